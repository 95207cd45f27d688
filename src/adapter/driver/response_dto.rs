use crate::application::service::{OrderReadModel, ProductStock};
use crate::domain::model::{Category, Order, Product, User, Warehouse};
use rust_decimal::Decimal;
use serde::Serialize;

/// 操作結果用のレスポンスDTO
/// (ステータス, 注文ID, メッセージ) のタプルのうちIDとメッセージを運ぶ
#[derive(Serialize)]
pub struct WorkflowResponse {
    pub order_id: String,
    pub message: String,
}

/// CRUD操作結果用のレスポンスDTO
#[derive(Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub message: String,
}

/// 注文一覧用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderSummaryResponse {
    pub order_id: String,
    pub user_id: String,
    pub item_count: u32,
    pub sub_total: Decimal,
    pub shipping_cost: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
    pub finished: bool,
    pub canceled: bool,
}

/// 注文明細用のレスポンスDTO
/// remaining_quantityは閲覧者の倉庫におけるその商品の現在の台帳数量
#[derive(Serialize)]
pub struct LineItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub remaining_quantity: u32,
}

/// 注文詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct OrderDetailResponse {
    pub order_id: String,
    pub user_id: String,
    pub item_count: u32,
    pub sub_total: Decimal,
    pub shipping_cost: Decimal,
    pub taxes: Decimal,
    pub total: Decimal,
    pub finished: bool,
    pub canceled: bool,
    pub line_items: Vec<LineItemResponse>,
}

/// 注文一覧画面用のレスポンスDTO
/// 現在の注文と完了済み注文の一覧を運ぶ
#[derive(Serialize)]
pub struct OrdersIndexResponse {
    pub current_order: Option<OrderDetailResponse>,
    pub orders: Vec<OrderSummaryResponse>,
}

/// 商品用のレスポンスDTO
#[derive(Serialize)]
pub struct ProductResponse {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    pub category_ids: Vec<String>,
    pub deleted: bool,
}

/// 数量付き商品用のレスポンスDTO
#[derive(Serialize)]
pub struct ProductStockResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub quantity: u32,
}

/// 商品詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub quantity: u32,
    pub warehouse_id: Option<String>,
}

/// 倉庫用のレスポンスDTO
#[derive(Serialize)]
pub struct WarehouseResponse {
    pub warehouse_id: String,
    pub name: String,
    pub deleted: bool,
}

/// スタッフ一覧付き倉庫詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct WarehouseDetailResponse {
    #[serde(flatten)]
    pub warehouse: WarehouseResponse,
    pub staff: Vec<UserResponse>,
}

/// ユーザー用のレスポンスDTO
#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub warehouse_id: Option<String>,
    pub deleted: bool,
}

/// カテゴリ用のレスポンスDTO
#[derive(Serialize)]
pub struct CategoryResponse {
    pub category_id: String,
    pub name: String,
}

impl OrderSummaryResponse {
    /// ドメインオブジェクトからOrderSummaryResponseを作成
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            item_count: order.item_count(),
            sub_total: order.sub_total().amount(),
            shipping_cost: order.shipping_cost().amount(),
            taxes: order.taxes().amount(),
            total: order.total().amount(),
            finished: order.is_finished(),
            canceled: order.is_canceled(),
        }
    }
}

impl OrderDetailResponse {
    /// 読み取りモデルからOrderDetailResponseを作成
    pub fn from_read_model(read_model: &OrderReadModel) -> Self {
        let line_items = read_model
            .line_items
            .iter()
            .map(|item| LineItemResponse {
                product_id: item.line_item.product_id().to_string(),
                quantity: item.line_item.quantity(),
                unit_price: item.line_item.unit_price().amount(),
                subtotal: item.line_item.subtotal().amount(),
                remaining_quantity: item.remaining_quantity,
            })
            .collect();

        let order = &read_model.order;
        Self {
            order_id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            item_count: order.item_count(),
            sub_total: order.sub_total().amount(),
            shipping_cost: order.shipping_cost().amount(),
            taxes: order.taxes().amount(),
            total: order.total().amount(),
            finished: order.is_finished(),
            canceled: order.is_canceled(),
            line_items,
        }
    }
}

impl ProductResponse {
    /// ドメインオブジェクトからProductResponseを作成
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id().to_string(),
            name: product.name().to_string(),
            description: product.description().to_string(),
            unit_price: product.unit_price().amount(),
            category_ids: product
                .category_ids()
                .iter()
                .map(|id| id.to_string())
                .collect(),
            deleted: product.is_deleted(),
        }
    }
}

impl ProductStockResponse {
    /// 数量付き商品からProductStockResponseを作成
    pub fn from_product_stock(stock: &ProductStock) -> Self {
        Self {
            product: ProductResponse::from_product(&stock.product),
            quantity: stock.quantity,
        }
    }
}

impl WarehouseResponse {
    /// ドメインオブジェクトからWarehouseResponseを作成
    pub fn from_warehouse(warehouse: &Warehouse) -> Self {
        Self {
            warehouse_id: warehouse.id().to_string(),
            name: warehouse.name().to_string(),
            deleted: warehouse.is_deleted(),
        }
    }
}

impl UserResponse {
    /// ドメインオブジェクトからUserResponseを作成
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            role: user.role().to_string(),
            warehouse_id: user.warehouse_id().map(|id| id.to_string()),
            deleted: user.is_deleted(),
        }
    }
}

impl CategoryResponse {
    /// ドメインオブジェクトからCategoryResponseを作成
    pub fn from_category(category: &Category) -> Self {
        Self {
            category_id: category.id().to_string(),
            name: category.name().to_string(),
        }
    }
}
