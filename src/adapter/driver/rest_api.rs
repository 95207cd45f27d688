use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::service::{
    CategoryApplicationService, OrderApplicationService, OrderQueryService,
    ProductApplicationService, StockQueryService, UserApplicationService,
    WarehouseApplicationService,
};
use crate::application::ApplicationError;
use crate::adapter::driver::request_dto::{
    ActorQueryParams, AddToOrderRequest, CategoryRequest, ListQueryParams, ProductRequest,
    ProductsQueryParams, RemoveFromOrderRequest, UserRequest, WarehouseRequest,
};
use crate::adapter::driver::response_dto::{
    CategoryResponse, MessageResponse, OrderDetailResponse, OrderSummaryResponse,
    OrdersIndexResponse, ProductDetailResponse, ProductResponse, ProductStockResponse,
    UserResponse, WarehouseDetailResponse, WarehouseResponse, WorkflowResponse,
};
use crate::domain::model::{
    CategoryId, LineItemRemoval, Money, OrderId, ProductId, Role, UserId, WarehouseId,
};
use crate::domain::port::{OrderRepository, StockRepository};

/// APIエラーレスポンス
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

/// アプリケーションサービスを含む状態
pub struct AppState<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    pub order_service: Arc<OrderApplicationService<OR, SR>>,
    pub product_service: Arc<ProductApplicationService>,
    pub warehouse_service: Arc<WarehouseApplicationService>,
    pub user_service: Arc<UserApplicationService>,
    pub category_service: Arc<CategoryApplicationService>,
    pub order_query_service: Arc<OrderQueryService>,
    pub stock_query_service: Arc<StockQueryService>,
}

// Arcのクローンのみなのでリポジトリ型にCloneを要求しない
impl<OR, SR> Clone for AppState<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    fn clone(&self) -> Self {
        Self {
            order_service: self.order_service.clone(),
            product_service: self.product_service.clone(),
            warehouse_service: self.warehouse_service.clone(),
            user_service: self.user_service.clone(),
            category_service: self.category_service.clone(),
            order_query_service: self.order_query_service.clone(),
            stock_query_service: self.stock_query_service.clone(),
        }
    }
}

/// REST APIルーターを作成
pub fn create_router<OR, SR>() -> Router<AppState<OR, SR>>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        // 商品
        .route("/products", get(list_products::<OR, SR>).post(create_product::<OR, SR>))
        .route(
            "/products/:product_id",
            get(get_product::<OR, SR>).patch(update_product::<OR, SR>).delete(delete_product::<OR, SR>),
        )
        .route("/products/:product_id/remove", delete(remove_product_from_warehouse::<OR, SR>))
        .route("/products/:product_id/restore", patch(restore_product::<OR, SR>))
        .route("/products/:product_id/add-to-order", post(add_to_order::<OR, SR>))
        .route("/products/:product_id/remove-from-order", post(remove_from_order::<OR, SR>))
        // 倉庫
        .route("/warehouses", get(list_warehouses::<OR, SR>).post(create_warehouse::<OR, SR>))
        .route(
            "/warehouses/:warehouse_id",
            get(get_warehouse::<OR, SR>).patch(update_warehouse::<OR, SR>).delete(delete_warehouse::<OR, SR>),
        )
        .route("/warehouses/:warehouse_id/restore", put(restore_warehouse::<OR, SR>))
        // ユーザー
        .route("/users", get(list_users::<OR, SR>).post(create_user::<OR, SR>))
        .route(
            "/users/:user_id",
            get(get_user::<OR, SR>).patch(update_user::<OR, SR>).delete(delete_user::<OR, SR>),
        )
        // カテゴリ
        .route("/categories", get(list_categories::<OR, SR>).post(create_category::<OR, SR>))
        .route(
            "/categories/:category_id",
            get(get_category::<OR, SR>).patch(update_category::<OR, SR>).delete(delete_category::<OR, SR>),
        )
        // 注文
        .route("/orders", get(list_orders::<OR, SR>))
        .route("/orders/:order_id", get(get_order::<OR, SR>).delete(erase_order::<OR, SR>))
        .route("/orders/:order_id/finish", post(finish_order::<OR, SR>))
        .route("/orders/:order_id/cancel", delete(cancel_order::<OR, SR>))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "warehouse-inventory-management",
        "version": "0.1.0"
    }))
}

// 商品を注文に追加するエンドポイント
async fn add_to_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<AddToOrderRequest>,
) -> Result<Json<WorkflowResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(request.user_id);
    let product_id = ProductId::from_uuid(product_id);
    let explicit_order_id = request.order_id.map(OrderId::from_uuid);

    match state
        .order_service
        .add_product_to_order(user_id, product_id, request.quantity, explicit_order_id)
        .await
    {
        Ok(order_id) => Ok(Json(WorkflowResponse {
            order_id: order_id.to_string(),
            message: "Product added to order successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品を注文から取り除くエンドポイント
async fn remove_from_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<RemoveFromOrderRequest>,
) -> Result<Json<WorkflowResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(request.user_id);
    let product_id = ProductId::from_uuid(product_id);
    let explicit_order_id = request.order_id.map(OrderId::from_uuid);

    match state
        .order_service
        .remove_product_from_order(user_id, product_id, request.quantity, explicit_order_id)
        .await
    {
        Ok(result) => {
            // 明細ごと削除されたか数量のみ減少したかをメッセージで区別する
            let message = match result.removal {
                LineItemRemoval::Removed(_) => "Product removed from order successfully",
                LineItemRemoval::Reduced(_) => "Quantity removed from the order successfully",
            };
            Ok(Json(WorkflowResponse {
                order_id: result.order_id.to_string(),
                message: message.to_string(),
            }))
        }
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文完了エンドポイント
async fn finish_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<WorkflowResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let order_id = OrderId::from_uuid(order_id);

    match state.order_service.finish_order(order_id).await {
        Ok(order_id) => Ok(Json(WorkflowResponse {
            order_id: order_id.to_string(),
            message: "Order finished correctly".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文キャンセルエンドポイント
async fn cancel_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(order_id): Path<Uuid>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<WorkflowResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let order_id = OrderId::from_uuid(order_id);
    let user_id = UserId::from_uuid(params.user_id);

    match state.order_service.cancel_order(user_id, order_id).await {
        Ok(order_id) => Ok(Json(WorkflowResponse {
            order_id: order_id.to_string(),
            message: "Order canceled correctly".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文消去エンドポイント
async fn erase_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(order_id): Path<Uuid>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<WorkflowResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let order_id = OrderId::from_uuid(order_id);
    let user_id = UserId::from_uuid(params.user_id);

    match state.order_service.erase_order(user_id, order_id).await {
        Ok(order_id) => Ok(Json(WorkflowResponse {
            order_id: order_id.to_string(),
            message: "Order erased successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 注文一覧取得エンドポイント
// 現在の注文（金額は再計算済み）と完了済み注文の一覧を返す
async fn list_orders<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<OrdersIndexResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(params.user_id);

    let current_order = match state.order_query_service.current_order_for_user(user_id).await {
        Ok(current_order) => current_order,
        Err(err) => return Err(map_application_error(err)),
    };

    let orders = match state.order_query_service.list_finished_orders(user_id).await {
        Ok(orders) => orders,
        Err(err) => return Err(map_application_error(err)),
    };

    Ok(Json(OrdersIndexResponse {
        current_order: current_order
            .as_ref()
            .map(OrderDetailResponse::from_read_model),
        orders: orders.iter().map(OrderSummaryResponse::from_order).collect(),
    }))
}

// 注文詳細取得エンドポイント
async fn get_order<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(order_id): Path<Uuid>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<OrderDetailResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let order_id = OrderId::from_uuid(order_id);
    let user_id = UserId::from_uuid(params.user_id);

    match state.order_query_service.order_detail(order_id, user_id).await {
        Ok(Some(read_model)) => Ok(Json(OrderDetailResponse::from_read_model(&read_model))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された注文が見つかりません".to_string(),
                code: "ORDER_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品一覧取得エンドポイント
// 既定ではリクエスト元ユーザーの倉庫にある商品を返し、
// all=true の場合は全商品をユーザーの倉庫での数量付きで返す
async fn list_products<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Query(params): Query<ProductsQueryParams>,
) -> Result<Json<Vec<ProductStockResponse>>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(params.user_id);
    let include_deleted = params.deleted.unwrap_or(false);

    let user = match state.user_service.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiError {
                    error: "指定されたユーザーが見つかりません".to_string(),
                    code: "USER_NOT_FOUND".to_string(),
                }),
            ))
        }
        Err(err) => return Err(map_application_error(err)),
    };

    let all_view =
        params.all.unwrap_or(false) || user.role() == Role::Director || include_deleted;

    let warehouse_view = match user.warehouse_id() {
        Some(warehouse_id) if !all_view => Some(warehouse_id),
        _ => None,
    };

    match warehouse_view {
        // 倉庫ビュー: 所属倉庫にある商品のみ
        Some(warehouse_id) => {
            match state
                .stock_query_service
                .products_in_warehouse(warehouse_id)
                .await
            {
                Ok(stocks) => Ok(Json(
                    stocks
                        .iter()
                        .map(ProductStockResponse::from_product_stock)
                        .collect(),
                )),
                Err(err) => Err(map_application_error(err)),
            }
        }
        // 全倉庫ビュー: 商品一覧をユーザーの倉庫での数量付きで返す
        None => {
            let products = match state.product_service.list_products(include_deleted).await {
                Ok(products) => products,
                Err(err) => return Err(map_application_error(err)),
            };

            let mut response = Vec::with_capacity(products.len());
            for product in &products {
                let quantity = match user.warehouse_id() {
                    Some(warehouse_id) => {
                        match state
                            .stock_query_service
                            .quantity_on_hand(product.id(), warehouse_id)
                            .await
                        {
                            Ok(quantity) => quantity,
                            Err(err) => return Err(map_application_error(err)),
                        }
                    }
                    None => 0,
                };
                response.push(ProductStockResponse {
                    product: ProductResponse::from_product(product),
                    quantity,
                });
            }

            Ok(Json(response))
        }
    }
}

// 商品作成エンドポイント
async fn create_product<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(request.user_id);
    let category_ids = request
        .category_ids
        .iter()
        .map(|id| CategoryId::from_uuid(*id))
        .collect();

    match state
        .product_service
        .create_product(
            user_id,
            request.name,
            request.description.unwrap_or_default(),
            Money::new(request.unit_price),
            category_ids,
            request.quantity,
        )
        .await
    {
        Ok(product_id) => Ok(Json(MessageResponse {
            id: product_id.to_string(),
            message: "Product created successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品詳細取得エンドポイント
async fn get_product<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<ProductDetailResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let product_id = ProductId::from_uuid(product_id);
    let user_id = UserId::from_uuid(params.user_id);

    let product = match state.product_service.get_product(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiError {
                    error: "指定された商品が見つかりません".to_string(),
                    code: "PRODUCT_NOT_FOUND".to_string(),
                }),
            ))
        }
        Err(err) => return Err(map_application_error(err)),
    };

    let warehouse_id = match state.user_service.get_user(user_id).await {
        Ok(user) => user.and_then(|user| user.warehouse_id()),
        Err(err) => return Err(map_application_error(err)),
    };

    let quantity = match warehouse_id {
        Some(warehouse_id) => {
            match state
                .stock_query_service
                .quantity_on_hand(product_id, warehouse_id)
                .await
            {
                Ok(quantity) => quantity,
                Err(err) => return Err(map_application_error(err)),
            }
        }
        None => 0,
    };

    Ok(Json(ProductDetailResponse {
        product: ProductResponse::from_product(&product),
        quantity,
        warehouse_id: warehouse_id.map(|id| id.to_string()),
    }))
}

// 商品更新エンドポイント
async fn update_product<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<ProductRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let product_id = ProductId::from_uuid(product_id);
    let user_id = UserId::from_uuid(request.user_id);
    let category_ids = request
        .category_ids
        .iter()
        .map(|id| CategoryId::from_uuid(*id))
        .collect();

    match state
        .product_service
        .update_product(
            user_id,
            product_id,
            request.name,
            request.description.unwrap_or_default(),
            Money::new(request.unit_price),
            category_ids,
            request.quantity,
        )
        .await
    {
        Ok(product_id) => Ok(Json(MessageResponse {
            id: product_id.to_string(),
            message: "Product updated".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品削除エンドポイント（論理削除）
async fn delete_product<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let product_id = ProductId::from_uuid(product_id);

    match state.product_service.delete_product(product_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: product_id.to_string(),
            message: "Product deleted successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品を倉庫から取り除くエンドポイント
async fn remove_product_from_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
    Query(params): Query<ActorQueryParams>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let product_id = ProductId::from_uuid(product_id);
    let user_id = UserId::from_uuid(params.user_id);

    match state
        .product_service
        .remove_product_from_warehouse(user_id, product_id)
        .await
    {
        Ok(()) => Ok(Json(MessageResponse {
            id: product_id.to_string(),
            message: "Product removed from this warehouse".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 商品復元エンドポイント
async fn restore_product<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let product_id = ProductId::from_uuid(product_id);

    match state.product_service.restore_product(product_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: product_id.to_string(),
            message: "Product restored successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 倉庫一覧取得エンドポイント
async fn list_warehouses<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<WarehouseResponse>>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    match state
        .warehouse_service
        .list_warehouses(params.deleted.unwrap_or(false))
        .await
    {
        Ok(warehouses) => Ok(Json(
            warehouses
                .iter()
                .map(WarehouseResponse::from_warehouse)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 倉庫作成エンドポイント
async fn create_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Json(request): Json<WarehouseRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    match state.warehouse_service.create_warehouse(request.name).await {
        Ok(warehouse_id) => Ok(Json(MessageResponse {
            id: warehouse_id.to_string(),
            message: "Warehouse created successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 倉庫詳細取得エンドポイント（スタッフ一覧付き）
async fn get_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<WarehouseDetailResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let warehouse_id = WarehouseId::from_uuid(warehouse_id);

    let warehouse = match state.warehouse_service.get_warehouse(warehouse_id).await {
        Ok(Some(warehouse)) => warehouse,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiError {
                    error: "指定された倉庫が見つかりません".to_string(),
                    code: "WAREHOUSE_NOT_FOUND".to_string(),
                }),
            ))
        }
        Err(err) => return Err(map_application_error(err)),
    };

    let staff = match state.warehouse_service.warehouse_staff(warehouse_id).await {
        Ok(staff) => staff,
        Err(err) => return Err(map_application_error(err)),
    };

    Ok(Json(WarehouseDetailResponse {
        warehouse: WarehouseResponse::from_warehouse(&warehouse),
        staff: staff.iter().map(UserResponse::from_user).collect(),
    }))
}

// 倉庫更新エンドポイント
async fn update_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(warehouse_id): Path<Uuid>,
    Json(request): Json<WarehouseRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let warehouse_id = WarehouseId::from_uuid(warehouse_id);

    match state
        .warehouse_service
        .update_warehouse(warehouse_id, request.name)
        .await
    {
        Ok(warehouse_id) => Ok(Json(MessageResponse {
            id: warehouse_id.to_string(),
            message: "Warehouse updated".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 倉庫削除エンドポイント（論理削除）
async fn delete_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let warehouse_id = WarehouseId::from_uuid(warehouse_id);

    match state.warehouse_service.delete_warehouse(warehouse_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: warehouse_id.to_string(),
            message: "Warehouse disabled successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// 倉庫復元エンドポイント
async fn restore_warehouse<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(warehouse_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let warehouse_id = WarehouseId::from_uuid(warehouse_id);

    match state.warehouse_service.restore_warehouse(warehouse_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: warehouse_id.to_string(),
            message: "Warehouse restored successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// ユーザー一覧取得エンドポイント
async fn list_users<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<UserResponse>>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    match state
        .user_service
        .list_users(params.deleted.unwrap_or(false))
        .await
    {
        Ok(users) => Ok(Json(users.iter().map(UserResponse::from_user).collect())),
        Err(err) => Err(map_application_error(err)),
    }
}

// ユーザー作成エンドポイント
async fn create_user<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Json(request): Json<UserRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let role = match Role::from_string(&request.role) {
        Ok(role) => role,
        Err(err) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: format!("{}", err),
                    code: "INVALID_ROLE".to_string(),
                }),
            ))
        }
    };

    match state
        .user_service
        .create_user(
            request.name,
            request.email,
            role,
            request.warehouse_id.map(WarehouseId::from_uuid),
        )
        .await
    {
        Ok(user_id) => Ok(Json(MessageResponse {
            id: user_id.to_string(),
            message: "User created successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// ユーザー詳細取得エンドポイント
async fn get_user<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(user_id);

    match state.user_service.get_user(user_id).await {
        Ok(Some(user)) => Ok(Json(UserResponse::from_user(&user))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定されたユーザーが見つかりません".to_string(),
                code: "USER_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// ユーザー更新エンドポイント
async fn update_user<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UserRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(user_id);

    let role = match Role::from_string(&request.role) {
        Ok(role) => role,
        Err(err) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: format!("{}", err),
                    code: "INVALID_ROLE".to_string(),
                }),
            ))
        }
    };

    match state
        .user_service
        .update_user(
            user_id,
            request.name,
            request.email,
            role,
            request.warehouse_id.map(WarehouseId::from_uuid),
        )
        .await
    {
        Ok(user_id) => Ok(Json(MessageResponse {
            id: user_id.to_string(),
            message: "User updated successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// ユーザー削除エンドポイント（論理削除）
async fn delete_user<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let user_id = UserId::from_uuid(user_id);

    match state.user_service.delete_user(user_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: user_id.to_string(),
            message: "User deleted successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// カテゴリ一覧取得エンドポイント
async fn list_categories<OR, SR>(
    State(state): State<AppState<OR, SR>>,
) -> Result<Json<Vec<CategoryResponse>>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    match state.category_service.list_categories().await {
        Ok(categories) => Ok(Json(
            categories
                .iter()
                .map(CategoryResponse::from_category)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// カテゴリ作成エンドポイント
async fn create_category<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    match state.category_service.create_category(request.name).await {
        Ok(category_id) => Ok(Json(MessageResponse {
            id: category_id.to_string(),
            message: "Category created successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// カテゴリ詳細取得エンドポイント
async fn get_category<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let category_id = CategoryId::from_uuid(category_id);

    match state.category_service.get_category(category_id).await {
        Ok(Some(category)) => Ok(Json(CategoryResponse::from_category(&category))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定されたカテゴリが見つかりません".to_string(),
                code: "CATEGORY_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// カテゴリ更新エンドポイント
async fn update_category<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(category_id): Path<Uuid>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let category_id = CategoryId::from_uuid(category_id);

    match state
        .category_service
        .update_category(category_id, request.name)
        .await
    {
        Ok(category_id) => Ok(Json(MessageResponse {
            id: category_id.to_string(),
            message: "Category updated successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// カテゴリ削除エンドポイント
async fn delete_category<OR, SR>(
    State(state): State<AppState<OR, SR>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ApiError>)>
where
    OR: OrderRepository + 'static,
    SR: StockRepository + 'static,
{
    let category_id = CategoryId::from_uuid(category_id);

    match state.category_service.delete_category(category_id).await {
        Ok(()) => Ok(Json(MessageResponse {
            id: category_id.to_string(),
            message: "Category deleted successfully".to_string(),
        })),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: crate::domain::error::DomainError) -> (StatusCode, Json<ApiError>) {
    use crate::domain::error::DomainError;

    match domain_err {
        DomainError::InsufficientStock => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "在庫が不足しています".to_string(),
                code: "INSUFFICIENT_STOCK".to_string(),
            }),
        ),
        DomainError::NoActiveOrder => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "操作対象の未完了注文がありません".to_string(),
                code: "NO_ACTIVE_ORDER".to_string(),
            }),
        ),
        DomainError::LineItemNotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "注文にその商品の明細がありません".to_string(),
                code: "LINE_ITEM_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::OrderAlreadyFinished => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "注文は既に完了しています".to_string(),
                code: "ORDER_ALREADY_FINISHED".to_string(),
            }),
        ),
        DomainError::OrderAlreadyCanceled => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "注文は既にキャンセルされています".to_string(),
                code: "ORDER_ALREADY_CANCELED".to_string(),
            }),
        ),
        DomainError::OrderNotFound => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された注文が見つかりません".to_string(),
                code: "ORDER_NOT_FOUND".to_string(),
            }),
        ),
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な数量です".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
        DomainError::RepositoryError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
    }
}
