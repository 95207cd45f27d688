use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 注文への商品追加用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct AddToOrderRequest {
    pub user_id: Uuid,
    pub quantity: u32,
    /// 従業員以外の役割が対象注文を明示するためのID
    pub order_id: Option<Uuid>,
}

/// 注文からの商品取り除き用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct RemoveFromOrderRequest {
    pub user_id: Uuid,
    pub quantity: u32,
    pub order_id: Option<Uuid>,
}

/// 商品作成・更新用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct ProductRequest {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub category_ids: Vec<Uuid>,
    /// リクエスト元ユーザーの倉庫に登録する数量
    pub quantity: u32,
}

/// 倉庫作成・更新用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct WarehouseRequest {
    pub name: String,
}

/// ユーザー作成・更新用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct UserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    pub warehouse_id: Option<Uuid>,
}

/// カテゴリ作成・更新用のリクエストDTO
#[derive(Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// 商品一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct ProductsQueryParams {
    pub user_id: Uuid,
    /// trueの場合は全倉庫の商品を対象にする
    pub all: Option<bool>,
    /// trueの場合は論理削除済みの商品も含める
    pub deleted: Option<bool>,
}

/// 作業者を指定するクエリパラメータ
#[derive(Deserialize)]
pub struct ActorQueryParams {
    pub user_id: Uuid,
}

/// 論理削除込みの一覧取得用のクエリパラメータ
#[derive(Deserialize)]
pub struct ListQueryParams {
    pub deleted: Option<bool>,
}
