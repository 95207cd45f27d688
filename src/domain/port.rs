// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::model::{
    Category, CategoryId, Order, OrderId, Product, ProductId, StockEntry, User, UserId, Warehouse,
    WarehouseId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// リポジトリ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 注文リポジトリトレイト
/// 注文集約の永続化を抽象化する
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 注文を保存する（明細も含めて保存される）
    async fn save(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 注文IDで注文を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Order))` - 注文が見つかった
    /// * `Ok(None)` - 注文が見つからなかった
    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// ユーザーの「現在の注文」を検索する
    /// 最新の注文が未完了である場合にのみそれを返す。
    /// グローバルな状態は持たず、毎回クエリで解決する
    async fn find_open_order_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// 完了済みの注文を取得する
    /// 作成日時の降順で並べて返す
    async fn find_finished(&self) -> Result<Vec<Order>, RepositoryError>;

    /// 新しい一意の注文IDを生成する
    fn next_identity(&self) -> OrderId;
}

/// 在庫台帳リポジトリトレイト
/// (商品, 倉庫) ごとの手持ち数量の永続化を抽象化する
#[async_trait]
pub trait StockRepository: Send + Sync {
    /// 台帳エントリを保存する（数量を指定値に上書きするUPSERT）
    async fn save(&self, entry: &StockEntry) -> Result<(), RepositoryError>;

    /// (商品, 倉庫) の台帳エントリを検索する
    /// 関連が存在しない場合の数量は0として扱う
    async fn find(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<StockEntry>, RepositoryError>;

    /// (商品, 倉庫) の数量を差分で調整する
    /// 単一の原子的な読み取り・変更・書き込みとして実行され、
    /// 結果が負になる場合は何も変更せずにfalseを返す
    ///
    /// # Returns
    /// * `Ok(true)` - 調整成功
    /// * `Ok(false)` - 数量不足のため調整されなかった
    async fn adjust(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
    ) -> Result<bool, RepositoryError>;

    /// (商品, 倉庫) の関連を数量にかかわらず削除する
    async fn remove(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<(), RepositoryError>;

    /// 指定された倉庫の全台帳エントリを取得する
    async fn find_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<StockEntry>, RepositoryError>;
}

/// 商品リポジトリトレイト
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 商品を保存する（カテゴリの割り当ても含めて保存される）
    async fn save(&self, product: &Product) -> Result<(), RepositoryError>;

    /// 商品IDで商品を検索する（論理削除済みの商品も返す）
    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// すべての商品を取得する
    ///
    /// # Arguments
    /// * `include_deleted` - trueの場合は論理削除済みの商品も含める
    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Product>, RepositoryError>;

    /// 新しい一意の商品IDを生成する
    fn next_identity(&self) -> ProductId;
}

/// 倉庫リポジトリトレイト
#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    /// 倉庫を保存する
    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError>;

    /// 倉庫IDで倉庫を検索する（論理削除済みの倉庫も返す）
    async fn find_by_id(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, RepositoryError>;

    /// すべての倉庫を取得する
    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Warehouse>, RepositoryError>;

    /// 新しい一意の倉庫IDを生成する
    fn next_identity(&self) -> WarehouseId;
}

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを保存する
    async fn save(&self, user: &User) -> Result<(), RepositoryError>;

    /// ユーザーIDでユーザーを検索する
    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError>;

    /// すべてのユーザーを取得する
    async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, RepositoryError>;

    /// 指定された倉庫に所属するスタッフを取得する
    async fn find_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<User>, RepositoryError>;

    /// 新しい一意のユーザーIDを生成する
    fn next_identity(&self) -> UserId;
}

/// カテゴリリポジトリトレイト
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// カテゴリを保存する
    async fn save(&self, category: &Category) -> Result<(), RepositoryError>;

    /// カテゴリIDでカテゴリを検索する
    async fn find_by_id(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError>;

    /// すべてのカテゴリを取得する
    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError>;

    /// カテゴリを削除する（物理削除）
    async fn delete(&self, category_id: CategoryId) -> Result<(), RepositoryError>;

    /// 新しい一意のカテゴリIDを生成する
    fn next_identity(&self) -> CategoryId;
}
