pub mod order_query_service;
pub mod stock_query_service;

pub use order_query_service::{LineItemReadModel, OrderQueryService, OrderReadModel};
pub use stock_query_service::{ProductStock, StockQueryService};

use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Actor, Category, CategoryId, Money, OrderId, Product, ProductId, Role, StockEntry, User,
    UserId, Warehouse, WarehouseId,
};
use crate::domain::port::{
    CategoryRepository, OrderRepository, ProductRepository, StockRepository, UserRepository,
    WarehouseRepository,
};
use crate::domain::service::{OrderResolution, OrderWorkflowService, RemoveFromOrderResult};
use std::sync::Arc;

/// 注文アプリケーションサービス
/// 作業者の解決と対象商品の検証を行い、ワークフローサービスに委譲する
pub struct OrderApplicationService<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    workflow: OrderWorkflowService<OR, SR>,
    user_repository: Arc<dyn UserRepository>,
    product_repository: Arc<dyn ProductRepository>,
}

impl<OR, SR> OrderApplicationService<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    /// 新しい注文アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `workflow` - 注文ワークフローサービス
    /// * `user_repository` - ユーザーリポジトリ
    /// * `product_repository` - 商品リポジトリ
    pub fn new(
        workflow: OrderWorkflowService<OR, SR>,
        user_repository: Arc<dyn UserRepository>,
        product_repository: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            workflow,
            user_repository,
            product_repository,
        }
    }

    /// リクエストのユーザーIDをワークフローの作業者として解決する
    async fn resolve_actor(&self, user_id: UserId) -> Result<Actor, ApplicationError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ユーザーが見つかりません: {}", user_id))
            })?;

        user.as_actor().map_err(ApplicationError::from)
    }

    /// 対象商品を取得する（論理削除済みの商品は対象外）
    async fn load_product(&self, product_id: ProductId) -> Result<Product, ApplicationError> {
        self.product_repository
            .find_by_id(product_id)
            .await?
            .filter(|product| !product.is_deleted())
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("商品が見つかりません: {}", product_id))
            })
    }

    /// 商品を注文に追加
    ///
    /// # Returns
    /// * `Ok(OrderId)` - 追加先の注文ID
    pub async fn add_product_to_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        explicit_order_id: Option<OrderId>,
    ) -> Result<OrderId, ApplicationError> {
        let actor = self.resolve_actor(user_id).await?;
        let product = self.load_product(product_id).await?;
        let resolution = OrderResolution::select(actor.role(), explicit_order_id)?;

        self.workflow
            .add_to_order(&actor, &product, quantity, &resolution)
            .await
            .map_err(ApplicationError::from)
    }

    /// 商品を注文から取り除く
    ///
    /// # Returns
    /// * `Ok(RemoveFromOrderResult)` - 対象注文のIDと取り除きの内訳
    pub async fn remove_product_from_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        explicit_order_id: Option<OrderId>,
    ) -> Result<RemoveFromOrderResult, ApplicationError> {
        let actor = self.resolve_actor(user_id).await?;
        let product = self.load_product(product_id).await?;
        let resolution = OrderResolution::select(actor.role(), explicit_order_id)?;

        self.workflow
            .remove_from_order(&actor, product.id(), quantity, &resolution)
            .await
            .map_err(ApplicationError::from)
    }

    /// 注文を完了
    pub async fn finish_order(&self, order_id: OrderId) -> Result<OrderId, ApplicationError> {
        self.workflow
            .finish_order(order_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 注文をキャンセル
    /// 各明細の数量は作業者の所属倉庫の台帳に戻る
    pub async fn cancel_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderId, ApplicationError> {
        let actor = self.resolve_actor(user_id).await?;
        self.workflow
            .cancel_order(&actor, order_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 未完了の注文を消去
    pub async fn erase_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderId, ApplicationError> {
        let actor = self.resolve_actor(user_id).await?;
        self.workflow
            .erase_order(&actor, order_id)
            .await
            .map_err(ApplicationError::from)
    }
}

/// 商品アプリケーションサービス
/// 商品CRUDと、作業者の倉庫に対する台帳エントリの維持を担当する
pub struct ProductApplicationService {
    product_repository: Arc<dyn ProductRepository>,
    stock_repository: Arc<dyn StockRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl ProductApplicationService {
    /// 新しい商品アプリケーションサービスを作成
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        stock_repository: Arc<dyn StockRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            product_repository,
            stock_repository,
            user_repository,
        }
    }

    async fn load_user(&self, user_id: UserId) -> Result<User, ApplicationError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .filter(|user| !user.is_deleted())
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ユーザーが見つかりません: {}", user_id))
            })
    }

    /// 新しい商品を作成
    /// ディレクター以外が作成した場合は、作成者の倉庫に初期数量で
    /// 台帳エントリを登録する
    pub async fn create_product(
        &self,
        user_id: UserId,
        name: String,
        description: String,
        unit_price: Money,
        category_ids: Vec<CategoryId>,
        quantity: u32,
    ) -> Result<ProductId, ApplicationError> {
        let user = self.load_user(user_id).await?;

        let product = Product::new(
            self.product_repository.next_identity(),
            name,
            description,
            unit_price,
            category_ids,
        )?;
        self.product_repository.save(&product).await?;

        if user.role() != Role::Director {
            if let Some(warehouse_id) = user.warehouse_id() {
                let entry = StockEntry::new(product.id(), warehouse_id, quantity);
                self.stock_repository.save(&entry).await?;
            }
        }

        Ok(product.id())
    }

    /// 商品を更新
    /// 作業者の倉庫の台帳エントリは、既に存在すれば数量を上書きし、
    /// 存在せず数量が正の場合のみ新規に登録する
    pub async fn update_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
        name: String,
        description: String,
        unit_price: Money,
        category_ids: Vec<CategoryId>,
        quantity: u32,
    ) -> Result<ProductId, ApplicationError> {
        let user = self.load_user(user_id).await?;

        let mut product = self
            .product_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("商品が見つかりません: {}", product_id))
            })?;

        product.update(name, description, unit_price)?;
        product.set_categories(category_ids);
        self.product_repository.save(&product).await?;

        if let Some(warehouse_id) = user.warehouse_id() {
            let existing = self
                .stock_repository
                .find(product.id(), warehouse_id)
                .await?;
            if existing.is_some() || quantity > 0 {
                let entry = StockEntry::new(product.id(), warehouse_id, quantity);
                self.stock_repository.save(&entry).await?;
            }
        }

        Ok(product.id())
    }

    /// 商品を論理削除
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), ApplicationError> {
        let mut product = self
            .product_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("商品が見つかりません: {}", product_id))
            })?;

        product.mark_deleted();
        self.product_repository.save(&product).await?;
        Ok(())
    }

    /// 論理削除された商品を復元
    pub async fn restore_product(&self, product_id: ProductId) -> Result<(), ApplicationError> {
        let mut product = self
            .product_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("商品が見つかりません: {}", product_id))
            })?;

        product.restore();
        self.product_repository.save(&product).await?;
        Ok(())
    }

    /// 商品を作業者の倉庫から取り除く
    /// 数量にかかわらず台帳の関連ごと削除する
    pub async fn remove_product_from_warehouse(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), ApplicationError> {
        let user = self.load_user(user_id).await?;
        let warehouse_id = user.warehouse_id().ok_or_else(|| {
            ApplicationError::DomainError(DomainError::InvalidValue(
                "作業者に倉庫が割り当てられていません".to_string(),
            ))
        })?;

        self.stock_repository
            .remove(product_id, warehouse_id)
            .await?;
        Ok(())
    }

    /// 商品IDで商品を取得
    pub async fn get_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, ApplicationError> {
        self.product_repository
            .find_by_id(product_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての商品を取得
    pub async fn list_products(
        &self,
        include_deleted: bool,
    ) -> Result<Vec<Product>, ApplicationError> {
        self.product_repository
            .find_all(include_deleted)
            .await
            .map_err(ApplicationError::from)
    }
}

/// 倉庫アプリケーションサービス
pub struct WarehouseApplicationService {
    warehouse_repository: Arc<dyn WarehouseRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl WarehouseApplicationService {
    /// 新しい倉庫アプリケーションサービスを作成
    pub fn new(
        warehouse_repository: Arc<dyn WarehouseRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            warehouse_repository,
            user_repository,
        }
    }

    /// 新しい倉庫を作成
    pub async fn create_warehouse(&self, name: String) -> Result<WarehouseId, ApplicationError> {
        let warehouse = Warehouse::new(self.warehouse_repository.next_identity(), name)?;
        self.warehouse_repository.save(&warehouse).await?;
        Ok(warehouse.id())
    }

    /// 倉庫を更新
    pub async fn update_warehouse(
        &self,
        warehouse_id: WarehouseId,
        name: String,
    ) -> Result<WarehouseId, ApplicationError> {
        let mut warehouse = self
            .warehouse_repository
            .find_by_id(warehouse_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("倉庫が見つかりません: {}", warehouse_id))
            })?;

        warehouse.rename(name)?;
        self.warehouse_repository.save(&warehouse).await?;
        Ok(warehouse.id())
    }

    /// 倉庫を論理削除（無効化）
    pub async fn delete_warehouse(&self, warehouse_id: WarehouseId) -> Result<(), ApplicationError> {
        let mut warehouse = self
            .warehouse_repository
            .find_by_id(warehouse_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("倉庫が見つかりません: {}", warehouse_id))
            })?;

        warehouse.mark_deleted();
        self.warehouse_repository.save(&warehouse).await?;
        Ok(())
    }

    /// 論理削除された倉庫を復元
    pub async fn restore_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<(), ApplicationError> {
        let mut warehouse = self
            .warehouse_repository
            .find_by_id(warehouse_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("倉庫が見つかりません: {}", warehouse_id))
            })?;

        warehouse.restore();
        self.warehouse_repository.save(&warehouse).await?;
        Ok(())
    }

    /// 倉庫IDで倉庫を取得
    pub async fn get_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, ApplicationError> {
        self.warehouse_repository
            .find_by_id(warehouse_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 倉庫に所属するスタッフを取得
    pub async fn warehouse_staff(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<User>, ApplicationError> {
        self.user_repository
            .find_by_warehouse(warehouse_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべての倉庫を取得
    pub async fn list_warehouses(
        &self,
        include_deleted: bool,
    ) -> Result<Vec<Warehouse>, ApplicationError> {
        self.warehouse_repository
            .find_all(include_deleted)
            .await
            .map_err(ApplicationError::from)
    }
}

/// ユーザーアプリケーションサービス
pub struct UserApplicationService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserApplicationService {
    /// 新しいユーザーアプリケーションサービスを作成
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    /// 新しいユーザーを作成
    pub async fn create_user(
        &self,
        name: String,
        email: String,
        role: Role,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<UserId, ApplicationError> {
        let user = User::new(
            self.user_repository.next_identity(),
            name,
            email,
            role,
            warehouse_id,
        )?;
        self.user_repository.save(&user).await?;
        Ok(user.id())
    }

    /// ユーザーを更新
    pub async fn update_user(
        &self,
        user_id: UserId,
        name: String,
        email: String,
        role: Role,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<UserId, ApplicationError> {
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ユーザーが見つかりません: {}", user_id))
            })?;

        user.update(name, email, role, warehouse_id)?;
        self.user_repository.save(&user).await?;
        Ok(user.id())
    }

    /// ユーザーを論理削除
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), ApplicationError> {
        let mut user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("ユーザーが見つかりません: {}", user_id))
            })?;

        user.mark_deleted();
        self.user_repository.save(&user).await?;
        Ok(())
    }

    /// ユーザーIDでユーザーを取得
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, ApplicationError> {
        self.user_repository
            .find_by_id(user_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべてのユーザーを取得
    pub async fn list_users(&self, include_deleted: bool) -> Result<Vec<User>, ApplicationError> {
        self.user_repository
            .find_all(include_deleted)
            .await
            .map_err(ApplicationError::from)
    }
}

/// カテゴリアプリケーションサービス
pub struct CategoryApplicationService {
    category_repository: Arc<dyn CategoryRepository>,
}

impl CategoryApplicationService {
    /// 新しいカテゴリアプリケーションサービスを作成
    pub fn new(category_repository: Arc<dyn CategoryRepository>) -> Self {
        Self {
            category_repository,
        }
    }

    /// 新しいカテゴリを作成
    pub async fn create_category(&self, name: String) -> Result<CategoryId, ApplicationError> {
        let category = Category::new(self.category_repository.next_identity(), name)?;
        self.category_repository.save(&category).await?;
        Ok(category.id())
    }

    /// カテゴリを更新
    pub async fn update_category(
        &self,
        category_id: CategoryId,
        name: String,
    ) -> Result<CategoryId, ApplicationError> {
        let mut category = self
            .category_repository
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("カテゴリが見つかりません: {}", category_id))
            })?;

        category.rename(name)?;
        self.category_repository.save(&category).await?;
        Ok(category.id())
    }

    /// カテゴリを削除
    pub async fn delete_category(&self, category_id: CategoryId) -> Result<(), ApplicationError> {
        self.category_repository
            .delete(category_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// カテゴリIDでカテゴリを取得
    pub async fn get_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<Category>, ApplicationError> {
        self.category_repository
            .find_by_id(category_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// すべてのカテゴリを取得
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApplicationError> {
        self.category_repository
            .find_all()
            .await
            .map_err(ApplicationError::from)
    }
}
