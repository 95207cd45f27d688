use crate::application::ApplicationError;
use crate::domain::model::{LineItem, Order, OrderId, UserId, WarehouseId};
use crate::domain::port::{OrderRepository, StockRepository, UserRepository};
use std::sync::Arc;

/// 残数量を付与した注文明細の読み取りモデル
/// 残数量は閲覧者の倉庫におけるその商品の現在の台帳数量
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemReadModel {
    pub line_item: LineItem,
    pub remaining_quantity: u32,
}

/// 読み取り用の注文モデル
/// 派生金額は読み取りのたびに再計算される（保存はされない）
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReadModel {
    pub order: Order,
    pub line_items: Vec<LineItemReadModel>,
}

/// 注文クエリサービス
/// 読み取り専用の注文操作を提供する
pub struct OrderQueryService {
    order_repository: Arc<dyn OrderRepository>,
    stock_repository: Arc<dyn StockRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl OrderQueryService {
    /// 新しい注文クエリサービスを作成
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        stock_repository: Arc<dyn StockRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            order_repository,
            stock_repository,
            user_repository,
        }
    }

    /// 閲覧者の所属倉庫を取得する（倉庫なしのユーザーはNone）
    async fn viewer_warehouse(
        &self,
        user_id: UserId,
    ) -> Result<Option<WarehouseId>, ApplicationError> {
        let user = self.user_repository.find_by_id(user_id).await?;
        Ok(user.and_then(|user| user.warehouse_id()))
    }

    /// 派生金額を再計算し、明細に残数量を付与する
    /// 単価やカテゴリが最後の保存以降に変化している可能性があるため、
    /// 金額は保存された値ではなく毎回計算し直す
    async fn annotate(
        &self,
        mut order: Order,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<OrderReadModel, ApplicationError> {
        order.recompute_totals();

        let mut line_items = Vec::with_capacity(order.line_items().len());
        for item in order.line_items() {
            let remaining_quantity = match warehouse_id {
                Some(warehouse_id) => self
                    .stock_repository
                    .find(item.product_id(), warehouse_id)
                    .await?
                    .map(|entry| entry.quantity())
                    .unwrap_or(0),
                None => 0,
            };
            line_items.push(LineItemReadModel {
                line_item: item.clone(),
                remaining_quantity,
            });
        }

        Ok(OrderReadModel { order, line_items })
    }

    /// ユーザーの「現在の注文」を取得
    /// 最新の注文が未完了である場合にのみ返す
    ///
    /// # Returns
    /// * `Ok(Some(OrderReadModel))` - 現在の注文（金額は再計算済み）
    /// * `Ok(None)` - 未完了の注文が存在しない
    pub async fn current_order_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<OrderReadModel>, ApplicationError> {
        let order = self
            .order_repository
            .find_open_order_for_user(user_id)
            .await?;

        match order {
            Some(order) => {
                let warehouse_id = self.viewer_warehouse(user_id).await?;
                Ok(Some(self.annotate(order, warehouse_id).await?))
            }
            None => Ok(None),
        }
    }

    /// 注文IDで注文の詳細を取得
    /// 金額は再計算され、明細には閲覧者の倉庫での残数量が付与される
    pub async fn order_detail(
        &self,
        order_id: OrderId,
        viewer_user_id: UserId,
    ) -> Result<Option<OrderReadModel>, ApplicationError> {
        let order = self.order_repository.find_by_id(order_id).await?;

        match order {
            Some(order) => {
                let warehouse_id = self.viewer_warehouse(viewer_user_id).await?;
                Ok(Some(self.annotate(order, warehouse_id).await?))
            }
            None => Ok(None),
        }
    }

    /// 完了済みの注文の一覧を取得
    /// 閲覧者の「現在の注文」は一覧から除外される
    pub async fn list_finished_orders(
        &self,
        viewer_user_id: UserId,
    ) -> Result<Vec<Order>, ApplicationError> {
        let current_order_id = self
            .order_repository
            .find_open_order_for_user(viewer_user_id)
            .await?
            .map(|order| order.id());

        let orders = self.order_repository.find_finished().await?;

        Ok(orders
            .into_iter()
            .filter(|order| Some(order.id()) != current_order_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Money, ProductId, StockEntry, User};
    use crate::domain::model::Role;
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // テスト用のモックリポジトリ
    struct MockOrderRepository {
        orders: Mutex<Vec<Order>>,
    }

    impl MockOrderRepository {
        fn new() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
            }
        }

        fn add_order(&self, order: Order) {
            self.orders.lock().unwrap().push(order);
        }
    }

    #[async_trait]
    impl OrderRepository for MockOrderRepository {
        async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
            let mut orders = self.orders.lock().unwrap();
            if let Some(existing) = orders.iter_mut().find(|o| o.id() == order.id()) {
                *existing = order.clone();
            } else {
                orders.push(order.clone());
            }
            Ok(())
        }

        async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().find(|o| o.id() == order_id).cloned())
        }

        async fn find_open_order_for_user(
            &self,
            user_id: UserId,
        ) -> Result<Option<Order>, RepositoryError> {
            // 挿入順を作成順とみなし、最新の注文が未完了のときだけ返す
            let orders = self.orders.lock().unwrap();
            Ok(orders
                .iter()
                .filter(|o| o.user_id() == user_id)
                .last()
                .filter(|o| !o.is_finished())
                .cloned())
        }

        async fn find_finished(&self) -> Result<Vec<Order>, RepositoryError> {
            let orders = self.orders.lock().unwrap();
            Ok(orders.iter().filter(|o| o.is_finished()).cloned().collect())
        }

        fn next_identity(&self) -> OrderId {
            OrderId::new()
        }
    }

    struct MockStockRepository {
        entries: Mutex<HashMap<(ProductId, WarehouseId), u32>>,
    }

    impl MockStockRepository {
        fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }

        fn set(&self, product_id: ProductId, warehouse_id: WarehouseId, quantity: u32) {
            self.entries
                .lock()
                .unwrap()
                .insert((product_id, warehouse_id), quantity);
        }
    }

    #[async_trait]
    impl StockRepository for MockStockRepository {
        async fn save(&self, entry: &StockEntry) -> Result<(), RepositoryError> {
            self.set(entry.product_id(), entry.warehouse_id(), entry.quantity());
            Ok(())
        }

        async fn find(
            &self,
            product_id: ProductId,
            warehouse_id: WarehouseId,
        ) -> Result<Option<StockEntry>, RepositoryError> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .get(&(product_id, warehouse_id))
                .map(|quantity| StockEntry::new(product_id, warehouse_id, *quantity)))
        }

        async fn adjust(
            &self,
            product_id: ProductId,
            warehouse_id: WarehouseId,
            delta: i64,
        ) -> Result<bool, RepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            let current = i64::from(*entries.get(&(product_id, warehouse_id)).unwrap_or(&0));
            let next = current + delta;
            if next < 0 {
                return Ok(false);
            }
            entries.insert((product_id, warehouse_id), next as u32);
            Ok(true)
        }

        async fn remove(
            &self,
            product_id: ProductId,
            warehouse_id: WarehouseId,
        ) -> Result<(), RepositoryError> {
            self.entries.lock().unwrap().remove(&(product_id, warehouse_id));
            Ok(())
        }

        async fn find_by_warehouse(
            &self,
            warehouse_id: WarehouseId,
        ) -> Result<Vec<StockEntry>, RepositoryError> {
            let entries = self.entries.lock().unwrap();
            Ok(entries
                .iter()
                .filter(|((_, w), _)| *w == warehouse_id)
                .map(|((p, w), q)| StockEntry::new(*p, *w, *q))
                .collect())
        }
    }

    struct MockUserRepository {
        users: Mutex<HashMap<UserId, User>>,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }

        fn add_user(&self, user: User) {
            self.users.lock().unwrap().insert(user.id(), user);
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn save(&self, user: &User) -> Result<(), RepositoryError> {
            self.users.lock().unwrap().insert(user.id(), user.clone());
            Ok(())
        }

        async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }

        async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .filter(|u| include_deleted || !u.is_deleted())
                .cloned()
                .collect())
        }

        async fn find_by_warehouse(
            &self,
            warehouse_id: WarehouseId,
        ) -> Result<Vec<User>, RepositoryError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .filter(|u| u.warehouse_id() == Some(warehouse_id))
                .cloned()
                .collect())
        }

        fn next_identity(&self) -> UserId {
            UserId::new()
        }
    }

    fn employee(warehouse_id: WarehouseId) -> User {
        User::new(
            UserId::new(),
            "山田太郎".to_string(),
            "yamada@example.com".to_string(),
            Role::Employee,
            Some(warehouse_id),
        )
        .unwrap()
    }

    fn service(
        orders: Arc<MockOrderRepository>,
        stock: Arc<MockStockRepository>,
        users: Arc<MockUserRepository>,
    ) -> OrderQueryService {
        OrderQueryService::new(orders, stock, users)
    }

    #[tokio::test]
    async fn test_current_order_recomputes_totals_on_read() {
        let orders = Arc::new(MockOrderRepository::new());
        let stock = Arc::new(MockStockRepository::new());
        let users = Arc::new(MockUserRepository::new());

        let warehouse_id = WarehouseId::new();
        let user = employee(warehouse_id);
        users.add_user(user.clone());

        // 保存された金額はゼロのままの注文（再計算されていない状態）
        let mut order = Order::new(OrderId::new(), user.id());
        order
            .add_item(ProductId::new(), 3, Money::new(dec!(5.00)))
            .unwrap();
        orders.add_order(order);

        let result = service(orders, stock, users)
            .current_order_for_user(user.id())
            .await
            .unwrap()
            .unwrap();

        // 読み取り時に再計算される
        assert_eq!(result.order.sub_total().amount(), dec!(15.00));
        assert_eq!(result.order.total().amount(), dec!(16.95));
    }

    #[tokio::test]
    async fn test_current_order_none_when_latest_is_finished() {
        let orders = Arc::new(MockOrderRepository::new());
        let stock = Arc::new(MockStockRepository::new());
        let users = Arc::new(MockUserRepository::new());

        let user = employee(WarehouseId::new());
        users.add_user(user.clone());

        let mut order = Order::new(OrderId::new(), user.id());
        order.finish().unwrap();
        orders.add_order(order);

        let result = service(orders, stock, users)
            .current_order_for_user(user.id())
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_line_items_annotated_with_remaining_quantity() {
        let orders = Arc::new(MockOrderRepository::new());
        let stock = Arc::new(MockStockRepository::new());
        let users = Arc::new(MockUserRepository::new());

        let warehouse_id = WarehouseId::new();
        let user = employee(warehouse_id);
        users.add_user(user.clone());

        let product_id = ProductId::new();
        stock.set(product_id, warehouse_id, 6);

        let mut order = Order::new(OrderId::new(), user.id());
        order.add_item(product_id, 4, Money::new(dec!(5.00))).unwrap();
        orders.add_order(order);

        let result = service(orders, stock, users)
            .current_order_for_user(user.id())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.line_items.len(), 1);
        assert_eq!(result.line_items[0].remaining_quantity, 6);
    }

    #[tokio::test]
    async fn test_finished_listing_excludes_current_order() {
        let orders = Arc::new(MockOrderRepository::new());
        let stock = Arc::new(MockStockRepository::new());
        let users = Arc::new(MockUserRepository::new());

        let user = employee(WarehouseId::new());
        users.add_user(user.clone());

        let mut finished = Order::new(OrderId::new(), user.id());
        finished.finish().unwrap();
        orders.add_order(finished.clone());

        // 最新の未完了注文（現在の注文）
        let current = Order::new(OrderId::new(), user.id());
        orders.add_order(current.clone());

        let listing = service(orders, stock, users)
            .list_finished_orders(user.id())
            .await
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id(), finished.id());
        assert!(listing.iter().all(|o| o.id() != current.id()));
    }
}
