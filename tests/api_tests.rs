use axum_test::TestServer;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use warehouse_inventory_management::adapter::driven::ConsoleLogger;
use warehouse_inventory_management::adapter::driver::rest_api::{create_router, AppState};
use warehouse_inventory_management::application::service::{
    CategoryApplicationService, OrderApplicationService, OrderQueryService,
    ProductApplicationService, StockQueryService, UserApplicationService,
    WarehouseApplicationService,
};
use warehouse_inventory_management::domain::model::{
    Category, CategoryId, Money, Order, OrderId, Product, ProductId, Role, StockEntry, User,
    UserId, Warehouse, WarehouseId,
};
use warehouse_inventory_management::domain::port::{
    CategoryRepository, OrderRepository, ProductRepository, RepositoryError, StockRepository,
    UserRepository, WarehouseRepository,
};
use warehouse_inventory_management::domain::service::OrderWorkflowService;

use async_trait::async_trait;
use rust_decimal_macros::dec;

// テスト用のインメモリリポジトリ
#[derive(Clone, Default)]
struct InMemoryOrderRepository {
    orders: Arc<Mutex<Vec<Order>>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
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

#[derive(Clone, Default)]
struct InMemoryStockRepository {
    entries: Arc<Mutex<HashMap<(ProductId, WarehouseId), u32>>>,
}

#[async_trait]
impl StockRepository for InMemoryStockRepository {
    async fn save(&self, entry: &StockEntry) -> Result<(), RepositoryError> {
        self.entries
            .lock()
            .unwrap()
            .insert((entry.product_id(), entry.warehouse_id()), entry.quantity());
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
        self.entries
            .lock()
            .unwrap()
            .remove(&(product_id, warehouse_id));
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

#[derive(Clone, Default)]
struct InMemoryProductRepository {
    products: Arc<Mutex<HashMap<ProductId, Product>>>,
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products
            .lock()
            .unwrap()
            .insert(product.id(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.lock().unwrap().get(&product_id).cloned())
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Product>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| include_deleted || !p.is_deleted())
            .cloned()
            .collect())
    }

    fn next_identity(&self) -> ProductId {
        ProductId::new()
    }
}

#[derive(Clone, Default)]
struct InMemoryWarehouseRepository {
    warehouses: Arc<Mutex<HashMap<WarehouseId, Warehouse>>>,
}

#[async_trait]
impl WarehouseRepository for InMemoryWarehouseRepository {
    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        self.warehouses
            .lock()
            .unwrap()
            .insert(warehouse.id(), warehouse.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, RepositoryError> {
        Ok(self.warehouses.lock().unwrap().get(&warehouse_id).cloned())
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Warehouse>, RepositoryError> {
        Ok(self
            .warehouses
            .lock()
            .unwrap()
            .values()
            .filter(|w| include_deleted || !w.is_deleted())
            .cloned()
            .collect())
    }

    fn next_identity(&self) -> WarehouseId {
        WarehouseId::new()
    }
}

#[derive(Clone, Default)]
struct InMemoryUserRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
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

#[derive(Clone, Default)]
struct InMemoryCategoryRepository {
    categories: Arc<Mutex<HashMap<CategoryId, Category>>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn save(&self, category: &Category) -> Result<(), RepositoryError> {
        self.categories
            .lock()
            .unwrap()
            .insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        Ok(self.categories.lock().unwrap().get(&category_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.categories.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, category_id: CategoryId) -> Result<(), RepositoryError> {
        self.categories.lock().unwrap().remove(&category_id);
        Ok(())
    }

    fn next_identity(&self) -> CategoryId {
        CategoryId::new()
    }
}

/// テストサーバーと、シードした従業員・倉庫・商品のID
struct TestContext {
    server: TestServer,
    user_id: Uuid,
    product_id: Uuid,
}

/// インメモリリポジトリでサーバーを組み立て、
/// 倉庫1つ・従業員1人・在庫10の商品1つをシードする
async fn setup() -> TestContext {
    let order_repository = InMemoryOrderRepository::default();
    let stock_repository = InMemoryStockRepository::default();
    let product_repository = InMemoryProductRepository::default();
    let warehouse_repository = InMemoryWarehouseRepository::default();
    let user_repository = InMemoryUserRepository::default();
    let category_repository = InMemoryCategoryRepository::default();

    let warehouse = Warehouse::new(WarehouseId::new(), "東京第1倉庫".to_string()).unwrap();
    warehouse_repository.save(&warehouse).await.unwrap();

    let user = User::new(
        UserId::new(),
        "山田太郎".to_string(),
        "yamada@example.com".to_string(),
        Role::Employee,
        Some(warehouse.id()),
    )
    .unwrap();
    user_repository.save(&user).await.unwrap();

    let product = Product::new(
        ProductId::new(),
        "ボルトM8".to_string(),
        String::new(),
        Money::new(dec!(5.00)),
        Vec::new(),
    )
    .unwrap();
    product_repository.save(&product).await.unwrap();
    stock_repository
        .save(&StockEntry::new(product.id(), warehouse.id(), 10))
        .await
        .unwrap();

    let logger = Arc::new(ConsoleLogger::new());
    let user_repository = Arc::new(user_repository);
    let product_repository = Arc::new(product_repository);
    let stock_repository_arc = Arc::new(stock_repository.clone());
    let order_repository_arc = Arc::new(order_repository.clone());

    let workflow = OrderWorkflowService::new(
        order_repository.clone(),
        stock_repository.clone(),
        logger,
    );

    let state = AppState {
        order_service: Arc::new(OrderApplicationService::new(
            workflow,
            user_repository.clone(),
            product_repository.clone(),
        )),
        product_service: Arc::new(ProductApplicationService::new(
            product_repository.clone(),
            stock_repository_arc.clone(),
            user_repository.clone(),
        )),
        warehouse_service: Arc::new(WarehouseApplicationService::new(
            Arc::new(warehouse_repository),
            user_repository.clone(),
        )),
        user_service: Arc::new(UserApplicationService::new(user_repository.clone())),
        category_service: Arc::new(CategoryApplicationService::new(Arc::new(
            category_repository,
        ))),
        order_query_service: Arc::new(OrderQueryService::new(
            order_repository_arc,
            stock_repository_arc.clone(),
            user_repository.clone(),
        )),
        stock_query_service: Arc::new(StockQueryService::new(
            stock_repository_arc,
            product_repository,
        )),
    };

    let app = create_router().with_state(state);
    let server = TestServer::new(app).unwrap();

    TestContext {
        server,
        user_id: user.id().as_uuid(),
        product_id: product.id().as_uuid(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let context = setup().await;

    let response = context.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_add_to_order_and_read_current_order() {
    let context = setup().await;

    let response = context
        .server
        .post(&format!("/products/{}/add-to-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 4, "order_id": null }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Product added to order successfully");

    let response = context
        .server
        .get("/orders")
        .add_query_param("user_id", context.user_id)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let current_order = &body["current_order"];

    // 金額は読み取り時に再計算される: 小計 20.00、配送料 0.80、税額 2.00
    assert_eq!(current_order["item_count"], 4);
    assert_eq!(current_order["sub_total"], "20.00");
    assert_eq!(current_order["shipping_cost"], "0.80");
    assert_eq!(current_order["taxes"], "2.00");
    assert_eq!(current_order["total"], "22.80");

    // 明細には倉庫の残数量が付与される
    assert_eq!(current_order["line_items"][0]["quantity"], 4);
    assert_eq!(current_order["line_items"][0]["remaining_quantity"], 6);
}

#[tokio::test]
async fn test_add_to_order_with_insufficient_stock_is_rejected() {
    let context = setup().await;

    let response = context
        .server
        .post(&format!("/products/{}/add-to-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 99, "order_id": null }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    // 在庫は変化していない
    let response = context
        .server
        .get(&format!("/products/{}", context.product_id))
        .add_query_param("user_id", context.user_id)
        .await;
    let body: Value = response.json();
    assert_eq!(body["quantity"], 10);
}

#[tokio::test]
async fn test_remove_from_order_messages_distinguish_outcomes() {
    let context = setup().await;

    context
        .server
        .post(&format!("/products/{}/add-to-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 4, "order_id": null }))
        .await
        .assert_status_ok();

    // 一部のみ取り除き → 数量の減少
    let response = context
        .server
        .post(&format!("/products/{}/remove-from-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 1, "order_id": null }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Quantity removed from the order successfully");

    // 残りすべてを取り除き → 明細ごと削除
    let response = context
        .server
        .post(&format!("/products/{}/remove-from-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 3, "order_id": null }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Product removed from order successfully");
}

#[tokio::test]
async fn test_finish_order_then_current_order_is_gone() {
    let context = setup().await;

    let response = context
        .server
        .post(&format!("/products/{}/add-to-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 2, "order_id": null }))
        .await;
    let body: Value = response.json();
    let order_id = body["order_id"].as_str().unwrap().to_string();

    context
        .server
        .post(&format!("/orders/{}/finish", order_id))
        .await
        .assert_status_ok();

    // 完了の二重実行は拒否される
    let response = context
        .server
        .post(&format!("/orders/{}/finish", order_id))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "ORDER_ALREADY_FINISHED");

    // 現在の注文はなくなり、完了済み一覧に現れる
    let response = context
        .server
        .get("/orders")
        .add_query_param("user_id", context.user_id)
        .await;
    let body: Value = response.json();
    assert!(body["current_order"].is_null());
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"][0]["order_id"], order_id);
}

#[tokio::test]
async fn test_cancel_order_returns_stock() {
    let context = setup().await;

    let response = context
        .server
        .post(&format!("/products/{}/add-to-order", context.product_id))
        .json(&json!({ "user_id": context.user_id, "quantity": 4, "order_id": null }))
        .await;
    let body: Value = response.json();
    let order_id = body["order_id"].as_str().unwrap().to_string();

    context
        .server
        .delete(&format!("/orders/{}/cancel", order_id))
        .add_query_param("user_id", context.user_id)
        .await
        .assert_status_ok();

    // 在庫は作業者の倉庫に戻る
    let response = context
        .server
        .get(&format!("/products/{}", context.product_id))
        .add_query_param("user_id", context.user_id)
        .await;
    let body: Value = response.json();
    assert_eq!(body["quantity"], 10);
}

#[tokio::test]
async fn test_category_crud() {
    let context = setup().await;

    let response = context
        .server
        .post("/categories")
        .json(&json!({ "name": "工具" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let category_id = body["id"].as_str().unwrap().to_string();

    let response = context
        .server
        .patch(&format!("/categories/{}", category_id))
        .json(&json!({ "name": "電動工具" }))
        .await;
    response.assert_status_ok();

    let response = context.server.get(&format!("/categories/{}", category_id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "電動工具");

    context
        .server
        .delete(&format!("/categories/{}", category_id))
        .await
        .assert_status_ok();

    let response = context.server.get(&format!("/categories/{}", category_id)).await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
