use warehouse_inventory_management::adapter::driven::{
    ConsoleLogger, MySqlCategoryRepository, MySqlOrderRepository, MySqlProductRepository,
    MySqlStockRepository, MySqlUserRepository, MySqlWarehouseRepository,
};
use warehouse_inventory_management::adapter::driver::rest_api::{create_router, AppState};
use warehouse_inventory_management::adapter::{DatabaseConfig, DatabaseMigration};
use warehouse_inventory_management::application::service::{
    CategoryApplicationService, OrderApplicationService, OrderQueryService,
    ProductApplicationService, StockQueryService, UserApplicationService,
    WarehouseApplicationService,
};
use warehouse_inventory_management::domain::service::OrderWorkflowService;

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== 倉庫在庫管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLリポジトリを作成
    let order_repository = Arc::new(MySqlOrderRepository::new(pool.clone()));
    let stock_repository = Arc::new(MySqlStockRepository::new(pool.clone()));
    let product_repository = Arc::new(MySqlProductRepository::new(pool.clone()));
    let warehouse_repository = Arc::new(MySqlWarehouseRepository::new(pool.clone()));
    let user_repository = Arc::new(MySqlUserRepository::new(pool.clone()));
    let category_repository = Arc::new(MySqlCategoryRepository::new(pool.clone()));

    // ロガーを作成
    let logger = Arc::new(ConsoleLogger::new());

    // ワークフローサービスとアプリケーションサービスを作成
    let workflow = OrderWorkflowService::new(
        MySqlOrderRepository::new(pool.clone()),
        MySqlStockRepository::new(pool.clone()),
        logger.clone(),
    );
    let order_service = OrderApplicationService::new(
        workflow,
        user_repository.clone(),
        product_repository.clone(),
    );
    let product_service = ProductApplicationService::new(
        product_repository.clone(),
        stock_repository.clone(),
        user_repository.clone(),
    );
    let warehouse_service =
        WarehouseApplicationService::new(warehouse_repository.clone(), user_repository.clone());
    let user_service = UserApplicationService::new(user_repository.clone());
    let category_service = CategoryApplicationService::new(category_repository.clone());
    let order_query_service = OrderQueryService::new(
        order_repository.clone(),
        stock_repository.clone(),
        user_repository.clone(),
    );
    let stock_query_service =
        StockQueryService::new(stock_repository.clone(), product_repository.clone());

    // アプリケーション状態を作成
    let app_state = AppState {
        order_service: Arc::new(order_service),
        product_service: Arc::new(product_service),
        warehouse_service: Arc::new(warehouse_service),
        user_service: Arc::new(user_service),
        category_service: Arc::new(category_service),
        order_query_service: Arc::new(order_query_service),
        stock_query_service: Arc::new(stock_query_service),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  GET    /products - 商品一覧取得");
    println!("  POST   /products - 商品作成");
    println!("  POST   /products/:id/add-to-order - 商品を注文に追加");
    println!("  POST   /products/:id/remove-from-order - 商品を注文から取り除き");
    println!("  GET    /orders - 注文一覧取得（現在の注文 + 完了済み注文）");
    println!("  POST   /orders/:id/finish - 注文完了");
    println!("  DELETE /orders/:id/cancel - 注文キャンセル");
    println!("  DELETE /orders/:id - 注文消去");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
