pub mod category_repository;
pub mod console_logger;
pub mod order_repository;
pub mod product_repository;
pub mod stock_repository;
pub mod user_repository;
pub mod warehouse_repository;

pub use category_repository::MySqlCategoryRepository;
pub use console_logger::ConsoleLogger;
pub use order_repository::MySqlOrderRepository;
pub use product_repository::MySqlProductRepository;
pub use stock_repository::MySqlStockRepository;
pub use user_repository::MySqlUserRepository;
pub use warehouse_repository::MySqlWarehouseRepository;
