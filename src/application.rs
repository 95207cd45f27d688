// アプリケーション層
// ユースケースの調整と読み取り専用クエリ

pub mod error;
pub mod service;

pub use error::ApplicationError;
