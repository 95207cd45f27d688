// 倉庫在庫管理システム
// ドメイン駆動設計によるヘキサゴナルアーキテクチャ

pub mod adapter;
pub mod application;
pub mod domain;
