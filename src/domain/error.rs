/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 在庫不足（要求数量が台帳の現在数量を超えている）
    InsufficientStock,
    /// 操作対象となる未完了の注文が存在しない
    NoActiveOrder,
    /// (注文, 商品) に対応する注文明細が存在しない
    LineItemNotFound,
    /// 完了済みの注文に対する操作（完了の二重実行、明細編集、消去）
    OrderAlreadyFinished,
    /// キャンセル済みの注文に対する再キャンセル
    OrderAlreadyCanceled,
    /// 指定されたIDの注文が存在しない
    OrderNotFound,
    /// 無効な数量（例: 0以下の数量）
    InvalidQuantity,
    /// 無効な値
    InvalidValue(String),
    /// リポジトリ操作の失敗
    RepositoryError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InsufficientStock => write!(f, "Insufficient stock"),
            DomainError::NoActiveOrder => write!(f, "No active order"),
            DomainError::LineItemNotFound => write!(f, "Line item not found"),
            DomainError::OrderAlreadyFinished => write!(f, "Order already finished"),
            DomainError::OrderAlreadyCanceled => write!(f, "Order already canceled"),
            DomainError::OrderNotFound => write!(f, "Order not found"),
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            DomainError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
