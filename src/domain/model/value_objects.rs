use crate::domain::error::DomainError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 注文の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// 新しい一意のOrderIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OrderId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOrderIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// 商品の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// 新しい一意のProductIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ProductId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からProductIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

/// 倉庫の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseId(Uuid);

impl WarehouseId {
    /// 新しい一意のWarehouseIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから WarehouseId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からWarehouseIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for WarehouseId {
    fn default() -> Self {
        Self::new()
    }
}

/// ユーザーの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// カテゴリの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// 新しい一意のCategoryIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CategoryId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCategoryIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

/// スタッフの役割
/// ワークフローが区別するのは従業員かそれ以外かのみ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// 従業員（自分の最新の未完了注文を暗黙的に操作する）
    Employee,
    /// スーパーバイザー（注文IDを明示して操作する）
    Supervisor,
    /// ディレクター（全倉庫を横断して閲覧できる）
    Director,
}

impl Role {
    /// 従業員かどうか
    pub fn is_employee(&self) -> bool {
        matches!(self, Role::Employee)
    }

    /// 文字列からRoleを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "employee" => Ok(Role::Employee),
            "supervisor" => Ok(Role::Supervisor),
            "director" => Ok(Role::Director),
            _ => Err(DomainError::InvalidValue(format!("無効な役割: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role_str = match self {
            Role::Employee => "employee",
            Role::Supervisor => "supervisor",
            Role::Director => "director",
        };
        write!(f, "{}", role_str)
    }
}

/// ワークフロー操作を実行する作業者
/// 認証コラボレーターが解決したユーザーの識別情報・役割・所属倉庫を運ぶ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    role: Role,
    warehouse_id: WarehouseId,
}

impl Actor {
    /// 新しい作業者を作成
    pub fn new(user_id: UserId, role: Role, warehouse_id: WarehouseId) -> Self {
        Self {
            user_id,
            role,
            warehouse_id,
        }
    }

    /// ユーザーIDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 役割を取得
    pub fn role(&self) -> Role {
        self.role
    }

    /// 所属倉庫IDを取得
    pub fn warehouse_id(&self) -> WarehouseId {
        self.warehouse_id
    }
}

/// 金額を表す値オブジェクト
/// 派生金額は小数点以下2桁に丸める（ゼロから遠い方向への四捨五入）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// 金額から作成
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// ゼロ金額を作成
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// 金額を取得
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Money {
        Money(self.0 + other.0)
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money(self.0 * Decimal::from(factor))
    }

    /// 小数点以下2桁に丸めた金額を返す
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 注文明細を表す値オブジェクト
/// (注文, 商品) の組ごとに最大1件、数量が0になった時点で削除される
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    product_id: ProductId,
    quantity: u32,
    unit_price: Money,
}

impl LineItem {
    /// 新しい注文明細を作成
    /// 数量は1以上である必要がある
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
        })
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 単価を取得
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// 小計を計算（単価 × 数量）
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// 数量を増加させ、単価を商品の現在単価で上書きする
    /// 明細は最後に追加された時点の単価を保持する
    pub fn add_quantity(&mut self, additional_quantity: u32, unit_price: Money) -> Result<(), DomainError> {
        if additional_quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        self.quantity += additional_quantity;
        self.unit_price = unit_price;
        Ok(())
    }

    /// 数量を減少させる
    /// 呼び出し側は quantity 未満の値のみ渡すこと（数量0の明細は存在できない）
    pub fn reduce_quantity(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 || quantity >= self.quantity {
            return Err(DomainError::InvalidQuantity);
        }
        self.quantity -= quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_id_creation() {
        let id1 = OrderId::new();
        let id2 = OrderId::new();
        assert_ne!(id1, id2, "Each OrderId should be unique");
    }

    #[test]
    fn test_role_from_string() {
        assert_eq!(Role::from_string("employee").unwrap(), Role::Employee);
        assert_eq!(Role::from_string("supervisor").unwrap(), Role::Supervisor);
        assert_eq!(Role::from_string("director").unwrap(), Role::Director);
        assert!(Role::from_string("manager").is_err());
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::new(dec!(10.00));
        let money2 = Money::new(dec!(5.50));
        let result = money1.add(&money2);
        assert_eq!(result.amount(), dec!(15.50));
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::new(dec!(1.25));
        let result = money.multiply(4);
        assert_eq!(result.amount(), dec!(5.00));
    }

    #[test]
    fn test_money_rounding_half_away_from_zero() {
        // 0.005 は 0.01 に切り上げられる
        assert_eq!(Money::new(dec!(0.005)).rounded().amount(), dec!(0.01));
        assert_eq!(Money::new(dec!(0.004)).rounded().amount(), dec!(0.00));
        assert_eq!(Money::new(dec!(2.675)).rounded().amount(), dec!(2.68));
    }

    #[test]
    fn test_line_item_creation() {
        let product_id = ProductId::new();
        let price = Money::new(dec!(5.00));
        let item = LineItem::new(product_id, 2, price).unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.subtotal().amount(), dec!(10.00));
    }

    #[test]
    fn test_line_item_invalid_quantity() {
        let product_id = ProductId::new();
        let price = Money::new(dec!(5.00));
        let result = LineItem::new(product_id, 0, price);
        assert!(result.is_err());
    }

    #[test]
    fn test_line_item_add_quantity_overwrites_unit_price() {
        let product_id = ProductId::new();
        let mut item = LineItem::new(product_id, 2, Money::new(dec!(5.00))).unwrap();

        item.add_quantity(3, Money::new(dec!(6.00))).unwrap();

        assert_eq!(item.quantity(), 5);
        assert_eq!(item.unit_price().amount(), dec!(6.00));
    }

    #[test]
    fn test_line_item_reduce_quantity() {
        let product_id = ProductId::new();
        let mut item = LineItem::new(product_id, 5, Money::new(dec!(5.00))).unwrap();

        item.reduce_quantity(2).unwrap();
        assert_eq!(item.quantity(), 3);

        // 数量以上の減少は明細の削除であり、reduce_quantityでは扱えない
        assert!(item.reduce_quantity(3).is_err());
    }
}
