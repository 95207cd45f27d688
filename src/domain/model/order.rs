use crate::domain::error::DomainError;
use crate::domain::model::{LineItem, Money, OrderId, ProductId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// 配送料率（小計 × 0.01 × 商品点数）
const SHIPPING_RATE: Decimal = dec!(0.01);
/// 税率（小計 × 0.10）
const TAX_RATE: Decimal = dec!(0.10);

/// 注文明細の取り除き結果
/// 明細ごと削除されたか、数量のみ減少したかを区別する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemRemoval {
    /// 明細が削除された（戻すべき数量は明細が持っていた数量）
    Removed(u32),
    /// 数量のみ減少した
    Reduced(u32),
}

impl LineItemRemoval {
    /// 台帳に戻すべき数量を取得
    pub fn removed_quantity(&self) -> u32 {
        match self {
            LineItemRemoval::Removed(quantity) => *quantity,
            LineItemRemoval::Reduced(quantity) => *quantity,
        }
    }
}

/// Order集約
/// 注文明細の集合と派生金額、ライフサイクル（完了・キャンセル）を管理する
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    line_items: Vec<LineItem>,
    item_count: u32,
    sub_total: Money,
    shipping_cost: Money,
    taxes: Money,
    total: Money,
    finished: bool,
    canceled: bool,
}

impl Order {
    /// 新しい注文を作成
    /// 明細なし、金額はすべてゼロ、未完了・未キャンセル
    pub fn new(id: OrderId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            line_items: Vec::new(),
            item_count: 0,
            sub_total: Money::zero(),
            shipping_cost: Money::zero(),
            taxes: Money::zero(),
            total: Money::zero(),
            finished: false,
            canceled: false,
        }
    }

    /// データベースから取得したデータで注文を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: OrderId,
        user_id: UserId,
        line_items: Vec<LineItem>,
        item_count: u32,
        sub_total: Money,
        shipping_cost: Money,
        taxes: Money,
        total: Money,
        finished: bool,
        canceled: bool,
    ) -> Self {
        Self {
            id,
            user_id,
            line_items,
            item_count,
            sub_total,
            shipping_cost,
            taxes,
            total,
            finished,
            canceled,
        }
    }

    /// 注文IDを取得
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// 所有ユーザーのIDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 注文明細のリストを取得
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// 商品点数（全明細の数量合計）を取得
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    /// 小計を取得
    pub fn sub_total(&self) -> Money {
        self.sub_total
    }

    /// 配送料を取得
    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    /// 税額を取得
    pub fn taxes(&self) -> Money {
        self.taxes
    }

    /// 合計を取得
    pub fn total(&self) -> Money {
        self.total
    }

    /// 完了済みかどうか
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// キャンセル済みかどうか
    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    /// 指定された商品の注文明細を取得
    pub fn line_item(&self, product_id: ProductId) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|item| item.product_id() == product_id)
    }

    /// 商品を注文に追加
    /// 同じ商品の明細が既に存在する場合は数量を増加し、
    /// どちらの場合も単価を商品の現在単価で上書きする
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<(), DomainError> {
        if self.finished {
            return Err(DomainError::OrderAlreadyFinished);
        }
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        if let Some(existing_item) = self
            .line_items
            .iter_mut()
            .find(|item| item.product_id() == product_id)
        {
            existing_item.add_quantity(quantity, unit_price)?;
        } else {
            let item = LineItem::new(product_id, quantity, unit_price)?;
            self.line_items.push(item);
        }

        self.item_count += quantity;
        Ok(())
    }

    /// 商品を注文から取り除く
    /// 要求数量が明細の数量以上なら明細ごと削除し、明細が持っていた数量を返す。
    /// それ未満なら数量のみ減少させる。
    pub fn remove_item(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineItemRemoval, DomainError> {
        if self.finished {
            return Err(DomainError::OrderAlreadyFinished);
        }
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let position = self
            .line_items
            .iter()
            .position(|item| item.product_id() == product_id)
            .ok_or(DomainError::LineItemNotFound)?;

        let removal = if quantity >= self.line_items[position].quantity() {
            let item = self.line_items.remove(position);
            LineItemRemoval::Removed(item.quantity())
        } else {
            self.line_items[position].reduce_quantity(quantity)?;
            LineItemRemoval::Reduced(quantity)
        };

        self.item_count -= removal.removed_quantity();
        Ok(removal)
    }

    /// 派生金額を現在の明細から再計算する
    /// 後続のフィールドは先行フィールドの丸め済みの値に依存するため、
    /// 小計 → 配送料 → 税額 → 合計 の順でそれぞれ個別に丸める
    pub fn recompute_totals(&mut self) {
        let sub_total = self
            .line_items
            .iter()
            .map(|item| item.subtotal())
            .fold(Money::zero(), |acc, amount| acc.add(&amount))
            .rounded();

        let shipping_cost = Money::new(
            sub_total.amount() * SHIPPING_RATE * Decimal::from(self.item_count),
        )
        .rounded();

        let taxes = Money::new(sub_total.amount() * TAX_RATE).rounded();

        let total = sub_total.add(&shipping_cost).add(&taxes).rounded();

        self.sub_total = sub_total;
        self.shipping_cost = shipping_cost;
        self.taxes = taxes;
        self.total = total;
    }

    /// 注文を完了する
    /// 事前条件: 未完了であること。完了後の明細編集は許可されない
    pub fn finish(&mut self) -> Result<(), DomainError> {
        if self.finished {
            return Err(DomainError::OrderAlreadyFinished);
        }
        self.recompute_totals();
        self.finished = true;
        Ok(())
    }

    /// 注文をキャンセルする
    /// 完了済みかどうかとは独立に設定できるが、二重キャンセルは拒否する
    /// （台帳への返却が再実行されてしまうため）
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.canceled {
            return Err(DomainError::OrderAlreadyCanceled);
        }
        self.canceled = true;
        Ok(())
    }

    /// 未完了の注文を消去する
    /// すべての明細を削除し、商品点数を0に戻す。注文そのものは残る
    pub fn erase(&mut self) -> Result<(), DomainError> {
        if self.finished {
            return Err(DomainError::OrderAlreadyFinished);
        }
        self.line_items.clear();
        self.item_count = 0;
        Ok(())
    }
}
