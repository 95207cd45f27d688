// ドメインサービス
// 複数の集約にまたがるビジネスロジックを実装

use crate::domain::error::DomainError;
use crate::domain::model::{Actor, LineItemRemoval, Order, OrderId, Product, ProductId, Role};
use crate::domain::port::{Logger, OrderRepository, StockRepository};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 対象注文の解決戦略
/// リクエストごとに役割から一度だけ選択され、ワークフローサービスに渡される
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResolution {
    /// 作業者自身の最新の未完了注文を暗黙的に対象とする（従業員）
    ImplicitForActor,
    /// 指定されたIDの注文を対象とする（従業員以外の役割）
    ExplicitById(OrderId),
}

impl OrderResolution {
    /// 役割と明示的な注文IDから解決戦略を選択する
    pub fn select(role: Role, explicit_order_id: Option<OrderId>) -> Result<Self, DomainError> {
        if role.is_employee() {
            Ok(OrderResolution::ImplicitForActor)
        } else {
            explicit_order_id
                .map(OrderResolution::ExplicitById)
                .ok_or_else(|| {
                    DomainError::InvalidValue("注文IDが指定されていません".to_string())
                })
        }
    }
}

/// 取り除き操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveFromOrderResult {
    pub order_id: OrderId,
    pub removal: LineItemRemoval,
}

/// 注文ワークフローサービス
/// 在庫台帳とOrder集約の間の数量の移動を1リクエスト=1整合性単位として調整する。
/// 台帳への書き込みの前にすべての事前条件チェックが完了するため、
/// 失敗したリクエストは何も変更しない
pub struct OrderWorkflowService<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    order_repository: OR,
    stock_repository: SR,
    logger: Arc<dyn Logger>,
}

impl<OR, SR> OrderWorkflowService<OR, SR>
where
    OR: OrderRepository,
    SR: StockRepository,
{
    /// 新しいワークフローサービスを作成
    ///
    /// # Arguments
    /// * `order_repository` - 注文リポジトリ
    /// * `stock_repository` - 在庫台帳リポジトリ
    /// * `logger` - ロガー
    pub fn new(order_repository: OR, stock_repository: SR, logger: Arc<dyn Logger>) -> Self {
        Self {
            order_repository,
            stock_repository,
            logger,
        }
    }

    /// 対象注文を解決する
    /// 暗黙解決では最新の未完了注文を再利用し、存在しない場合の扱いは
    /// `create_if_absent` で分岐する（追加では新規作成、取り除きでは失敗）
    async fn resolve_order(
        &self,
        actor: &Actor,
        resolution: &OrderResolution,
        create_if_absent: bool,
    ) -> Result<Order, DomainError> {
        match resolution {
            OrderResolution::ImplicitForActor => {
                let open_order = self
                    .order_repository
                    .find_open_order_for_user(actor.user_id())
                    .await
                    .map_err(|e| {
                        DomainError::RepositoryError(format!("注文の取得に失敗: {}", e))
                    })?;

                match open_order {
                    Some(order) => Ok(order),
                    None if create_if_absent => Ok(Order::new(
                        self.order_repository.next_identity(),
                        actor.user_id(),
                    )),
                    None => Err(DomainError::NoActiveOrder),
                }
            }
            OrderResolution::ExplicitById(order_id) => {
                let order = self
                    .order_repository
                    .find_by_id(*order_id)
                    .await
                    .map_err(|e| {
                        DomainError::RepositoryError(format!("注文の取得に失敗: {}", e))
                    })?
                    .ok_or(DomainError::OrderNotFound)?;

                if order.is_finished() {
                    return Err(DomainError::OrderAlreadyFinished);
                }

                Ok(order)
            }
        }
    }

    /// 商品を注文に追加する
    /// 作業者の倉庫の台帳から数量を引き当て、注文明細に移す。
    /// 台帳の数量が足りない場合は何も変更せずに失敗する
    ///
    /// # Returns
    /// * `Ok(OrderId)` - 追加先の注文ID
    pub async fn add_to_order(
        &self,
        actor: &Actor,
        product: &Product,
        quantity: u32,
        resolution: &OrderResolution,
    ) -> Result<OrderId, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        // 台帳に触れる前に対象注文を解決する
        // （存在しない明示IDで在庫だけが減ることを防ぐ）
        let mut order = self.resolve_order(actor, resolution, true).await?;

        let adjusted = self
            .stock_repository
            .adjust(
                product.id(),
                actor.warehouse_id(),
                -(i64::from(quantity)),
            )
            .await
            .map_err(|e| DomainError::RepositoryError(format!("台帳の調整に失敗: {}", e)))?;

        if !adjusted {
            return Err(DomainError::InsufficientStock);
        }

        order.add_item(product.id(), quantity, product.unit_price())?;

        self.order_repository
            .save(&order)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の保存に失敗: {}", e)))?;

        let correlation_id = Uuid::new_v4();
        self.logger.info(
            "OrderWorkflowService",
            "商品を注文に追加しました",
            Some(correlation_id),
            Some(HashMap::from([
                ("order_id".to_string(), order.id().to_string()),
                ("product_id".to_string(), product.id().to_string()),
                ("quantity".to_string(), quantity.to_string()),
            ])),
        );

        Ok(order.id())
    }

    /// 商品を注文から取り除く
    /// 実際に取り除かれた数量（要求数量と明細数量の小さい方）だけを
    /// 作業者の倉庫の台帳に戻す
    ///
    /// # Returns
    /// * `Ok(RemoveFromOrderResult)` - 対象注文のIDと、明細ごと削除されたか
    ///   数量のみ減少したか
    pub async fn remove_from_order(
        &self,
        actor: &Actor,
        product_id: ProductId,
        quantity: u32,
        resolution: &OrderResolution,
    ) -> Result<RemoveFromOrderResult, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }

        let mut order = self.resolve_order(actor, resolution, false).await?;

        let removal = order.remove_item(product_id, quantity)?;

        self.stock_repository
            .adjust(
                product_id,
                actor.warehouse_id(),
                i64::from(removal.removed_quantity()),
            )
            .await
            .map_err(|e| DomainError::RepositoryError(format!("台帳の調整に失敗: {}", e)))?;

        self.order_repository
            .save(&order)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の保存に失敗: {}", e)))?;

        let correlation_id = Uuid::new_v4();
        self.logger.info(
            "OrderWorkflowService",
            "商品を注文から取り除きました",
            Some(correlation_id),
            Some(HashMap::from([
                ("order_id".to_string(), order.id().to_string()),
                ("product_id".to_string(), product_id.to_string()),
                (
                    "removed_quantity".to_string(),
                    removal.removed_quantity().to_string(),
                ),
            ])),
        );

        Ok(RemoveFromOrderResult {
            order_id: order.id(),
            removal,
        })
    }

    /// 注文を完了する
    /// 派生金額を再計算してから完了フラグを立てる。二重完了は拒否され、
    /// その場合は何も変更されない
    pub async fn finish_order(&self, order_id: OrderId) -> Result<OrderId, DomainError> {
        let mut order = self
            .order_repository
            .find_by_id(order_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の取得に失敗: {}", e)))?
            .ok_or(DomainError::OrderNotFound)?;

        order.finish()?;

        self.order_repository
            .save(&order)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の保存に失敗: {}", e)))?;

        let correlation_id = Uuid::new_v4();
        self.logger.info(
            "OrderWorkflowService",
            "注文を完了しました",
            Some(correlation_id),
            Some(HashMap::from([
                ("order_id".to_string(), order.id().to_string()),
                ("total".to_string(), order.total().to_string()),
            ])),
        );

        Ok(order.id())
    }

    /// 注文をキャンセルする
    /// 各明細の数量を作業者の現在の倉庫の台帳に戻す。明細と商品点数は
    /// 変更されない。二重キャンセルは台帳への返却が再実行されてしまうため拒否する
    ///
    /// 返却先は常に作業者の所属倉庫であり、在庫が元々引き当てられた
    /// 倉庫と異なる場合がある
    pub async fn cancel_order(&self, actor: &Actor, order_id: OrderId) -> Result<OrderId, DomainError> {
        let mut order = self
            .order_repository
            .find_by_id(order_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の取得に失敗: {}", e)))?
            .ok_or(DomainError::OrderNotFound)?;

        order.cancel()?;

        for item in order.line_items() {
            self.stock_repository
                .adjust(
                    item.product_id(),
                    actor.warehouse_id(),
                    i64::from(item.quantity()),
                )
                .await
                .map_err(|e| DomainError::RepositoryError(format!("台帳の調整に失敗: {}", e)))?;
        }

        self.order_repository
            .save(&order)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の保存に失敗: {}", e)))?;

        let correlation_id = Uuid::new_v4();
        self.logger.info(
            "OrderWorkflowService",
            "注文をキャンセルしました",
            Some(correlation_id),
            Some(HashMap::from([
                ("order_id".to_string(), order.id().to_string()),
                (
                    "warehouse_id".to_string(),
                    actor.warehouse_id().to_string(),
                ),
            ])),
        );

        Ok(order.id())
    }

    /// 未完了の注文を消去する
    /// 各明細の数量を作業者の倉庫の台帳に戻してからすべての明細を削除し、
    /// 商品点数を0に戻す。注文そのものは残る。完了済みの注文は消去できない
    pub async fn erase_order(&self, actor: &Actor, order_id: OrderId) -> Result<OrderId, DomainError> {
        let mut order = self
            .order_repository
            .find_by_id(order_id)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の取得に失敗: {}", e)))?
            .ok_or(DomainError::OrderNotFound)?;

        if order.is_finished() {
            return Err(DomainError::OrderAlreadyFinished);
        }

        for item in order.line_items() {
            self.stock_repository
                .adjust(
                    item.product_id(),
                    actor.warehouse_id(),
                    i64::from(item.quantity()),
                )
                .await
                .map_err(|e| DomainError::RepositoryError(format!("台帳の調整に失敗: {}", e)))?;
        }

        order.erase()?;

        self.order_repository
            .save(&order)
            .await
            .map_err(|e| DomainError::RepositoryError(format!("注文の保存に失敗: {}", e)))?;

        let correlation_id = Uuid::new_v4();
        self.logger.info(
            "OrderWorkflowService",
            "注文を消去しました",
            Some(correlation_id),
            Some(HashMap::from([(
                "order_id".to_string(),
                order.id().to_string(),
            )])),
        );

        Ok(order.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_select_employee_is_implicit() {
        let resolution = OrderResolution::select(Role::Employee, None).unwrap();
        assert_eq!(resolution, OrderResolution::ImplicitForActor);

        // 従業員は明示的な注文IDを渡しても暗黙解決のまま
        let resolution =
            OrderResolution::select(Role::Employee, Some(OrderId::new())).unwrap();
        assert_eq!(resolution, OrderResolution::ImplicitForActor);
    }

    #[test]
    fn test_resolution_select_supervisor_requires_order_id() {
        let order_id = OrderId::new();
        let resolution =
            OrderResolution::select(Role::Supervisor, Some(order_id)).unwrap();
        assert_eq!(resolution, OrderResolution::ExplicitById(order_id));

        assert!(OrderResolution::select(Role::Supervisor, None).is_err());
    }
}
