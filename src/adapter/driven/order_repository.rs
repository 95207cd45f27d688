use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{LineItem, Money, Order, OrderId, ProductId, UserId};
use crate::domain::port::{OrderRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL注文リポジトリ
/// MySQLデータベースを使用して注文を永続化する
pub struct MySqlOrderRepository {
    pool: Pool<MySql>,
}

impl MySqlOrderRepository {
    /// 新しいMySQL注文リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// 1件分の行の集合から注文集約を再構築する
    /// ordersとline_itemsをLEFT JOINした行を前提とする
    fn build_order_from_rows(rows: &[sqlx::mysql::MySqlRow]) -> Result<Order, RepositoryError> {
        let first_row = &rows[0];

        let order_id = OrderId::from_string(first_row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("注文IDの解析に失敗しました: {}", e))
        })?;

        let user_id = UserId::from_string(first_row.get("user_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("ユーザーIDの解析に失敗しました: {}", e))
        })?;

        // 注文明細を再構築
        let mut line_items = Vec::new();
        for row in rows {
            if let (Some(product_id_str), Some(quantity), Some(unit_price)) = (
                row.get::<Option<String>, _>("product_id"),
                row.get::<Option<u32>, _>("quantity"),
                row.get::<Option<Decimal>, _>("unit_price"),
            ) {
                let product_id = ProductId::from_string(&product_id_str).map_err(|e| {
                    RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
                })?;

                let line_item = LineItem::new(product_id, quantity, Money::new(unit_price))
                    .map_err(|e| {
                        RepositoryError::FetchFailed(format!(
                            "注文明細の構築に失敗しました: {}",
                            e
                        ))
                    })?;

                line_items.push(line_item);
            }
        }

        Ok(Order::reconstruct(
            order_id,
            user_id,
            line_items,
            first_row.get::<u32, _>("item_count"),
            Money::new(first_row.get::<Decimal, _>("sub_total")),
            Money::new(first_row.get::<Decimal, _>("shipping_cost")),
            Money::new(first_row.get::<Decimal, _>("taxes")),
            Money::new(first_row.get::<Decimal, _>("total")),
            first_row.get::<bool, _>("finished"),
            first_row.get::<bool, _>("canceled"),
        ))
    }

    /// データベースの行から注文オブジェクトのリストを構築する
    /// JOINされた結果から複数の注文を再構築する
    fn build_orders_from_rows(
        rows: Vec<sqlx::mysql::MySqlRow>,
    ) -> Result<Vec<Order>, RepositoryError> {
        use std::collections::HashMap;

        // 注文IDごとにグループ化（挿入順を保持するためIDの並びも別に持つ）
        let mut order_ids: Vec<String> = Vec::new();
        let mut order_groups: HashMap<String, Vec<sqlx::mysql::MySqlRow>> = HashMap::new();
        for row in rows {
            let order_id: String = row.get("id");
            if !order_groups.contains_key(&order_id) {
                order_ids.push(order_id.clone());
            }
            order_groups.entry(order_id).or_default().push(row);
        }

        let mut orders = Vec::new();
        for order_id in order_ids {
            let order_rows = &order_groups[&order_id];
            orders.push(Self::build_order_from_rows(order_rows)?);
        }

        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for MySqlOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!("トランザクション開始に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // 注文データをordersテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, item_count, sub_total, shipping_cost, taxes, total, finished, canceled)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                item_count = VALUES(item_count),
                sub_total = VALUES(sub_total),
                shipping_cost = VALUES(shipping_cost),
                taxes = VALUES(taxes),
                total = VALUES(total),
                finished = VALUES(finished),
                canceled = VALUES(canceled)
            "#,
        )
        .bind(order.id().to_string())
        .bind(order.user_id().to_string())
        .bind(order.item_count())
        .bind(order.sub_total().amount())
        .bind(order.shipping_cost().amount())
        .bind(order.taxes().amount())
        .bind(order.total().amount())
        .bind(order.is_finished())
        .bind(order.is_canceled())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 既存の注文明細を削除
        sqlx::query("DELETE FROM line_items WHERE order_id = ?")
            .bind(order.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文明細の削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        // 注文明細データをline_itemsテーブルにINSERT
        for line_item in order.line_items() {
            sqlx::query(
                r#"
                INSERT INTO line_items (order_id, product_id, quantity, unit_price)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(order.id().to_string())
            .bind(line_item.product_id().to_string())
            .bind(line_item.quantity())
            .bind(line_item.unit_price().amount())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文明細の保存に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;
        }

        // トランザクションをコミット
        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        // ordersテーブルとline_itemsテーブルをJOINして取得
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id, o.item_count,
                o.sub_total, o.shipping_cost, o.taxes, o.total,
                o.finished, o.canceled,
                li.product_id, li.quantity, li.unit_price
            FROM orders o
            LEFT JOIN line_items li ON o.id = li.order_id
            WHERE o.id = ?
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self::build_order_from_rows(&rows)?))
    }

    async fn find_open_order_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        // ユーザーの最新の注文を明細付きで取得する
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id, o.item_count,
                o.sub_total, o.shipping_cost, o.taxes, o.total,
                o.finished, o.canceled,
                li.product_id, li.quantity, li.unit_price
            FROM orders o
            LEFT JOIN line_items li ON o.id = li.order_id
            WHERE o.id = (
                SELECT id FROM orders
                WHERE user_id = ?
                ORDER BY created_at DESC
                LIMIT 1
            )
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        let order = Self::build_order_from_rows(&rows)?;

        // 最新の注文が完了済みの場合、現在の注文は存在しない
        if order.is_finished() {
            return Ok(None);
        }

        Ok(Some(order))
    }

    async fn find_finished(&self) -> Result<Vec<Order>, RepositoryError> {
        // 完了済みの注文を作成日時の降順で取得
        let rows = sqlx::query(
            r#"
            SELECT
                o.id, o.user_id, o.item_count,
                o.sub_total, o.shipping_cost, o.taxes, o.total,
                o.finished, o.canceled,
                li.product_id, li.quantity, li.unit_price
            FROM orders o
            LEFT JOIN line_items li ON o.id = li.order_id
            WHERE o.finished = TRUE
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Self::build_orders_from_rows(rows)
    }

    fn next_identity(&self) -> OrderId {
        OrderId::new()
    }
}
