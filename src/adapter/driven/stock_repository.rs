use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{ProductId, StockEntry, WarehouseId};
use crate::domain::port::{RepositoryError, StockRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL在庫台帳リポジトリ
/// product_warehouseピボットテーブルを台帳として使用する
#[derive(Clone)]
pub struct MySqlStockRepository {
    pool: Pool<MySql>,
}

impl MySqlStockRepository {
    /// 新しいMySQL在庫台帳リポジトリを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StockRepository for MySqlStockRepository {
    async fn save(&self, entry: &StockEntry) -> Result<(), RepositoryError> {
        // 台帳エントリをproduct_warehouseテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO product_warehouse (product_id, warehouse_id, quantity)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                quantity = VALUES(quantity)
            "#,
        )
        .bind(entry.product_id().to_string())
        .bind(entry.warehouse_id().to_string())
        .bind(entry.quantity())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("台帳の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<Option<StockEntry>, RepositoryError> {
        let row = sqlx::query(
            "SELECT quantity FROM product_warehouse WHERE product_id = ? AND warehouse_id = ?",
        )
        .bind(product_id.to_string())
        .bind(warehouse_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("台帳の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(row.map(|row| {
            StockEntry::new(product_id, warehouse_id, row.get::<u32, _>("quantity"))
        }))
    }

    async fn adjust(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
    ) -> Result<bool, RepositoryError> {
        if delta >= 0 {
            // 増加は関連が存在しない場合の新規作成を兼ねるUPSERT
            sqlx::query(
                r#"
                INSERT INTO product_warehouse (product_id, warehouse_id, quantity)
                VALUES (?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    quantity = quantity + VALUES(quantity)
                "#,
            )
            .bind(product_id.to_string())
            .bind(warehouse_id.to_string())
            .bind(delta as u64)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("台帳の調整に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

            return Ok(true);
        }

        // 減少は条件付きUPDATEの単一文として実行する。
        // 同じ (商品, 倉庫) への並行リクエストが可用性チェックを同時に通過して
        // 台帳を過剰に引き落とすことはできない
        let decrement = delta.unsigned_abs();
        let result = sqlx::query(
            r#"
            UPDATE product_warehouse
            SET quantity = quantity - ?
            WHERE product_id = ? AND warehouse_id = ? AND quantity >= ?
            "#,
        )
        .bind(decrement)
        .bind(product_id.to_string())
        .bind(warehouse_id.to_string())
        .bind(decrement)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("台帳の調整に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM product_warehouse WHERE product_id = ? AND warehouse_id = ?")
            .bind(product_id.to_string())
            .bind(warehouse_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("台帳の削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<StockEntry>, RepositoryError> {
        // 指定された倉庫の全エントリを商品IDの昇順で取得
        let rows = sqlx::query(
            "SELECT product_id, quantity FROM product_warehouse WHERE warehouse_id = ? ORDER BY product_id ASC",
        )
        .bind(warehouse_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("台帳一覧の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        let mut entries = Vec::new();
        for row in rows {
            let product_id = ProductId::from_string(row.get("product_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
            })?;

            entries.push(StockEntry::new(
                product_id,
                warehouse_id,
                row.get::<u32, _>("quantity"),
            ));
        }

        Ok(entries)
    }
}
