use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Warehouse, WarehouseId};
use crate::domain::port::{RepositoryError, WarehouseRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQL倉庫リポジトリ
pub struct MySqlWarehouseRepository {
    pool: Pool<MySql>,
}

impl MySqlWarehouseRepository {
    /// 新しいMySQL倉庫リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_warehouse(row: &sqlx::mysql::MySqlRow) -> Result<Warehouse, RepositoryError> {
        let warehouse_id = WarehouseId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("倉庫IDの解析に失敗しました: {}", e))
        })?;

        Ok(Warehouse::reconstruct(
            warehouse_id,
            row.get("name"),
            row.get::<bool, _>("deleted"),
        ))
    }
}

#[async_trait]
impl WarehouseRepository for MySqlWarehouseRepository {
    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO warehouses (id, name, deleted)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                deleted = VALUES(deleted)
            "#,
        )
        .bind(warehouse.id().to_string())
        .bind(warehouse.name())
        .bind(warehouse.is_deleted())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("倉庫の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Option<Warehouse>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, deleted FROM warehouses WHERE id = ?")
            .bind(warehouse_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("倉庫の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::build_warehouse(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Warehouse>, RepositoryError> {
        let query = if include_deleted {
            "SELECT id, name, deleted FROM warehouses ORDER BY name ASC"
        } else {
            "SELECT id, name, deleted FROM warehouses WHERE deleted = FALSE ORDER BY name ASC"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("倉庫一覧の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_warehouse).collect()
    }

    fn next_identity(&self) -> WarehouseId {
        WarehouseId::new()
    }
}
