use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Role, User, UserId, WarehouseId};
use crate::domain::port::{RepositoryError, UserRepository};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQLユーザーリポジトリ
pub struct MySqlUserRepository {
    pool: Pool<MySql>,
}

impl MySqlUserRepository {
    /// 新しいMySQLユーザーリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_user(row: &sqlx::mysql::MySqlRow) -> Result<User, RepositoryError> {
        let user_id = UserId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("ユーザーIDの解析に失敗しました: {}", e))
        })?;

        let role = Role::from_string(row.get("role")).map_err(|e| {
            RepositoryError::FetchFailed(format!("役割の解析に失敗しました: {}", e))
        })?;

        let warehouse_id = match row.get::<Option<String>, _>("warehouse_id") {
            Some(warehouse_id_str) => {
                Some(WarehouseId::from_string(&warehouse_id_str).map_err(|e| {
                    RepositoryError::FetchFailed(format!("倉庫IDの解析に失敗しました: {}", e))
                })?)
            }
            None => None,
        };

        Ok(User::reconstruct(
            user_id,
            row.get("name"),
            row.get("email"),
            role,
            warehouse_id,
            row.get::<bool, _>("deleted"),
        ))
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn save(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, warehouse_id, deleted)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                email = VALUES(email),
                role = VALUES(role),
                warehouse_id = VALUES(warehouse_id),
                deleted = VALUES(deleted)
            "#,
        )
        .bind(user.id().to_string())
        .bind(user.name())
        .bind(user.email())
        .bind(user.role().to_string())
        .bind(user.warehouse_id().map(|id| id.to_string()))
        .bind(user.is_deleted())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("ユーザーの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, role, warehouse_id, deleted FROM users WHERE id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("ユーザーの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::build_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<User>, RepositoryError> {
        let query = if include_deleted {
            "SELECT id, name, email, role, warehouse_id, deleted FROM users ORDER BY name ASC"
        } else {
            "SELECT id, name, email, role, warehouse_id, deleted FROM users WHERE deleted = FALSE ORDER BY name ASC"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("ユーザー一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_user).collect()
    }

    async fn find_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, email, role, warehouse_id, deleted FROM users WHERE warehouse_id = ? AND deleted = FALSE ORDER BY name ASC",
        )
        .bind(warehouse_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("スタッフ一覧の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_user).collect()
    }

    fn next_identity(&self) -> UserId {
        UserId::new()
    }
}
