use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{Category, CategoryId};
use crate::domain::port::{CategoryRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use sqlx::{MySql, Pool, Row};

/// MySQLカテゴリリポジトリ
pub struct MySqlCategoryRepository {
    pool: Pool<MySql>,
}

impl MySqlCategoryRepository {
    /// 新しいMySQLカテゴリリポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_category(row: &sqlx::mysql::MySqlRow) -> Result<Category, RepositoryError> {
        let category_id = CategoryId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("カテゴリIDの解析に失敗しました: {}", e))
        })?;

        Ok(Category::reconstruct(category_id, row.get("name")))
    }
}

#[async_trait]
impl CategoryRepository for MySqlCategoryRepository {
    async fn save(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name)
            "#,
        )
        .bind(category.id().to_string())
        .bind(category.name())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("カテゴリの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        category_id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(category_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("カテゴリの取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        match row {
            Some(row) => Ok(Some(Self::build_category(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カテゴリ一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_category).collect()
    }

    async fn delete(&self, category_id: CategoryId) -> Result<(), RepositoryError> {
        // 割り当てごと削除する（物理削除）
        sqlx::query("DELETE FROM category_product WHERE category_id = ?")
            .bind(category_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カテゴリ割り当ての削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(category_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("カテゴリの削除に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        Ok(())
    }

    fn next_identity(&self) -> CategoryId {
        CategoryId::new()
    }
}
