use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{CategoryId, Money, Product, ProductId};
use crate::domain::port::{ProductRepository, RepositoryError};
use async_trait::async_trait;

// MySQL関連のインポート
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row};

/// MySQL商品リポジトリ
/// カテゴリの割り当て（category_productピボット）も商品と一緒に永続化する
pub struct MySqlProductRepository {
    pool: Pool<MySql>,
}

impl MySqlProductRepository {
    /// 新しいMySQL商品リポジトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    fn build_product(
        row: &sqlx::mysql::MySqlRow,
        category_ids: Vec<CategoryId>,
    ) -> Result<Product, RepositoryError> {
        let product_id = ProductId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
        })?;

        Ok(Product::reconstruct(
            product_id,
            row.get("name"),
            row.get("description"),
            Money::new(row.get::<Decimal, _>("unit_price")),
            category_ids,
            row.get::<bool, _>("deleted"),
        ))
    }

    async fn category_ids_for(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<CategoryId>, RepositoryError> {
        let rows = sqlx::query("SELECT category_id FROM category_product WHERE product_id = ?")
            .bind(product_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カテゴリ割り当ての取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        let mut category_ids = Vec::new();
        for row in rows {
            let category_id = CategoryId::from_string(row.get("category_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("カテゴリIDの解析に失敗しました: {}", e))
            })?;
            category_ids.push(category_id);
        }

        Ok(category_ids)
    }
}

#[async_trait]
impl ProductRepository for MySqlProductRepository {
    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!("トランザクション開始に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        // 商品データをproductsテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, unit_price, deleted)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                name = VALUES(name),
                description = VALUES(description),
                unit_price = VALUES(unit_price),
                deleted = VALUES(deleted)
            "#,
        )
        .bind(product.id().to_string())
        .bind(product.name())
        .bind(product.description())
        .bind(product.unit_price().amount())
        .bind(product.is_deleted())
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // カテゴリの割り当てを置き換え
        sqlx::query("DELETE FROM category_product WHERE product_id = ?")
            .bind(product.id().to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カテゴリ割り当ての削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        for category_id in product.category_ids() {
            sqlx::query("INSERT INTO category_product (category_id, product_id) VALUES (?, ?)")
                .bind(category_id.to_string())
                .bind(product.id().to_string())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DatabaseError::QueryError(format!(
                        "カテゴリ割り当ての保存に失敗しました: {}",
                        e
                    ))
                })
                .map_err(RepositoryError::from)?;
        }

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

    async fn find_by_id(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, description, unit_price, deleted FROM products WHERE id = ?",
        )
        .bind(product_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        match row {
            Some(row) => {
                let category_ids = self.category_ids_for(product_id).await?;
                Ok(Some(Self::build_product(&row, category_ids)?))
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self, include_deleted: bool) -> Result<Vec<Product>, RepositoryError> {
        let query = if include_deleted {
            "SELECT id, name, description, unit_price, deleted FROM products ORDER BY name ASC"
        } else {
            "SELECT id, name, description, unit_price, deleted FROM products WHERE deleted = FALSE ORDER BY name ASC"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("商品一覧の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        let mut products = Vec::new();
        for row in rows {
            let product_id = ProductId::from_string(row.get("id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
            })?;
            let category_ids = self.category_ids_for(product_id).await?;
            products.push(Self::build_product(&row, category_ids)?);
        }

        Ok(products)
    }

    fn next_identity(&self) -> ProductId {
        ProductId::new()
    }
}
