use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;

use crate::config::MysqlStoreConfig;
use crate::domain::models::product::Product;

use super::{Backend, StoreError};

/// Table backend: one row per product, column per field. Queries go through
/// the runtime API so the crate builds without a live database; the schema
/// lives in `migrations/`.
pub struct MysqlBackend {
    pool: MySqlPool,
}

// 数据库记录结构体
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    title: String,
    image_url: String,
    description: String,
    product_url: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            image_url: row.image_url,
            description: row.description,
            product_url: row.product_url,
        }
    }
}

impl MysqlBackend {
    /// The pool is lazy: an unreachable server surfaces on first use and
    /// degrades through the read-fallback chain instead of failing boot.
    pub fn connect(config: &MysqlStoreConfig) -> Result<Self, StoreError> {
        tracing::info!("Initializing MySQL product store");

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.url)
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Backend for MysqlBackend {
    async fn fetch_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, image_url, description, product_url FROM products",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, image_url, description, product_url FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(row.map(Product::from))
    }

    async fn search_title(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, title, image_url, description, product_url FROM products \
             WHERE LOWER(title) LIKE CONCAT('%', LOWER(?), '%')",
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products (id, title, image_url, description, product_url) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&product.id)
        .bind(&product.title)
        .bind(&product.image_url)
        .bind(&product.description)
        .bind(&product.product_url)
        .execute(&self.pool)
        .await
        .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<Vec<String>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");

        // select first so the outcome can report which ids actually existed
        let select = format!("SELECT id FROM products WHERE id IN ({placeholders})");
        let mut query = sqlx::query_scalar::<_, String>(&select);
        for id in ids {
            query = query.bind(id);
        }
        let deleted_ids = query
            .fetch_all(&self.pool)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        if deleted_ids.is_empty() {
            return Ok(deleted_ids);
        }

        let delete = format!("DELETE FROM products WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&delete);
        for id in ids {
            query = query.bind(id);
        }
        query
            .execute(&self.pool)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(deleted_ids)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;

        Ok(count as u64)
    }
}
