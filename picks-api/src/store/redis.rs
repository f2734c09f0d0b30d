use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::RedisStoreConfig;
use crate::domain::models::product::Product;

use super::{filter_by_title, split_deleted, Backend, StoreError};

/// Key-value backend: the catalog is one JSON array stored under a single
/// key, read-modify-written as a whole like the file variant.
pub struct RedisBackend {
    client: redis::Client,
    key: String,
}

impl RedisBackend {
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self, StoreError> {
        tracing::info!("Initializing Redis product store");

        let client =
            redis::Client::open(config.url.as_str()).map_err(|err| StoreError::Backend(err.to_string()))?;

        // 测试连接; a failed probe is logged, not fatal, so reads can still
        // degrade to the snapshot while the server is down
        match client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(err) = redis::cmd("PING").query_async::<()>(&mut conn).await {
                    tracing::warn!(error = %err, "Redis ping failed, continuing degraded");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Redis unreachable at startup, continuing degraded");
            }
        }

        Ok(Self {
            client,
            key: config.key.clone(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }

    async fn read(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(&self.key)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        match raw {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|err| StoreError::Malformed(err.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, products: &[Product]) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string(products).map_err(|err| StoreError::Malformed(err.to_string()))?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(&self.key, raw)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn fetch_all(&self) -> Result<Vec<Product>, StoreError> {
        self.read().await
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let products = self.read().await?;
        Ok(products.into_iter().find(|product| product.id == id))
    }

    async fn search_title(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        Ok(filter_by_title(self.read().await?, term))
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let mut products = self.read().await?;
        products.push(product.clone());
        self.write(&products).await
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<Vec<String>, StoreError> {
        let products = self.read().await?;
        let (kept, deleted_ids) = split_deleted(products, ids);
        if !deleted_ids.is_empty() {
            self.write(&kept).await?;
        }
        Ok(deleted_ids)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read().await?.len() as u64)
    }
}
