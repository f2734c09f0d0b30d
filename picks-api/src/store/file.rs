use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::domain::models::product::Product;

use super::{filter_by_title, split_deleted, Backend, StoreError};

/// JSON-document backend: the whole catalog lives in one file holding a
/// top-level array. Writes rewrite the document.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file reads as an empty catalog so seeding can create it.
    async fn read(&self) -> Result<Vec<Product>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Backend(err.to_string())),
        };
        serde_json::from_str(&raw).map_err(|err| StoreError::Malformed(err.to_string()))
    }

    async fn write(&self, products: &[Product]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| StoreError::Backend(err.to_string()))?;
            }
        }
        let raw = serde_json::to_string_pretty(products)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        fs::write(&self.path, raw)
            .await
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait]
impl Backend for FileBackend {
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
