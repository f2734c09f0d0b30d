pub mod file;
pub mod mysql;
pub mod redis;
pub mod snapshot;

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{BackendKind, StoreConfig};
use crate::domain::models::product::{NewProduct, Product};
use crate::error::AppError;

use self::file::FileBackend;
use self::mysql::MysqlBackend;
use self::redis::RedisBackend;
use self::snapshot::Snapshot;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed product data: {0}")]
    Malformed(String),
}

/// One backing data source. Implementations report honest errors; the
/// fallback policy lives in [`ProductStore`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn fetch_by_id(&self, id: &str) -> Result<Option<Product>, StoreError>;

    async fn search_title(&self, term: &str) -> Result<Vec<Product>, StoreError>;

    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    /// Removes the given ids and returns the ids that actually existed.
    async fn delete_by_ids(&self, ids: &[String]) -> Result<Vec<String>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Served by the configured backend.
    Primary,
    /// Primary read failed; served from the snapshot file or its embedded copy.
    Snapshot,
    /// Neither source was readable.
    Unavailable,
}

/// `list_all` result. The HTTP surface only ships `products`; `source` keeps
/// the degraded-read case observable for callers and tests.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub source: CatalogSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
    pub deleted_ids: Vec<String>,
    pub remaining_count: u64,
}

/// Store facade: validation, id assignment, seeding and the
/// primary -> snapshot -> empty fallback chain, over any [`Backend`].
pub struct ProductStore {
    backend: Box<dyn Backend>,
    snapshot: Snapshot,
    seeded: AtomicBool,
}

pub async fn init_store(config: &StoreConfig) -> Result<ProductStore, AppError> {
    let snapshot = Snapshot::new(&config.snapshot_path);
    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::File => Box::new(FileBackend::new(&config.file.path)),
        BackendKind::Redis => Box::new(RedisBackend::connect(&config.redis).await?),
        BackendKind::Mysql => Box::new(MysqlBackend::connect(&config.mysql)?),
    };
    Ok(ProductStore::new(backend, snapshot))
}

impl ProductStore {
    pub fn new(backend: Box<dyn Backend>, snapshot: Snapshot) -> Self {
        Self {
            backend,
            snapshot,
            seeded: AtomicBool::new(false),
        }
    }

    /// Never fails: a broken primary degrades to the snapshot, a broken
    /// snapshot degrades to an empty catalog.
    pub async fn list_all(&self) -> Catalog {
        self.seed_if_empty().await;

        match self.backend.fetch_all().await {
            Ok(products) => Catalog {
                products,
                source: CatalogSource::Primary,
            },
            Err(err) => {
                tracing::warn!(error = %err, "primary backend read failed, trying snapshot");
                match self.snapshot.load().await {
                    Ok(products) => Catalog {
                        products,
                        source: CatalogSource::Snapshot,
                    },
                    Err(snap_err) => {
                        tracing::warn!(error = %snap_err, "snapshot unavailable, serving empty catalog");
                        Catalog {
                            products: Vec::new(),
                            source: CatalogSource::Unavailable,
                        }
                    }
                }
            }
        }
    }

    /// Not-found is `Ok(None)`, distinct from a backend failure.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        self.backend.fetch_by_id(id).await
    }

    /// Case-insensitive substring match on title. An empty term matches
    /// every product.
    pub async fn search_by_title(&self, term: &str) -> Result<Vec<Product>, StoreError> {
        self.backend.search_title(term).await
    }

    pub async fn insert(&self, candidate: NewProduct) -> Result<Product, StoreError> {
        validate(&candidate)?;
        let product = Product::new(candidate);
        self.backend.insert(&product).await?;
        Ok(product)
    }

    /// Ids that do not exist are ignored; the outcome reports what was
    /// actually removed and how many records remain.
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<DeleteOutcome, StoreError> {
        let deleted_ids = self.backend.delete_by_ids(ids).await?;
        let remaining_count = self.backend.count().await?;
        Ok(DeleteOutcome {
            deleted_count: deleted_ids.len() as u64,
            deleted_ids,
            remaining_count,
        })
    }

    /// One-time population of an empty backend from the bundled snapshot.
    /// The flag is only set after a successful pass, so a backend that was
    /// down at boot gets another chance; the emptiness check keeps the
    /// operation idempotent at the data level.
    pub async fn seed_if_empty(&self) {
        if self.seeded.load(Ordering::Acquire) {
            return;
        }
        match self.try_seed().await {
            Ok(()) => self.seeded.store(true, Ordering::Release),
            Err(err) => tracing::warn!(error = %err, "seeding skipped"),
        }
    }

    async fn try_seed(&self) -> Result<(), StoreError> {
        if self.backend.count().await? > 0 {
            return Ok(());
        }
        let products = self.snapshot.load().await?;
        for product in &products {
            self.backend.insert(product).await?;
        }
        tracing::info!(count = products.len(), "seeded empty backend from snapshot");
        Ok(())
    }
}

fn validate(candidate: &NewProduct) -> Result<(), StoreError> {
    let has_title = candidate
        .title
        .as_deref()
        .is_some_and(|title| !title.trim().is_empty());
    let has_product_url = candidate
        .product_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty());

    if has_title && has_product_url {
        Ok(())
    } else {
        Err(StoreError::Validation(
            "Missing required fields: title and productUrl are required".to_string(),
        ))
    }
}

/// Shared by the document-shaped backends (file, redis).
pub(crate) fn filter_by_title(products: Vec<Product>, term: &str) -> Vec<Product> {
    let needle = term.to_lowercase();
    products
        .into_iter()
        .filter(|product| product.title.to_lowercase().contains(&needle))
        .collect()
}

/// Splits `products` into (kept, deleted ids) for the given id set.
pub(crate) fn split_deleted(
    products: Vec<Product>,
    ids: &[String],
) -> (Vec<Product>, Vec<String>) {
    let mut kept = Vec::with_capacity(products.len());
    let mut deleted_ids = Vec::new();
    for product in products {
        if ids.contains(&product.id) {
            deleted_ids.push(product.id);
        } else {
            kept.push(product);
        }
    }
    (kept, deleted_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_at(dir: &TempDir) -> ProductStore {
        let backend = FileBackend::new(dir.path().join("products.json"));
        // point the snapshot at a file that does not exist so only the
        // embedded copy would be served
        let snapshot = Snapshot::new(dir.path().join("snapshot.json"));
        ProductStore::new(Box::new(backend), snapshot)
    }

    fn empty_snapshot(dir: &TempDir) {
        std::fs::write(dir.path().join("snapshot.json"), "[]").unwrap();
    }

    fn candidate(title: &str) -> NewProduct {
        NewProduct {
            title: Some(title.to_string()),
            product_url: Some(format!("https://example.com/{title}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_fills_defaults_and_persists() {
        let dir = TempDir::new().unwrap();
        empty_snapshot(&dir);
        let store = store_at(&dir);

        let product = store.insert(candidate("Wireless Mouse")).await.unwrap();
        assert_eq!(
            product.image_url,
            crate::domain::models::product::PLACEHOLDER_IMAGE_URL
        );
        assert_eq!(product.description, "");

        let fetched = store.get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched, Some(product));
    }

    #[tokio::test]
    async fn insert_rejects_missing_required_fields() {
        let dir = TempDir::new().unwrap();
        empty_snapshot(&dir);
        let store = store_at(&dir);

        let missing_title = NewProduct {
            product_url: Some("https://example.com/x".to_string()),
            ..Default::default()
        };
        let missing_url = NewProduct {
            title: Some("X".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            store.insert(missing_title).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.insert(missing_url).await,
            Err(StoreError::Validation(_))
        ));

        // nothing was persisted
        assert!(store.list_all().await.products.is_empty());
    }

    #[tokio::test]
    async fn get_by_id_unknown_is_none() {
        let dir = TempDir::new().unwrap();
        empty_snapshot(&dir);
        let store = store_at(&dir);

        assert_eq!(store.get_by_id("no-such-id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let dir = TempDir::new().unwrap();
        empty_snapshot(&dir);
        let store = store_at(&dir);

        store.insert(candidate("Wireless Mouse")).await.unwrap();
        store.insert(candidate("USB Hub")).await.unwrap();

        let hits = store.search_by_title("mouse").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Wireless Mouse");

        // empty term matches everything
        assert_eq!(store.search_by_title("").await.unwrap().len(), 2);
        // no match is an empty result, not an error
        assert!(store.search_by_title("keyboard").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_ignores_unknown_ids_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        empty_snapshot(&dir);
        let store = store_at(&dir);

        let keep = store.insert(candidate("Keep")).await.unwrap();
        let gone = store.insert(candidate("Drop")).await.unwrap();

        let ids = vec![gone.id.clone(), "ghost".to_string()];
        let outcome = store.delete_by_ids(&ids).await.unwrap();
        assert_eq!(outcome.deleted_count, 1);
        assert_eq!(outcome.deleted_ids, vec![gone.id.clone()]);
        assert_eq!(outcome.remaining_count, 1);

        // second pass deletes nothing
        let outcome = store.delete_by_ids(&ids).await.unwrap();
        assert_eq!(outcome.deleted_count, 0);
        assert!(outcome.deleted_ids.is_empty());
        assert_eq!(outcome.remaining_count, 1);

        assert_eq!(store.get_by_id(&keep.id).await.unwrap(), Some(keep));
    }

    #[tokio::test]
    async fn first_list_seeds_empty_backend_once() {
        let dir = TempDir::new().unwrap();
        let seeds = vec![
            Product::new(candidate("Seeded A")),
            Product::new(candidate("Seeded B")),
        ];
        std::fs::write(
            dir.path().join("snapshot.json"),
            serde_json::to_string(&seeds).unwrap(),
        )
        .unwrap();
        let store = store_at(&dir);

        let catalog = store.list_all().await;
        assert_eq!(catalog.source, CatalogSource::Primary);
        assert_eq!(catalog.products.len(), 2);

        // running it again must not duplicate records
        let catalog = store.list_all().await;
        assert_eq!(catalog.products.len(), 2);
    }

    #[tokio::test]
    async fn list_falls_back_to_snapshot_when_primary_unreadable() {
        let dir = TempDir::new().unwrap();
        let seeds = vec![Product::new(candidate("From Snapshot"))];
        std::fs::write(
            dir.path().join("snapshot.json"),
            serde_json::to_string(&seeds).unwrap(),
        )
        .unwrap();
        // a directory is not readable as a JSON document
        let backend = FileBackend::new(dir.path());
        let store = ProductStore::new(
            Box::new(backend),
            Snapshot::new(dir.path().join("snapshot.json")),
        );

        let catalog = store.list_all().await;
        assert_eq!(catalog.source, CatalogSource::Snapshot);
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].title, "From Snapshot");
    }

    #[tokio::test]
    async fn list_serves_embedded_snapshot_when_disk_copy_missing() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path());
        let store = ProductStore::new(
            Box::new(backend),
            Snapshot::new(dir.path().join("missing.json")),
        );

        let catalog = store.list_all().await;
        assert_eq!(catalog.source, CatalogSource::Snapshot);
        assert!(!catalog.products.is_empty());
    }
}
