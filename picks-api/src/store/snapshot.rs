use std::path::PathBuf;

use tokio::fs;

use crate::domain::models::product::Product;

use super::StoreError;

/// Copy bundled into the binary; keeps new deployments non-empty even when
/// no snapshot file ships alongside them.
const EMBEDDED_SNAPSHOT: &str = include_str!("../../data/products.json");

/// Seed/fallback source: the configured file when readable, otherwise the
/// embedded copy.
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<Product>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(products) => return Ok(products),
                Err(err) => {
                    tracing::warn!(error = %err, path = %self.path.display(), "snapshot file malformed, using embedded copy");
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, path = %self.path.display(), "snapshot file unreadable, using embedded copy");
            }
        }
        serde_json::from_str(EMBEDDED_SNAPSHOT).map_err(|err| StoreError::Malformed(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn embedded_copy_parses() {
        let dir = TempDir::new().unwrap();
        let snapshot = Snapshot::new(dir.path().join("missing.json"));
        let products = snapshot.load().await.unwrap();
        assert!(!products.is_empty());
        for product in &products {
            assert!(!product.title.is_empty());
            assert!(!product.product_url.is_empty());
        }
    }

    #[tokio::test]
    async fn disk_copy_wins_over_embedded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            r#"[{"id": "1", "title": "Only One", "imageUrl": "https://example.com/i.jpg", "description": "", "productUrl": "https://example.com/p"}]"#,
        )
        .unwrap();

        let snapshot = Snapshot::new(path);
        let products = snapshot.load().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Only One");
    }
}
