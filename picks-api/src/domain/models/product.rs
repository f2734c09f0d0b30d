use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown for products submitted without an image.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/1/14/No_Image_Available.jpg";

/// Catalog entry. Field names are camelCase on the wire and in the JSON
/// snapshot, so one struct serves both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default = "default_image_url")]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    pub product_url: String,
}

fn default_image_url() -> String {
    PLACEHOLDER_IMAGE_URL.to_string()
}

/// Insert candidate as posted by a client. Presence of `title` and
/// `product_url` is enforced by the store, not the type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub product_url: Option<String>,
}

impl Product {
    /// Build a stored record from a validated candidate: assigns a fresh id
    /// and fills the image/description defaults.
    pub fn new(candidate: NewProduct) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: candidate.title.unwrap_or_default(),
            image_url: candidate
                .image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(default_image_url),
            description: candidate.description.unwrap_or_default(),
            product_url: candidate.product_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let product = Product::new(NewProduct {
            title: Some("Desk Mat".to_string()),
            product_url: Some("https://example.com/desk-mat".to_string()),
            ..Default::default()
        });

        assert_eq!(product.title, "Desk Mat");
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(product.description, "");
        assert!(!product.id.is_empty());
    }

    #[test]
    fn new_treats_empty_image_url_as_absent() {
        let product = Product::new(NewProduct {
            title: Some("Desk Mat".to_string()),
            image_url: Some(String::new()),
            product_url: Some("https://example.com/desk-mat".to_string()),
            ..Default::default()
        });

        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn new_assigns_unique_ids() {
        let candidate = NewProduct {
            title: Some("Desk Mat".to_string()),
            product_url: Some("https://example.com/desk-mat".to_string()),
            ..Default::default()
        };

        let a = Product::new(candidate.clone());
        let b = Product::new(candidate);
        assert_ne!(a.id, b.id);
    }
}
