use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::models::product::{NewProduct, Product};
use crate::error::{AppError, AppResult};
use crate::server::AppState;
use crate::store::StoreError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(get_products)
            .post(create_product)
            .delete(delete_products)
            .options(preflight),
    )
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    id: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub product_url: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            description: product.description,
            product_url: product.product_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteProductsRequest {
    ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProductsResponse {
    message: String,
    deleted_count: u64,
    deleted_ids: Vec<String>,
    remaining_count: u64,
}

/// The CORS layer answers real preflights; this keeps a bare OPTIONS probe
/// at 200 as well.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// One GET endpoint, dispatched on query parameters: `?id=` wins over
/// `?title=`, no parameters lists the whole catalog.
async fn get_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Response> {
    if let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) {
        // backend failures collapse to not-found on this path, reads never
        // surface 5xx
        let product = match state.store.get_by_id(id).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!(error = %err, id, "product lookup failed");
                None
            }
        };
        let product = product
            .ok_or_else(|| AppError::NotFound(format!("Product with ID {id} not found")))?;
        return Ok(Json(ProductResponse::from(product)).into_response());
    }

    if let Some(title) = query.title.as_deref().filter(|title| !title.is_empty()) {
        let products = match state.store.search_by_title(title).await {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(error = %err, "product search failed, serving empty result");
                Vec::new()
            }
        };
        let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
        return Ok(Json(body).into_response());
    }

    let catalog = state.store.list_all().await;
    let body: Vec<ProductResponse> = catalog
        .products
        .into_iter()
        .map(ProductResponse::from)
        .collect();
    Ok(Json(body).into_response())
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(candidate): Json<NewProduct>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let product = state.store.insert(candidate).await.map_err(|err| match err {
        StoreError::Validation(msg) => AppError::Validation(msg),
        other => {
            tracing::error!(error = %other, "product insert failed");
            AppError::Internal("Error adding product".to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

async fn delete_products(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeleteProductsRequest>,
) -> AppResult<Json<DeleteProductsResponse>> {
    let ids = match request.ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => {
            return Err(AppError::Validation(
                "Request body must include an \"ids\" array".to_string(),
            ))
        }
    };

    let outcome = state.store.delete_by_ids(&ids).await.map_err(|err| {
        tracing::error!(error = %err, "product delete failed");
        AppError::Internal("Error deleting products".to_string())
    })?;

    Ok(Json(DeleteProductsResponse {
        message: format!("Successfully deleted {} products", outcome.deleted_count),
        deleted_count: outcome.deleted_count,
        deleted_ids: outcome.deleted_ids,
        remaining_count: outcome.remaining_count,
    }))
}
