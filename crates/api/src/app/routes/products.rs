use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use gift_products::ProductService;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product).put(update_product))
        .route("/:id", get(get_product).delete(delete_product))
}

pub async fn get_product(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::product_error_to_response(e),
    };

    match service.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(service): Extension<Arc<ProductService>>,
) -> axum::response::Response {
    match service.get_all_products().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(service): Extension<Arc<ProductService>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let new = match body.into_new_product() {
        Ok(v) => v,
        Err(e) => return errors::product_error_to_response(e),
    };

    match service.add_product(new).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(service): Extension<Arc<ProductService>>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let update = match body.into_update() {
        Ok(v) => v,
        Err(e) => return errors::product_error_to_response(e),
    };

    match service.update_product(update).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(service): Extension<Arc<ProductService>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(e) => return errors::product_error_to_response(e),
    };

    match service.delete_product(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::product_error_to_response(e),
    }
}
