use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gift_products::ProductError;

pub fn product_error_to_response(err: ProductError) -> axum::response::Response {
    match err {
        ProductError::NotFound(id) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("product {id} does not exist"),
        ),
        ProductError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
        ProductError::MalformedInput(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ProductError::Store(e) => {
            tracing::error!(error = %e, "product store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

/// Unreadable JSON bodies are reported like any other structural violation.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
