use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use storefront_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/products/:id/reviews", get(list_product_reviews))
}

pub async fn list_product_reviews(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match services.reviews.list_reviews_for_product(id).await {
        Ok(reviews) => (StatusCode::OK, Json(dto::reviews_to_json(&reviews))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
