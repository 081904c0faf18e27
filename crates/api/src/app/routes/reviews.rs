use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use storefront_core::{DomainError, ReviewId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn public_router() -> Router {
    Router::new()
        .route("/reviews", get(list_all_reviews))
        .route("/reviews/:id", get(get_review))
}

pub fn protected_router() -> Router {
    Router::new()
        .route("/reviews", post(create_review))
        .route("/reviews/:id", patch(update_review).delete(delete_review))
}

pub async fn create_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateReviewRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };
    let (product, input) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e @ DomainError::InvalidId(_)) => return errors::invalid_id(e),
        Err(e) => return errors::service_error_to_response(e.into()),
    };

    match services.reviews.create_review(product, input, principal.principal()).await {
        Ok(review) => {
            (StatusCode::CREATED, Json(serde_json::json!({ "review": dto::review_to_json(&review) }))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_all_reviews(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.reviews.list_all_reviews().await {
        Ok(reviews) => {
            let items = reviews.iter().map(dto::review_with_product_to_json).collect::<Vec<_>>();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "reviews": items, "count": reviews.len() })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_review(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReviewId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match services.reviews.get_review(id).await {
        Ok(review) => (StatusCode::OK, Json(serde_json::json!({ "review": dto::review_to_json(&review) }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateReviewRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: ReviewId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.reviews.update_review(id, body.into(), principal.principal()).await {
        Ok(review) => (StatusCode::OK, Json(serde_json::json!({ "review": dto::review_to_json(&review) }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_review(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReviewId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match services.reviews.delete_review(id, principal.principal()).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({ "msg": format!("successfully removed the review with id: {removed}") })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
