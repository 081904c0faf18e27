use axum::{routing::get, Router};

pub mod orders;
pub mod products;
pub mod reviews;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(reviews::public_router())
        .merge(products::router())
}

/// Routes that require a verified bearer token.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(orders::router())
        .merge(reviews::protected_router())
}
