use axum::{extract::Extension, response::IntoResponse, Json};

use crate::context::PrincipalContext;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    let principal = principal.principal();
    Json(serde_json::json!({
        "userId": principal.user_id.to_string(),
        "role": principal.role.as_str(),
    }))
}
