use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use storefront_core::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/orders", get(list_all_orders).post(create_order))
        .route("/orders/showAllMyOrders", get(list_my_orders))
        .route("/orders/:id", get(get_order).patch(confirm_payment))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };
    let command = match body.into_command() {
        Ok(c) => c,
        Err(e) => return errors::invalid_id(e),
    };

    match services.orders.create_order(principal.principal(), command).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "order": dto::order_to_json(&order),
                "clientSecret": order.client_secret(),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_all_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.orders.list_all_orders(principal.principal()).await {
        Ok(orders) => (StatusCode::OK, Json(dto::orders_to_json(&orders))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.orders.list_orders_for_user(principal.principal()).await {
        Ok(orders) => (StatusCode::OK, Json(dto::orders_to_json(&orders))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };

    match services.orders.get_order(id, principal.principal()).await {
        Ok(order) => (StatusCode::OK, Json(serde_json::json!({ "order": dto::order_to_json(&order) }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn confirm_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::ConfirmPaymentRequest>, JsonRejection>,
) -> axum::response::Response {
    let id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::invalid_id(e),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };
    let payment_intent_id = body.payment_intent_id.unwrap_or_default();

    match services
        .orders
        .confirm_payment(id, &payment_intent_id, principal.principal())
        .await
    {
        Ok(order) => (StatusCode::OK, Json(serde_json::json!({ "order": dto::order_to_json(&order) }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
