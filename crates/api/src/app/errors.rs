use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::payment::PaymentError;
use storefront_infra::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::Unauthorized(msg) => json_error(StatusCode::FORBIDDEN, "unauthorized", msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Payment(e) => {
            tracing::warn!(error = %e, "payment authorization failed");
            let msg = match e {
                PaymentError::Declined(msg) => format!("payment declined: {msg}"),
                PaymentError::Unavailable(_) => "payment processor unavailable".to_string(),
            };
            json_error(StatusCode::BAD_GATEWAY, "payment_error", msg)
        }
        ServiceError::Store(e) => {
            tracing::error!(error = %e, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal storage error")
        }
    }
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

/// Malformed path identifier.
pub fn invalid_id(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
}

/// Body that failed to parse as the expected JSON shape.
pub fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_infra::store::StoreError;

    #[test]
    fn maps_each_kind_to_status() {
        let cases = [
            (ServiceError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (ServiceError::Unauthorized("u".into()), StatusCode::FORBIDDEN),
            (ServiceError::Conflict("c".into()), StatusCode::CONFLICT),
            (
                ServiceError::Payment(PaymentError::Declined("d".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::Store(StoreError::Backend("b".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
