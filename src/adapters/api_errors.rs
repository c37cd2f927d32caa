use crate::domain::error::CheckoutError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can become an axum response.
pub struct ApiError(pub CheckoutError);

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            CheckoutError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            CheckoutError::Decode(msg) => (StatusCode::BAD_REQUEST, "invalid_order_data", msg.clone()),
            CheckoutError::Auth(msg) => {
                tracing::warn!("webhook rejected: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Unauthorized".to_string(),
                )
            }
            CheckoutError::Gateway(msg) => {
                tracing::error!("gateway error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "payment_gateway_error",
                    "Failed to create payment".to_string(),
                )
            }
            CheckoutError::Collaborator(msg) | CheckoutError::Config(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            CheckoutError::Serialization(err) => {
                (StatusCode::BAD_REQUEST, "invalid_json", err.to_string())
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
