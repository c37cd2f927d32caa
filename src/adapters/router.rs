use {
    super::{
        checkout,
        tilopay::{confirm, webhook},
    },
    crate::AppState,
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    std::time::Duration,
    tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer},
};

pub const BODY_LIMIT: usize = 64 * 1024;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Expired requests get 408.
#[allow(deprecated)]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(checkout::health))
        .route(
            "/api/tilopay/create-payment",
            post(checkout::create_payment_handler),
        )
        .route("/api/tilopay/confirm", post(confirm::confirm_handler))
        .route(
            "/api/tilopay/webhook",
            get(webhook::webhook_liveness).post(webhook::webhook_handler),
        )
        .route(
            "/api/email/send-sinpe",
            post(checkout::send_bank_transfer_handler),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
