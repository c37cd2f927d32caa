use {
    super::{
        fields::{self, NOTIFICATION_FIELDS},
        signature,
    },
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::CheckoutError, id::OrderId, id::TransactionId, return_data},
        services::reconciliation::{GatewayNotification, ReconcileOutcome},
    },
    axum::{Json, body::Bytes, extract::State, http::HeaderMap},
    chrono::Utc,
    serde_json::{Value, json},
    uuid::Uuid,
};

pub async fn webhook_liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Tilopay webhook endpoint is active",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(webhook_id = tracing::field::Empty, order_id = tracing::field::Empty)
)]
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let webhook_id = format!("wh_{}", Uuid::now_v7().simple());
    tracing::Span::current().record("webhook_id", tracing::field::display(&webhook_id));

    let check = signature::verify_headers(state.webhook_secret.as_deref(), &headers, &body)?;
    tracing::debug!(?check, "notification authenticated");

    let payload: Value = serde_json::from_slice(&body).map_err(CheckoutError::from)?;
    let extracted = fields::extract(&payload, &NOTIFICATION_FIELDS);

    let order_id = extracted
        .order_id
        .ok_or_else(|| CheckoutError::Validation("No order ID".into()))
        .and_then(OrderId::new)?;
    tracing::Span::current().record("order_id", tracing::field::display(&order_id));

    let echoed_order = extracted
        .return_data
        .and_then(|encoded| match return_data::decode(&encoded) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring undecodable echoed order data");
                None
            }
        });

    let notification = GatewayNotification {
        order_id,
        transaction_id: extracted.transaction_id.and_then(TransactionId::new),
        code: extracted.code,
        status: extracted.status,
        echoed_order,
    };

    let outcome = state.reconciler.handle_notification(notification).await?;
    Ok(Json(notification_response(&outcome, &webhook_id)))
}

/// Always success-shaped: a non-2xx would only make the gateway retry.
fn notification_response(outcome: &ReconcileOutcome, webhook_id: &str) -> Value {
    let order_id = outcome.order_id().as_str();
    match outcome {
        ReconcileOutcome::Fulfilled { .. } => json!({
            "success": true,
            "orderId": order_id,
            "message": "Payment confirmed and order created",
            "webhookId": webhook_id,
        }),
        ReconcileOutcome::AlreadyProcessed { status, .. } => json!({
            "success": true,
            "orderId": order_id,
            "message": "Order already processed",
            "alreadyProcessed": true,
            "paymentStatus": status.map(|s| s.as_str()),
            "webhookId": webhook_id,
        }),
        ReconcileOutcome::Declined { code, recorded, .. } => {
            let message = if *recorded {
                "Payment failed - order cancelled"
            } else {
                "Order not found but webhook acknowledged"
            };
            json!({
                "success": true,
                "orderId": order_id,
                "message": message,
                "paymentStatus": "failed",
                "code": code.as_ref().map(|c| c.as_str()),
                "webhookId": webhook_id,
            })
        }
        ReconcileOutcome::Deferred { .. } => json!({
            "success": true,
            "orderId": order_id,
            "message": "Payment approved, awaiting order confirmation",
            "webhookId": webhook_id,
        }),
        ReconcileOutcome::Indeterminate { code, status, .. } => json!({
            "success": true,
            "orderId": order_id,
            "message": "Webhook received but status unknown",
            "code": code.as_ref().map(|c| c.as_str()),
            "status": status,
            "webhookId": webhook_id,
        }),
    }
}
