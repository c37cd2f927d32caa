use {
    super::fields::{self, CONFIRMATION_FIELDS},
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::CheckoutError, id::OrderId, id::TransactionId},
        services::reconciliation::{Confirmation, ReconcileOutcome},
    },
    axum::{Json, body::Bytes, extract::State, http::StatusCode},
    serde_json::{Value, json},
};

/// Called by the success page after the gateway redirects the customer back.
pub async fn confirm_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload: Value = serde_json::from_slice(&body).map_err(CheckoutError::from)?;
    let extracted = fields::extract(&payload, &CONFIRMATION_FIELDS);
    let order_id = extracted
        .order_id
        .ok_or_else(|| CheckoutError::Validation("Order ID required".into()))
        .and_then(OrderId::new)?;

    tracing::info!(
        order_id = %order_id,
        transaction_id = extracted.transaction_id.as_deref().unwrap_or("-"),
        code = extracted.code.as_ref().map(|c| c.as_str()).unwrap_or("-"),
        "payment confirmation received"
    );

    let confirmation = Confirmation {
        order_id,
        transaction_id: extracted.transaction_id.and_then(TransactionId::new),
        code: extracted.code,
        return_data: extracted.return_data,
    };

    let outcome = state.reconciler.confirm(confirmation).await?;
    Ok(confirmation_response(&outcome))
}

fn confirmation_response(outcome: &ReconcileOutcome) -> (StatusCode, Json<Value>) {
    let order_id = outcome.order_id().as_str();
    match outcome {
        ReconcileOutcome::Fulfilled { report, .. } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "orderId": order_id,
                "emailSent": report.email_sent,
                "message": "Payment confirmed",
            })),
        ),
        ReconcileOutcome::AlreadyProcessed { status, .. } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "orderId": order_id,
                "alreadyProcessed": true,
                "paymentStatus": status.map(|s| s.as_str()),
            })),
        ),
        ReconcileOutcome::Declined { code, .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "orderId": order_id,
                "error": "Payment declined",
                "message": "Payment was not approved",
                "code": code.as_ref().map(|c| c.as_str()),
            })),
        ),
        ReconcileOutcome::Deferred { .. } | ReconcileOutcome::Indeterminate { .. } => (
            StatusCode::ACCEPTED,
            Json(json!({
                "success": false,
                "orderId": order_id,
                "status": "pending",
                "message": "Payment result not available yet",
            })),
        ),
    }
}
