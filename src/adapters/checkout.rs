use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::CheckoutError, order::CheckoutSubmission},
    },
    axum::{Json, body::Bytes, extract::State},
    serde_json::{Value, json},
};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn parse_submission(body: &[u8]) -> Result<CheckoutSubmission, CheckoutError> {
    Ok(serde_json::from_slice(body)?)
}

/// Card checkout: returns the hosted payment page the storefront redirects to.
pub async fn create_payment_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let submission = parse_submission(&body)?;
    let session = state.intake.initiate_card_payment(&submission).await?;

    Ok(Json(json!({
        "success": true,
        "orderId": session.order_id,
        "paymentUrl": session.payment_url,
        "transactionId": session.transaction_id,
    })))
}

/// Bank-transfer checkout: the order is recorded and the instructions
/// mailed before responding.
pub async fn send_bank_transfer_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let submission = parse_submission(&body)?;
    let receipt = state.intake.accept_bank_transfer(&submission).await?;

    let message = if receipt.fulfillment.email_sent {
        "Order received. Check your email for the transfer instructions."
    } else {
        "Order received. Please contact the store to get the transfer instructions."
    };
    Ok(Json(json!({
        "success": true,
        "orderId": receipt.order.order_id(),
        "emailSent": receipt.fulfillment.email_sent,
        "message": message,
    })))
}
