use {
    super::error::CheckoutError,
    super::order::Order,
    base64::{Engine, engine::general_purpose::STANDARD},
};

/// Base64 of the order's JSON, carried through the gateway redirect so the
/// confirm call can rebuild the order without a durable store.
pub fn encode(order: &Order) -> Result<String, CheckoutError> {
    Ok(STANDARD.encode(serde_json::to_vec(order)?))
}

/// Decode and sanity-check an order that came back through the browser.
pub fn decode(encoded: &str) -> Result<Order, CheckoutError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CheckoutError::Decode(format!("returnData is not base64: {e}")))?;
    let order: Order = serde_json::from_slice(&bytes)
        .map_err(|e| CheckoutError::Decode(format!("returnData is not an order: {e}")))?;
    order.verify_pricing()?;
    Ok(order)
}
