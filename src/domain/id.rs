use {
    chrono::Utc,
    derive_more::Display,
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use super::error::CheckoutError;

/// Storefront order identifier, `ORD-<unix millis>-<6 hex chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Result<Self, CheckoutError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CheckoutError::Validation("order id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Millisecond timestamp plus 24 random bits. Collisions within one
    /// millisecond are possible but not handled.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
        Self(format!("ORD-{}-{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Gateway-assigned transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies one fulfilment unit: order id plus transaction id, with the
/// transaction part empty when the gateway did not report one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{order_id}:{transaction_id}")]
pub struct DedupKey {
    order_id: String,
    transaction_id: String,
}

impl DedupKey {
    pub fn new(order_id: &OrderId, transaction_id: Option<&TransactionId>) -> Self {
        Self {
            order_id: order_id.as_str().to_string(),
            transaction_id: transaction_id
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}
