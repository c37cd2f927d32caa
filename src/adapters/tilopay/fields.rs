use {
    crate::{adapters::first_text, domain::outcome::GatewayCode},
    serde_json::Value,
};

/// Payload field names per attribute, in lookup order. The gateway names the
/// same thing differently across event types and locales; new spellings go
/// here and nowhere else.
pub struct FieldAliases {
    pub order_id: &'static [&'static str],
    pub transaction_id: &'static [&'static str],
    pub code: &'static [&'static str],
    pub status: &'static [&'static str],
    pub return_data: &'static [&'static str],
}

pub const NOTIFICATION_FIELDS: FieldAliases = FieldAliases {
    order_id: &["order", "order_id", "orderNumber", "referencia", "reference"],
    transaction_id: &[
        "tilopay-transaction",
        "tpt",
        "transaction_id",
        "transaccion_id",
        "id",
    ],
    code: &["code"],
    status: &["estado", "status"],
    return_data: &["returnData", "return_data"],
};

pub const CONFIRMATION_FIELDS: FieldAliases = FieldAliases {
    order_id: &["orderId", "order_id"],
    transaction_id: &["transactionId", "transaction_id", "tpt"],
    code: &["code"],
    status: &[],
    return_data: &["returnData", "return_data"],
};

/// Normalised view of a notification payload; nothing is validated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub code: Option<GatewayCode>,
    pub status: Option<String>,
    pub return_data: Option<String>,
}

pub fn extract(payload: &Value, aliases: &FieldAliases) -> ExtractedFields {
    ExtractedFields {
        order_id: first_text(payload, aliases.order_id),
        transaction_id: first_text(payload, aliases.transaction_id),
        code: first_present(payload, aliases.code).and_then(GatewayCode::from_value),
        status: first_text(payload, aliases.status).map(|s| s.to_lowercase()),
        return_data: first_text(payload, aliases.return_data),
    }
}

/// First alias present with a non-null value, whatever its type.
pub fn first_present<'a>(payload: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|name| payload.get(*name).filter(|v| !v.is_null()))
}
