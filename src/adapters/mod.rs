pub mod api_errors;
pub mod betsy;
pub mod checkout;
pub mod resend;
pub mod router;
pub mod tilopay;

use serde_json::Value;

/// First alias holding a non-empty string or a number, as text.
pub fn first_text(payload: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|name| match payload.get(*name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
