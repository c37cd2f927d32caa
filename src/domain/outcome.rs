use {derive_more::Display, serde_json::Value};

const APPROVED_STATUSES: &[&str] = &["aprobada", "approved", "success", "paid", "completed"];
const DECLINED_STATUSES: &[&str] = &[
    "rechazada",
    "declined",
    "failed",
    "canceled",
    "cancelled",
    "rejected",
];

/// Gateway result code. The redirect sends it as a string, the webhook
/// sometimes as a number; both normalise to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct GatewayCode(String);

impl GatewayCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// `null` counts as "no code supplied".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(match n.as_i64().or_else(|| integral(n.as_f64()?)) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            })),
            other => Some(Self(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_approval(&self) -> bool {
        self.0 == "1"
    }
}

/// `1.0` on the wire is the integer 1.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT).then_some(f as i64)
}

const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Verdict {
    #[display("approved")]
    Approved,
    #[display("declined")]
    Declined,
    #[display("indeterminate")]
    Indeterminate,
}

/// Collapse a gateway code and free-text status into a verdict.
///
/// The code wins whenever one is present: `1` approves, anything else
/// declines. Status words only approve when no code came with them.
pub fn classify(code: Option<&GatewayCode>, status: Option<&str>) -> Verdict {
    let status = status.map(|s| s.trim().to_lowercase()).unwrap_or_default();

    if code.is_some_and(GatewayCode::is_approval) {
        return Verdict::Approved;
    }
    if code.is_none() && APPROVED_STATUSES.contains(&status.as_str()) {
        return Verdict::Approved;
    }
    if code.is_some() || DECLINED_STATUSES.contains(&status.as_str()) {
        return Verdict::Declined;
    }
    Verdict::Indeterminate
}
