use {
    super::error::CheckoutError,
    super::id::{OrderId, TransactionId},
    super::money::MoneyAmount,
    super::pricing::{self, SHIPPING_COST},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::fmt,
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// An order leaves `Pending` exactly once and never moves again.
    pub fn can_transition_to(&self, next: &PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed) | (Self::Pending, Self::Failed)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = CheckoutError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CheckoutError::Validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[serde(alias = "SINPE")]
    BankTransfer,
    #[default]
    #[serde(alias = "Tilopay", alias = "Tarjeta")]
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw checkout form. The storefront posts Spanish field names; English ones
/// are accepted too. Nothing here is trusted until `Order::from_submission`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSubmission {
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "provincia")]
    pub province: Option<String>,
    pub canton: Option<String>,
    #[serde(alias = "distrito")]
    pub district: Option<String>,
    #[serde(alias = "direccion")]
    pub address: Option<String>,
    #[serde(alias = "cantidad")]
    pub quantity: Option<Value>,
    pub color: Option<String>,
    #[serde(alias = "comentarios")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "telefono")]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(alias = "provincia")]
    pub province: String,
    pub canton: String,
    #[serde(alias = "distrito")]
    pub district: String,
    #[serde(rename = "address", alias = "direccion")]
    pub line: String,
}

/// How a gateway report resolves a pending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Approved { transaction_id: Option<TransactionId> },
    Declined { transaction_id: Option<TransactionId> },
}

impl Settlement {
    pub fn status(&self) -> PaymentStatus {
        match self {
            Self::Approved { .. } => PaymentStatus::Completed,
            Self::Declined { .. } => PaymentStatus::Failed,
        }
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            Self::Approved { transaction_id } | Self::Declined { transaction_id } => {
                transaction_id.as_ref()
            }
        }
    }
}

fn default_color() -> String {
    "Blanco".to_string()
}

/// Canonical order. Serialises flat, in the same shape the storefront
/// round-trips through the gateway redirect as `returnData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction_id: Option<TransactionId>,
    #[serde(flatten)]
    customer: Customer,
    #[serde(flatten)]
    address: ShippingAddress,
    #[serde(alias = "cantidad")]
    quantity: u32,
    #[serde(default = "default_color")]
    color: String,
    subtotal: MoneyAmount,
    #[serde(default)]
    shipping_cost: MoneyAmount,
    total: MoneyAmount,
    #[serde(default, alias = "comentarios", skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(default)]
    payment_method: PaymentMethod,
    #[serde(default)]
    payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paid_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

fn required(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Order {
    /// Build a pending order from a checkout submission. Pricing is always
    /// recomputed here; the client never supplies amounts.
    pub fn from_submission(
        submission: &CheckoutSubmission,
        method: PaymentMethod,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Self, CheckoutError> {
        let quantity_present = match &submission.quantity {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };

        let fields = (
            required(&submission.name),
            required(&submission.phone),
            required(&submission.email),
            required(&submission.province),
            required(&submission.canton),
            required(&submission.district),
            required(&submission.address),
        );
        let (
            (Some(name), Some(phone), Some(email), Some(province), Some(canton), Some(district), Some(line)),
            true,
        ) = (fields, quantity_present)
        else {
            return Err(CheckoutError::Validation("Missing required fields".into()));
        };

        let pricing = submission
            .quantity
            .as_ref()
            .map(pricing::resolve_raw)
            .unwrap_or_else(|| pricing::resolve(1));

        Ok(Self {
            order_id,
            transaction_id: None,
            customer: Customer { name, phone, email },
            address: ShippingAddress {
                province,
                canton,
                district,
                line,
            },
            quantity: pricing.quantity,
            color: required(&submission.color).unwrap_or_else(default_color),
            subtotal: pricing.subtotal,
            shipping_cost: SHIPPING_COST,
            total: pricing.total(),
            comment: required(&submission.comment),
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
            created_at: now,
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        self.transaction_id.as_ref()
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn address(&self) -> &ShippingAddress {
        &self.address
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn subtotal(&self) -> MoneyAmount {
        self.subtotal
    }

    pub fn shipping_cost(&self) -> MoneyAmount {
        self.shipping_cost
    }

    pub fn total(&self) -> MoneyAmount {
        self.total
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    /// Amounts must match what the tier table yields for the quantity.
    pub fn verify_pricing(&self) -> Result<(), CheckoutError> {
        let expected = pricing::resolve(i64::from(self.quantity));
        if expected.quantity != self.quantity
            || expected.subtotal != self.subtotal
            || self.shipping_cost != SHIPPING_COST
            || expected.total() != self.total
        {
            return Err(CheckoutError::Decode(format!(
                "order {} amounts do not match pricing for quantity {}",
                self.order_id, self.quantity
            )));
        }
        Ok(())
    }

    /// Move a pending order to its terminal status.
    pub fn settle(
        &mut self,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<(), CheckoutError> {
        let next = settlement.status();
        if !self.payment_status.can_transition_to(&next) {
            return Err(CheckoutError::Validation(format!(
                "invalid status transition: {} → {}",
                self.payment_status, next
            )));
        }

        if let Some(txn) = settlement.transaction_id() {
            self.transaction_id = Some(txn.clone());
        }
        if next == PaymentStatus::Completed {
            self.paid_at = Some(at);
        }
        self.payment_status = next;
        Ok(())
    }
}
