use {
    super::error::{CheckoutError, CrmError},
    super::id::TransactionId,
    super::order::Order,
    std::{future::Future, pin::Pin},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Hosted payment page handed back by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLink {
    pub payment_url: String,
    pub transaction_id: Option<TransactionId>,
}

pub trait PaymentGateway: Send + Sync {
    /// Authenticate and create a payment link for the order's total.
    fn create_payment_link(&self, order: &Order) -> BoxFuture<'_, Result<PaymentLink, CheckoutError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailReceipt {
    pub customer_sent: bool,
    pub operator_sent: bool,
}

pub trait Mailer: Send + Sync {
    /// Customer confirmation plus operator notification. Errors only when
    /// nothing at all could be sent.
    fn send_order(&self, order: &Order) -> BoxFuture<'_, Result<EmailReceipt, CheckoutError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmRecord {
    pub id: Option<String>,
}

pub trait CrmClient: Send + Sync {
    fn push_order(&self, order: &Order) -> BoxFuture<'_, Result<CrmRecord, CrmError>>;
}
