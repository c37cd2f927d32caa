use {
    super::fulfillment::{Fulfillment, FulfillmentReport},
    crate::domain::{
        error::CheckoutError,
        id::{OrderId, TransactionId},
        order::{CheckoutSubmission, Order, PaymentMethod},
        provider::PaymentGateway,
        store::OrderStore,
    },
    chrono::Utc,
    std::sync::Arc,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub order_id: OrderId,
    pub payment_url: String,
    pub transaction_id: Option<TransactionId>,
}

#[derive(Debug)]
pub struct BankTransferReceipt {
    pub order: Order,
    pub fulfillment: FulfillmentReport,
}

/// Entry point for new orders, on either payment path.
pub struct OrderIntake {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn OrderStore>,
    fulfillment: Arc<Fulfillment>,
}

impl OrderIntake {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn OrderStore>,
        fulfillment: Arc<Fulfillment>,
    ) -> Self {
        Self {
            gateway,
            store,
            fulfillment,
        }
    }

    /// Card path: ask the gateway for a hosted payment page, then record the
    /// pending order. Nothing is stored when the gateway refuses. The order
    /// outcome arrives later via confirm or webhook.
    pub async fn initiate_card_payment(
        &self,
        submission: &CheckoutSubmission,
    ) -> Result<PaymentSession, CheckoutError> {
        let order = Order::from_submission(
            submission,
            PaymentMethod::Card,
            OrderId::generate(),
            Utc::now(),
        )?;
        let link = self.gateway.create_payment_link(&order).await?;
        self.store.insert(order.clone());
        tracing::info!(
            order_id = %order.order_id(),
            total = %order.total(),
            transaction_id = link.transaction_id.as_ref().map(|t| t.as_str()).unwrap_or("-"),
            "payment link created"
        );

        Ok(PaymentSession {
            order_id: order.order_id().clone(),
            payment_url: link.payment_url,
            transaction_id: link.transaction_id,
        })
    }

    /// Bank-transfer path: no gateway involved, the customer gets transfer
    /// instructions by email right away and the order stays pending.
    pub async fn accept_bank_transfer(
        &self,
        submission: &CheckoutSubmission,
    ) -> Result<BankTransferReceipt, CheckoutError> {
        let order = Order::from_submission(
            submission,
            PaymentMethod::BankTransfer,
            OrderId::generate(),
            Utc::now(),
        )?;
        self.store.insert(order.clone());
        tracing::info!(order_id = %order.order_id(), total = %order.total(), "bank transfer order received");

        let fulfillment = self.fulfillment.dispatch(&order).await;
        Ok(BankTransferReceipt { order, fulfillment })
    }
}
