use {
    super::crm_sync::{CrmSync, CrmSyncOutcome},
    crate::domain::{order::Order, provider::Mailer},
    std::sync::Arc,
    tokio::task::JoinHandle,
};

/// What the side effects of one order did. The CRM task keeps running after
/// the report is returned; callers that care can await it.
#[derive(Debug)]
pub struct FulfillmentReport {
    pub email_sent: bool,
    pub crm_task: JoinHandle<CrmSyncOutcome>,
}

/// Email and CRM side effects for an order that has just been accepted.
/// Neither failure is propagated: the order state is already decided.
pub struct Fulfillment {
    mailer: Arc<dyn Mailer>,
    crm: Arc<CrmSync>,
}

impl Fulfillment {
    pub fn new(mailer: Arc<dyn Mailer>, crm: Arc<CrmSync>) -> Self {
        Self { mailer, crm }
    }

    pub async fn dispatch(&self, order: &Order) -> FulfillmentReport {
        let email_sent = match self.mailer.send_order(order).await {
            Ok(receipt) => {
                tracing::info!(
                    order_id = %order.order_id(),
                    customer = receipt.customer_sent,
                    operator = receipt.operator_sent,
                    "order email sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(order_id = %order.order_id(), error = %e, "failed to send order email");
                false
            }
        };

        let crm = Arc::clone(&self.crm);
        let snapshot = order.clone();
        let crm_task = tokio::spawn(async move { crm.sync(&snapshot).await });

        FulfillmentReport {
            email_sent,
            crm_task,
        }
    }
}
