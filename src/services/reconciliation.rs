use {
    super::fulfillment::{Fulfillment, FulfillmentReport},
    crate::domain::{
        error::CheckoutError,
        id::{DedupKey, OrderId, TransactionId},
        order::{Order, PaymentMethod, PaymentStatus, Settlement},
        outcome::{self, GatewayCode, Verdict},
        return_data,
        store::{DedupLedger, OrderStore, SettleOutcome},
    },
    chrono::Utc,
    std::sync::Arc,
};

/// Client-driven confirmation after the gateway redirect. Carries the full
/// order as `returnData` because nothing durable backs it between calls.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub order_id: OrderId,
    pub transaction_id: Option<TransactionId>,
    pub code: Option<GatewayCode>,
    pub return_data: Option<String>,
}

/// Gateway-driven notification, already authenticated and normalised.
#[derive(Debug, Clone)]
pub struct GatewayNotification {
    pub order_id: OrderId,
    pub transaction_id: Option<TransactionId>,
    pub code: Option<GatewayCode>,
    pub status: Option<String>,
    pub echoed_order: Option<Order>,
}

#[derive(Debug)]
pub enum ReconcileOutcome {
    /// This event completed the order and ran its side effects.
    Fulfilled {
        order: Order,
        report: FulfillmentReport,
    },
    /// An earlier event already resolved this order or key.
    AlreadyProcessed {
        order_id: OrderId,
        status: Option<PaymentStatus>,
    },
    /// Gateway declined. `recorded` is false when the order is unknown here.
    Declined {
        order_id: OrderId,
        code: Option<GatewayCode>,
        recorded: bool,
    },
    /// Approved, but no order data to fulfil with; the confirm call will.
    Deferred { order_id: OrderId },
    /// Neither approved nor declined; left pending.
    Indeterminate {
        order_id: OrderId,
        code: Option<GatewayCode>,
        status: Option<String>,
    },
}

impl ReconcileOutcome {
    pub fn order_id(&self) -> &OrderId {
        match self {
            Self::Fulfilled { order, .. } => order.order_id(),
            Self::AlreadyProcessed { order_id, .. }
            | Self::Declined { order_id, .. }
            | Self::Deferred { order_id }
            | Self::Indeterminate { order_id, .. } => order_id,
        }
    }
}

enum Applied {
    Settled(Order),
    AlreadyProcessed(Option<PaymentStatus>),
}

/// Sole writer of payment status. Every report, from either channel, goes
/// through classification, then the dedup ledger, then a compare-and-set on
/// the order store before any side effect runs.
pub struct Reconciler {
    store: Arc<dyn OrderStore>,
    ledger: Arc<dyn DedupLedger>,
    fulfillment: Arc<Fulfillment>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn OrderStore>,
        ledger: Arc<dyn DedupLedger>,
        fulfillment: Arc<Fulfillment>,
    ) -> Self {
        Self {
            store,
            ledger,
            fulfillment,
        }
    }

    /// Redirect-return path. Decode errors reject before any state change.
    pub async fn confirm(
        &self,
        confirmation: Confirmation,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        let Confirmation {
            order_id,
            transaction_id,
            code,
            return_data,
        } = confirmation;

        let encoded = return_data
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CheckoutError::Decode("Order information not found in request".into()))?;
        let decoded = return_data::decode(encoded)?;
        if decoded.order_id() != &order_id {
            return Err(CheckoutError::Decode(format!(
                "returnData belongs to order {}, not {order_id}",
                decoded.order_id()
            )));
        }
        let candidate = decoded.with_payment_method(PaymentMethod::Card);

        let key = DedupKey::new(&order_id, transaction_id.as_ref());
        match outcome::classify(code.as_ref(), None) {
            Verdict::Approved => {
                let settlement = Settlement::Approved { transaction_id };
                match self.apply(key, candidate, &settlement)? {
                    Applied::Settled(order) => Ok(self.fulfil(order).await),
                    Applied::AlreadyProcessed(status) => {
                        tracing::info!(order_id = %order_id, "confirmation for an order already processed");
                        Ok(ReconcileOutcome::AlreadyProcessed { order_id, status })
                    }
                }
            }
            Verdict::Declined => {
                let settlement = Settlement::Declined { transaction_id };
                let recorded = match self.apply(key, candidate, &settlement)? {
                    Applied::Settled(_) => true,
                    Applied::AlreadyProcessed(Some(PaymentStatus::Completed)) => {
                        tracing::info!(order_id = %order_id, "decline for an order already paid");
                        return Ok(ReconcileOutcome::AlreadyProcessed {
                            order_id,
                            status: Some(PaymentStatus::Completed),
                        });
                    }
                    Applied::AlreadyProcessed(_) => false,
                };
                tracing::info!(
                    order_id = %order_id,
                    code = code.as_ref().map(GatewayCode::as_str).unwrap_or("-"),
                    "payment declined"
                );
                Ok(ReconcileOutcome::Declined {
                    order_id,
                    code,
                    recorded,
                })
            }
            Verdict::Indeterminate => {
                tracing::warn!(order_id = %order_id, "confirmation without a usable result code");
                Ok(ReconcileOutcome::Indeterminate {
                    order_id,
                    code,
                    status: None,
                })
            }
        }
    }

    /// Webhook path. Unknown orders are acknowledged, never rejected: the
    /// gateway would only retry, and retrying cannot make the order known.
    pub async fn handle_notification(
        &self,
        notification: GatewayNotification,
    ) -> Result<ReconcileOutcome, CheckoutError> {
        let GatewayNotification {
            order_id,
            transaction_id,
            code,
            status,
            echoed_order,
        } = notification;

        let verdict = outcome::classify(code.as_ref(), status.as_deref());
        tracing::info!(
            order_id = %order_id,
            code = code.as_ref().map(GatewayCode::as_str).unwrap_or("-"),
            status = status.as_deref().unwrap_or("-"),
            %verdict,
            "payment notification classified"
        );

        if verdict == Verdict::Indeterminate {
            tracing::warn!(order_id = %order_id, "unknown payment status, leaving order pending");
            return Ok(ReconcileOutcome::Indeterminate {
                order_id,
                code,
                status,
            });
        }

        let echoed_order = echoed_order.filter(|order| {
            let matches = order.order_id() == &order_id;
            if !matches {
                tracing::warn!(
                    order_id = %order_id,
                    echoed = %order.order_id(),
                    "echoed order data belongs to another order, ignoring it"
                );
            }
            matches
        });
        let candidate = self.store.get(&order_id).or(echoed_order);
        let key = DedupKey::new(&order_id, transaction_id.as_ref());

        if verdict == Verdict::Approved {
            let Some(candidate) = candidate else {
                tracing::info!(order_id = %order_id, "approved but order data unavailable, deferring to confirmation");
                return Ok(ReconcileOutcome::Deferred { order_id });
            };
            let settlement = Settlement::Approved { transaction_id };
            return match self.apply(key, candidate, &settlement)? {
                Applied::Settled(order) => Ok(self.fulfil(order).await),
                Applied::AlreadyProcessed(status) => {
                    tracing::info!(order_id = %order_id, "order already processed");
                    Ok(ReconcileOutcome::AlreadyProcessed { order_id, status })
                }
            };
        }

        let Some(candidate) = candidate else {
            if !self.ledger.claim(key) {
                return Ok(ReconcileOutcome::AlreadyProcessed {
                    order_id,
                    status: None,
                });
            }
            tracing::warn!(order_id = %order_id, "declined payment for an order unknown here");
            return Ok(ReconcileOutcome::Declined {
                order_id,
                code,
                recorded: false,
            });
        };

        let settlement = Settlement::Declined { transaction_id };
        match self.apply(key, candidate, &settlement)? {
            Applied::Settled(_) => {
                tracing::info!(order_id = %order_id, "payment failed, order marked failed");
                Ok(ReconcileOutcome::Declined {
                    order_id,
                    code,
                    recorded: true,
                })
            }
            Applied::AlreadyProcessed(status) => {
                Ok(ReconcileOutcome::AlreadyProcessed { order_id, status })
            }
        }
    }

    /// Claim the key, then settle. Nothing in here suspends, so the claim and
    /// the state change cannot interleave with another report.
    fn apply(
        &self,
        key: DedupKey,
        candidate: Order,
        settlement: &Settlement,
    ) -> Result<Applied, CheckoutError> {
        let order_id = candidate.order_id().clone();
        if !self.ledger.claim(key.clone()) {
            tracing::info!(%key, "duplicate payment report");
            let status = self.store.get(&order_id).map(|o| o.payment_status());
            return Ok(Applied::AlreadyProcessed(status));
        }

        match self.store.settle(candidate, settlement, Utc::now())? {
            SettleOutcome::Settled(order) => Ok(Applied::Settled(order)),
            SettleOutcome::AlreadySettled(order) => {
                tracing::info!(
                    %key,
                    status = %order.payment_status(),
                    "order already settled by another report"
                );
                Ok(Applied::AlreadyProcessed(Some(order.payment_status())))
            }
            SettleOutcome::NotGatewayPaid(order) => {
                tracing::warn!(
                    %key,
                    method = %order.payment_method(),
                    "gateway report for an order not paid through the gateway, ignoring it"
                );
                Ok(Applied::AlreadyProcessed(Some(order.payment_status())))
            }
        }
    }

    async fn fulfil(&self, order: Order) -> ReconcileOutcome {
        tracing::info!(order_id = %order.order_id(), "order marked as paid");
        let report = self.fulfillment.dispatch(&order).await;
        ReconcileOutcome::Fulfilled { order, report }
    }
}
