use {
    crate::domain::{
        error::CheckoutError,
        id::OrderId,
        order::{Order, PaymentMethod, Settlement},
        store::{OrderStore, SettleOutcome},
    },
    chrono::{DateTime, Utc},
    std::{
        collections::HashMap,
        sync::{Mutex, MutexGuard, PoisonError},
    },
};

/// Pending and settled orders for the life of the process.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<OrderId, Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderStore for InMemoryOrderStore {
    fn get(&self, id: &OrderId) -> Option<Order> {
        self.lock().get(id).cloned()
    }

    fn insert(&self, order: Order) {
        self.lock().insert(order.order_id().clone(), order);
    }

    fn settle(
        &self,
        candidate: Order,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<SettleOutcome, CheckoutError> {
        let mut orders = self.lock();

        let mut order = match orders.get(candidate.order_id()) {
            Some(existing) if existing.payment_status().is_terminal() => {
                return Ok(SettleOutcome::AlreadySettled(existing.clone()));
            }
            Some(existing) if existing.payment_method() == PaymentMethod::BankTransfer => {
                return Ok(SettleOutcome::NotGatewayPaid(existing.clone()));
            }
            Some(existing) => existing.clone(),
            None if candidate.payment_status().is_terminal() => {
                return Ok(SettleOutcome::AlreadySettled(candidate));
            }
            None => candidate,
        };

        order.settle(settlement, at)?;
        orders.insert(order.order_id().clone(), order.clone());
        Ok(SettleOutcome::Settled(order))
    }
}
