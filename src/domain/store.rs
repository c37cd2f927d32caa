use {
    super::error::CheckoutError,
    super::id::{DedupKey, OrderId},
    super::order::{Order, Settlement},
    chrono::{DateTime, Utc},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// This call moved the order out of `Pending`.
    Settled(Order),
    /// Someone else already resolved it; carries the recorded state.
    AlreadySettled(Order),
    /// The stored order is not paid through the gateway, so no gateway
    /// report may settle it.
    NotGatewayPaid(Order),
}

/// Orders known to this process. Implementations must make `settle` a single
/// atomic step so two reports for the same order cannot both win.
pub trait OrderStore: Send + Sync {
    fn get(&self, id: &OrderId) -> Option<Order>;

    fn insert(&self, order: Order);

    fn contains(&self, id: &OrderId) -> bool {
        self.get(id).is_some()
    }

    /// Settle the stored order, or `candidate` if none is stored yet. The
    /// stored record wins over the candidate because its amounts were
    /// computed server-side. Stored bank-transfer orders are never settled.
    fn settle(
        &self,
        candidate: Order,
        settlement: &Settlement,
        at: DateTime<Utc>,
    ) -> Result<SettleOutcome, CheckoutError>;
}

/// Keys whose outcome has already been acted on. Append-only.
pub trait DedupLedger: Send + Sync {
    fn has_processed(&self, key: &DedupKey) -> bool;

    fn mark_processed(&self, key: DedupKey);

    /// Check and mark in one step. Returns `true` only for the first caller.
    fn claim(&self, key: DedupKey) -> bool;
}
