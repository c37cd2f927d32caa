pub mod crm_sync;
pub mod fulfillment;
pub mod intake;
pub mod reconciliation;
