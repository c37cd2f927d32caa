pub mod dedup_ledger;
pub mod order_store;

pub use dedup_ledger::InMemoryDedupLedger;
pub use order_store::InMemoryOrderStore;
