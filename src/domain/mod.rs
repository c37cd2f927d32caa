pub mod error;
pub mod id;
pub mod money;
pub mod order;
pub mod outcome;
pub mod pricing;
pub mod provider;
pub mod return_data;
pub mod store;
