pub mod client;
pub mod confirm;
pub mod fields;
pub mod signature;
pub mod webhook;

pub use client::TilopayGateway;
