//! Infrastructure layer: invoice store adapters and configuration.

pub mod config;
pub mod store;

pub use config::{ConfigError, InfraConfig};
pub use store::{InMemoryInvoiceStore, PostgresInvoiceStore};
