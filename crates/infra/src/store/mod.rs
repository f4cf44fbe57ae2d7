//! Invoice store adapters.
//!
//! Each adapter serves both boundaries of the invoicing crate: the numbering
//! query (`InvoiceNumberSource`) and invoice persistence
//! (`InvoiceRepository`), with the store enforcing unique invoice numbers.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInvoiceStore;
pub use postgres::PostgresInvoiceStore;
