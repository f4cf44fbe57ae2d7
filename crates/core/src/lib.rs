//! `finbuddy-core` — shared domain building blocks.
//!
//! Pure types only: the domain error model, typed identifiers and the
//! value-object marker used by the tax and invoicing crates.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{InvoiceId, UserId};
pub use value_object::ValueObject;
