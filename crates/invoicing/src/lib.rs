//! Invoicing domain module.
//!
//! Line items and totals, the invoice draft reducer, invoice numbering and the
//! validation/save rules around them. Everything here is deterministic apart
//! from the two store boundaries (`InvoiceNumberSource`, `InvoiceRepository`),
//! which infrastructure crates implement.

pub mod document;
pub mod draft;
pub mod line_item;
pub mod numbering;
pub mod store;
pub mod submission;
pub mod totals;
pub mod validation;

pub use document::{DocumentType, InvoiceKind, Party};
pub use draft::{DraftEdit, InvoiceDraft, PartyField, PartyRole};
pub use line_item::InvoiceLineItem;
pub use numbering::{
    Clock, FixedClock, InvoiceNumber, InvoiceNumberAllocator, InvoiceNumberSource,
    NumberingStoreError, SystemClock, date_pattern,
};
pub use store::{INVOICE_NUMBER_CONSTRAINT, InvoiceRepository, SaveError};
pub use submission::InvoiceSubmission;
pub use totals::InvoiceTotals;
pub use validation::{FieldError, ValidationErrors, validate_draft};
