//! Write side of the invoice store and its error model.

use async_trait::async_trait;
use thiserror::Error;

use finbuddy_core::InvoiceId;

use crate::submission::InvoiceSubmission;

/// Name of the unique constraint on `invoices.invoice_number`.
pub const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_key";

const DUPLICATE_KEY_MARKER: &str = "duplicate key value";

/// Failure saving an invoice.
///
/// A duplicate number is reported apart from other failures so the user can
/// be told to pick another number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Invoice number already exists. Please use a different invoice number.")]
    DuplicateInvoiceNumber { invoice_number: String },

    #[error("invoice {0} not found")]
    NotFound(InvoiceId),

    #[error("invoice store error: {0}")]
    Store(String),
}

impl SaveError {
    /// Classify a store error message.
    ///
    /// Only a duplicate-key violation of [`INVOICE_NUMBER_CONSTRAINT`] counts
    /// as a duplicate number; any other message is a generic store error.
    pub fn from_store_message(invoice_number: &str, message: &str) -> Self {
        if message.contains(DUPLICATE_KEY_MARKER) && message.contains(INVOICE_NUMBER_CONSTRAINT) {
            SaveError::DuplicateInvoiceNumber {
                invoice_number: invoice_number.to_string(),
            }
        } else {
            SaveError::Store(message.to_string())
        }
    }

    pub fn is_duplicate_number(&self) -> bool {
        matches!(self, SaveError::DuplicateInvoiceNumber { .. })
    }

    /// Text for the failure toast shown after a save.
    pub fn user_message(&self) -> String {
        format!("Failed to process invoice: {self}")
    }
}

/// Persistence of invoices with their line items.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Store a new invoice and its items.
    async fn insert(&self, submission: &InvoiceSubmission) -> Result<InvoiceId, SaveError>;

    /// Replace an existing invoice and all of its items.
    async fn update(&self, id: InvoiceId, submission: &InvoiceSubmission) -> Result<(), SaveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_number_is_recognised() {
        let err = SaveError::from_store_message(
            "INV-240615-003",
            r#"duplicate key value violates unique constraint "invoices_invoice_number_key""#,
        );
        assert!(err.is_duplicate_number());
        assert_eq!(
            err.user_message(),
            "Failed to process invoice: Invoice number already exists. Please use a different invoice number."
        );
    }

    #[test]
    fn other_duplicates_stay_generic() {
        let err = SaveError::from_store_message(
            "INV-240615-003",
            r#"duplicate key value violates unique constraint "invoice_items_pkey""#,
        );
        assert_eq!(
            err,
            SaveError::Store(
                r#"duplicate key value violates unique constraint "invoice_items_pkey""#.to_string()
            )
        );
    }
}
