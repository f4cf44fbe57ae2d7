//! Invoice kinds, document types and trading parties.

use serde::{Deserialize, Serialize};

/// Direction of an invoice relative to the business using FinBuddy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// The business is the supplier.
    Sales,
    /// The business is the recipient.
    Purchase,
}

impl InvoiceKind {
    /// Default invoice-number prefix for this kind.
    pub fn number_prefix(self) -> &'static str {
        match self {
            InvoiceKind::Sales => "INV",
            InvoiceKind::Purchase => "PO",
        }
    }

    /// Document type a proforma of this kind becomes when converted.
    pub fn converted_document_type(self) -> DocumentType {
        match self {
            InvoiceKind::Sales => DocumentType::Tax,
            InvoiceKind::Purchase => DocumentType::PurchaseOrder,
        }
    }
}

impl core::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InvoiceKind::Sales => f.write_str("sales"),
            InvoiceKind::Purchase => f.write_str("purchase"),
        }
    }
}

/// Document type code stored with an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Proforma invoice; the default for new drafts.
    #[default]
    Performa,
    Tax,
    Quotation,
    PurchaseOrder,
}

impl DocumentType {
    pub fn code(self) -> &'static str {
        match self {
            DocumentType::Performa => "performa",
            DocumentType::Tax => "tax",
            DocumentType::Quotation => "quotation",
            DocumentType::PurchaseOrder => "purchase_order",
        }
    }
}

/// Supplier or recipient details as entered on the invoice form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub gstin: String,
    pub address: String,
    pub place: String,
    pub state_code: String,
    pub pincode: String,
}
