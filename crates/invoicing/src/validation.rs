//! Form validation for invoice drafts.
//!
//! The tax arithmetic accepts any numbers; this is where ranges, lengths and
//! the single-regime rule are enforced before a draft may be saved. All
//! failures are collected so the form can show them together.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use finbuddy_core::DomainError;
use finbuddy_tax::gstin::{GSTIN_LEN, HSN_CODE_LEN, STATE_CODE_LEN};

use crate::document::Party;
use crate::draft::InvoiceDraft;
use crate::line_item::InvoiceLineItem;

const NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 100;
const PLACE_MAX: usize = 50;
const REFERENCE_MAX: usize = 16;
const DESCRIPTION_MAX: usize = 300;
const PINCODE_LEN: usize = 6;
const GST_RATE_MAX: f64 = 100.0;

/// One failed field, addressed by its form path (e.g. `items.0.hsn_code`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Error, Serialize, Deserialize)]
#[error("{} invalid field(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::validation(summarize(&errors.0))
    }
}

#[derive(Default)]
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn fail(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    fn max_len(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.fail(field, message);
        }
    }

    fn exact_len(&mut self, field: &str, value: &str, len: usize, message: &str) {
        if value.trim().chars().count() != len {
            self.fail(field, message);
        }
    }

    fn pincode(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.len() != PINCODE_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            self.fail(field, "Pincode must be 6 digits");
        }
    }

    /// `!(value >= min)` so NaN fails too.
    fn at_least(&mut self, field: &str, value: f64, min: f64, message: &str) {
        if !(value >= min) {
            self.fail(field, message);
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

/// Check a draft against the invoice form rules.
pub fn validate_draft(draft: &InvoiceDraft) -> Result<(), ValidationErrors> {
    let mut c = Collector::default();

    if draft.invoice_number().trim().is_empty() {
        c.fail("invoice_number", "Invoice number is required");
    }
    c.max_len(
        "preceding_invoice_reference",
        draft.preceding_invoice_reference(),
        REFERENCE_MAX,
        "Reference must be at most 16 characters",
    );

    validate_supplier(&mut c, draft.supplier());
    validate_recipient(&mut c, draft.recipient());

    if draft.items().is_empty() {
        c.fail("items", "At least one item is required");
    }
    for (index, item) in draft.items().iter().enumerate() {
        validate_item(&mut c, index, item);
    }

    c.finish()
}

/// Supplier fields are optional; empty means "not provided".
fn validate_supplier(c: &mut Collector, supplier: &Party) {
    c.max_len("supplier_name", &supplier.name, NAME_MAX, "Supplier name must be at most 100 characters");
    c.max_len("supplier_address", &supplier.address, ADDRESS_MAX, "Address must be at most 100 characters");
    c.max_len("supplier_place", &supplier.place, PLACE_MAX, "Place must be at most 50 characters");
    if !supplier.gstin.is_empty() {
        c.exact_len("supplier_gstin", &supplier.gstin, GSTIN_LEN, "GSTIN must be 15 characters");
    }
    if !supplier.state_code.trim().is_empty() {
        c.exact_len("supplier_state_code", &supplier.state_code, STATE_CODE_LEN, "State code must be 2 characters");
    }
    if !supplier.pincode.is_empty() {
        c.pincode("supplier_pincode", &supplier.pincode);
    }
}

fn validate_recipient(c: &mut Collector, recipient: &Party) {
    c.max_len("recipient_name", &recipient.name, NAME_MAX, "Recipient name must be at most 100 characters");
    c.exact_len("recipient_gstin", &recipient.gstin, GSTIN_LEN, "GSTIN must be 15 characters");
    c.max_len("recipient_address", &recipient.address, ADDRESS_MAX, "Address must be at most 100 characters");
    c.max_len("recipient_place", &recipient.place, PLACE_MAX, "Place must be at most 50 characters");
    if recipient.state_code.trim().is_empty() {
        c.fail("recipient_state_code", "State code is required");
    } else {
        c.exact_len("recipient_state_code", &recipient.state_code, STATE_CODE_LEN, "State code must be 2 characters");
    }
    c.pincode("recipient_pincode", &recipient.pincode);
}

fn validate_item(c: &mut Collector, index: usize, item: &InvoiceLineItem) {
    let field = |name: &str| format!("items.{index}.{name}");

    if item.item_description.trim().is_empty() {
        c.fail(field("item_description"), "Description is required");
    }
    c.max_len(
        &field("item_description"),
        &item.item_description,
        DESCRIPTION_MAX,
        "Description must be at most 300 characters",
    );
    c.exact_len(&field("hsn_code"), &item.hsn_code, HSN_CODE_LEN, "HSN code must be 8 digits");

    c.at_least(&field("item_price"), item.item_price, 0.0, "Price must be non-negative");
    c.at_least(&field("quantity"), item.quantity, 1.0, "Quantity must be at least 1");
    if !(0.0..=100.0).contains(&item.discount_percentage) {
        c.fail(field("discount_percentage"), "Discount percentage must be between 0 and 100");
    }
    c.at_least(&field("assessable_value"), item.assessable_value, 0.0, "Assessable value must be non-negative");
    if !(0.0..=GST_RATE_MAX).contains(&item.gst_rate) {
        c.fail(field("gst_rate"), "GST rate must be between 0 and 100");
    }
    c.at_least(&field("igst_value"), item.igst_value, 0.0, "IGST must be non-negative");
    c.at_least(&field("cgst_value"), item.cgst_value, 0.0, "CGST must be non-negative");
    c.at_least(&field("sgst_value"), item.sgst_value, 0.0, "SGST must be non-negative");

    if !item.split().is_single_regime() {
        c.fail(field("igst_value"), "IGST cannot be combined with CGST/SGST on the same item");
    }
}
