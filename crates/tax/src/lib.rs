//! GST (Goods and Services Tax) domain module.
//!
//! Deterministic tax arithmetic for Indian invoices: assessable values, the
//! IGST vs CGST/SGST split and the identifiers the split is decided from.
//! No IO, no clamping, no rounding; validation lives in the invoicing crate.

pub mod calc;
pub mod format;
pub mod gstin;
pub mod regime;

pub use calc::{assessable_value, cgst, igst, sgst, total_invoice_value};
pub use format::format_inr;
pub use gstin::{Gstin, HsnCode, StateCode, derive_state_code};
pub use regime::{GstSplit, TaxRegime};
