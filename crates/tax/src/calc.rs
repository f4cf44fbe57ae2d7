//! Pure GST arithmetic.
//!
//! These functions never fail and never clamp their inputs: a discount above
//! 100% yields a negative assessable value. Keeping inputs in range is the job
//! of the form-validation layer.

/// Taxable base after quantity and discount.
///
/// `unit_price * quantity * (1 - discount_percentage / 100)`. Callers without a
/// quantity or discount pass `1.0` and `0.0`.
pub fn assessable_value(unit_price: f64, quantity: f64, discount_percentage: f64) -> f64 {
    let gross = unit_price * quantity;
    let discount = gross * discount_percentage / 100.0;
    gross - discount
}

/// Integrated GST (inter-state): the full rate.
pub fn igst(assessable_value: f64, gst_rate: f64) -> f64 {
    assessable_value * gst_rate / 100.0
}

/// Central GST (intra-state): half the rate.
pub fn cgst(assessable_value: f64, gst_rate: f64) -> f64 {
    assessable_value * gst_rate / 200.0
}

/// State GST (intra-state): half the rate, always equal to [`cgst`].
pub fn sgst(assessable_value: f64, gst_rate: f64) -> f64 {
    assessable_value * gst_rate / 200.0
}

/// Line value including tax.
///
/// Accepts any combination of components; mixing IGST with CGST/SGST is not
/// rejected here.
pub fn total_invoice_value(assessable_value: f64, igst: f64, cgst: f64, sgst: f64) -> f64 {
    assessable_value + igst + cgst + sgst
}
