use serde::{Deserialize, Serialize};

use finbuddy_tax::{GstSplit, TaxRegime, calc};

/// One invoice line as edited in the invoice form.
///
/// `assessable_value` and the three tax values are derived; they are stored
/// on the line because the form displays and persists them. Missing numeric
/// fields deserialize as zero (quantity as one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceLineItem {
    pub item_description: String,
    /// 8-character HSN code (checked by validation, not here).
    pub hsn_code: String,
    pub item_price: f64,
    pub quantity: f64,
    pub discount_percentage: f64,
    pub assessable_value: f64,
    pub gst_rate: f64,
    pub igst_value: f64,
    pub cgst_value: f64,
    pub sgst_value: f64,
}

impl Default for InvoiceLineItem {
    fn default() -> Self {
        Self {
            item_description: String::new(),
            hsn_code: String::new(),
            item_price: 0.0,
            quantity: 1.0,
            discount_percentage: 0.0,
            assessable_value: 0.0,
            gst_rate: 0.0,
            igst_value: 0.0,
            cgst_value: 0.0,
            sgst_value: 0.0,
        }
    }
}

impl InvoiceLineItem {
    /// Blank line that keeps the HSN code, GST rate and discount of `previous`.
    pub fn templated_from(previous: &InvoiceLineItem) -> Self {
        Self {
            hsn_code: previous.hsn_code.clone(),
            gst_rate: previous.gst_rate,
            discount_percentage: previous.discount_percentage,
            ..Self::default()
        }
    }

    pub fn split(&self) -> GstSplit {
        GstSplit {
            igst: self.igst_value,
            cgst: self.cgst_value,
            sgst: self.sgst_value,
        }
    }

    /// Recompute the assessable value from price, quantity and discount.
    pub fn recompute_assessable(&mut self) {
        self.assessable_value =
            calc::assessable_value(self.item_price, self.quantity, self.discount_percentage);
    }

    /// Overwrite all three tax values for `regime` from the current
    /// assessable value and rate.
    pub fn apply_regime(&mut self, regime: TaxRegime) {
        let split = GstSplit::compute(regime, self.assessable_value, self.gst_rate);
        self.igst_value = split.igst;
        self.cgst_value = split.cgst;
        self.sgst_value = split.sgst;
    }

    /// Assessable value plus tax.
    pub fn line_total(&self) -> f64 {
        calc::total_invoice_value(
            self.assessable_value,
            self.igst_value,
            self.cgst_value,
            self.sgst_value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(price: f64, quantity: f64, discount: f64, rate: f64) -> InvoiceLineItem {
        InvoiceLineItem {
            item_description: "Steel rods".to_string(),
            hsn_code: "72142090".to_string(),
            item_price: price,
            quantity,
            discount_percentage: discount,
            gst_rate: rate,
            ..InvoiceLineItem::default()
        }
    }

    #[test]
    fn regime_switch_zeroes_the_other_components() {
        let mut item = priced(500.0, 2.0, 0.0, 18.0);
        item.recompute_assessable();

        item.apply_regime(TaxRegime::IntraState);
        assert_eq!((item.igst_value, item.cgst_value, item.sgst_value), (0.0, 90.0, 90.0));

        item.apply_regime(TaxRegime::InterState);
        assert_eq!((item.igst_value, item.cgst_value, item.sgst_value), (180.0, 0.0, 0.0));
        assert_eq!(item.line_total(), 1180.0);
    }

    #[test]
    fn template_keeps_classification_and_resets_amounts() {
        let mut previous = priced(100.0, 3.0, 5.0, 12.0);
        previous.recompute_assessable();
        previous.apply_regime(TaxRegime::InterState);

        let next = InvoiceLineItem::templated_from(&previous);
        assert_eq!(next.hsn_code, "72142090");
        assert_eq!(next.gst_rate, 12.0);
        assert_eq!(next.discount_percentage, 5.0);
        assert_eq!(next.item_price, 0.0);
        assert_eq!(next.quantity, 1.0);
        assert_eq!(next.assessable_value, 0.0);
        assert!(next.item_description.is_empty());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let item: InvoiceLineItem =
            serde_json::from_str(r#"{"item_description":"Bolts","item_price":12.5}"#).unwrap();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.igst_value, 0.0);
        assert_eq!(item.item_price, 12.5);
    }
}
