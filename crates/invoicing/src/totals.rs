use serde::{Deserialize, Serialize};

use finbuddy_tax::calc;

use crate::line_item::InvoiceLineItem;

/// Invoice-level aggregate over line items.
///
/// Always derived from the items, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub total_assessable_value: f64,
    pub total_igst: f64,
    pub total_cgst: f64,
    pub total_sgst: f64,
    pub total_value: f64,
}

impl InvoiceTotals {
    /// Sum each component across `items`; an empty slice gives all zeros.
    pub fn from_items(items: &[InvoiceLineItem]) -> Self {
        let mut totals = items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_assessable_value += item.assessable_value;
            acc.total_igst += item.igst_value;
            acc.total_cgst += item.cgst_value;
            acc.total_sgst += item.sgst_value;
            acc
        });
        totals.total_value = calc::total_invoice_value(
            totals.total_assessable_value,
            totals.total_igst,
            totals.total_cgst,
            totals.total_sgst,
        );
        totals
    }

    pub fn total_tax(&self) -> f64 {
        self.total_igst + self.total_cgst + self.total_sgst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_items_total_zero() {
        assert_eq!(InvoiceTotals::from_items(&[]), InvoiceTotals::default());
        assert_eq!(InvoiceTotals::from_items(&[]).total_value, 0.0);
    }

    #[test]
    fn sums_components_and_grand_total() {
        let items = vec![
            InvoiceLineItem {
                assessable_value: 1000.0,
                igst_value: 180.0,
                ..InvoiceLineItem::default()
            },
            InvoiceLineItem {
                assessable_value: 200.0,
                cgst_value: 5.0,
                sgst_value: 5.0,
                ..InvoiceLineItem::default()
            },
        ];

        let totals = InvoiceTotals::from_items(&items);
        assert_eq!(totals.total_assessable_value, 1200.0);
        assert_eq!(totals.total_igst, 180.0);
        assert_eq!(totals.total_cgst, 5.0);
        assert_eq!(totals.total_sgst, 5.0);
        assert_eq!(totals.total_tax(), 190.0);
        assert_eq!(totals.total_value, 1390.0);
    }

    #[test]
    fn items_without_amounts_count_as_zero() {
        let items: Vec<InvoiceLineItem> =
            serde_json::from_str(r#"[{"assessable_value": 50}, {}]"#).unwrap();
        let totals = InvoiceTotals::from_items(&items);
        assert_eq!(totals.total_assessable_value, 50.0);
        assert_eq!(totals.total_value, 50.0);
    }
}
