//! Tax-regime selection: which GST components apply to a supply.

use serde::{Deserialize, Serialize};

use finbuddy_core::ValueObject;

use crate::calc;

/// GST regime of a supply, decided by the supplier and recipient states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Same state: CGST + SGST, each at half the rate.
    IntraState,
    /// Different states (or an unknown state): IGST at the full rate.
    InterState,
}

impl TaxRegime {
    /// Compare two state codes.
    ///
    /// Codes are trimmed first. A missing (empty) code on either side is
    /// treated as a different state.
    pub fn between(supplier_state_code: &str, recipient_state_code: &str) -> Self {
        let supplier = supplier_state_code.trim();
        let recipient = recipient_state_code.trim();
        if !supplier.is_empty() && supplier == recipient {
            TaxRegime::IntraState
        } else {
            TaxRegime::InterState
        }
    }
}

/// The three GST components of one line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GstSplit {
    pub igst: f64,
    pub cgst: f64,
    pub sgst: f64,
}

impl ValueObject for GstSplit {}

impl GstSplit {
    /// Full recompute of the split for `regime`.
    ///
    /// The components of the other regime are always zero, whatever the line
    /// carried before.
    pub fn compute(regime: TaxRegime, assessable_value: f64, gst_rate: f64) -> Self {
        match regime {
            TaxRegime::IntraState => Self {
                igst: 0.0,
                cgst: calc::cgst(assessable_value, gst_rate),
                sgst: calc::sgst(assessable_value, gst_rate),
            },
            TaxRegime::InterState => Self {
                igst: calc::igst(assessable_value, gst_rate),
                cgst: 0.0,
                sgst: 0.0,
            },
        }
    }

    /// False when IGST and CGST/SGST are both non-zero.
    pub fn is_single_regime(&self) -> bool {
        !(self.igst > 0.0 && (self.cgst > 0.0 || self.sgst > 0.0))
    }
}
