use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use finbuddy_core::UserId;

use crate::document::{DocumentType, InvoiceKind, Party};
use crate::draft::InvoiceDraft;
use crate::line_item::InvoiceLineItem;
use crate::validation::{ValidationErrors, validate_draft};

/// A validated draft, shaped for the invoice store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSubmission {
    pub user_id: UserId,
    pub invoice_number: String,
    pub invoice_type: InvoiceKind,
    pub document_type_code: DocumentType,
    /// Serialized as `YYYY-MM-DD`.
    pub document_date: NaiveDate,
    pub preceding_invoice_reference: Option<String>,
    pub supplier: Party,
    pub recipient: Party,
    pub items: Vec<InvoiceLineItem>,
    pub total_invoice_value: f64,
}

impl InvoiceSubmission {
    /// Validate `draft` and build the record to save for `user_id`.
    ///
    /// The draft is borrowed, so after a failed save the caller still holds
    /// the form state unchanged.
    pub fn from_draft(draft: &InvoiceDraft, user_id: UserId) -> Result<Self, ValidationErrors> {
        validate_draft(draft)?;

        let reference = draft.preceding_invoice_reference().trim();
        Ok(Self {
            user_id,
            invoice_number: draft.invoice_number().trim().to_string(),
            invoice_type: draft.invoice_kind(),
            document_type_code: draft.document_type(),
            document_date: draft.document_date(),
            preceding_invoice_reference: (!reference.is_empty()).then(|| reference.to_string()),
            supplier: trimmed_party(draft.supplier()),
            recipient: trimmed_party(draft.recipient()),
            items: draft.items().iter().map(trimmed_item).collect(),
            total_invoice_value: draft.totals().total_value,
        })
    }
}

/// Validation checks codes after trimming, so the stored record is trimmed too.
fn trimmed_party(party: &Party) -> Party {
    Party {
        name: party.name.trim().to_string(),
        gstin: party.gstin.trim().to_string(),
        address: party.address.trim().to_string(),
        place: party.place.trim().to_string(),
        state_code: party.state_code.trim().to_string(),
        pincode: party.pincode.trim().to_string(),
    }
}

fn trimmed_item(item: &InvoiceLineItem) -> InvoiceLineItem {
    InvoiceLineItem {
        item_description: item.item_description.trim().to_string(),
        hsn_code: item.hsn_code.trim().to_string(),
        ..item.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_json(invoice_number: &str, recipient_gstin: &str) -> String {
        format!(
            r#"{{
                "invoice_number": "{invoice_number}",
                "invoice_kind": "purchase",
                "document_date": "2024-06-15",
                "supplier": {{ "state_code": "29" }},
                "recipient": {{
                    "gstin": "{recipient_gstin}",
                    "state_code": "29",
                    "pincode": "560001"
                }},
                "items": [{{
                    "item_description": "Printer paper",
                    "hsn_code": "48025690",
                    "item_price": 250,
                    "quantity": 4,
                    "gst_rate": 12
                }}]
            }}"#
        )
    }

    fn draft(invoice_number: &str, recipient_gstin: &str) -> InvoiceDraft {
        let draft: InvoiceDraft = serde_json::from_str(&draft_json(invoice_number, recipient_gstin)).unwrap();
        draft.apply(crate::draft::DraftEdit::RecomputeAll).unwrap()
    }

    #[test]
    fn carries_total_and_formats_date() {
        let user_id = UserId::new();
        let submission = InvoiceSubmission::from_draft(&draft("PO-240615-001", "29ABCDE1234F1Z5"), user_id).unwrap();

        assert_eq!(submission.user_id, user_id);
        assert_eq!(submission.invoice_type, InvoiceKind::Purchase);
        assert_eq!(submission.document_type_code, DocumentType::Performa);
        assert_eq!(submission.preceding_invoice_reference, None);
        assert_eq!(submission.total_invoice_value, 1120.0);

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["document_date"], "2024-06-15");
        assert_eq!(json["invoice_type"], "purchase");
        assert_eq!(json["document_type_code"], "performa");
    }

    #[test]
    fn invalid_draft_is_not_submitted() {
        let errors = InvoiceSubmission::from_draft(&draft("PO-240615-001", "29ABC"), UserId::new()).unwrap_err();
        assert!(errors.contains("recipient_gstin"));
    }

    #[test]
    fn padded_codes_are_stored_trimmed() {
        let raw = draft_json("PO-240615-001", " 29ABCDE1234F1Z5 ")
            .replace("\"560001\"", "\" 560001 \"")
            .replace("\"48025690\"", "\"48025690 \"");
        let draft: InvoiceDraft = serde_json::from_str(&raw).unwrap();
        let draft = draft.apply(crate::draft::DraftEdit::RecomputeAll).unwrap();

        let submission = InvoiceSubmission::from_draft(&draft, UserId::new()).unwrap();
        assert_eq!(submission.recipient.gstin, "29ABCDE1234F1Z5");
        assert_eq!(submission.recipient.pincode, "560001");
        assert_eq!(submission.items[0].hsn_code, "48025690");
        assert_eq!(submission.items[0].item_description, "Printer paper");
    }
}
