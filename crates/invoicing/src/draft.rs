//! Invoice draft state and its edit reducer.
//!
//! A draft is an immutable snapshot of the invoice form. Every edit goes
//! through [`InvoiceDraft::apply`], which returns the next snapshot with all
//! dependent values (assessable value, tax split, derived state codes)
//! already recomputed. There is no subscription and nothing to re-enter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use finbuddy_core::{DomainError, DomainResult};
use finbuddy_tax::{TaxRegime, derive_state_code};

use crate::document::{DocumentType, InvoiceKind, Party};
use crate::line_item::InvoiceLineItem;
use crate::numbering::InvoiceNumber;
use crate::totals::InvoiceTotals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Supplier,
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyField {
    Name,
    Gstin,
    Address,
    Place,
    StateCode,
    Pincode,
}

/// A single field edit on the invoice form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum DraftEdit {
    InvoiceNumber { value: String },
    DocumentDate { value: NaiveDate },
    DocumentType { value: DocumentType },
    PrecedingReference { value: String },
    Party { role: PartyRole, field: PartyField, value: String },
    ItemDescription { index: usize, value: String },
    ItemHsnCode { index: usize, value: String },
    ItemPrice { index: usize, value: f64 },
    ItemQuantity { index: usize, value: f64 },
    ItemDiscount { index: usize, value: f64 },
    ItemGstRate { index: usize, value: f64 },
    /// Append a line templated from the last one.
    AddItem,
    RemoveItem { index: usize },
    /// Recompute every derived value on every line.
    RecomputeAll,
}

/// Invoice form state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    invoice_number: String,
    invoice_kind: InvoiceKind,
    #[serde(rename = "document_type_code", default)]
    document_type: DocumentType,
    document_date: NaiveDate,
    #[serde(default)]
    preceding_invoice_reference: String,
    #[serde(default)]
    supplier: Party,
    #[serde(default)]
    recipient: Party,
    #[serde(default)]
    items: Vec<InvoiceLineItem>,
}

impl InvoiceDraft {
    /// New proforma draft with one blank line.
    pub fn new(invoice_kind: InvoiceKind, invoice_number: &InvoiceNumber, document_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.to_string(),
            invoice_kind,
            document_type: DocumentType::Performa,
            document_date,
            preceding_invoice_reference: String::new(),
            supplier: Party::default(),
            recipient: Party::default(),
            items: vec![InvoiceLineItem::default()],
        }
    }

    /// Fill our own side of the invoice from the business profile: the
    /// supplier on sales invoices, the recipient on purchase invoices.
    pub fn with_business_profile(&self, profile: &Party) -> Self {
        let mut next = self.clone();
        match self.invoice_kind {
            InvoiceKind::Sales => next.supplier = profile.clone(),
            InvoiceKind::Purchase => next.recipient = profile.clone(),
        }
        next.recompute_all();
        next
    }

    /// Tax invoice (or purchase order) drafted from this proforma.
    ///
    /// Keeps parties and lines, takes the freshly allocated number and
    /// references the source number.
    pub fn convert_to_tax_invoice(&self, invoice_number: &InvoiceNumber) -> Self {
        let mut next = self.clone();
        next.preceding_invoice_reference = self.invoice_number.clone();
        next.invoice_number = invoice_number.to_string();
        next.document_type = self.invoice_kind.converted_document_type();
        next
    }

    pub fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    pub fn invoice_kind(&self) -> InvoiceKind {
        self.invoice_kind
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn document_date(&self) -> NaiveDate {
        self.document_date
    }

    pub fn preceding_invoice_reference(&self) -> &str {
        &self.preceding_invoice_reference
    }

    pub fn supplier(&self) -> &Party {
        &self.supplier
    }

    pub fn recipient(&self) -> &Party {
        &self.recipient
    }

    pub fn items(&self) -> &[InvoiceLineItem] {
        &self.items
    }

    /// Regime implied by the current supplier and recipient state codes.
    pub fn regime(&self) -> TaxRegime {
        TaxRegime::between(&self.supplier.state_code, &self.recipient.state_code)
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::from_items(&self.items)
    }

    /// Apply one edit and return the resulting snapshot.
    ///
    /// Fails only for edits that address a line that does not exist, or that
    /// would remove the last line.
    pub fn apply(&self, edit: DraftEdit) -> DomainResult<InvoiceDraft> {
        let mut next = self.clone();
        let regime = next.regime();

        match edit {
            DraftEdit::InvoiceNumber { value } => next.invoice_number = value,
            DraftEdit::DocumentDate { value } => next.document_date = value,
            DraftEdit::DocumentType { value } => next.document_type = value,
            DraftEdit::PrecedingReference { value } => next.preceding_invoice_reference = value,
            DraftEdit::Party { role, field, value } => next.edit_party(role, field, value),
            DraftEdit::ItemDescription { index, value } => {
                next.item_mut(index)?.item_description = value;
            }
            DraftEdit::ItemHsnCode { index, value } => {
                next.item_mut(index)?.hsn_code = value;
            }
            DraftEdit::ItemPrice { index, value } => {
                let item = next.item_mut(index)?;
                item.item_price = value;
                reprice(item, regime);
            }
            DraftEdit::ItemQuantity { index, value } => {
                let item = next.item_mut(index)?;
                item.quantity = value;
                reprice(item, regime);
            }
            DraftEdit::ItemDiscount { index, value } => {
                let item = next.item_mut(index)?;
                item.discount_percentage = value;
                reprice(item, regime);
            }
            DraftEdit::ItemGstRate { index, value } => {
                let item = next.item_mut(index)?;
                item.gst_rate = value;
                item.apply_regime(regime);
            }
            DraftEdit::AddItem => {
                let item = next
                    .items
                    .last()
                    .map(InvoiceLineItem::templated_from)
                    .unwrap_or_default();
                next.items.push(item);
            }
            DraftEdit::RemoveItem { index } => {
                if index >= next.items.len() {
                    return Err(DomainError::not_found(format!("line item {index}")));
                }
                if next.items.len() == 1 {
                    return Err(DomainError::validation(
                        "at least one item is required",
                    ));
                }
                next.items.remove(index);
            }
            DraftEdit::RecomputeAll => {
                for item in &mut next.items {
                    reprice(item, regime);
                }
            }
        }

        Ok(next)
    }

    fn party_mut(&mut self, role: PartyRole) -> &mut Party {
        match role {
            PartyRole::Supplier => &mut self.supplier,
            PartyRole::Recipient => &mut self.recipient,
        }
    }

    fn edit_party(&mut self, role: PartyRole, field: PartyField, value: String) {
        let party = self.party_mut(role);
        let state_changed = match field {
            PartyField::Name => {
                party.name = value;
                false
            }
            PartyField::Address => {
                party.address = value;
                false
            }
            PartyField::Place => {
                party.place = value;
                false
            }
            PartyField::Pincode => {
                party.pincode = value;
                false
            }
            PartyField::StateCode => {
                party.state_code = value;
                true
            }
            PartyField::Gstin => {
                let derived = derive_state_code(&value, &party.state_code);
                party.gstin = value;
                match derived {
                    Some(code) => {
                        party.state_code = code;
                        true
                    }
                    None => false,
                }
            }
        };

        if state_changed {
            self.recompute_all();
        }
    }

    /// Re-split tax on every line for the current regime.
    fn recompute_all(&mut self) {
        let regime = self.regime();
        for item in &mut self.items {
            item.apply_regime(regime);
        }
    }

    fn item_mut(&mut self, index: usize) -> DomainResult<&mut InvoiceLineItem> {
        self.items
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found(format!("line item {index}")))
    }
}

fn reprice(item: &mut InvoiceLineItem, regime: TaxRegime) {
    item.recompute_assessable();
    item.apply_regime(regime);
}
