//! End-to-end draft lifecycle: allocate a number, edit, validate, save.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};

use finbuddy_core::{InvoiceId, UserId};
use finbuddy_invoicing::{
    DraftEdit, FixedClock, InvoiceDraft, InvoiceKind, InvoiceNumberAllocator, InvoiceNumberSource,
    InvoiceRepository, InvoiceSubmission, NumberingStoreError, Party, PartyField, PartyRole,
    SaveError, validate_draft,
};

/// Minimal store keyed by invoice number, rejecting duplicates with the
/// same message Postgres produces.
#[derive(Default)]
struct TestStore {
    invoices: Mutex<BTreeMap<String, InvoiceSubmission>>,
}

#[async_trait]
impl InvoiceNumberSource for TestStore {
    async fn latest_with_prefix(&self, pattern: &str) -> Result<Option<String>, NumberingStoreError> {
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices.keys().filter(|n| n.starts_with(pattern)).next_back().cloned())
    }
}

#[async_trait]
impl InvoiceRepository for TestStore {
    async fn insert(&self, submission: &InvoiceSubmission) -> Result<InvoiceId, SaveError> {
        let mut invoices = self.invoices.lock().unwrap();
        if invoices.contains_key(&submission.invoice_number) {
            return Err(SaveError::from_store_message(
                &submission.invoice_number,
                r#"duplicate key value violates unique constraint "invoices_invoice_number_key""#,
            ));
        }
        invoices.insert(submission.invoice_number.clone(), submission.clone());
        Ok(InvoiceId::new())
    }

    async fn update(&self, id: InvoiceId, _submission: &InvoiceSubmission) -> Result<(), SaveError> {
        Err(SaveError::NotFound(id))
    }
}

fn clock() -> FixedClock {
    let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    FixedClock(ist.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap())
}

fn party(role: PartyRole, field: PartyField, value: &str) -> DraftEdit {
    DraftEdit::Party { role, field, value: value.to_string() }
}

fn fill(draft: InvoiceDraft) -> InvoiceDraft {
    let edits = vec![
        party(PartyRole::Recipient, PartyField::Name, "Globex Pvt Ltd"),
        party(PartyRole::Recipient, PartyField::Gstin, "27ABCDE1234F1Z5"),
        party(PartyRole::Recipient, PartyField::Pincode, "400001"),
        DraftEdit::ItemDescription { index: 0, value: "Consulting".to_string() },
        DraftEdit::ItemHsnCode { index: 0, value: "99831100".to_string() },
        DraftEdit::ItemPrice { index: 0, value: 1000.0 },
        DraftEdit::ItemGstRate { index: 0, value: 18.0 },
    ];
    edits.into_iter().fold(draft, |d, e| d.apply(e).unwrap())
}

#[tokio::test]
async fn sales_draft_is_numbered_taxed_and_saved() {
    let store = std::sync::Arc::new(TestStore::default());
    let allocator = InvoiceNumberAllocator::with_clock(store.clone(), clock());
    let profile = Party {
        name: "Acme Traders".to_string(),
        gstin: "27AAPFU0939F1ZV".to_string(),
        state_code: "27".to_string(),
        pincode: "411001".to_string(),
        ..Party::default()
    };

    let number = allocator.allocate(InvoiceKind::Sales.number_prefix()).await;
    assert_eq!(number.to_string(), "INV-240615-001");

    let date = clock().0.date_naive();
    let draft = fill(InvoiceDraft::new(InvoiceKind::Sales, &number, date).with_business_profile(&profile));

    // Both parties in state 27: central + state tax.
    let item = &draft.items()[0];
    assert_eq!((item.igst_value, item.cgst_value, item.sgst_value), (0.0, 90.0, 90.0));
    assert_eq!(validate_draft(&draft), Ok(()));

    let submission = InvoiceSubmission::from_draft(&draft, UserId::new()).unwrap();
    assert_eq!(submission.total_invoice_value, 1180.0);
    store.insert(&submission).await.unwrap();

    let next = allocator.allocate("INV").await;
    assert_eq!(next.to_string(), "INV-240615-002");
}

#[tokio::test]
async fn duplicate_number_keeps_draft_for_resubmission() {
    let store = TestStore::default();
    let date = clock().0.date_naive();
    let number = "INV-240615-001".parse().unwrap();

    let first = fill(InvoiceDraft::new(InvoiceKind::Sales, &number, date));
    store
        .insert(&InvoiceSubmission::from_draft(&first, UserId::new()).unwrap())
        .await
        .unwrap();

    let second = fill(InvoiceDraft::new(InvoiceKind::Sales, &number, date));
    let err = store
        .insert(&InvoiceSubmission::from_draft(&second, UserId::new()).unwrap())
        .await
        .unwrap_err();
    assert!(err.is_duplicate_number());

    // Fix the number on the untouched draft and resubmit.
    let fixed = second
        .apply(DraftEdit::InvoiceNumber { value: "INV-240615-002".to_string() })
        .unwrap();
    assert_eq!(fixed.items(), second.items());
    store
        .insert(&InvoiceSubmission::from_draft(&fixed, UserId::new()).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn recipient_in_other_state_pays_igst() {
    let date = clock().0.date_naive();
    let number = "INV-240615-001".parse().unwrap();
    let draft = fill(InvoiceDraft::new(InvoiceKind::Sales, &number, date))
        .apply(party(PartyRole::Supplier, PartyField::StateCode, "29"))
        .unwrap();

    let item = &draft.items()[0];
    assert_eq!((item.igst_value, item.cgst_value, item.sgst_value), (180.0, 0.0, 0.0));
    assert_eq!(draft.totals().total_value, 1180.0);
}
