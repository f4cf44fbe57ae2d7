use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use finbuddy_core::InvoiceId;
use finbuddy_invoicing::{
    INVOICE_NUMBER_CONSTRAINT, InvoiceNumberSource, InvoiceRepository, InvoiceSubmission,
    NumberingStoreError, SaveError,
};

#[derive(Debug, Clone)]
struct StoredInvoice {
    id: InvoiceId,
    submission: InvoiceSubmission,
}

/// In-memory invoice store for tests/dev.
///
/// Keyed by invoice number, so "latest with prefix" is a reverse range scan
/// and uniqueness is a map lookup. Duplicates fail with the same message the
/// Postgres constraint produces.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    inner: RwLock<BTreeMap<String, StoredInvoice>>,
}

fn duplicate_message() -> String {
    format!("duplicate key value violates unique constraint \"{INVOICE_NUMBER_CONSTRAINT}\"")
}

fn poisoned() -> String {
    "invoice store lock poisoned".to_string()
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: InvoiceId) -> Option<InvoiceSubmission> {
        let map = self.inner.read().ok()?;
        map.values()
            .find(|stored| stored.id == id)
            .map(|stored| stored.submission.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl InvoiceNumberSource for InMemoryInvoiceStore {
    async fn latest_with_prefix(&self, pattern: &str) -> Result<Option<String>, NumberingStoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| NumberingStoreError::Unavailable(poisoned()))?;
        Ok(map
            .range(pattern.to_string()..)
            .take_while(|(number, _)| number.starts_with(pattern))
            .map(|(number, _)| number.clone())
            .last())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceStore {
    async fn insert(&self, submission: &InvoiceSubmission) -> Result<InvoiceId, SaveError> {
        let number = &submission.invoice_number;
        let mut map = self.inner.write().map_err(|_| SaveError::Store(poisoned()))?;
        if map.contains_key(number) {
            return Err(SaveError::from_store_message(number, &duplicate_message()));
        }

        let id = InvoiceId::new();
        map.insert(
            number.clone(),
            StoredInvoice {
                id,
                submission: submission.clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: InvoiceId, submission: &InvoiceSubmission) -> Result<(), SaveError> {
        let number = &submission.invoice_number;
        let mut map = self.inner.write().map_err(|_| SaveError::Store(poisoned()))?;

        let current = map
            .iter()
            .find(|(_, stored)| stored.id == id)
            .map(|(key, _)| key.clone())
            .ok_or(SaveError::NotFound(id))?;
        if current != *number && map.contains_key(number) {
            return Err(SaveError::from_store_message(number, &duplicate_message()));
        }

        map.remove(&current);
        map.insert(
            number.clone(),
            StoredInvoice {
                id,
                submission: submission.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use finbuddy_core::UserId;
    use finbuddy_invoicing::{DocumentType, InvoiceKind, Party};

    fn submission(number: &str) -> InvoiceSubmission {
        InvoiceSubmission {
            user_id: UserId::new(),
            invoice_number: number.to_string(),
            invoice_type: InvoiceKind::Sales,
            document_type_code: DocumentType::Performa,
            document_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            preceding_invoice_reference: None,
            supplier: Party::default(),
            recipient: Party::default(),
            items: Vec::new(),
            total_invoice_value: 0.0,
        }
    }

    #[tokio::test]
    async fn latest_is_greatest_number_with_prefix() {
        let store = InMemoryInvoiceStore::new();
        for number in ["INV-240615-002", "INV-240615-010", "INV-240616-001", "INV-240614-099", "PO-240615-050"] {
            store.insert(&submission(number)).await.unwrap();
        }

        assert_eq!(
            store.latest_with_prefix("INV-240615").await.unwrap().as_deref(),
            Some("INV-240615-010")
        );
        assert_eq!(store.latest_with_prefix("INV-240617").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_insert_is_classified() {
        let store = InMemoryInvoiceStore::new();
        store.insert(&submission("INV-240615-001")).await.unwrap();

        let err = store.insert(&submission("INV-240615-001")).await.unwrap_err();
        assert!(err.is_duplicate_number());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_and_renumbers() {
        let store = InMemoryInvoiceStore::new();
        let id = store.insert(&submission("INV-240615-001")).await.unwrap();
        store.insert(&submission("INV-240615-002")).await.unwrap();

        let mut changed = submission("INV-240615-003");
        changed.total_invoice_value = 1180.0;
        store.update(id, &changed).await.unwrap();
        assert_eq!(store.get(id).unwrap().total_invoice_value, 1180.0);
        assert_eq!(store.len(), 2);

        let err = store.update(id, &submission("INV-240615-002")).await.unwrap_err();
        assert!(err.is_duplicate_number());
    }

    #[tokio::test]
    async fn update_of_unknown_invoice_fails() {
        let store = InMemoryInvoiceStore::new();
        let id = InvoiceId::new();
        assert_eq!(
            store.update(id, &submission("INV-240615-001")).await,
            Err(SaveError::NotFound(id))
        );
    }
}
