//! Save command - validate a draft and store it as an invoice

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use finbuddy_core::{InvoiceId, UserId};
use finbuddy_infra::{InMemoryInvoiceStore, InfraConfig, PostgresInvoiceStore};
use finbuddy_invoicing::{DraftEdit, InvoiceDraft, InvoiceRepository, InvoiceSubmission};

pub async fn run(config: &InfraConfig, path: &Path, user_id: UserId, existing: Option<InvoiceId>) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let id = match &config.database_url {
        Some(url) => {
            let store = PostgresInvoiceStore::connect(url, config.max_connections)
                .await
                .context("failed to connect to Postgres")?;
            store.ensure_schema().await.context("failed to create invoice tables")?;
            save(&store, &raw, user_id, existing).await?
        }
        None => {
            warn!("DATABASE_URL not set; saving to an in-memory store that is discarded on exit");
            save(&InMemoryInvoiceStore::new(), &raw, user_id, existing).await?
        }
    };

    println!("{id}");
    Ok(())
}

/// Recompute, validate and insert (or replace `existing`).
///
/// Store failures are reported with the same text the invoice form shows.
async fn save<R: InvoiceRepository>(
    repo: &R,
    raw: &str,
    user_id: UserId,
    existing: Option<InvoiceId>,
) -> Result<InvoiceId> {
    let draft: InvoiceDraft = serde_json::from_str(raw).context("invalid draft JSON")?;
    let draft = draft.apply(DraftEdit::RecomputeAll)?;
    let submission = InvoiceSubmission::from_draft(&draft, user_id)?;

    let saved = match existing {
        Some(id) => repo.update(id, &submission).await.map(|()| id),
        None => repo.insert(&submission).await,
    };
    match saved {
        Ok(id) => {
            info!(invoice_id = %id, invoice_number = %submission.invoice_number, "invoice saved");
            Ok(id)
        }
        Err(err) => bail!(err.user_message()),
    }
}
