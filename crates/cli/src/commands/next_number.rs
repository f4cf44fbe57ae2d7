//! Next-number command - allocate today's next invoice number

use anyhow::{Context, Result};
use tracing::{info, warn};

use finbuddy_infra::{InMemoryInvoiceStore, InfraConfig, PostgresInvoiceStore};
use finbuddy_invoicing::{InvoiceKind, InvoiceNumberAllocator};

pub async fn run(config: &InfraConfig, kind: InvoiceKind) -> Result<()> {
    let prefix = config.prefix_for(kind);

    let number = match &config.database_url {
        Some(url) => {
            let store = PostgresInvoiceStore::connect(url, config.max_connections)
                .await
                .context("failed to connect to Postgres")?;
            InvoiceNumberAllocator::new(store).allocate(prefix).await
        }
        None => {
            warn!("DATABASE_URL not set; numbering against an empty in-memory store");
            InvoiceNumberAllocator::new(InMemoryInvoiceStore::new())
                .allocate(prefix)
                .await
        }
    };

    info!(%kind, %number, "allocated invoice number");
    println!("{number}");
    Ok(())
}
