//! Totals command - recompute a draft and print its tax totals

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use finbuddy_invoicing::{
    DraftEdit, FieldError, InvoiceDraft, InvoiceLineItem, InvoiceTotals, validate_draft,
};
use finbuddy_tax::{TaxRegime, format_inr};

#[derive(Debug, Serialize)]
struct FormattedTotals {
    assessable_value: String,
    igst: String,
    cgst: String,
    sgst: String,
    total_tax: String,
    total_value: String,
}

impl From<&InvoiceTotals> for FormattedTotals {
    fn from(totals: &InvoiceTotals) -> Self {
        Self {
            assessable_value: format_inr(totals.total_assessable_value),
            igst: format_inr(totals.total_igst),
            cgst: format_inr(totals.total_cgst),
            sgst: format_inr(totals.total_sgst),
            total_tax: format_inr(totals.total_tax()),
            total_value: format_inr(totals.total_value),
        }
    }
}

#[derive(Debug, Serialize)]
struct TotalsReport {
    invoice_number: String,
    regime: TaxRegime,
    items: Vec<InvoiceLineItem>,
    totals: InvoiceTotals,
    formatted: FormattedTotals,
    errors: Vec<FieldError>,
}

pub fn run(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = report(&raw)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.errors.is_empty() {
        bail!("draft has {} invalid field(s)", report.errors.len());
    }
    Ok(())
}

fn report(raw: &str) -> Result<TotalsReport> {
    let draft: InvoiceDraft = serde_json::from_str(raw).context("invalid draft JSON")?;
    let draft = draft.apply(DraftEdit::RecomputeAll)?;

    let totals = draft.totals();
    let errors = validate_draft(&draft).err().map(|e| e.0).unwrap_or_default();

    Ok(TotalsReport {
        invoice_number: draft.invoice_number().to_string(),
        regime: draft.regime(),
        items: draft.items().to_vec(),
        formatted: FormattedTotals::from(&totals),
        totals,
        errors,
    })
}
