//! Postgres-backed invoice store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | Result | Scenario |
//! |------------|-----------------|--------|----------|
//! | Database (unique violation on `invoices_invoice_number_key`) | `23505` | `SaveError::DuplicateInvoiceNumber` | Number already issued |
//! | Database (other) | Any other | `SaveError::Store` | Check/foreign key violations etc. |
//! | PoolClosed / Io / other | N/A | `SaveError::Store` or `NumberingStoreError::Unavailable` | Connection failures |
//!
//! The numbering query never fails the caller: the allocator turns
//! `NumberingStoreError` into a fallback number.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{instrument, warn};

use finbuddy_core::InvoiceId;
use finbuddy_invoicing::{
    INVOICE_NUMBER_CONSTRAINT, InvoiceLineItem, InvoiceNumberSource, InvoiceRepository,
    InvoiceSubmission, NumberingStoreError, SaveError,
};

const SCHEMA: &str = include_str!("../../migrations/0001_create_invoices.sql");

/// Invoice store over the `invoices` and `invoice_items` tables.
///
/// Insert and update write the header and all line items in one transaction;
/// the unique constraint on `invoice_number` is the only guard against two
/// drafts claiming the same number.
#[derive(Debug, Clone)]
pub struct PostgresInvoiceStore {
    pool: Arc<PgPool>,
}

impl PostgresInvoiceStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&*self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl InvoiceNumberSource for PostgresInvoiceStore {
    #[instrument(skip(self))]
    async fn latest_with_prefix(&self, pattern: &str) -> Result<Option<String>, NumberingStoreError> {
        let row = sqlx::query(
            r#"
            SELECT invoice_number
            FROM invoices
            WHERE invoice_number LIKE $1 ESCAPE '\'
            ORDER BY invoice_number DESC
            LIMIT 1
            "#,
        )
        .bind(format!("{}%", escape_like(pattern)))
        .fetch_optional(&*self.pool)
        .await
        .map_err(map_query_error)?;

        row.map(|r| r.try_get::<String, _>("invoice_number"))
            .transpose()
            .map_err(map_query_error)
    }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceStore {
    #[instrument(skip(self, submission), fields(invoice_number = %submission.invoice_number), err)]
    async fn insert(&self, submission: &InvoiceSubmission) -> Result<InvoiceId, SaveError> {
        let number = submission.invoice_number.as_str();
        let id = InvoiceId::new();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(number, "begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, user_id, invoice_number, invoice_type, document_type_code,
                document_date, preceding_invoice_reference,
                supplier_name, supplier_gstin, supplier_address, supplier_place,
                supplier_state_code, supplier_pincode,
                recipient_name, recipient_gstin, recipient_address, recipient_place,
                recipient_state_code, recipient_pincode,
                total_invoice_value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*submission.user_id.as_uuid())
        .bind(number)
        .bind(submission.invoice_type.to_string())
        .bind(submission.document_type_code.code())
        .bind(submission.document_date)
        .bind(submission.preceding_invoice_reference.as_deref())
        .bind(optional(&submission.supplier.name))
        .bind(optional(&submission.supplier.gstin))
        .bind(optional(&submission.supplier.address))
        .bind(optional(&submission.supplier.place))
        .bind(optional(&submission.supplier.state_code))
        .bind(optional(&submission.supplier.pincode))
        .bind(&submission.recipient.name)
        .bind(&submission.recipient.gstin)
        .bind(&submission.recipient.address)
        .bind(optional(&submission.recipient.place))
        .bind(&submission.recipient.state_code)
        .bind(&submission.recipient.pincode)
        .bind(submission.total_invoice_value)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(number, "insert_invoice", e))?;

        insert_items(&mut tx, id, number, &submission.items).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(number, "commit_transaction", e))?;
        Ok(id)
    }

    #[instrument(skip(self, submission), fields(invoice_id = %id, invoice_number = %submission.invoice_number), err)]
    async fn update(&self, id: InvoiceId, submission: &InvoiceSubmission) -> Result<(), SaveError> {
        let number = submission.invoice_number.as_str();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(number, "begin_transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices SET
                invoice_number = $2,
                invoice_type = $3,
                document_type_code = $4,
                document_date = $5,
                preceding_invoice_reference = $6,
                supplier_name = $7,
                supplier_gstin = $8,
                supplier_address = $9,
                supplier_place = $10,
                supplier_state_code = $11,
                supplier_pincode = $12,
                recipient_name = $13,
                recipient_gstin = $14,
                recipient_address = $15,
                recipient_place = $16,
                recipient_state_code = $17,
                recipient_pincode = $18,
                total_invoice_value = $19
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(number)
        .bind(submission.invoice_type.to_string())
        .bind(submission.document_type_code.code())
        .bind(submission.document_date)
        .bind(submission.preceding_invoice_reference.as_deref())
        .bind(optional(&submission.supplier.name))
        .bind(optional(&submission.supplier.gstin))
        .bind(optional(&submission.supplier.address))
        .bind(optional(&submission.supplier.place))
        .bind(optional(&submission.supplier.state_code))
        .bind(optional(&submission.supplier.pincode))
        .bind(&submission.recipient.name)
        .bind(&submission.recipient.gstin)
        .bind(&submission.recipient.address)
        .bind(optional(&submission.recipient.place))
        .bind(&submission.recipient.state_code)
        .bind(&submission.recipient.pincode)
        .bind(submission.total_invoice_value)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error(number, "update_invoice", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error(number, "rollback", e))?;
            return Err(SaveError::NotFound(id));
        }

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(number, "delete_items", e))?;

        insert_items(&mut tx, id, number, &submission.items).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(number, "commit_transaction", e))?;
        Ok(())
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    id: InvoiceId,
    number: &str,
    items: &[InvoiceLineItem],
) -> Result<(), SaveError> {
    for (line_no, item) in items.iter().enumerate() {
        let line_no = i32::try_from(line_no + 1)
            .map_err(|_| SaveError::Store(format!("too many line items on {number}")))?;

        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                invoice_id, line_no, item_description, hsn_code, item_price,
                quantity, discount_percentage, assessable_value, gst_rate,
                igst_value, cgst_value, sgst_value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(line_no)
        .bind(&item.item_description)
        .bind(&item.hsn_code)
        .bind(item.item_price)
        .bind(item.quantity)
        .bind(item.discount_percentage)
        .bind(item.assessable_value)
        .bind(item.gst_rate)
        .bind(item.igst_value)
        .bind(item.cgst_value)
        .bind(item.sgst_value)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error(number, "insert_item", e))?;
    }
    Ok(())
}

/// Optional supplier/recipient columns are stored as NULL when left empty.
fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Map SQLx errors on the write path to `SaveError`.
fn map_sqlx_error(invoice_number: &str, operation: &str, err: sqlx::Error) -> SaveError {
    match err {
        sqlx::Error::Database(db_err) => {
            let duplicate_number = db_err.code().is_some_and(|code| code.as_ref() == "23505")
                && db_err.constraint() == Some(INVOICE_NUMBER_CONSTRAINT);
            if duplicate_number {
                return SaveError::DuplicateInvoiceNumber {
                    invoice_number: invoice_number.to_string(),
                };
            }
            SaveError::from_store_message(
                invoice_number,
                &format!("database error in {}: {}", operation, db_err.message()),
            )
        }
        sqlx::Error::PoolClosed => SaveError::Store(format!("connection pool closed in {}", operation)),
        _ => SaveError::Store(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn map_query_error(err: sqlx::Error) -> NumberingStoreError {
    warn!(error = %err, "invoice number query failed");
    match err {
        sqlx::Error::Database(db_err) => NumberingStoreError::Query(db_err.message().to_string()),
        other => NumberingStoreError::Unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("INV-240615"), "INV-240615");
        assert_eq!(escape_like("A_B%C\\D"), "A\\_B\\%C\\\\D");
    }

    #[test]
    fn blank_optional_columns_become_null() {
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" Pune "), Some("Pune"));
    }

    #[test]
    fn pool_closed_is_a_store_error() {
        let err = map_sqlx_error("INV-240615-001", "insert_invoice", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            SaveError::Store("connection pool closed in insert_invoice".to_string())
        );
        assert!(!err.is_duplicate_number());
    }

    #[test]
    fn schema_declares_number_constraint() {
        assert!(SCHEMA.contains(INVOICE_NUMBER_CONSTRAINT));
    }

    #[test]
    fn unavailable_store_is_reported_to_allocator() {
        assert!(matches!(
            map_query_error(sqlx::Error::PoolClosed),
            NumberingStoreError::Unavailable(_)
        ));
    }
}
