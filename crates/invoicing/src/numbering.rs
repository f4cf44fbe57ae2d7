//! Invoice numbers and the sequential allocator.
//!
//! Numbers look like `INV-240615-003`: a prefix, the issue date as `YYMMDD`
//! and a per-day sequence padded to three digits. The allocator asks the
//! store for the highest number issued today and adds one. If the store
//! cannot answer it falls back to a timestamp-derived four-digit suffix
//! (`INV-240615-4821`) so that creating an invoice is never blocked.
//!
//! Neither path guarantees uniqueness under concurrent allocation; the store's
//! unique constraint on `invoice_number` is the final arbiter (see
//! [`crate::SaveError::DuplicateInvoiceNumber`]).

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use finbuddy_core::{DomainError, ValueObject};

const SEQUENCE_WIDTH: usize = 3;
const FALLBACK_WIDTH: usize = 4;

/// `{prefix}-{YYMMDD}`: the part shared by every number issued on `date`.
pub fn date_pattern(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}", date.format("%y%m%d"))
}

/// A parsed invoice number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    prefix: String,
    date: String,
    suffix: String,
}

impl ValueObject for InvoiceNumber {}

impl InvoiceNumber {
    /// `{prefix}-{YYMMDD}-{NNN}`; sequences above 999 simply get wider.
    pub fn sequential(prefix: &str, date: NaiveDate, sequence: u64) -> Self {
        Self {
            prefix: prefix.to_string(),
            date: date.format("%y%m%d").to_string(),
            suffix: format!("{:0width$}", sequence, width = SEQUENCE_WIDTH),
        }
    }

    /// Timestamp-derived number used when the store cannot be queried.
    ///
    /// The suffix is `(epoch_millis mod 1_000_000) / 100`, i.e. it changes
    /// every 100ms and repeats every 100s. Two fallback allocations in the
    /// same 100ms bucket collide.
    pub fn fallback(prefix: &str, now: DateTime<FixedOffset>) -> Self {
        let bucket = now.timestamp_millis().rem_euclid(1_000_000) / 100;
        Self {
            prefix: prefix.to_string(),
            date: now.date_naive().format("%y%m%d").to_string(),
            suffix: format!("{:0width$}", bucket, width = FALLBACK_WIDTH),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The `YYMMDD` segment.
    pub fn date_digits(&self) -> &str {
        &self.date
    }

    /// The sequence (or fallback timestamp) segment.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.prefix, self.date, self.suffix)
    }
}

impl FromStr for InvoiceNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_id(format!("invoice number {s:?}"));

        let mut parts = s.rsplitn(3, '-');
        let suffix = parts.next().ok_or_else(invalid)?;
        let date = parts.next().ok_or_else(invalid)?;
        let prefix = parts.next().ok_or_else(invalid)?;

        let all_digits = |v: &str| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit());
        if prefix.is_empty()
            || date.len() != 6
            || !all_digits(date)
            || suffix.len() < SEQUENCE_WIDTH
            || !all_digits(suffix)
        {
            return Err(invalid());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            date: date.to_string(),
            suffix: suffix.to_string(),
        })
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(value: InvoiceNumber) -> Self {
        value.to_string()
    }
}

/// Source of "now" for numbering; swapped for [`FixedClock`] in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Failure of the numbering query. The allocator never surfaces it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberingStoreError {
    #[error("invoice number query failed: {0}")]
    Query(String),

    #[error("invoice store unavailable: {0}")]
    Unavailable(String),
}

/// Read side of the invoice store used by the allocator.
#[async_trait]
pub trait InvoiceNumberSource: Send + Sync {
    /// Greatest existing `invoice_number` starting with `pattern`
    /// (lexicographic, descending, limit 1), or `None` if there is none.
    async fn latest_with_prefix(&self, pattern: &str) -> Result<Option<String>, NumberingStoreError>;
}

#[async_trait]
impl<S> InvoiceNumberSource for Arc<S>
where
    S: InvoiceNumberSource + ?Sized,
{
    async fn latest_with_prefix(&self, pattern: &str) -> Result<Option<String>, NumberingStoreError> {
        (**self).latest_with_prefix(pattern).await
    }
}

/// Sequence following `latest`: the leading digits right after
/// `{pattern}-` plus one, or 1 when there is no usable previous number.
///
/// Reading after the pattern keeps dashed prefixes (`SALES-NORTH`) working;
/// for a dash-free prefix this is the third dash-separated segment.
fn next_sequence(latest: Option<&str>, pattern: &str) -> u64 {
    latest
        .and_then(|number| number.strip_prefix(pattern))
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(leading_digits)
        .map(|last| last.saturating_add(1))
        .unwrap_or(1)
}

/// Leading ASCII digits of `segment`; a run too long for `u64` saturates.
fn leading_digits(segment: &str) -> Option<u64> {
    let segment = segment.trim_start();
    let end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    let digits = &segment[..end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Allocates the next invoice number for a prefix. Never fails.
pub struct InvoiceNumberAllocator<S, C = SystemClock> {
    source: S,
    clock: C,
}

impl<S> InvoiceNumberAllocator<S, SystemClock>
where
    S: InvoiceNumberSource,
{
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S, C> InvoiceNumberAllocator<S, C>
where
    S: InvoiceNumberSource,
    C: Clock,
{
    pub fn with_clock(source: S, clock: C) -> Self {
        Self { source, clock }
    }

    /// Next number for `prefix` on today's date.
    ///
    /// One store query, no retries. A query error switches to
    /// [`InvoiceNumber::fallback`].
    #[instrument(skip(self))]
    pub async fn allocate(&self, prefix: &str) -> InvoiceNumber {
        let now = self.clock.now();
        let date = now.date_naive();
        let pattern = date_pattern(prefix, date);

        match self.source.latest_with_prefix(&pattern).await {
            Ok(latest) => {
                let latest = latest.filter(|n| n.starts_with(&pattern));
                let sequence = next_sequence(latest.as_deref(), &pattern);
                let number = InvoiceNumber::sequential(prefix, date, sequence);
                debug!(previous = ?latest, %number, "allocated sequential invoice number");
                number
            }
            Err(err) => {
                let number = InvoiceNumber::fallback(prefix, now);
                warn!(error = %err, %number, "invoice number query failed; using timestamp fallback");
                number
            }
        }
    }
}
