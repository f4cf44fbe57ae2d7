//! Environment configuration for the store adapters.

use thiserror::Error;

use finbuddy_invoicing::InvoiceKind;

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "FINBUDDY_DB_MAX_CONNECTIONS";
pub const SALES_PREFIX: &str = "FINBUDDY_SALES_PREFIX";
pub const PURCHASE_PREFIX: &str = "FINBUDDY_PURCHASE_PREFIX";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must not be blank")]
    Blank { key: &'static str },
}

/// Settings read once at startup.
///
/// Without a `DATABASE_URL` the in-memory store is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub sales_prefix: String,
    pub purchase_prefix: String,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            sales_prefix: InvoiceKind::Sales.number_prefix().to_string(),
            purchase_prefix: InvoiceKind::Purchase.number_prefix().to_string(),
        }
    }
}

impl InfraConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; unset or empty keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_connections = match get(DB_MAX_CONNECTIONS) {
            None => defaults.max_connections,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: DB_MAX_CONNECTIONS,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            database_url: get(DATABASE_URL),
            max_connections,
            sales_prefix: get(SALES_PREFIX).unwrap_or(defaults.sales_prefix),
            purchase_prefix: get(PURCHASE_PREFIX).unwrap_or(defaults.purchase_prefix),
        })
    }

    /// Prefix override for `--prefix`; a blank override is rejected.
    pub fn with_prefix(mut self, kind: InvoiceKind, prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Blank {
                key: match kind {
                    InvoiceKind::Sales => SALES_PREFIX,
                    InvoiceKind::Purchase => PURCHASE_PREFIX,
                },
            });
        }
        match kind {
            InvoiceKind::Sales => self.sales_prefix = prefix.to_string(),
            InvoiceKind::Purchase => self.purchase_prefix = prefix.to_string(),
        }
        Ok(self)
    }

    pub fn prefix_for(&self, kind: InvoiceKind) -> &str {
        match kind {
            InvoiceKind::Sales => &self.sales_prefix,
            InvoiceKind::Purchase => &self.purchase_prefix,
        }
    }
}
