//! GST identifiers: GSTIN, state codes and HSN codes.
//!
//! Drafts carry these as raw strings (what the user typed). The types below
//! are the validated forms, used by the validation layer and for deriving a
//! state code from a GSTIN.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use finbuddy_core::{DomainError, ValueObject};

pub const GSTIN_LEN: usize = 15;
pub const STATE_CODE_LEN: usize = 2;
pub const HSN_CODE_LEN: usize = 8;

/// Two-character GST state code (e.g. `27` for Maharashtra).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

/// 15-character GST taxpayer identification number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

/// 8-character Harmonized System of Nomenclature code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HsnCode(String);

macro_rules! impl_fixed_len_code {
    ($t:ident, $len:expr, $name:literal) => {
        impl $t {
            pub fn parse(raw: &str) -> Result<Self, DomainError> {
                let value = raw.trim();
                if value.chars().count() != $len {
                    return Err(DomainError::invalid_id(format!(
                        "{} must be {} characters, got {:?}",
                        $name, $len, value
                    )));
                }
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ValueObject for $t {}

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_fixed_len_code!(StateCode, STATE_CODE_LEN, "state code");
impl_fixed_len_code!(Gstin, GSTIN_LEN, "GSTIN");
impl_fixed_len_code!(HsnCode, HSN_CODE_LEN, "HSN code");

impl Gstin {
    /// The state a GSTIN is registered in: its first two characters.
    pub fn state_code(&self) -> StateCode {
        StateCode(self.0.chars().take(STATE_CODE_LEN).collect())
    }
}

/// State code to write after a GSTIN edit, if any.
///
/// Returns the GSTIN's first two characters once it has at least two, and
/// only when they differ from `current_state_code`. A partial GSTIN is enough;
/// the derived code is not checked against the list of real states.
pub fn derive_state_code(gstin: &str, current_state_code: &str) -> Option<String> {
    let gstin = gstin.trim();
    if gstin.chars().count() < STATE_CODE_LEN {
        return None;
    }
    let code: String = gstin.chars().take(STATE_CODE_LEN).collect();
    (code != current_state_code).then_some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gstin_yields_its_state_code() {
        let gstin: Gstin = "27AAPFU0939F1ZV".parse().unwrap();
        assert_eq!(gstin.state_code().as_str(), "27");
    }

    #[test]
    fn wrong_length_codes_are_rejected() {
        assert!(Gstin::parse("27AAPFU0939F1Z").is_err());
        assert!(HsnCode::parse("1234567").is_err());
        assert!(HsnCode::parse("12345678").is_ok());
        assert!(StateCode::parse("270").is_err());
    }

    #[test]
    fn serde_rejects_invalid_gstin() {
        let ok: Result<Gstin, _> = serde_json::from_str("\"29ABCDE1234F1Z5\"");
        assert!(ok.is_ok());
        let bad: Result<Gstin, _> = serde_json::from_str("\"29ABC\"");
        assert!(bad.is_err());
    }

    #[test]
    fn derive_needs_two_characters() {
        assert_eq!(derive_state_code("", ""), None);
        assert_eq!(derive_state_code("2", ""), None);
        assert_eq!(derive_state_code("29", ""), Some("29".to_string()));
        assert_eq!(derive_state_code("29ABCDE", "27"), Some("29".to_string()));
    }

    #[test]
    fn derive_skips_unchanged_state_code() {
        assert_eq!(derive_state_code("27AAPFU0939F1ZV", "27"), None);
    }
}
