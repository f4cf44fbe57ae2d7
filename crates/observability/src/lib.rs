//! Process-wide logging setup.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, init, init_with_filter};
