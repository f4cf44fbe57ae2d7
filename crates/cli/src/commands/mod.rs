//! Subcommand implementations.

pub mod next_number;
pub mod save;
pub mod state_code;
pub mod totals;
