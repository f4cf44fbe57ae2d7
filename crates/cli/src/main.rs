//! FinBuddy CLI
//!
//! Allocates invoice numbers, totals and saves invoice drafts, and derives GST
//! state codes.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use finbuddy_core::{InvoiceId, UserId};
use finbuddy_infra::InfraConfig;
use finbuddy_invoicing::InvoiceKind;

mod commands;

#[derive(Parser)]
#[command(name = "finbuddy")]
#[command(about = "FinBuddy GST invoice engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate the next invoice number for today
    ///
    /// Without DATABASE_URL the store is empty, so this always prints the
    /// first number of the day and only shows the number format.
    NextNumber {
        /// Invoice kind; selects the configured prefix
        #[arg(short, long, value_enum, default_value_t = KindArg::Sales)]
        kind: KindArg,

        /// Prefix to use instead of the configured one
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Recompute, validate and total an invoice draft (JSON file)
    Totals {
        /// Path to the draft
        draft: PathBuf,
    },

    /// Validate a draft (JSON file) and save it as an invoice
    ///
    /// Creates the invoice tables on first use. Without DATABASE_URL the
    /// invoice goes to an in-memory store and is lost on exit.
    Save {
        /// Path to the draft
        draft: PathBuf,

        /// Owner of the invoice (UUID); a new id is generated when omitted
        #[arg(long)]
        user: Option<UserId>,

        /// Replace this saved invoice instead of inserting a new one
        #[arg(long)]
        update: Option<InvoiceId>,
    },

    /// Show the state code a GSTIN is registered in
    StateCode {
        gstin: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Sales,
    Purchase,
}

impl From<KindArg> for InvoiceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Sales => InvoiceKind::Sales,
            KindArg::Purchase => InvoiceKind::Purchase,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        finbuddy_observability::init_with_filter("debug");
    } else {
        finbuddy_observability::init();
    }

    match cli.command {
        Commands::NextNumber { kind, prefix } => {
            let kind = InvoiceKind::from(kind);
            let mut config = InfraConfig::from_env()?;
            if let Some(prefix) = prefix {
                config = config.with_prefix(kind, &prefix)?;
            }
            commands::next_number::run(&config, kind).await?;
        }
        Commands::Totals { draft } => {
            commands::totals::run(&draft)?;
        }
        Commands::Save { draft, user, update } => {
            let config = InfraConfig::from_env()?;
            let user = user.unwrap_or_default();
            commands::save::run(&config, &draft, user, update).await?;
        }
        Commands::StateCode { gstin } => {
            commands::state_code::run(&gstin)?;
        }
    }

    Ok(())
}
