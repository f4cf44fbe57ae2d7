//! State-code command - derive the registration state from a GSTIN

use anyhow::{Result, bail};

use finbuddy_tax::{Gstin, derive_state_code};

pub fn run(gstin: &str) -> Result<()> {
    println!("{}", state_code(gstin)?);
    Ok(())
}

/// A full GSTIN is parsed; a partial one still yields its first two characters.
fn state_code(gstin: &str) -> Result<String> {
    if let Ok(gstin) = Gstin::parse(gstin) {
        return Ok(gstin.state_code().to_string());
    }
    match derive_state_code(gstin, "") {
        Some(code) => {
            tracing::warn!(gstin = gstin.trim(), "GSTIN is not 15 characters");
            Ok(code)
        }
        None => bail!("GSTIN {:?} is too short to carry a state code", gstin.trim()),
    }
}
