//! `finchat config`

use crate::server::config::{Credentials, REQUIRED_ENV_VARS};
use crate::server::load_config;
use anyhow::{Context, Result};
use serde_json::json;

/// Print the layered configuration and masked credentials
pub fn run() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;

    let credentials = match Credentials::from_env() {
        Ok(creds) => serde_json::to_value(creds.masked())?,
        Err(e) => json!({ "error": e.to_string(), "required": REQUIRED_ENV_VARS }),
    };

    let view = json!({
        "config": config,
        "credentials": credentials,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
