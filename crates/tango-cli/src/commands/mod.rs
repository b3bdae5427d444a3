pub mod drill;
pub mod init;
pub mod stats;
pub mod validate;

use anyhow::Result;

use tango_core::Level;

use crate::config::TangoConfig;

/// Level from the command line, falling back to the config.
fn resolve_level(flag: Option<&str>, config: &TangoConfig) -> Result<Level> {
    match flag {
        Some(s) => s.parse::<Level>().map_err(|e| anyhow::anyhow!("{e}")),
        None => config.level(),
    }
}
