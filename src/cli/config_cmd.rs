//! Configuration commands.

use anyhow::Context;

use crate::config::Settings;

/// Print the effective settings (file + env) as TOML. The API key is never shown.
pub fn cmd_config_show(settings: &Settings) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    print!("{}", text);
    Ok(())
}
