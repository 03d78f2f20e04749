//! CLI Init Command
//!
//! Writes a starter config file with every default spelled out.

use std::path::Path;

use addonforge_config::{apply_all_defaults, write_config, AddonConfig, AddonForgeConfig};
use anyhow::{bail, Result};

use crate::terminal_output::note_success;

pub async fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let config = apply_all_defaults(AddonForgeConfig {
        addon: Some(AddonConfig {
            id: "my-addon@example.com".to_string(),
            install_url: "https://example.com/my-addon.xpi".to_string(),
        }),
        ..Default::default()
    });
    write_config(&config, path).await?;
    note_success(&format!("Wrote {}", path.display()));
    Ok(())
}
