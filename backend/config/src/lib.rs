//! `addonforge-config`: configuration for AddonForge.
//!
//! Provides:
//! - Typed config schema (add-on, event types, logging, simulated host)
//! - YAML read/write
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{AddonConfig, AddonForgeConfig, EventsConfig, FailAt, LoggingConfig, SimulationConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};

/// Load, substitute env vars, apply defaults, and validate a config file.
///
/// The validation report is returned rather than logged so the caller can
/// report it once logging is set up and decide whether errors are fatal.
pub async fn load_and_prepare(
    path: &std::path::Path,
) -> Result<(AddonForgeConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: AddonForgeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}
