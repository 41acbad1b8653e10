// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Consulta booking engine.
//!
//! TOML files with strict key checking, an XDG lookup hierarchy,
//! `CONSULTA_` environment overrides, and miette diagnostics with typo
//! suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use consulta_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("bot replies before abandon: {}", config.conversation.max_bot_responses);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ConfirmationMode, ConsultaConfig};

/// Load configuration from the file hierarchy and validate it.
///
/// Figment errors are turned into diagnostics that point into the TOML file
/// they came from.
pub fn load_and_validate() -> Result<ConsultaConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<ConsultaConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ConsultaConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Read every config file that exists, keyed by the path figment reports.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_candidates()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // Figment records relative files by their absolute path.
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(&path))
                    .unwrap_or(path)
            } else {
                path
            };
            Some((shown.display().to_string(), content))
        })
        .collect()
}
