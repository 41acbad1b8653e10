// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./consulta.toml` > `~/.config/consulta/consulta.toml` >
//! `/etc/consulta/consulta.toml`, with `CONSULTA_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use tracing::debug;

use crate::model::ConsultaConfig;

/// Config file name looked up in every directory of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "consulta.toml";

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/consulta/consulta.toml";

/// Top-level sections, used to split `CONSULTA_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "gemini",
    "conversation",
    "booking",
    "nlu",
    "moderation",
];

/// The user's XDG config file, if a config dir exists on this platform.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("consulta").join(CONFIG_FILE_NAME))
}

/// Every file the loader reads, lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    paths.extend(user_config_path());
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Build the full layered Figment (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ConsultaConfig::default()));
    for path in config_file_candidates() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the file hierarchy with env var overrides.
pub fn load_config() -> Result<ConsultaConfig, figment::Error> {
    let config: ConsultaConfig = build_figment().extract()?;
    debug!(database = %config.storage.database_path, "configuration loaded");
    Ok(config)
}

/// Load configuration from an inline TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ConsultaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConsultaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConsultaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConsultaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps `CONSULTA_BOOKING_MAX_OPTIONS` to `booking.max_options`.
///
/// Only the section prefix is split, so keys that contain underscores survive
/// intact. Variables naming no known section are passed through unchanged and
/// rejected by `deny_unknown_fields`.
fn env_provider() -> Env {
    Env::prefixed("CONSULTA_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
            && !rest.is_empty()
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
