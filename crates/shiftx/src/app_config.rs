//! 🔧 App Configuration - the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." - every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

use crate::backends::{HttpSourceConfig, SqliteSinkConfig};

/// 🏷️ Every env var we read starts with this. Nested keys split on `__`.
pub const ENV_PREFIX: &str = "SHIFTX_";

/// 📦 The AppConfig: where the pages come from, and where the rows go.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 📡 The rostering API and how patiently to talk to it.
    pub source_config: HttpSourceConfig,
    /// 🗄️ The SQLite store.
    pub sink_config: SqliteSinkConfig,
}

/// 🚀 Load the config from `SHIFTX_*` env vars, plus a TOML file if one was given.
///
/// 📐 The rules, no surprises:
///   - `config_file_name` is None → env vars only. No implicit `config.toml` fallback.
///   - `config_file_name` is Some → env vars + TOML, merged. TOML wins on conflicts.
///
/// Env keys map to nested fields with a double underscore:
/// `SHIFTX_SOURCE_CONFIG__URL`, `SHIFTX_SINK_CONFIG__DB_PATH`, and so on.
///
/// 💀 Returns an error if the config is unparseable or incomplete, with a message that says
/// where we looked.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    extract_from(Figment::new().merge(Env::prefixed(ENV_PREFIX).split("__")), config_file_name)
}

// -- split out so tests can hand in a figment without touching the process environment
fn extract_from(base: Figment, config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match config_file_name {
        Some(file_name) => base.merge(Toml::file(file_name)),
        None => base,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables ({ENV_PREFIX}*). \
             The file exists in our hearts, but apparently not on disk (or not in this shape).",
            path.display()
        ),
        None => format!(
            "💀 Failed to parse configuration from environment variables ({ENV_PREFIX}*). \
             No file was provided, this one's all on the environment. Classic."
        ),
    };

    config.extract().context(context_msg)
}
