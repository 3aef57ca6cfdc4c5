use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::debug;
use rocket::figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{HasherConfig, NotesError, Result};

/// Prefix of environment variables overriding configuration keys.
pub const CONFIG_ENV_PREFIX: &str = "SLUGNOTES_";

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding notes and the users file
    pub data_dir: PathBuf,

    /// Whether to keep notes and users on disk; otherwise they live in memory
    pub persist: bool,

    /// Where anonymous visitors of protected pages are sent
    pub login_url: String,

    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count
    pub argon2_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("org", "slugnotes", "slugnotes")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".slugnotes"));

        Config {
            data_dir,
            persist: true,
            login_url: "/auth/login".to_string(),
            argon2_memory_kib: argon2::Params::DEFAULT_M_COST,
            argon2_iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

impl Config {
    /// Builds the layered configuration: rocket's own sources, our defaults,
    /// the optional TOML file, then `SLUGNOTES_` environment variables.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment =
            rocket::Config::figment().merge(Serialized::defaults(Config::default()));
        if let Some(file) = config_file {
            debug!("Reading configuration from {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(CONFIG_ENV_PREFIX).global())
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment.extract().map_err(|e| NotesError::ConfigError {
            message: e.to_string(),
        })
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.data_dir.join("notes")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn hasher(&self) -> HasherConfig {
        HasherConfig {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
        }
    }
}
