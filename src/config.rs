//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/docdb.sqlite"
//!
//! [admin]
//! password_env = "BYPASS_SETTINGS_RESTRICTIONS_PASSWORD"
//!
//! [session]
//! default_user = "google-oauth2|1234abcdef"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use docdb_core::naming;
use docdb_core::AdminConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub admin: AdminSettings,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminSettings {
    /// Environment variable holding the admin password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            password_env: default_password_env(),
        }
    }
}

fn default_password_env() -> String {
    "BYPASS_SETTINGS_RESTRICTIONS_PASSWORD".to_string()
}

impl AdminSettings {
    /// Look the admin password up once.
    pub fn resolve(&self) -> AdminConfig {
        AdminConfig::from_env(&self.password_env)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SessionConfig {
    /// User id for commands run without `--user`. Unset means console mode.
    #[serde(default)]
    pub default_user: Option<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.admin.password_env.trim().is_empty() {
        anyhow::bail!("admin.password_env must not be empty");
    }

    if let Some(user) = &config.session.default_user {
        if naming::user_id_suffix(user).is_none() {
            anyhow::bail!(
                "session.default_user must be at least {} characters",
                naming::USER_ID_SUFFIX_LENGTH
            );
        }
    }

    Ok(config)
}
