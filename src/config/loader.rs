//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (platform config dir, e.g. ~/.config/gitwriter/config.toml)
//! 3. Project config (.gitwriter/config.toml)
//! 4. Environment variables (GITWRITER_* prefix, `__` separates sections)

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{GitWriterError, Result};

const APP_NAME: &str = "gitwriter";
const ENV_PREFIX: &str = "GITWRITER_";
const DATABASE_FILE: &str = "gitwriter.db";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::extract(figment.merge(Self::env_provider()))
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Self::env_provider());
        Self::extract(figment)
    }

    // GITWRITER_LLM__MODEL -> llm.model, GITWRITER_BUDGET__READER_FILE_CAP -> budget.reader_file_cap
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).split("__").lowercase(true)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| GitWriterError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Global config directory
    pub fn global_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".gitwriter")
    }

    /// Database path: configured value, else the platform data directory
    pub fn database_path(config: &Config) -> Result<PathBuf> {
        if let Some(path) = &config.storage.database_path {
            return Ok(path.clone());
        }

        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .ok_or_else(|| {
                GitWriterError::Config(
                    "Cannot determine data directory; set storage.database_path".to_string(),
                )
            })
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a default config file at the global or project location.
    /// Returns the path and whether a file was written.
    pub fn init(global: bool, force: bool) -> Result<(PathBuf, bool)> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                GitWriterError::Config("Cannot determine global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        let written = Self::write_default(&path, force)?;
        Ok((path, written))
    }

    /// Write the default config to `path` unless it exists (or `force`)
    pub fn write_default(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, Self::default_config_toml())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    /// Generate default config content (TOML)
    fn default_config_toml() -> String {
        r#"# GitWriter Configuration
# Project settings in .gitwriter/config.toml override the global file.
# Environment overrides use GITWRITER_<SECTION>__<KEY>, e.g. GITWRITER_LLM__MODEL.

version = "1.0"

[github]
api_base = "https://api.github.com"
timeout_secs = 30
max_retries = 2
commit_message = "README.md added via GitWriter"
fetch_concurrency = 1

# provider = "none" always uses the heuristic extractor and template README.
# With "openai", a missing API key (config or OPENAI_API_KEY) does the same.
[llm]
provider = "openai"
model = "gpt-4"
api_base = "https://api.openai.com/v1"
timeout_secs = 120
max_tokens = 2048
preflight = false

[budget]
max_file_chars = 2000
extraction_token_ceiling = 6000
extraction_file_cap = 10
reader_token_ceiling = 5000
reader_file_cap = 50
max_blob_bytes = 102400

[storage]
# database_path = "/path/to/gitwriter.db"
"#
        .to_string()
    }
}
