//! Config Command
//!
//! Usage:
//!   gitwriter config show [-f toml|json]
//!   gitwriter config path
//!   gitwriter config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{GitWriterError, Result};

/// Print the merged effective configuration (API key omitted)
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&config)?,
        "toml" => toml::to_string_pretty(&config)
            .map_err(|e| GitWriterError::Config(format!("Failed to render config: {}", e)))?,
        other => {
            return Err(GitWriterError::InvalidInput(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    };
    println!("{}", rendered);
    Ok(())
}

/// Print where configuration and data live
pub fn path() -> Result<()> {
    let out = Output::new();
    out.section("Configuration paths");

    match ConfigLoader::global_config_path() {
        Some(global) => out.field("Global", describe(&global)),
        None => out.field("Global", "(no config directory on this platform)"),
    }
    out.field("Project", describe(&ConfigLoader::project_config_path()));

    let config = ConfigLoader::load()?;
    out.field("Database", ConfigLoader::database_path(&config)?.display());
    Ok(())
}

fn describe(path: &std::path::Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

/// Write a default config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let (path, written) = ConfigLoader::init(global, force)?;

    if written {
        out.success(&format!("Created {}", path.display()));
    } else {
        out.warning(&format!(
            "{} already exists; use --force to overwrite",
            path.display()
        ));
    }
    Ok(())
}
