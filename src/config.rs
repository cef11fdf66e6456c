use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

/// Default location of the local tool manifest, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = ".config/dotnet-tools.json";
/// Default directory tools are installed into.
pub const DEFAULT_TOOL_PATH: &str = "tools";

/// User configuration, read from `config.toml`.
///
/// Every key is optional; command line flags take precedence over it.
#[derive(Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the tool manifest to use when none is given.
    pub manifest: Option<PathBuf>,
    /// Directory tools are installed into.
    pub tool_path: Option<PathBuf>,
    /// The `dotnet` executable.
    pub dotnet: Option<PathBuf>,
}

impl Config {
    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    /// Returns an error if the file exists but can't be read or is not valid TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
    pub fn manifest(&self) -> PathBuf {
        self.manifest.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST))
    }
    pub fn tool_path(&self) -> PathBuf {
        self.tool_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL_PATH))
    }
    pub fn dotnet(&self) -> PathBuf {
        self.dotnet.clone().unwrap_or_else(|| PathBuf::from("dotnet"))
    }
}

/// Returns the per-user configuration directory, e.g. `~/.config/localtools` on Linux.
pub fn get_global_config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "localtools", "localtools")
        .ok_or_else(|| anyhow!("Could not get project directories"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Returns the path of the per-user `config.toml`.
pub fn get_global_config_file() -> Result<PathBuf> {
    Ok(get_global_config_dir()?.join("config.toml"))
}
