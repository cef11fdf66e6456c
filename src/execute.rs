use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use localtools::config::{get_global_config_file, Config};
use localtools::dotnet::DotNetToolInstaller;
use localtools::fs::{FileSystem, LocalFileSystem, ProcessEnvironment};
use localtools::installer::{PackageInstaller, PackageType, ToolManifestPackageInstaller};
use localtools::reader::{JsonManifestReader, ManifestReader};
use localtools::reference::manifest_reference;
use crate::cli::{LocalToolsCommand, CLI};

pub fn execute(cli: CLI) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => get_global_config_file()?,
    };
    let config = Config::load(config_path)?;
    match cli.command {
        LocalToolsCommand::Install { manifest, tool_path } => {
            execute_install(&config, manifest, tool_path)
        }
        LocalToolsCommand::List { manifest } => {
            execute_list(&config, manifest)
        }
    }
}

pub fn execute_install(config: &Config, manifest: Option<PathBuf>, tool_path: Option<PathBuf>) -> Result<()> {
    let manifest = manifest.unwrap_or_else(|| config.manifest());
    let tool_path = tool_path.unwrap_or_else(|| config.tool_path());
    let reference = manifest_reference(&manifest.to_string_lossy())
        .with_context(|| format!("Cannot install tools from {}", manifest.display()))?;

    let installer = ToolManifestPackageInstaller::new(
        LocalFileSystem,
        JsonManifestReader::new(ProcessEnvironment::current()?),
        DotNetToolInstaller::new(config.dotnet()),
    );
    if !installer.can_install(&reference, PackageType::Tool) {
        bail!("Cannot install '{}'", reference);
    }
    let files = installer
        .install(&reference, PackageType::Tool, &tool_path)
        .with_context(|| format!("Failed to install tools from {}", manifest.display()))?;
    println!(
        "{} {} file(s) into {}",
        "Installed".green().bold(),
        files.len(),
        tool_path.display()
    );
    Ok(())
}

pub fn execute_list(config: &Config, manifest: Option<PathBuf>) -> Result<()> {
    let manifest_path = manifest.unwrap_or_else(|| config.manifest());
    let reader = JsonManifestReader::new(ProcessEnvironment::current()?);
    let manifest = reader
        .load(&LocalFileSystem.get_file(&manifest_path))
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;

    if manifest.is_empty() {
        println!("{}", "No tools".yellow());
        return Ok(());
    }
    let mut entries: Vec<_> = manifest.entries().collect();
    entries.sort_by_key(|entry| entry.package_id().to_lowercase());
    for entry in entries {
        println!("{}: {}", entry.package_id(), entry.version());
    }
    Ok(())
}
