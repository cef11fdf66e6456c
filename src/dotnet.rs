use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use walkdir::WalkDir;
use crate::error::InstallError;
use crate::fs::FileHandle;
use crate::installer::{PackageType, ToolPackageInstaller};
use crate::reference::{PackageReference, DOTNET_TOOL_SCHEME};

/// Installs `dotnet:?package=<id>&version=<version>` references with the .NET CLI
/// (`dotnet tool install --tool-path`).
#[derive(Debug, Clone)]
pub struct DotNetToolInstaller {
    dotnet: PathBuf,
}

impl DotNetToolInstaller {
    /// # Arguments
    /// * `dotnet` - The `dotnet` executable, either a bare name looked up on `PATH` or a full path.
    pub fn new<P: Into<PathBuf>>(dotnet: P) -> Self {
        Self { dotnet: dotnet.into() }
    }
}

impl Default for DotNetToolInstaller {
    fn default() -> Self {
        Self::new("dotnet")
    }
}

impl ToolPackageInstaller for DotNetToolInstaller {
    fn install(
        &self,
        package: &PackageReference,
        package_type: PackageType,
        path: &Path,
    ) -> Result<Vec<FileHandle>, InstallError> {
        if package_type != PackageType::Tool || !package.has_scheme(DOTNET_TOOL_SCHEME) {
            return Err(InstallError::InvalidOperation(format!(
                "dotnet tool installer cannot install '{package}' as {package_type}"
            )));
        }
        let package_id = single_parameter(package, "package")?;
        let version = single_parameter(package, "version")?;

        if find_store_directory(path, package_id, version).is_some() {
            debug!("{} {} is already installed in {}", package_id, version, path.display());
        } else {
            debug!("Running {} tool install {} --version {}", self.dotnet.display(), package_id, version);
            let output = Command::new(&self.dotnet)
                .args(["tool", "install", package_id, "--version", version, "--tool-path"])
                .arg(path)
                .output()
                .map_err(|source| InstallError::Io { path: self.dotnet.clone(), source })?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                return Err(InstallError::Package {
                    reference: package.to_string(),
                    message: if stderr.is_empty() {
                        format!("dotnet exited with {}", output.status)
                    } else {
                        stderr
                    },
                });
            }
        }
        match find_store_directory(path, package_id, version) {
            Some(store_dir) => installed_files(path, &store_dir),
            None => {
                warn!("{} {} was installed but not found in {}", package_id, version, path.display());
                Ok(Vec::new())
            }
        }
    }
}

/// Finds where `dotnet tool install --tool-path` unpacked a package:
/// `<tool path>/.store/<lower-cased id>/<normalized version>`.
///
/// Version directories are matched after normalization, so `1.0.0-Beta`
/// finds `1.0.0-beta` and `1.0` finds `1.0.0`.
fn find_store_directory(tool_path: &Path, package_id: &str, version: &str) -> Option<PathBuf> {
    let package_dir = tool_path.join(".store").join(package_id.to_lowercase());
    let wanted = normalize_version(version);
    std::fs::read_dir(&package_dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|candidate| {
            candidate.is_dir()
                && candidate
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| normalize_version(name) == wanted)
        })
}

/// NuGet-style version normalization: lower-cased, build metadata dropped,
/// at least three numeric parts, a zero fourth part removed and leading
/// zeros stripped.
fn normalize_version(version: &str) -> String {
    let version = version.trim().to_lowercase();
    let version = version.split('+').next().unwrap_or_default();
    let (release, prerelease) = match version.split_once('-') {
        Some((release, prerelease)) => (release, Some(prerelease)),
        None => (version, None),
    };
    let mut parts: Vec<String> = release
        .split('.')
        .map(|part| match part.parse::<u64>() {
            Ok(number) => number.to_string(),
            Err(_) => part.to_string(),
        })
        .collect();
    while parts.len() < 3 {
        parts.push("0".to_string());
    }
    if parts.len() == 4 && parts[3] == "0" {
        parts.pop();
    }
    let mut normalized = parts.join(".");
    if let Some(prerelease) = prerelease {
        normalized.push('-');
        normalized.push_str(prerelease);
    }
    normalized
}

fn single_parameter<'a>(package: &'a PackageReference, key: &'static str) -> Result<&'a str, InstallError> {
    match package.parameter(key) {
        Some([value]) if !value.trim().is_empty() => Ok(value.as_str()),
        Some([_]) => Err(InstallError::argument(key, format!("value of parameter '{key}' is empty"))),
        Some(_) => Err(InstallError::argument(key, format!("multiple values for parameter '{key}'"))),
        None => Err(InstallError::argument(key, format!("missing parameter '{key}' in '{package}'"))),
    }
}

/// Collects the package's files from the store, plus the launchers `dotnet`
/// placed at the root of the tool path for them.
fn installed_files(tool_path: &Path, store_dir: &Path) -> Result<Vec<FileHandle>, InstallError> {
    let mut files = Vec::new();
    let mut stems = HashSet::new();
    for entry in WalkDir::new(store_dir) {
        let entry = entry.map_err(|e| InstallError::Io {
            path: store_dir.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            if let Some(stem) = entry.path().file_stem() {
                stems.insert(stem.to_os_string());
            }
            files.push(FileHandle::new(entry.path(), true));
        }
    }

    let launchers = std::fs::read_dir(tool_path)
        .map_err(|source| InstallError::Io { path: tool_path.to_path_buf(), source })?;
    for launcher in launchers {
        let launcher = launcher.map_err(|source| InstallError::Io { path: tool_path.to_path_buf(), source })?;
        let launcher_path = launcher.path();
        let matches_store = launcher_path
            .file_stem()
            .is_some_and(|stem| stems.contains(stem));
        if launcher_path.is_file() && matches_store {
            files.push(FileHandle::new(launcher_path, true));
        }
    }
    Ok(files)
}
