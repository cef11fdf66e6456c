use std::fmt;
use std::path::Path;
use tracing::{debug, info};
use crate::error::InstallError;
use crate::fs::{FileHandle, FileSystem};
use crate::reader::ManifestReader;
use crate::reference::{PackageReference, TOOL_MANIFEST_SCHEME};

/// The kind of package a host asks to install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageType {
    Unspecified,
    Addin,
    Tool,
    Module,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageType::Unspecified => "Unspecified",
            PackageType::Addin => "Addin",
            PackageType::Tool => "Tool",
            PackageType::Module => "Module",
        };
        f.write_str(name)
    }
}

/// An installer a host can select for a package reference.
pub trait PackageInstaller {
    /// Whether this installer handles `package` of the given type.
    fn can_install(&self, package: &PackageReference, package_type: PackageType) -> bool;

    /// Installs `package` into `path` and returns the files it produced.
    fn install(
        &self,
        package: &PackageReference,
        package_type: PackageType,
        path: &Path,
    ) -> Result<Vec<FileHandle>, InstallError>;
}

/// Installs a single `dotnet:` tool reference. Used as the delegate of
/// [`ToolManifestPackageInstaller`].
pub trait ToolPackageInstaller {
    fn install(
        &self,
        package: &PackageReference,
        package_type: PackageType,
        path: &Path,
    ) -> Result<Vec<FileHandle>, InstallError>;
}

impl<T: ToolPackageInstaller + ?Sized> ToolPackageInstaller for &T {
    fn install(
        &self,
        package: &PackageReference,
        package_type: PackageType,
        path: &Path,
    ) -> Result<Vec<FileHandle>, InstallError> {
        (**self).install(package, package_type, path)
    }
}

/// Installs every tool listed in a local tool manifest.
///
/// Handles `toolmanifest:?package=<path to dotnet-tools.json>` references. Each
/// manifest entry is converted to a `dotnet:` reference and handed to the
/// delegate, one after the other. The first failing entry aborts the install.
pub struct ToolManifestPackageInstaller<F, R, D> {
    file_system: F,
    reader: R,
    delegate: D,
}

impl<F, R, D> ToolManifestPackageInstaller<F, R, D>
where
    F: FileSystem,
    R: ManifestReader,
    D: ToolPackageInstaller,
{
    pub fn new(file_system: F, reader: R, delegate: D) -> Self {
        Self {
            file_system,
            reader,
            delegate,
        }
    }

    fn manifest_file(&self, package: &PackageReference) -> Result<FileHandle, InstallError> {
        let value = match package.parameter("package") {
            None => {
                return Err(InstallError::argument(
                    "package",
                    "no tool manifest path specified, expected as parameter 'package'",
                ));
            }
            Some([value]) => value,
            Some(_) => {
                return Err(InstallError::argument(
                    "package",
                    "multiple values for parameter 'package' in tool manifest reference",
                ));
            }
        };
        if value.trim().is_empty() {
            return Err(InstallError::argument("package", "value of parameter 'package' is empty"));
        }

        let file = self.file_system.get_file(Path::new(value));
        if !file.exists() {
            return Err(InstallError::NotFound { path: file.path().to_path_buf() });
        }
        Ok(file)
    }
}

impl<F, R, D> PackageInstaller for ToolManifestPackageInstaller<F, R, D>
where
    F: FileSystem,
    R: ManifestReader,
    D: ToolPackageInstaller,
{
    fn can_install(&self, package: &PackageReference, package_type: PackageType) -> bool {
        package_type == PackageType::Tool && package.has_scheme(TOOL_MANIFEST_SCHEME)
    }

    fn install(
        &self,
        package: &PackageReference,
        package_type: PackageType,
        path: &Path,
    ) -> Result<Vec<FileHandle>, InstallError> {
        if package_type != PackageType::Tool {
            return Err(InstallError::InvalidOperation(format!(
                "tool manifest installer cannot install packages of type '{package_type}'"
            )));
        }
        if !package.has_scheme(TOOL_MANIFEST_SCHEME) {
            return Err(InstallError::InvalidOperation(format!(
                "tool manifest installer cannot install package references with scheme '{}'",
                package.scheme()
            )));
        }

        debug!("Installing tools from local tool manifest");
        let manifest_file = self.manifest_file(package)?;
        let manifest = self.reader.load(&manifest_file)?;

        let mut files = Vec::new();
        for entry in manifest.entries() {
            info!("Installing tool {entry}");
            let reference = entry.to_package_reference()?;
            files.extend(self.delegate.install(&reference, package_type, path)?);
        }
        Ok(files)
    }
}
