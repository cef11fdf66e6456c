use std::collections::BTreeMap;
use std::io::ErrorKind;
use serde::Deserialize;
use tracing::debug;
use crate::error::InstallError;
use crate::fs::{Environment, FileHandle};
use crate::manifest::{ManifestEntry, ToolManifest};

/// The only manifest format version this crate understands.
pub const SUPPORTED_MANIFEST_VERSION: i64 = 1;

/// Loads tool manifests.
pub trait ManifestReader {
    /// Loads a local tool manifest (`dotnet-tools.json`) from `file`.
    ///
    /// # Errors
    /// * [`InstallError::NotFound`] if the file does not exist.
    /// * [`InstallError::InvalidManifest`] if the file is not a valid or supported tool manifest.
    /// * [`InstallError::Io`] if the file exists but can't be read.
    fn load(&self, file: &FileHandle) -> Result<ToolManifest, InstallError>;
}

impl<T: ManifestReader + ?Sized> ManifestReader for &T {
    fn load(&self, file: &FileHandle) -> Result<ToolManifest, InstallError> {
        (**self).load(file)
    }
}

/// On-disk shape of `dotnet-tools.json`. Fields not listed here are ignored.
#[derive(Deserialize, Debug)]
struct ManifestDocument {
    version: Option<i64>,
    #[serde(default)]
    tools: Option<BTreeMap<String, ToolDocument>>,
}

#[derive(Deserialize, Debug)]
struct ToolDocument {
    #[serde(default)]
    version: Option<String>,
}

/// Reads JSON tool manifests from disk, resolving relative paths through an [`Environment`].
#[derive(Debug, Clone)]
pub struct JsonManifestReader<E> {
    environment: E,
}

impl<E: Environment> JsonManifestReader<E> {
    pub fn new(environment: E) -> Self {
        Self { environment }
    }
}

impl<E: Environment> ManifestReader for JsonManifestReader<E> {
    fn load(&self, file: &FileHandle) -> Result<ToolManifest, InstallError> {
        if !file.exists() {
            return Err(InstallError::NotFound { path: file.path().to_path_buf() });
        }
        let path = self.environment.make_absolute(file.path());
        debug!("Loading tool manifest from {}", path.display());

        let content = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => InstallError::NotFound { path: path.clone() },
            _ => InstallError::Io { path: path.clone(), source },
        })?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let document: ManifestDocument = serde_json::from_str(content).map_err(|source| {
            InstallError::InvalidManifest {
                path: path.clone(),
                message: "failed to deserialize tool manifest".to_string(),
                source: Some(source),
            }
        })?;

        match document.version {
            Some(SUPPORTED_MANIFEST_VERSION) => {}
            Some(version) => {
                return Err(InstallError::invalid_manifest(
                    &path,
                    format!("unexpected version '{version}' (expected '{SUPPORTED_MANIFEST_VERSION}')"),
                ));
            }
            None => {
                return Err(InstallError::invalid_manifest(&path, "manifest has no 'version' property"));
            }
        }

        let mut manifest = ToolManifest::new();
        for (package_id, tool) in document.tools.unwrap_or_default() {
            let version = tool.version.unwrap_or_default();
            let entry = ManifestEntry::new(&package_id, &version).map_err(|_| {
                InstallError::invalid_manifest(
                    &path,
                    format!("tool '{package_id}' must have a non-empty package id and version"),
                )
            })?;
            manifest.insert(entry);
        }
        debug!("Tool manifest {} lists {} tool(s)", path.display(), manifest.len());
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use tempfile::{tempdir, TempDir};
    use crate::fs::{FileSystem, LocalFileSystem, ProcessEnvironment};

    /// Environment that counts how often the working directory is asked for.
    struct CountingEnvironment {
        working_directory: PathBuf,
        calls: Cell<usize>,
    }

    impl Environment for CountingEnvironment {
        fn working_directory(&self) -> PathBuf {
            self.calls.set(self.calls.get() + 1);
            self.working_directory.clone()
        }
    }

    fn reader() -> JsonManifestReader<ProcessEnvironment> {
        JsonManifestReader::new(ProcessEnvironment::new("/nonexistent-working-directory"))
    }

    fn write_manifest(dir: &TempDir, content: &str) -> FileHandle {
        let path = dir.path().join("dotnet-tools.json");
        std::fs::write(&path, content).unwrap();
        FileHandle::new(path, true)
    }

    #[test]
    fn test_load_fails_if_file_does_not_exist() {
        let file = FileHandle::new("some-path", false);
        match reader().load(&file) {
            Err(InstallError::NotFound { path }) => assert_eq!(path, Path::new("some-path")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_fails_if_file_was_removed_after_taking_the_handle() {
        let dir = tempdir().unwrap();
        let path = write_manifest(&dir, r#"{ "version": 1 }"#).path().to_path_buf();
        let file = LocalFileSystem.get_file(&path);
        assert!(file.exists());
        std::fs::remove_file(&path).unwrap();

        match reader().load(&file) {
            Err(InstallError::NotFound { path: missing }) => assert_eq!(missing, path),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_resolves_relative_path_through_environment() {
        let dir = tempdir().unwrap();
        write_manifest(&dir, r#"{ "version": 1 }"#);
        let environment = CountingEnvironment {
            working_directory: dir.path().to_path_buf(),
            calls: Cell::new(0),
        };
        let reader = JsonManifestReader::new(environment);

        let manifest = reader.load(&FileHandle::new("dotnet-tools.json", true)).unwrap();

        assert!(manifest.is_empty());
        assert_eq!(reader.environment.calls.get(), 1);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let file = write_manifest(&dir, "not json");
        match reader().load(&file) {
            Err(InstallError::InvalidManifest { path, source, .. }) => {
                assert_eq!(path, file.path());
                assert!(source.is_some());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_missing_version() {
        let dir = tempdir().unwrap();
        let file = write_manifest(&dir, "{ }");
        assert!(matches!(
            reader().load(&file),
            Err(InstallError::InvalidManifest { source: None, .. })
        ));
    }

    #[test]
    fn test_load_rejects_unsupported_version() {
        let dir = tempdir().unwrap();
        for content in [r#"{ "version": 2 }"#, r#"{ "version": 0 }"#, r#"{ "version": null }"#] {
            let file = write_manifest(&dir, content);
            assert!(
                matches!(reader().load(&file), Err(InstallError::InvalidManifest { .. })),
                "accepted {content}"
            );
        }
    }

    #[test]
    fn test_load_returns_empty_manifest_without_tools() {
        let dir = tempdir().unwrap();
        for content in [r#"{ "version": 1 }"#, r#"{ "version": 1, "tools": {} }"#, r#"{ "version": 1, "tools": null }"#] {
            let file = write_manifest(&dir, content);
            assert!(reader().load(&file).unwrap().is_empty(), "not empty for {content}");
        }
    }

    #[test]
    fn test_load_returns_expected_tools() {
        let dir = tempdir().unwrap();
        let file = write_manifest(
            &dir,
            r#"{
              "version": 1,
              "isRoot": true,
              "tools": {
                "nbgv": { "version": "3.4.231", "commands": ["nbgv"] },
                "dotnet-format": { "version": "5.1.225507", "commands": ["dotnet-format"] },
                "dotnet-reportgenerator-globaltool": { "version": "4.8.12", "commands": ["reportgenerator"] }
              }
            }"#,
        );

        let manifest = reader().load(&file).unwrap();

        let mut entries: Vec<_> = manifest.entries().cloned().collect();
        entries.sort_by(|a, b| a.package_id().cmp(b.package_id()));
        assert_eq!(
            entries,
            vec![
                ManifestEntry::new("dotnet-format", "5.1.225507").unwrap(),
                ManifestEntry::new("dotnet-reportgenerator-globaltool", "4.8.12").unwrap(),
                ManifestEntry::new("nbgv", "3.4.231").unwrap(),
            ]
        );
    }

    #[test]
    fn test_load_skips_byte_order_mark() {
        let dir = tempdir().unwrap();
        let file = write_manifest(&dir, "\u{feff}{ \"version\": 1, \"tools\": { \"nbgv\": { \"version\": \"3.4.231\" } } }");
        assert_eq!(reader().load(&file).unwrap().len(), 1);
    }

    #[test]
    fn test_load_rejects_tool_without_version() {
        let dir = tempdir().unwrap();
        for content in [
            r#"{ "version": 1, "tools": { "nbgv": { "commands": ["nbgv"] } } }"#,
            r#"{ "version": 1, "tools": { "nbgv": { "version": " " } } }"#,
        ] {
            let file = write_manifest(&dir, content);
            match reader().load(&file) {
                Err(InstallError::InvalidManifest { message, .. }) => assert!(message.contains("nbgv")),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }
}
