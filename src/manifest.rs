use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use crate::error::InstallError;
use crate::reference::PackageReference;

/// A single tool listed in a local tool manifest.
///
/// Package id and version compare case-insensitively, so `Foo 1.0-BETA` and
/// `foo 1.0-beta` are the same entry.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    package_id: String,
    version: String,
}

/// Normalized identity of a [`ManifestEntry`]: lower-cased id and version.
type EntryKey = (String, String);

impl ManifestEntry {
    /// Creates a new entry.
    ///
    /// # Arguments
    /// * `package_id` - The tool's package id (e.g., `"dotnet-format"`).
    /// * `version` - The exact version to install (e.g., `"5.1.225507"`).
    ///
    /// # Errors
    /// Returns [`InstallError::Argument`] naming the parameter if either value is empty or whitespace.
    pub fn new(package_id: &str, version: &str) -> Result<Self, InstallError> {
        if package_id.trim().is_empty() {
            return Err(InstallError::argument("package_id", "value must not be empty or whitespace"));
        }
        if version.trim().is_empty() {
            return Err(InstallError::argument("version", "value must not be empty or whitespace"));
        }
        Ok(Self {
            package_id: package_id.to_string(),
            version: version.to_string(),
        })
    }
    pub fn package_id(&self) -> &str {
        &self.package_id
    }
    pub fn version(&self) -> &str {
        &self.version
    }
    /// Converts the entry into a `dotnet:` package reference.
    ///
    /// See [`crate::reference::to_package_reference`] for the exact format.
    pub fn to_package_reference(&self) -> Result<PackageReference, InstallError> {
        PackageReference::parse(&crate::reference::to_package_reference(self))
    }

    fn key(&self) -> EntryKey {
        (self.package_id.to_lowercase(), self.version.to_lowercase())
    }
}

impl PartialEq for ManifestEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ManifestEntry {}

impl Hash for ManifestEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, version {}", self.package_id, self.version)
    }
}

/// The tools declared in a local tool manifest (`dotnet-tools.json`).
///
/// This is a set: adding an entry that is already present (ignoring case) does nothing.
/// The order in which [`ToolManifest::entries`] yields entries is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolManifest {
    entries: BTreeMap<EntryKey, ManifestEntry>,
}

impl ToolManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds a tool to the manifest.
    ///
    /// # Arguments
    /// * `package_id` - The tool's package id.
    /// * `version` - The tool's version.
    ///
    /// # Returns
    /// `true` if the tool was added, `false` if an equal entry already existed.
    ///
    /// # Errors
    /// Returns an error if either value is empty or whitespace.
    pub fn add(&mut self, package_id: &str, version: &str) -> Result<bool, InstallError> {
        Ok(self.insert(ManifestEntry::new(package_id, version)?))
    }
    /// Inserts an already validated entry. Duplicates are silently dropped.
    pub fn insert(&mut self, entry: ManifestEntry) -> bool {
        let key = entry.key();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, entry);
        true
    }
    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }
    pub fn contains(&self, entry: &ManifestEntry) -> bool {
        self.entries.contains_key(&entry.key())
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(entry: &ManifestEntry) -> u64 {
        let mut hasher = DefaultHasher::new();
        entry.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_entry_rejects_blank_package_id() {
        for id in ["", " ", "\t"] {
            match ManifestEntry::new(id, "1.0") {
                Err(InstallError::Argument { param, .. }) => assert_eq!(param, "package_id"),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_entry_rejects_blank_version() {
        for version in ["", "  ", "\n"] {
            match ManifestEntry::new("tool", version) {
                Err(InstallError::Argument { param, .. }) => assert_eq!(param, "version"),
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn test_entry_keeps_original_casing() {
        let entry = ManifestEntry::new("Dotnet-Format", "5.1.0-Beta").unwrap();
        assert_eq!(entry.package_id(), "Dotnet-Format");
        assert_eq!(entry.version(), "5.1.0-Beta");
        assert_eq!(entry.to_string(), "Dotnet-Format, version 5.1.0-Beta");
    }

    #[test]
    fn test_entry_equality_ignores_case() {
        let a = ManifestEntry::new("Foo", "1.0").unwrap();
        let b = ManifestEntry::new("foo", "1.0").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = ManifestEntry::new("foo", "1.0-RC").unwrap();
        let d = ManifestEntry::new("FOO", "1.0-rc").unwrap();
        assert_eq!(c, d);
        assert_eq!(hash_of(&c), hash_of(&d));
    }

    #[test]
    fn test_entry_inequality() {
        let a = ManifestEntry::new("foo", "1.0").unwrap();
        assert_ne!(a, ManifestEntry::new("bar", "1.0").unwrap());
        assert_ne!(a, ManifestEntry::new("foo", "2.0").unwrap());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut manifest = ToolManifest::new();
        assert!(manifest.add("nbgv", "3.4.231").unwrap());
        assert!(!manifest.add("nbgv", "3.4.231").unwrap());
        assert!(!manifest.add("NBGV", "3.4.231").unwrap());
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_same_package_with_different_versions_are_distinct() {
        let mut manifest = ToolManifest::new();
        manifest.add("nbgv", "3.4.231").unwrap();
        manifest.add("nbgv", "3.5.0").unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_add_propagates_validation_errors() {
        let mut manifest = ToolManifest::new();
        assert!(manifest.add("", "1.0").is_err());
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_contains() {
        let mut manifest = ToolManifest::new();
        manifest.add("Tool", "1.0").unwrap();
        assert!(manifest.contains(&ManifestEntry::new("tool", "1.0").unwrap()));
        assert!(!manifest.contains(&ManifestEntry::new("tool", "1.1").unwrap()));
    }

    #[test]
    fn test_to_package_reference() {
        let entry = ManifestEntry::new("pkg", "1.2.3").unwrap();
        let reference = entry.to_package_reference().unwrap();
        assert_eq!(reference.scheme(), "dotnet");
        assert_eq!(reference.original_string(), "dotnet:?package=pkg&version=1.2.3");
    }
}
