use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use crate::error::InstallError;
use crate::manifest::ManifestEntry;

/// Scheme of references that point at a local tool manifest,
/// e.g. `toolmanifest:?package=.config/dotnet-tools.json`.
pub const TOOL_MANIFEST_SCHEME: &str = "toolmanifest";

/// Scheme of references handled by the .NET tool installer,
/// e.g. `dotnet:?package=nbgv&version=3.4.231`.
pub const DOTNET_TOOL_SCHEME: &str = "dotnet";

/// A scheme-qualified package locator of the form
/// `<scheme>:[address][?key=value&key=value...]`.
///
/// Parameter keys are case-insensitive and may repeat; values are kept
/// verbatim (no percent-decoding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    original: String,
    scheme: String,
    address: String,
    parameters: BTreeMap<String, Vec<String>>,
}

impl PackageReference {
    /// Parses a package reference.
    ///
    /// # Errors
    /// Returns [`InstallError::Argument`] if the input has no scheme or the scheme contains
    /// characters other than ASCII alphanumerics, `+`, `-` and `.`.
    pub fn parse(input: &str) -> Result<Self, InstallError> {
        let original = input.trim();
        let (scheme, rest) = original
            .split_once(':')
            .ok_or_else(|| InstallError::argument("reference", format!("'{original}' has no scheme")))?;
        let valid_scheme = !scheme.is_empty()
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(InstallError::argument(
                "reference",
                format!("'{original}' has an invalid scheme '{scheme}'"),
            ));
        }
        let (address, query) = rest.split_once('?').unwrap_or((rest, ""));

        let mut parameters: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            parameters
                .entry(key.to_lowercase())
                .or_default()
                .push(value.to_string());
        }

        Ok(Self {
            original: original.to_string(),
            scheme: scheme.to_string(),
            address: address.to_string(),
            parameters,
        })
    }
    pub fn original_string(&self) -> &str {
        &self.original
    }
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
    /// Whether the scheme equals `scheme`, ignoring ASCII case.
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }
    /// The part between the scheme and the query; empty for `scheme:?...` references.
    pub fn address(&self) -> &str {
        &self.address
    }
    pub fn parameters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.parameters
    }
    /// All values given for `key`, if the key is present.
    pub fn parameter(&self, key: &str) -> Option<&[String]> {
        self.parameters
            .get(&key.to_lowercase())
            .map(Vec::as_slice)
    }
}

impl FromStr for PackageReference {
    type Err = InstallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Translates a manifest entry into the `dotnet:` reference that installs it:
/// `dotnet:?package=<id>&version=<version>`.
///
/// Id and version are substituted verbatim. Values containing `&` or `=`
/// produce a reference that does not parse back to the same entry.
pub fn to_package_reference(entry: &ManifestEntry) -> String {
    format!(
        "{}:?package={}&version={}",
        DOTNET_TOOL_SCHEME,
        entry.package_id(),
        entry.version()
    )
}

/// Builds the reference naming a tool manifest file:
/// `toolmanifest:?package=<path>`.
///
/// # Errors
/// Returns [`InstallError::Argument`] if `manifest_path` contains `&` or has
/// leading or trailing whitespace, since the parsed reference would not name
/// the same file.
pub fn manifest_reference(manifest_path: &str) -> Result<PackageReference, InstallError> {
    if manifest_path.contains('&') {
        return Err(InstallError::argument(
            "package",
            format!("manifest path '{manifest_path}' must not contain '&'"),
        ));
    }
    if manifest_path.trim() != manifest_path {
        return Err(InstallError::argument(
            "package",
            format!("manifest path '{manifest_path}' must not start or end with whitespace"),
        ));
    }
    let reference = PackageReference::parse(&format!("{}:?package={}", TOOL_MANIFEST_SCHEME, manifest_path))?;
    match reference.parameter("package") {
        Some([path]) if path == manifest_path => Ok(reference),
        _ => Err(InstallError::argument(
            "package",
            format!("manifest path '{manifest_path}' cannot be used in a package reference"),
        )),
    }
}
