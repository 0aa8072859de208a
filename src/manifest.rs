//! Manifest model and loader.
//!
//! The manifest is read once per run and never modified. Only the top-level
//! shape is checked here. Each collection is kept as a raw document node and
//! validated when it is requested (see [`crate::collection`]), so a broken
//! collection does not affect the others.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Root manifest document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Manifest {
    /// Global exclusion patterns, merged into every collection.
    pub ignore: Option<Vec<String>>,
    /// Declared collections by name, unvalidated.
    pub collections: Option<BTreeMap<String, Value>>,
}

/// The fields of one collection as written in the manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSpec {
    /// Path patterns, in the order they are archived.
    pub items: Option<Vec<String>>,
    /// Directory template the collection's archives are written below.
    pub target: Option<String>,
    /// Compression name, see [`Compression`].
    pub compress: Option<String>,
    /// Collection-level exclusion patterns.
    pub ignore: Option<Vec<String>>,
}

impl CollectionSpec {
    /// Reads the known fields of the collection `name` from its manifest node.
    ///
    /// An empty node has no fields. Unknown keys are ignored; a null field
    /// counts as absent.
    ///
    /// # Errors
    /// [`Error::InvalidCollection`] if the node is not a mapping or a field
    /// has the wrong type.
    pub fn from_value(name: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(_) => {}
            _ => return Err(Error::invalid_collection(name, "is not a mapping")),
        }
        Ok(Self {
            items: field(name, value, "items")?,
            target: field(name, value, "target")?,
            compress: field(name, value, "compress")?,
            ignore: field(name, value, "ignore")?,
        })
    }
}

fn field<T: DeserializeOwned>(name: &str, value: &Value, key: &str) -> Result<Option<T>> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .map(|v| serde_yaml::from_value(v.clone()))
        .transpose()
        .map_err(|e| Error::invalid_collection(name, format!("has invalid {key}: {e}")))
}

impl Manifest {
    /// Returns the declared collections, or an error if there are none.
    pub fn collections(&self) -> Result<&BTreeMap<String, Value>> {
        self.collections
            .as_ref()
            .ok_or(Error::ManifestMissingCollections)
    }

    /// Looks up a collection by name and reads its fields.
    pub fn collection(&self, name: &str) -> Result<CollectionSpec> {
        let value = self
            .collections()?
            .get(name)
            .ok_or_else(|| Error::UnknownCollection(name.to_string()))?;
        CollectionSpec::from_value(name, value)
    }

    /// Global exclusion patterns, empty if none are declared.
    pub fn global_ignore(&self) -> &[String] {
        self.ignore.as_deref().unwrap_or_default()
    }
}

/// Supported archive compressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    None,
    Gz,
    Xz,
    Bz2,
}

impl Compression {
    pub const ALL: [Compression; 4] = [
        Compression::None,
        Compression::Gz,
        Compression::Xz,
        Compression::Bz2,
    ];

    /// Name used in the manifest.
    pub fn name(self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gz => "gz",
            Compression::Xz => "xz",
            Compression::Bz2 => "bz2",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Compression::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown compression profile {s}"))
    }
}

/// Reads and parses a manifest file.
///
/// Files with a `.toml` extension are parsed as TOML, everything else as
/// YAML. An empty document is an empty manifest.
///
/// # Errors
/// [`Error::ManifestNotFound`] if the path does not exist,
/// [`Error::ManifestParse`] if the document is not well-formed.
pub fn load(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(Error::ManifestNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| Error::ManifestParse {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    tracing::debug!("loaded manifest {} ({} bytes)", path.display(), text.len());

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let parsed = if is_toml {
        parse_toml(&text)
    } else {
        parse_yaml(&text)
    };
    parsed.map_err(|source| Error::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

type ParseResult = std::result::Result<Manifest, Box<dyn std::error::Error + Send + Sync>>;

/// Parses a YAML manifest.
pub fn parse_yaml(text: &str) -> ParseResult {
    if text.trim().is_empty() {
        return Ok(Manifest::default());
    }
    let manifest: Option<Manifest> = serde_yaml::from_str(text)?;
    Ok(manifest.unwrap_or_default())
}

/// Parses a TOML manifest.
pub fn parse_toml(text: &str) -> ParseResult {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const MANIFEST: &str = r#"
ignore:
  - "*.tmp"
collections:
  daily:
    items:
      - "{{home}}/docs/**"
      - /etc/hosts
    target: /backups
    compress: gz
    ignore:
      - "*.bak"
  weekly:
    items: [/srv]
    target: /backups
"#;

    #[test]
    fn test_parse_yaml() {
        let manifest = parse_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.global_ignore(), ["*.tmp"]);
        let daily = manifest.collection("daily").unwrap();
        assert_eq!(
            daily.items.as_deref().unwrap(),
            ["{{home}}/docs/**", "/etc/hosts"]
        );
        assert_eq!(daily.target.as_deref(), Some("/backups"));
        assert_eq!(daily.compress.as_deref(), Some("gz"));
        assert_eq!(daily.ignore.as_deref().unwrap(), ["*.bak"]);

        // Missing fields are kept as absent, not rejected.
        let weekly = manifest.collection("weekly").unwrap();
        assert!(weekly.compress.is_none());
        assert!(weekly.ignore.is_none());
    }

    #[test]
    fn test_unknown_collection() {
        let manifest = parse_yaml(MANIFEST).unwrap();
        assert!(matches!(
            manifest.collection("monthly"),
            Err(Error::UnknownCollection(name)) if name == "monthly"
        ));
    }

    #[test]
    fn test_missing_collections() {
        let manifest = parse_yaml("ignore: ['*.tmp']").unwrap();
        assert!(matches!(
            manifest.collections(),
            Err(Error::ManifestMissingCollections)
        ));
        assert!(matches!(
            manifest.collection("daily"),
            Err(Error::ManifestMissingCollections)
        ));
    }

    #[test]
    fn test_broken_collection_is_isolated() {
        let manifest = parse_yaml(
            r#"
collections:
  daily: {items: [/etc/hosts], target: /backups, compress: gz}
  weekly: {items: /srv, target: /backups, compress: gz}
  monthly: [/srv]
  yearly:
"#,
        )
        .unwrap();
        assert_eq!(manifest.collection("daily").unwrap().items.unwrap(), ["/etc/hosts"]);
        match manifest.collection("weekly") {
            Err(Error::InvalidCollection { name, reason }) => {
                assert_eq!(name, "weekly");
                assert!(reason.starts_with("has invalid items"), "{reason}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            manifest.collection("monthly"),
            Err(Error::InvalidCollection { reason, .. }) if reason == "is not a mapping"
        ));
        assert_eq!(manifest.collection("yearly").unwrap(), CollectionSpec::default());
    }

    #[test]
    fn test_wrongly_typed_fields() {
        let manifest = parse_yaml(
            "collections:\n  c: {items: [/a], target: [/t], compress: 7, extra: true}\n",
        )
        .unwrap();
        assert!(matches!(
            manifest.collection("c"),
            Err(Error::InvalidCollection { reason, .. }) if reason.starts_with("has invalid target")
        ));

        let manifest = parse_yaml("collections:\n  c: {items: [/a], target: /t, compress: ~}\n")
            .unwrap();
        assert!(manifest.collection("c").unwrap().compress.is_none());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(parse_yaml("").unwrap(), Manifest::default());
        assert!(parse_yaml("").unwrap().global_ignore().is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let manifest = parse_toml(
            r#"
ignore = ["*.tmp"]

[collections.daily]
items = ["/etc/hosts"]
target = "/backups"
compress = "xz"
"#,
        )
        .unwrap();
        let daily = manifest.collection("daily").unwrap();
        assert_eq!(daily.compress.as_deref(), Some("xz"));
        assert_eq!(manifest.global_ignore(), ["*.tmp"]);
    }

    #[test]
    fn test_compression_from_str() {
        assert_eq!("none".parse::<Compression>(), Ok(Compression::None));
        assert_eq!("gz".parse::<Compression>(), Ok(Compression::Gz));
        assert_eq!("xz".parse::<Compression>(), Ok(Compression::Xz));
        assert_eq!("bz2".parse::<Compression>(), Ok(Compression::Bz2));
        assert!("zip".parse::<Compression>().is_err());
        assert!("GZ".parse::<Compression>().is_err());
    }

    #[test]
    fn test_load_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");
        assert!(matches!(load(&path), Err(Error::ManifestNotFound(p)) if p == path));
    }

    #[test]
    fn test_load_malformed() {
        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        writeln!(file, "collections: [unclosed").unwrap();
        assert!(matches!(load(file.path()), Err(Error::ManifestParse { .. })));
    }

    #[test]
    fn test_load_yaml_and_toml_files() {
        let mut yaml = NamedTempFile::with_suffix(".yml").unwrap();
        yaml.write_all(MANIFEST.as_bytes()).unwrap();
        let manifest = load(yaml.path()).unwrap();
        assert_eq!(manifest.collections().unwrap().len(), 2);

        let mut toml = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(toml, "[collections.a]\nitems = []").unwrap();
        let manifest = load(toml.path()).unwrap();
        assert!(manifest.collection("a").unwrap().target.is_none());
    }
}
