//! File-backed rule document store.
//!
//! One YAML document per key under `<rules_dir>/parsers/`. Writes replace
//! the whole document, so concurrent writers to one key are last-writer-wins.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use super::ruleset::RuleSet;
use crate::error::RulesetError;

/// Subdirectory of the rules directory holding parser documents.
const PARSERS_DIR: &str = "parsers";

/// Store for persisted rule sets.
#[derive(Debug, Clone)]
pub struct RuleStore {
    root: PathBuf,
}

impl RuleStore {
    /// Create a store rooted at a rules directory. Nothing is created yet.
    pub fn new(rules_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: rules_dir.into(),
        }
    }

    /// The rules directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for a key. A `.yaml`/`.yml` suffix is optional.
    ///
    /// Keys name a single file under `<rules_dir>/parsers/`; empty keys and
    /// keys with path separators or `..` are rejected.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, RulesetError> {
        if key.trim().is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(RulesetError::InvalidKey {
                key: key.to_string(),
            });
        }
        let file = if key.ends_with(".yaml") || key.ends_with(".yml") {
            key.to_string()
        } else {
            format!("{key}.yaml")
        };
        Ok(self.root.join(PARSERS_DIR).join(file))
    }

    /// Write a rule set under `key`, or under its default slug.
    ///
    /// Returns the document path. An existing document is overwritten.
    pub fn persist(&self, ruleset: &RuleSet, key: Option<&str>) -> Result<PathBuf, RulesetError> {
        let key = key.map_or_else(|| ruleset.key(), str::to_string);
        let path = self.path_for(&key)?;
        let io_err = |source: io::Error| RulesetError::Io {
            path: path.clone(),
            source,
        };

        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(io_err)?;

        let yaml = serde_yaml::to_string(ruleset)?;

        // Each writer stages its own file beside the target, then swaps it in whole.
        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(yaml.as_bytes()).map_err(io_err)?;
        tmp.persist(&path).map_err(|e| io_err(e.error))?;

        info!("Rules saved to: {}", path.display());
        Ok(path)
    }

    /// Load the rule set stored under `key`.
    ///
    /// A missing document is `Ok(None)`; an unreadable or malformed one is
    /// an error.
    pub fn load(&self, key: &str) -> Result<Option<RuleSet>, RulesetError> {
        let path = self.path_for(key)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Rule document not found: {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(RulesetError::Io { path, source }),
        };

        serde_yaml::from_str(&content)
            .map(Some)
            .map_err(|source| RulesetError::Malformed { path, source })
    }

    /// Keys of every stored document, sorted.
    pub fn keys(&self) -> Result<Vec<String>, RulesetError> {
        let dir = self.root.join(PARSERS_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RulesetError::Io { path: dir, source }),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| RulesetError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceMetadata;
    use crate::vendor::Vendor;

    fn rules() -> RuleSet {
        RuleSet::generate(&DeviceMetadata {
            vendor: Vendor::Cisco,
            device_type: "Switch".to_string(),
            model: "Catalyst 3850".to_string(),
            software_version: "15.2".to_string(),
            config_format: "Cisco IOS".to_string(),
        })
    }

    #[test]
    fn test_persist_and_load_default_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());

        let path = store.persist(&rules(), None).unwrap();
        assert_eq!(path, dir.path().join("parsers").join("cisco_switch.yaml"));

        let loaded = store.load("cisco_switch").unwrap().unwrap();
        assert_eq!(loaded, rules_with_time(&loaded));
        assert_eq!(loaded.patterns.keys().next().map(String::as_str), Some("hostname"));
    }

    fn rules_with_time(other: &RuleSet) -> RuleSet {
        let mut rs = rules();
        rs.created_at = other.created_at;
        rs
    }

    #[test]
    fn test_explicit_key_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        store.persist(&rules(), Some("lab.yaml")).unwrap();
        assert!(store.load("lab").unwrap().is_some());
        assert!(store.load("lab.yaml").unwrap().is_some());
        assert!(store.load("cisco_switch").unwrap().is_none());
    }

    #[test]
    fn test_missing_document_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        assert!(store.load("nope").unwrap().is_none());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_collision_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        store.persist(&rules(), None).unwrap();
        store
            .persist(&rules().with_version("2.0.0"), Some("cisco_switch"))
            .unwrap();
        assert_eq!(store.load("cisco_switch").unwrap().unwrap().version, "2.0.0");
        assert_eq!(store.keys().unwrap(), vec!["cisco_switch"]);
    }

    #[test]
    fn test_malformed_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        let path = store.path_for("broken").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "patterns: [unclosed").unwrap();
        assert!(matches!(
            store.load("broken"),
            Err(RulesetError::Malformed { .. })
        ));
    }

    #[test]
    fn test_document_is_human_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        let path = store.persist(&rules(), None).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("vendor: Cisco"));
        assert!(text.contains("1.0.0"));
        assert!(text.contains("created_at:"));
    }

    #[test]
    fn test_concurrent_writers_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());

        for round in 0..20 {
            let handles: Vec<_> = (0..8)
                .map(|writer| {
                    let store = store.clone();
                    let ruleset = rules().with_version(format!("{round}.{writer}.0"));
                    std::thread::spawn(move || store.persist(&ruleset, Some("cisco_switch")))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }

            let loaded = store.load("cisco_switch").unwrap().unwrap();
            assert!(loaded.version.starts_with(&format!("{round}.")));
        }

        // No staging files are left behind
        assert_eq!(store.keys().unwrap(), vec!["cisco_switch"]);
        let entries = fs::read_dir(dir.path().join("parsers")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_key_outside_parsers_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path().join("rules"));

        for key in ["../x", "a/b", "a\\b", "..", ""] {
            assert!(
                matches!(store.persist(&rules(), Some(key)), Err(RulesetError::InvalidKey { .. })),
                "key {key:?} accepted"
            );
            assert!(matches!(store.load(key), Err(RulesetError::InvalidKey { .. })));
        }
        assert!(!dir.path().join("x.yaml").exists());
        assert!(!dir.path().join("rules").exists());
    }

    #[test]
    fn test_loads_document_without_utc_offset() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuleStore::new(dir.path());
        let path = store.path_for("huawei_switch").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "metadata:\n  vendor: Huawei\n  device_type: Switch\n  model: ''\n  software_version: ''\n  config_format: Huawei VRP\npatterns:\n  hostname: sysname\\s+(?P<hostname>\\S+)\ncreated_at: '2024-05-01T10:20:30.123456'\nversion: 1.0.0\n",
        )
        .unwrap();

        let loaded = store.load("huawei_switch").unwrap().unwrap();
        assert_eq!(loaded.metadata.vendor, Vendor::Huawei);
        assert_eq!(
            loaded.created_at.to_rfc3339(),
            "2024-05-01T10:20:30.123456+00:00"
        );
        assert_eq!(loaded.patterns["hostname"], r"sysname\s+(?P<hostname>\S+)");
    }
}
