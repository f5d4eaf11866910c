//! Per-input parse session.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::extract::extract;
use super::identify::identify;
use super::validate::{QualityReport, QualityValidator};
use crate::error::{Error, ExportError, Result, RulesetError};
use crate::export::ExportRecord;
use crate::model::{DeviceInfo, DeviceMetadata, InterfaceRecord};
use crate::rules::{self, RuleMatches, RuleSet, RuleStore};

/// Ephemeral state of one parse.
///
/// Holds the raw text and whatever the stages have produced so far.
/// Sessions are independent of each other; a single session is not meant
/// to be shared across threads while it is being mutated.
#[derive(Debug, Clone)]
pub struct ParseSession {
    raw: String,
    metadata: DeviceMetadata,
    identified: bool,
    device_info: DeviceInfo,
    interfaces: Vec<InterfaceRecord>,
    ruleset: Option<RuleSet>,
}

impl ParseSession {
    /// Create a session over a config text.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            metadata: DeviceMetadata::default(),
            identified: false,
            device_info: DeviceInfo::default(),
            interfaces: Vec::new(),
            ruleset: None,
        }
    }

    /// Create a session whose device is already known.
    ///
    /// Identification is skipped; the given metadata is final.
    pub fn with_metadata(raw: impl Into<String>, metadata: DeviceMetadata) -> Self {
        Self {
            metadata,
            identified: true,
            ..Self::new(raw)
        }
    }

    /// Read a config file into a new session.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(raw))
    }

    /// The raw config text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Current metadata (empty until identified).
    pub fn metadata(&self) -> &DeviceMetadata {
        &self.metadata
    }

    /// Extracted device facts.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Extracted interfaces in discovery order.
    pub fn interfaces(&self) -> &[InterfaceRecord] {
        &self.interfaces
    }

    /// The active rule set, if any.
    pub fn ruleset(&self) -> Option<&RuleSet> {
        self.ruleset.as_ref()
    }

    /// Identify the device. Runs once; later calls return the same metadata.
    pub fn identify(&mut self) -> &DeviceMetadata {
        if !self.identified {
            self.metadata = identify(&self.raw);
            self.identified = true;
        }
        &self.metadata
    }

    /// Extract device facts and interfaces, identifying first if needed.
    pub fn extract(&mut self) -> (&DeviceInfo, &[InterfaceRecord]) {
        self.identify();
        let (info, interfaces) = extract(&self.raw, &self.metadata);
        self.device_info = info;
        self.interfaces = interfaces;
        (&self.device_info, &self.interfaces)
    }

    /// Score what has been extracted so far.
    pub fn validate(&self, validator: &QualityValidator) -> QualityReport {
        validator.validate(&self.device_info, &self.interfaces)
    }

    /// Generate a rule set from the vendor template and make it active.
    pub fn generate_rules(&mut self) -> &RuleSet {
        self.ruleset.insert(RuleSet::generate(&self.metadata))
    }

    /// Make a rule set active, replacing any previous one.
    pub fn set_ruleset(&mut self, ruleset: RuleSet) {
        self.ruleset = Some(ruleset);
    }

    /// Persist the active rule set, generating one first if needed.
    pub fn persist_rules(&mut self, store: &RuleStore, key: Option<&str>) -> Result<PathBuf> {
        let ruleset = self.active_ruleset();
        Ok(store.persist(ruleset, key)?)
    }

    /// Load a stored rule set and make it active.
    ///
    /// Returns `Ok(false)` when no document exists for the key; the active
    /// rule set is left as it was. Session metadata is never replaced.
    pub fn load_rules(&mut self, store: &RuleStore, key: &str) -> Result<bool> {
        match store.load(key)? {
            Some(ruleset) => {
                debug!("Loaded rule set '{}' version {}", key, ruleset.version);
                self.ruleset = Some(ruleset);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply the active rule set to the raw text, generating one if needed.
    pub fn apply_rules(&mut self) -> std::result::Result<RuleMatches, RulesetError> {
        let metadata = &self.metadata;
        let ruleset = self
            .ruleset
            .get_or_insert_with(|| RuleSet::generate(metadata));
        rules::apply(&self.raw, ruleset)
    }

    /// Repair the active rule set from failure samples and keep the result.
    pub fn optimize_rules<S: AsRef<str>>(&mut self, failed_samples: &[S]) -> &RuleSet {
        let optimized = rules::optimize(self.active_ruleset(), failed_samples);
        self.ruleset.insert(optimized)
    }

    /// Snapshot for export.
    pub fn to_export(&self) -> ExportRecord {
        ExportRecord::new(
            self.metadata.clone(),
            self.device_info.clone(),
            self.interfaces.clone(),
        )
    }

    /// Write the nested JSON export.
    pub fn export_json(&self, path: impl AsRef<Path>) -> std::result::Result<(), ExportError> {
        self.to_export().write_json(path)
    }

    /// Write the flat CSV export.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> std::result::Result<(), ExportError> {
        self.to_export().write_csv(path)
    }

    fn active_ruleset(&mut self) -> &RuleSet {
        let metadata = &self.metadata;
        self.ruleset
            .get_or_insert_with(|| RuleSet::generate(metadata))
    }
}
