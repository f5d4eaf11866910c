//! Record store collaborator.
//!
//! A record store keeps config files, parse results and rule sets for
//! later querying. The contract is the [`RecordStore`] trait;
//! [`MemoryRecordStore`] is an in-process implementation.
//!
//! Upserts are keyed as follows:
//! - device metadata by (vendor, device type, model, software version)
//! - config files by SHA-256 content hash
//! - rules by (device metadata, rule name)
//!
//! Parse events are appended per file and never upserted.

mod memory;

pub use memory::MemoryRecordStore;

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result, StoreError};
use crate::model::{DeviceInfo, DeviceMetadata, InterfaceRecord};
use crate::parser::QualityReport;
use crate::pipeline::PipelineReport;
use crate::rules::RuleSet;

/// Characters kept in a file's content preview.
pub const PREVIEW_CHARS: usize = 1000;

/// Parse status recorded for a config file.
pub const STATUS_SUCCESS: &str = "success";

/// A config file as submitted for parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub file_name: String,
    pub file_path: String,
    pub content: String,
    pub parse_status: String,
}

impl ConfigFile {
    /// Create a record with status `success`.
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            content: content.into(),
            parse_status: STATUS_SUCCESS.to_string(),
        }
    }

    /// Read a file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, path.display().to_string(), content))
    }

    /// Set the parse status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.parse_status = status.into();
        self
    }

    /// Lowercase hex SHA-256 of the content.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// The first [`PREVIEW_CHARS`] characters of the content.
    pub fn preview(&self) -> &str {
        match self.content.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// The parse result of one config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub metadata: DeviceMetadata,
    pub device_info: DeviceInfo,
    pub interfaces: Vec<InterfaceRecord>,
    pub quality: QualityReport,
}

impl From<&PipelineReport> for ParsedRecord {
    fn from(report: &PipelineReport) -> Self {
        Self {
            metadata: report.metadata.clone(),
            device_info: report.device_info.clone(),
            interfaces: report.interfaces.clone(),
            quality: report.quality.clone(),
        }
    }
}

/// A rule as kept by a record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRule {
    pub id: u64,
    pub metadata_id: u64,
    pub rule_name: String,
    pub category: String,
    pub pattern: String,
    pub description: String,
    pub priority: i32,
    pub is_active: bool,
    pub success_rate: Option<f64>,
}

/// Severity of a parse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// One entry of a file's parse log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseEvent {
    pub level: EventLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub logged_at: DateTime<Utc>,
}

impl ParseEvent {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            details: None,
            duration_ms: None,
            logged_at: Utc::now(),
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach how long the parse took, in whole milliseconds.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// One event per pipeline stage; failed stages are warnings.
    pub fn from_report(report: &PipelineReport) -> Vec<Self> {
        report
            .stages
            .iter()
            .map(|outcome| {
                let level = if outcome.succeeded {
                    EventLevel::Info
                } else {
                    EventLevel::Warning
                };
                Self::new(level, format!("{}: {}", outcome.stage, outcome.message))
            })
            .collect()
    }
}

/// Aggregate counts over everything a store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStatistics {
    pub total_files: usize,
    /// Files per parse status.
    pub status_distribution: IndexMap<String, usize>,
    /// Mean quality score over all parse results, 0.0 when there are none.
    pub average_quality_score: f64,
    /// Files per identified vendor, most frequent first.
    pub vendor_distribution: IndexMap<String, usize>,
}

/// Storage for files, parse results and rules.
pub trait RecordStore {
    /// Store a file and its parse result. Returns the parse result id.
    fn save_parse_result(
        &mut self,
        file: &ConfigFile,
        parsed: &ParsedRecord,
    ) -> std::result::Result<u64, StoreError>;

    /// Store every pattern of a rule set. Returns the device metadata id.
    fn save_rules(&mut self, ruleset: &RuleSet) -> std::result::Result<u64, StoreError>;

    /// Active rules for a vendor and device type, ordered by priority then
    /// rule name.
    fn load_rules(
        &self,
        vendor: &str,
        device_type: &str,
    ) -> std::result::Result<Vec<StoredRule>, StoreError>;

    /// Append an event to the parse log of a stored file.
    fn log_parse_event(
        &mut self,
        file: &ConfigFile,
        event: ParseEvent,
    ) -> std::result::Result<(), StoreError>;

    /// Aggregate counts.
    fn statistics(&self) -> std::result::Result<ParseStatistics, StoreError>;
}

/// Category of a rule, inferred from its name.
pub fn rule_category(rule_name: &str) -> &'static str {
    let name = rule_name.to_lowercase();
    let has = |needle: &str| name.contains(needle);

    if has("hostname") {
        "hostname"
    } else if has("interface") {
        "interface"
    } else if has("vlan") {
        "vlan"
    } else if has("ip") || has("address") {
        "ip_address"
    } else if has("mac") {
        "mac_address"
    } else if has("serial") {
        "serial_number"
    } else if has("description") {
        "description"
    } else {
        "general"
    }
}
