//! Rule sets: generation from vendor templates and application to text.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RulesetError;
use crate::model::DeviceMetadata;
use crate::pattern;

/// Version stamped on freshly generated rule sets.
pub const DEFAULT_RULE_VERSION: &str = "1.0.0";

/// Field name to pattern string, in insertion order.
pub type Patterns = IndexMap<String, String>;

/// Field name to every match of that field's pattern.
pub type RuleMatches = IndexMap<String, Vec<RuleMatch>>;

/// A persisted mapping of field name to extraction pattern for one
/// (vendor, device type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub metadata: DeviceMetadata,
    #[serde(default)]
    pub patterns: Patterns,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl RuleSet {
    /// Create a rule set stamped with the current time and default version.
    pub fn new(metadata: DeviceMetadata, patterns: Patterns) -> Self {
        Self {
            metadata,
            patterns,
            created_at: Utc::now(),
            version: DEFAULT_RULE_VERSION.to_string(),
        }
    }

    /// Generate a rule set from the vendor's template.
    pub fn generate(metadata: &DeviceMetadata) -> Self {
        Self::new(metadata.clone(), generate(metadata))
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Default document key for this rule set.
    pub fn key(&self) -> String {
        self.metadata.slug()
    }

    /// Apply this rule set to a text.
    pub fn apply(&self, text: &str) -> Result<RuleMatches, RulesetError> {
        apply(text, self)
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones, read as UTC.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid created_at '{raw}': {e}")))
}

/// One match of a rule pattern.
///
/// Mirrors what the pattern defines: named groups, positional groups, or
/// neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleMatch {
    /// Named groups by name. Groups that did not participate are `None`.
    Named(IndexMap<String, Option<String>>),

    /// Positional groups in order.
    Groups(Vec<Option<String>>),

    /// The whole matched substring.
    Whole(String),
}

/// Template patterns for the vendor. Unregistered vendors get an empty map.
pub fn generate(metadata: &DeviceMetadata) -> Patterns {
    metadata
        .vendor
        .definition()
        .map(|def| def.rule_template.clone())
        .unwrap_or_default()
}

/// Collect every non-overlapping match of every field pattern.
///
/// Patterns run in multi-line mode. Each field appears in the result even
/// with zero matches.
pub fn apply(text: &str, ruleset: &RuleSet) -> Result<RuleMatches, RulesetError> {
    let mut result = RuleMatches::with_capacity(ruleset.patterns.len());

    for (field, p) in &ruleset.patterns {
        let re = pattern::compiled(&format!("(?m){p}")).map_err(|source| {
            RulesetError::InvalidPattern {
                field: field.clone(),
                source,
            }
        })?;

        let names: Vec<&str> = re.capture_names().flatten().collect();
        let matches = re
            .captures_iter(text)
            .map(|caps| {
                if !names.is_empty() {
                    RuleMatch::Named(
                        names
                            .iter()
                            .map(|&n| (n.to_string(), caps.name(n).map(|m| m.as_str().to_string())))
                            .collect(),
                    )
                } else if caps.len() > 1 {
                    RuleMatch::Groups(
                        caps.iter()
                            .skip(1)
                            .map(|g| g.map(|m| m.as_str().to_string()))
                            .collect(),
                    )
                } else {
                    RuleMatch::Whole(caps.get(0).map_or_else(String::new, |m| m.as_str().to_string()))
                }
            })
            .collect();

        result.insert(field.clone(), matches);
    }

    Ok(result)
}
