//! Builder for creating parse pipelines.

use std::path::PathBuf;

use super::Pipeline;
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::model::DeviceMetadata;
use crate::parser::QualityValidator;
use crate::rules::RuleStore;

/// Builder for constructing parse pipelines.
///
/// # Example
///
/// ```rust
/// use ferrocfg::pipeline::PipelineBuilder;
///
/// # fn example() -> Result<(), ferrocfg::Error> {
/// let pipeline = PipelineBuilder::new()
///     .quality_threshold(0.8)
///     .apply_rules(true)
///     .build()?;
///
/// let report = pipeline.run("hostname R1\n");
/// assert_eq!(report.device_info.hostname, "R1");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    config: ParserConfig,
    metadata: Option<DeviceMetadata>,
    rule_key: Option<String>,
    load_rules: bool,
    persist_rules: bool,
    apply_rules: bool,
    optimize_samples: Vec<String>,
}

impl PipelineBuilder {
    /// Create a builder with default settings and no optional stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole parser configuration.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rules directory (default: `rules`).
    pub fn rules_dir(mut self, rules_dir: impl Into<PathBuf>) -> Self {
        self.config.rules_dir = rules_dir.into();
        self
    }

    /// Set the minimum quality score (default: 0.9).
    pub fn quality_threshold(mut self, threshold: f64) -> Self {
        self.config.quality_threshold = threshold;
        self
    }

    /// Set the version stamped on generated rule sets (default: 1.0.0).
    pub fn rule_version(mut self, version: impl Into<String>) -> Self {
        self.config.rule_version = version.into();
        self
    }

    /// Use known metadata instead of identifying the device.
    pub fn metadata(mut self, metadata: DeviceMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the rule document key (default: the metadata slug).
    pub fn rule_key(mut self, key: impl Into<String>) -> Self {
        self.rule_key = Some(key.into());
        self
    }

    /// Prefer a stored rule set over a freshly generated one.
    pub fn load_rules(mut self, enabled: bool) -> Self {
        self.load_rules = enabled;
        self
    }

    /// Write the active rule set to the rules directory.
    pub fn persist_rules(mut self, enabled: bool) -> Self {
        self.persist_rules = enabled;
        self
    }

    /// Apply the active rule set to the input.
    pub fn apply_rules(mut self, enabled: bool) -> Self {
        self.apply_rules = enabled;
        self
    }

    /// Repair the active rule set from failure samples before use.
    pub fn optimize_with<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optimize_samples = samples.into_iter().map(Into::into).collect();
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> Result<Pipeline> {
        let threshold = self.config.quality_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidConfig {
                message: format!("Quality threshold must be within 0.0..=1.0, got {threshold}"),
            });
        }

        if self.config.rule_version.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "Rule version must not be empty".to_string(),
            });
        }

        if self.rule_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(Error::InvalidConfig {
                message: "Rule key must not be empty".to_string(),
            });
        }

        Ok(Pipeline {
            store: RuleStore::new(self.config.rules_dir.clone()),
            validator: QualityValidator::new(threshold),
            config: self.config,
            metadata: self.metadata,
            rule_key: self.rule_key,
            load_rules: self.load_rules,
            persist_rules: self.persist_rules,
            apply_rules: self.apply_rules,
            optimize_samples: self.optimize_samples,
        })
    }
}
