//! End-to-end parse pipeline.
//!
//! Runs identify, extract and validate over one config text, then the
//! rule stages the builder switched on: load or generate, persist, apply,
//! and optimize last. Optimizing only changes the rule set in the report;
//! the persisted document and the matches come from the rules before it.
//! A failing rule stage is logged and recorded in the report; the
//! remaining stages still run.
//!
//! # Example
//!
//! ```rust,no_run
//! use ferrocfg::Pipeline;
//!
//! # fn example() -> Result<(), ferrocfg::Error> {
//! let pipeline = Pipeline::builder()
//!     .rules_dir("./rules")
//!     .persist_rules(true)
//!     .apply_rules(true)
//!     .build()?;
//!
//! let report = pipeline.run_file("core-switch.cfg")?;
//! println!("{} -> {:.2}", report.device_info.hostname, report.quality.score);
//! # Ok(())
//! # }
//! ```

mod builder;

pub use builder::PipelineBuilder;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::export::ExportRecord;
use crate::model::{DeviceInfo, DeviceMetadata, InterfaceRecord};
use crate::parser::{ParseSession, QualityReport, QualityValidator};
use crate::rules::{RuleMatches, RuleSet, RuleStore};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Identify,
    Extract,
    Validate,
    LoadRules,
    GenerateRules,
    PersistRules,
    ApplyRules,
    OptimizeRules,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Identify => "identify",
            Stage::Extract => "extract",
            Stage::Validate => "validate",
            Stage::LoadRules => "load_rules",
            Stage::GenerateRules => "generate_rules",
            Stage::PersistRules => "persist_rules",
            Stage::ApplyRules => "apply_rules",
            Stage::OptimizeRules => "optimize_rules",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened in one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub succeeded: bool,
    pub message: String,
}

impl StageOutcome {
    fn ok(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            succeeded: true,
            message: message.into(),
        }
    }

    fn failed(stage: Stage, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("Stage {} failed: {}", stage, message);
        Self {
            stage,
            succeeded: false,
            message,
        }
    }
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub metadata: DeviceMetadata,
    pub device_info: DeviceInfo,
    pub interfaces: Vec<InterfaceRecord>,
    pub quality: QualityReport,
    pub ruleset: Option<RuleSet>,
    pub matches: RuleMatches,
    pub rules_path: Option<PathBuf>,
    pub stages: Vec<StageOutcome>,
}

impl PipelineReport {
    /// Whether every stage that ran succeeded.
    pub fn succeeded(&self) -> bool {
        self.stages.iter().all(|s| s.succeeded)
    }

    /// Outcome of a stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Snapshot for JSON or CSV export.
    pub fn to_export(&self) -> ExportRecord {
        ExportRecord::new(
            self.metadata.clone(),
            self.device_info.clone(),
            self.interfaces.clone(),
        )
    }
}

/// A configured parse pipeline. Reusable across inputs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ParserConfig,
    store: RuleStore,
    validator: QualityValidator,
    metadata: Option<DeviceMetadata>,
    rule_key: Option<String>,
    load_rules: bool,
    persist_rules: bool,
    apply_rules: bool,
    optimize_samples: Vec<String>,
}

impl Pipeline {
    /// Start building a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The parser configuration in use.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The rule store in use.
    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Read a config file and run the pipeline over it.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<PipelineReport> {
        let path = path.as_ref();
        info!("Parsing {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| Error::Input {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.run(&text))
    }

    /// Run the pipeline over a config text.
    pub fn run(&self, text: &str) -> PipelineReport {
        let session = match &self.metadata {
            Some(metadata) => ParseSession::with_metadata(text, metadata.clone()),
            None => ParseSession::new(text),
        };
        self.run_session(session)
    }

    fn run_session(&self, mut session: ParseSession) -> PipelineReport {
        let mut stages = Vec::new();

        let metadata = session.identify().clone();
        stages.push(if metadata.is_recognized() {
            StageOutcome::ok(
                Stage::Identify,
                format!("{} {}", metadata.vendor, metadata.device_type),
            )
        } else {
            StageOutcome::ok(Stage::Identify, "vendor not recognized")
        });

        let (_, interfaces) = session.extract();
        stages.push(StageOutcome::ok(
            Stage::Extract,
            format!("{} interfaces", interfaces.len()),
        ));

        let quality = session.validate(&self.validator);
        debug!(
            "Quality score {:.2} ({} warnings)",
            quality.score,
            quality.warnings.len()
        );
        stages.push(StageOutcome::ok(
            Stage::Validate,
            format!("score {:.2}", quality.score),
        ));

        let key = self.rule_key.clone().unwrap_or_else(|| metadata.slug());
        self.prepare_rules(&mut session, &key, &mut stages);

        let mut rules_path = None;
        if self.persist_rules {
            match session.persist_rules(&self.store, Some(&key)) {
                Ok(path) => {
                    stages.push(StageOutcome::ok(
                        Stage::PersistRules,
                        path.display().to_string(),
                    ));
                    rules_path = Some(path);
                }
                Err(e) => stages.push(StageOutcome::failed(Stage::PersistRules, e.to_string())),
            }
        }

        let mut matches = RuleMatches::new();
        if self.apply_rules {
            match session.apply_rules() {
                Ok(found) => {
                    let total: usize = found.values().map(Vec::len).sum();
                    stages.push(StageOutcome::ok(
                        Stage::ApplyRules,
                        format!("{total} matches across {} fields", found.len()),
                    ));
                    matches = found;
                }
                Err(e) => stages.push(StageOutcome::failed(Stage::ApplyRules, e.to_string())),
            }
        }

        if !self.optimize_samples.is_empty() {
            let before = session.ruleset().map(|rs| rs.version.clone());
            let after = session.optimize_rules(&self.optimize_samples).version.clone();
            let message = if before.as_deref() == Some(after.as_str()) {
                format!("unchanged at {after}")
            } else {
                format!("version {after}")
            };
            stages.push(StageOutcome::ok(Stage::OptimizeRules, message));
        }

        PipelineReport {
            metadata,
            device_info: session.device_info().clone(),
            interfaces: session.interfaces().to_vec(),
            quality,
            ruleset: session.ruleset().cloned(),
            matches,
            rules_path,
            stages,
        }
    }

    /// Load the stored rule set for `key` if asked to, else generate one.
    fn prepare_rules(&self, session: &mut ParseSession, key: &str, stages: &mut Vec<StageOutcome>) {
        if self.load_rules {
            match session.load_rules(&self.store, key) {
                Ok(true) => {
                    stages.push(StageOutcome::ok(Stage::LoadRules, key));
                    return;
                }
                Ok(false) => {
                    stages.push(StageOutcome::ok(Stage::LoadRules, format!("no rules stored for {key}")));
                }
                Err(e) => stages.push(StageOutcome::failed(Stage::LoadRules, e.to_string())),
            }
        }

        let ruleset = RuleSet::generate(session.metadata()).with_version(self.config.rule_version.clone());
        let count = ruleset.patterns.len();
        session.set_ruleset(ruleset);
        stages.push(StageOutcome::ok(
            Stage::GenerateRules,
            format!("{count} patterns"),
        ));
    }
}
