//! # Ferrocfg
//!
//! Multi-vendor network device configuration parser.
//!
//! Ferrocfg takes the raw text of a router or switch configuration and
//! turns it into structured device data: which vendor and device family it
//! came from, the device's identity, and its interfaces. Extraction is
//! driven by per-vendor definitions and by rule sets that can be persisted,
//! reloaded, and repaired from failure samples.
//!
//! ## Features
//!
//! - Vendor identification (Cisco, Huawei, H3C, Juniper, Ruijie)
//! - Device and interface extraction with quality scoring
//! - YAML rule sets: generate, persist, load, apply, optimize
//! - JSON and CSV export
//! - Collaborator contracts for hosted extraction services and record stores
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrocfg::Pipeline;
//!
//! # fn main() -> Result<(), ferrocfg::Error> {
//! let config = "\
//! hostname SW-CORE-01
//! !
//! interface GigabitEthernet0/1
//!  description Uplink to Core
//!  ip address 192.168.1.1 255.255.255.0
//!  no shutdown
//! !
//! ";
//!
//! let pipeline = Pipeline::builder().apply_rules(true).build()?;
//! let report = pipeline.run(config);
//!
//! assert_eq!(report.device_info.hostname, "SW-CORE-01");
//! assert_eq!(report.interfaces[0].ip_address, "192.168.1.1");
//! assert!(report.quality.is_valid);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod pattern;
pub mod pipeline;
pub mod records;
pub mod rules;
pub mod service;
pub mod vendor;

// Re-export main types for convenience
pub use config::{ParserConfig, ServiceConfig};
pub use error::Error;
pub use export::ExportRecord;
pub use model::{DeviceInfo, DeviceMetadata, InterfaceRecord, InterfaceStatus};
pub use parser::{ParseSession, QualityReport, QualityValidator};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineReport, Stage, StageOutcome};
pub use rules::{RuleSet, RuleStore};
pub use vendor::{Vendor, VendorDefinition, VendorRegistry};
