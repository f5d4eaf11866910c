//! Rule set management.
//!
//! Rule sets map field names to pattern strings for one (vendor, device
//! type) pair. They are generated from vendor templates, persisted as YAML
//! documents, applied to raw text, and repaired from failure samples.

mod optimize;
mod ruleset;
mod store;

pub use optimize::{candidates, optimize};
pub use ruleset::{
    DEFAULT_RULE_VERSION, Patterns, RuleMatch, RuleMatches, RuleSet, apply, generate,
};
pub use store::RuleStore;
