//! Parsing stages: identify, extract, validate.
//!
//! Each stage is a free function over plain data so it can be called on
//! its own; [`ParseSession`] strings them together over one input.

mod extract;
mod identify;
mod session;
mod validate;

pub use extract::{extract, extract_device_info, extract_interfaces, parse_block};
pub use identify::{DEVICE_TYPE_KEYWORDS, MODEL_PATTERNS, identify, identify_with};
pub use session::ParseSession;
pub use validate::{
    DEFAULT_QUALITY_THRESHOLD, QualityReport, QualityValidator, is_valid_hostname, is_valid_ipv4,
    validate,
};
