//! Adaptive repair of rule sets from failure samples.

use log::{debug, info};

use super::ruleset::RuleSet;
use crate::pattern;

/// Alternative hostname patterns, tried in order.
const HOSTNAME_CANDIDATES: &[&str] = &[
    r"hostname\s+(?P<hostname>\S+)",
    r"sysname\s+(?P<hostname>\S+)",
    r#"set-system-hostname\s+"?(?P<hostname>\S+)"?"#,
    r"host-name\s+(?P<hostname>\S+)",
];

/// Candidate replacement patterns registered for a field.
pub fn candidates(field: &str) -> &'static [&'static str] {
    match field {
        "hostname" => HOSTNAME_CANDIDATES,
        _ => &[],
    }
}

/// Repair patterns that fail on the given samples.
///
/// For each sample, every field whose current pattern does not match gets
/// the first registered candidate that does. Fields without candidates keep
/// their pattern. The patch version is bumped only if the final pattern map
/// differs from the input, so re-running with the same samples is a no-op.
pub fn optimize<S: AsRef<str>>(ruleset: &RuleSet, failed_samples: &[S]) -> RuleSet {
    let mut optimized = ruleset.clone();

    for sample in failed_samples {
        let sample = sample.as_ref();
        for (field, current) in optimized.patterns.iter_mut() {
            if matches(current, sample) {
                continue;
            }
            match candidates(field).iter().find(|c| matches(c, sample)) {
                Some(candidate) => {
                    debug!("Adopting candidate for '{}': {}", field, candidate);
                    *current = candidate.to_string();
                }
                None => debug!("No candidate for '{}' matches the sample", field),
            }
        }
    }

    if optimized.patterns != ruleset.patterns {
        optimized.version = bump_patch(&ruleset.version);
        info!(
            "Optimized rule set {} to version {}",
            optimized.key(),
            optimized.version
        );
    }

    optimized
}

/// An invalid pattern counts as not matching.
fn matches(p: &str, sample: &str) -> bool {
    pattern::compiled(p).is_ok_and(|re| re.is_match(sample))
}

/// `1.0.0` -> `1.0.1`; versions without a numeric tail get `.1` appended.
fn bump_patch(version: &str) -> String {
    match version.rsplit_once('.') {
        Some((head, tail)) => match tail.parse::<u64>() {
            Ok(n) => format!("{head}.{}", n + 1),
            Err(_) => format!("{version}.1"),
        },
        None => match version.parse::<u64>() {
            Ok(n) => (n + 1).to_string(),
            Err(_) => format!("{version}.1"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceMetadata;
    use crate::vendor::Vendor;

    fn cisco_rules() -> RuleSet {
        RuleSet::generate(&DeviceMetadata {
            vendor: Vendor::Cisco,
            device_type: "Router".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_adopts_first_matching_candidate() {
        let rules = cisco_rules();
        let optimized = optimize(&rules, &["sysname HW-CORE\n"]);
        assert_eq!(optimized.patterns["hostname"], r"sysname\s+(?P<hostname>\S+)");
        assert_eq!(optimized.version, "1.0.1");
    }

    #[test]
    fn test_fields_without_candidates_keep_pattern() {
        let rules = cisco_rules();
        let optimized = optimize(&rules, &["sysname HW-CORE\n"]);
        // vlan fails on the sample but has no candidates
        assert_eq!(optimized.patterns["vlan"], rules.patterns["vlan"]);
        assert_eq!(optimized.patterns.len(), rules.patterns.len());
    }

    #[test]
    fn test_idempotent_after_adoption() {
        let samples = ["host-name mx-edge-01;\n"];
        let once = optimize(&cisco_rules(), &samples);
        let twice = optimize(&once, &samples);
        assert_eq!(once.patterns, twice.patterns);
        assert_eq!(once.version, twice.version);
        assert_eq!(twice.patterns["hostname"], r"host-name\s+(?P<hostname>\S+)");
    }

    #[test]
    fn test_no_candidate_matches_leaves_ruleset_unchanged() {
        let rules = cisco_rules();
        let optimized = optimize(&rules, &["nothing useful here"]);
        assert_eq!(optimized, rules);
    }

    #[test]
    fn test_matching_sample_changes_nothing() {
        let rules = cisco_rules();
        let optimized = optimize(&rules, &["hostname R1\n"]);
        assert_eq!(optimized.patterns["hostname"], rules.patterns["hostname"]);
    }

    #[test]
    fn test_invalid_pattern_is_repaired() {
        let mut rules = cisco_rules();
        rules.patterns.insert("hostname".to_string(), r"hostname\s+(".to_string());
        let optimized = optimize(&rules, &["hostname R1\n"]);
        assert_eq!(optimized.patterns["hostname"], r"hostname\s+(?P<hostname>\S+)");
    }

    #[test]
    fn test_bump_patch() {
        assert_eq!(bump_patch("1.0.0"), "1.0.1");
        assert_eq!(bump_patch("2.3.9"), "2.3.10");
        assert_eq!(bump_patch("7"), "8");
        assert_eq!(bump_patch("1.0-beta"), "1.0-beta.1");
    }
}
