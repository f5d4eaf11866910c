//! Compiled pattern cache.
//!
//! Patterns are stored as plain strings so rule documents stay
//! serializable. Each distinct string is compiled once per process and
//! shared from here afterwards.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;

/// Global compiled-pattern cache.
static CACHE: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Compile a pattern, reusing a cached copy when one exists.
///
/// `Regex` clones share the compiled program, so returning by value is cheap.
pub fn compiled(pattern: &str) -> Result<Regex, regex::Error> {
    if let Ok(cache) = CACHE.read() {
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }
    }

    let regex = Regex::new(pattern)?;

    // A poisoned lock only costs us the cache entry.
    if let Ok(mut cache) = CACHE.write() {
        cache.entry(pattern.to_string()).or_insert_with(|| regex.clone());
    }

    Ok(regex)
}

/// Like [`compiled`], but logs and swallows compile errors.
///
/// Used by the built-in vendor tables, where a bad pattern should degrade
/// to "no match" instead of aborting identification or extraction.
pub fn compiled_or_log(pattern: &str) -> Option<Regex> {
    match compiled(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Skipping invalid pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// First capture group of the first match, if any.
pub fn first_capture(pattern: &str, text: &str) -> Option<String> {
    compiled_or_log(pattern)?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether the pattern matches anywhere in the text.
pub fn is_match(pattern: &str, text: &str) -> bool {
    compiled_or_log(pattern).is_some_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_reuses_cache() {
        let a = compiled(r"hostname\s+(\S+)").unwrap();
        let b = compiled(r"hostname\s+(\S+)").unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert!(CACHE.read().unwrap().contains_key(r"hostname\s+(\S+)"));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(compiled(r"interface\s+(").is_err());
        assert!(compiled_or_log(r"interface\s+(").is_none());
        assert!(!is_match(r"interface\s+(", "interface Gi0/1"));
    }

    #[test]
    fn test_first_capture() {
        assert_eq!(
            first_capture(r"sysname\s+(\S+)", "#\nsysname CORE-A\n#"),
            Some("CORE-A".to_string())
        );
        assert_eq!(first_capture(r"sysname\s+(\S+)", "hostname R1"), None);
    }
}
