//! Quality scoring for service-extracted configuration documents.

use serde_json::Value;

use crate::parser::QualityReport;

/// Minimum score for a valid service extraction.
pub const SERVICE_QUALITY_THRESHOLD: f64 = 0.6;

const HOSTNAME_WEIGHT: f64 = 0.2;
const MANAGEMENT_IP_WEIGHT: f64 = 0.1;
const INTERFACES_WEIGHT: f64 = 0.2;
const ADDRESSED_INTERFACE_WEIGHT: f64 = 0.05;
const ROUTING_WEIGHT: f64 = 0.15;
const VLANS_WEIGHT: f64 = 0.1;
const SECURITY_WEIGHT: f64 = 0.1;
const SERVICES_WEIGHT: f64 = 0.1;

/// Score a full-config document returned by an extraction service.
///
/// Scores are additive per section present and clamped to 1.0.
/// `filled_fields` counts contributing checks; `total_fields` counts every
/// check made (seven sections plus one per interface).
pub fn score_extracted(data: &Value) -> QualityReport {
    let mut warnings = Vec::new();
    let mut score = 0.0;
    let mut filled = 0;
    let mut total = 0;

    let mut check = |present: bool, weight: f64, missing: Option<&str>| {
        total += 1;
        if present {
            score += weight;
            filled += 1;
        } else if let Some(message) = missing {
            warnings.push(message.to_string());
        }
    };

    let device_info = &data["device_info"];
    check(
        is_truthy(&device_info["hostname"]),
        HOSTNAME_WEIGHT,
        Some("Missing hostname"),
    );
    check(
        is_truthy(&device_info["management_ip"]),
        MANAGEMENT_IP_WEIGHT,
        Some("Missing management IP"),
    );

    let interfaces = data["interfaces"].as_array().map(Vec::as_slice).unwrap_or_default();
    check(
        !interfaces.is_empty(),
        INTERFACES_WEIGHT,
        Some("No interfaces found"),
    );
    for iface in interfaces {
        check(
            is_truthy(&iface["name"]) && is_truthy(&iface["ip_address"]),
            ADDRESSED_INTERFACE_WEIGHT,
            None,
        );
    }

    check(
        any_section(&data["routing"]),
        ROUTING_WEIGHT,
        Some("No routing configuration found"),
    );
    check(is_truthy(&data["vlans"]), VLANS_WEIGHT, None);
    check(any_section(&data["security"]), SECURITY_WEIGHT, None);
    check(any_section(&data["services"]), SERVICES_WEIGHT, None);

    let score = score.min(1.0);
    QualityReport {
        is_valid: score >= SERVICE_QUALITY_THRESHOLD,
        score,
        warnings,
        filled_fields: filled,
        total_fields: total,
    }
}

/// Non-null, non-zero, non-empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// An object section counts when any of its members is truthy.
fn any_section(value: &Value) -> bool {
    match value {
        Value::Object(members) => members.values().any(is_truthy),
        other => is_truthy(other),
    }
}
