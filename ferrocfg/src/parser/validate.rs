//! Extraction quality scoring.

use serde::{Deserialize, Serialize};

use crate::model::{DeviceInfo, InterfaceRecord};

/// Default minimum score for a valid extraction.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.9;

/// Result of a quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// `score >= threshold` and no warnings.
    pub is_valid: bool,

    /// `filled_fields / total_fields`, 0.0 when nothing was counted.
    pub score: f64,

    /// Device info warnings first, then interfaces in discovery order.
    pub warnings: Vec<String>,

    /// Fields present and well-formed.
    pub filled_fields: usize,

    /// Fields counted.
    pub total_fields: usize,
}

/// Scores completeness and format correctness of extracted data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityValidator {
    threshold: f64,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY_THRESHOLD)
    }
}

impl QualityValidator {
    /// Create a validator with the given threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The threshold in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score the extracted device info and interfaces.
    ///
    /// Required device fields are hostname and management IP. Every
    /// interface counts one unit for its name and one more if it declares
    /// an IP address.
    pub fn validate(&self, device_info: &DeviceInfo, interfaces: &[InterfaceRecord]) -> QualityReport {
        let mut warnings = Vec::new();
        let mut filled = 0;
        let mut total = 0;

        let required: [(&str, &str, fn(&str) -> bool, &str); 2] = [
            ("hostname", &device_info.hostname, is_valid_hostname, "Invalid hostname format"),
            ("management_ip", &device_info.management_ip, is_valid_ipv4, "Invalid IP format"),
        ];

        for (field, value, check, invalid) in required {
            total += 1;
            if value.trim().is_empty() {
                warnings.push(format!("Missing required field: device_info.{field}"));
            } else if !check(value) {
                warnings.push(format!("{invalid}: {value}"));
            } else {
                filled += 1;
            }
        }

        for (idx, interface) in interfaces.iter().enumerate() {
            total += 1;
            if interface.name.is_empty() {
                warnings.push(format!("Interface {idx}: Missing interface name"));
            } else {
                filled += 1;
            }

            if !interface.ip_address.is_empty() {
                total += 1;
                if is_valid_ipv4(&interface.ip_address) {
                    filled += 1;
                } else {
                    let label = if interface.name.is_empty() {
                        idx.to_string()
                    } else {
                        interface.name.clone()
                    };
                    warnings.push(format!("Interface {label}: Invalid IP address"));
                }
            }
        }

        let score = if total > 0 {
            filled as f64 / total as f64
        } else {
            0.0
        };

        QualityReport {
            is_valid: score >= self.threshold && warnings.is_empty(),
            score,
            warnings,
            filled_fields: filled,
            total_fields: total,
        }
    }
}

/// Validate with the default threshold.
pub fn validate(device_info: &DeviceInfo, interfaces: &[InterfaceRecord]) -> QualityReport {
    QualityValidator::default().validate(device_info, interfaces)
}

/// A letter followed by at most 62 letters, digits or hyphens.
pub fn is_valid_hostname(hostname: &str) -> bool {
    let mut chars = hostname.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && hostname.len() <= 63
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Four dot-separated decimal octets, each in 0..=255.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let octets: Vec<&str> = ip.split('.').collect();
    octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InterfaceStatus;

    fn info(hostname: &str, ip: &str) -> DeviceInfo {
        DeviceInfo {
            hostname: hostname.to_string(),
            management_ip: ip.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ipv4_validation() {
        assert!(is_valid_ipv4("192.168.1.1"));
        assert!(is_valid_ipv4("0.0.0.0"));
        assert!(is_valid_ipv4("010.001.0.255"));
        assert!(!is_valid_ipv4("192.168.1.256"));
        assert!(!is_valid_ipv4("10.0.0"));
        assert!(!is_valid_ipv4("10.0.0.1.5"));
        assert!(!is_valid_ipv4("10.0.0.x"));
        assert!(!is_valid_ipv4("10.0..1"));
        assert!(!is_valid_ipv4("1000.0.0.1"));
    }

    #[test]
    fn test_hostname_validation() {
        assert!(is_valid_hostname("SW-CORE-01"));
        assert!(is_valid_hostname("r"));
        assert!(is_valid_hostname(&format!("a{}", "b".repeat(62))));
        assert!(!is_valid_hostname(&format!("a{}", "b".repeat(63))));
        assert!(!is_valid_hostname("1router"));
        assert!(!is_valid_hostname("core_sw"));
        assert!(!is_valid_hostname("mx-edge.lab"));
        assert!(!is_valid_hostname(""));
    }

    #[test]
    fn test_complete_extraction_is_valid() {
        let interfaces = vec![InterfaceRecord {
            name: "Gi0/1".to_string(),
            ip_address: "192.168.1.1".to_string(),
            subnet_mask: "255.255.255.0".to_string(),
            status: InterfaceStatus::Up,
            description: String::new(),
        }];
        let report = validate(&info("SW-CORE-01", "192.168.1.1"), &interfaces);
        assert!(report.is_valid);
        assert_eq!(report.score, 1.0);
        assert_eq!(report.total_fields, 4);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_no_interfaces_counts_only_device_fields() {
        let report = validate(&info("R1", ""), &[]);
        assert_eq!(report.total_fields, 2);
        assert_eq!(report.filled_fields, 1);
        assert_eq!(report.score, 0.5);
        assert!(!report.is_valid);
        assert_eq!(
            report.warnings,
            vec!["Missing required field: device_info.management_ip"]
        );
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let report = QualityValidator::new(0.0).validate(&DeviceInfo::default(), &[]);
        assert_eq!(report.total_fields, 2);
        assert_eq!(report.score, 0.0);
        // Threshold met, but warnings still make it invalid
        assert!(!report.is_valid);
    }

    #[test]
    fn test_warning_order() {
        let interfaces = vec![
            InterfaceRecord {
                ip_address: "10.0.0.300".to_string(),
                ..Default::default()
            },
            InterfaceRecord {
                name: "Gi0/2".to_string(),
                ip_address: "10.0.0".to_string(),
                ..Default::default()
            },
        ];
        let report = validate(&info("9bad", "1.2.3.4"), &interfaces);
        assert_eq!(
            report.warnings,
            vec![
                "Invalid hostname format: 9bad",
                "Interface 0: Missing interface name",
                "Interface 0: Invalid IP address",
                "Interface Gi0/2: Invalid IP address",
            ]
        );
        assert_eq!(report.total_fields, 6);
        assert_eq!(report.filled_fields, 2);
    }

    #[test]
    fn test_score_alone_does_not_imply_validity() {
        // 10 of 11 fields valid meets 0.9, but there is a warning
        let mut interfaces: Vec<InterfaceRecord> =
            (0..8).map(|i| InterfaceRecord::new(format!("Gi0/{i}"))).collect();
        interfaces[0].ip_address = "999.0.0.1".to_string();
        let report = validate(&info("R1", "10.0.0.1"), &interfaces);
        assert_eq!(report.total_fields, 11);
        assert_eq!(report.filled_fields, 10);
        assert!(report.score >= DEFAULT_QUALITY_THRESHOLD);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_deterministic() {
        let interfaces = vec![InterfaceRecord::new("Gi0/1")];
        let a = validate(&info("R1", "10.0.0.256"), &interfaces);
        let b = validate(&info("R1", "10.0.0.256"), &interfaces);
        assert_eq!(a, b);
    }
}
