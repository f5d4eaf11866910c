//! Data model shared by every pipeline stage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vendor::Vendor;

/// Identifies a device family. Set once by identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMetadata {
    pub vendor: Vendor,
    pub device_type: String,
    pub model: String,
    pub software_version: String,
    pub config_format: String,
}

impl DeviceMetadata {
    /// Whether a vendor fingerprint matched.
    pub fn is_recognized(&self) -> bool {
        self.vendor.is_known()
    }

    /// Rule document key: `{vendor}_{device_type}`, lowercased, spaces as `_`.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.vendor, self.device_type)
            .to_lowercase()
            .replace(' ', "_")
    }
}

/// Facts about one device instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub hostname: String,
    pub management_ip: String,
    pub mac_address: String,
    pub serial_number: String,
}

/// Administrative state of an interface as configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterfaceStatus {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    /// Neither enabled nor shut down explicitly.
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl InterfaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceStatus::Up => "up",
            InterfaceStatus::Down => "down",
            InterfaceStatus::Unset => "",
        }
    }
}

impl fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered interface block.
///
/// `name` is the identity key downstream; uniqueness is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceRecord {
    pub name: String,
    pub ip_address: String,
    pub subnet_mask: String,
    pub status: InterfaceStatus,
    pub description: String,
}

impl InterfaceRecord {
    /// Create a record with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        let metadata = DeviceMetadata {
            vendor: Vendor::Cisco,
            device_type: "Load Balancer".to_string(),
            ..Default::default()
        };
        assert_eq!(metadata.slug(), "cisco_load_balancer");

        let metadata = DeviceMetadata {
            vendor: Vendor::H3c,
            device_type: "Switch".to_string(),
            ..Default::default()
        };
        assert_eq!(metadata.slug(), "h3c_switch");
    }

    #[test]
    fn test_unrecognized_metadata_is_empty() {
        let metadata = DeviceMetadata::default();
        assert!(!metadata.is_recognized());
        assert_eq!(metadata.slug(), "_");
    }

    #[test]
    fn test_interface_status_serialization() {
        let record = InterfaceRecord::new("Gi0/1");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "");

        let up: InterfaceStatus = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(up, InterfaceStatus::Up);
    }

    #[test]
    fn test_metadata_deserializes_partial_document() {
        let metadata: DeviceMetadata =
            serde_json::from_str(r#"{"vendor": "Huawei", "device_type": "Switch"}"#).unwrap();
        assert_eq!(metadata.vendor, Vendor::Huawei);
        assert_eq!(metadata.model, "");
    }
}
