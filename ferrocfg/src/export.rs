//! Export of parse results as nested JSON or a flat CSV row.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::model::{DeviceInfo, DeviceMetadata, InterfaceRecord};

/// CSV header. Every export has exactly one data row under it.
pub const CSV_HEADER: [&str; 7] = [
    "hostname",
    "management_ip",
    "mac_address",
    "serial_number",
    "device_type",
    "model",
    "vendor",
];

/// Snapshot of one device's parse result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub metadata: DeviceMetadata,
    pub device_info: DeviceInfo,
    pub interfaces: Vec<InterfaceRecord>,
    pub exported_at: DateTime<Utc>,
}

impl ExportRecord {
    /// Create a snapshot stamped with the current time.
    pub fn new(
        metadata: DeviceMetadata,
        device_info: DeviceInfo,
        interfaces: Vec<InterfaceRecord>,
    ) -> Self {
        Self {
            metadata,
            device_info,
            interfaces,
            exported_at: Utc::now(),
        }
    }

    /// Pretty-printed nested JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Header plus one data row.
    pub fn to_csv(&self) -> String {
        let row = [
            self.device_info.hostname.as_str(),
            self.device_info.management_ip.as_str(),
            self.device_info.mac_address.as_str(),
            self.device_info.serial_number.as_str(),
            self.metadata.device_type.as_str(),
            self.metadata.model.as_str(),
            self.metadata.vendor.as_str(),
        ];

        let mut out = CSV_HEADER.join(",");
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|field| csv_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
        out
    }

    /// Write the JSON export to a file.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Write the CSV export to a file.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        fs::write(path, self.to_csv())?;
        Ok(())
    }
}

/// Quote a field if it contains a delimiter, quote or line break.
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
