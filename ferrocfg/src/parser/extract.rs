//! Field extraction: device facts and interface blocks.

use log::debug;

use crate::model::{DeviceInfo, DeviceMetadata, InterfaceRecord, InterfaceStatus};
use crate::pattern;

/// Colon pairs, dot pairs, or dot quads.
pub const MAC_PATTERN: &str = concat!(
    r"([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}",
    r"|([0-9A-Fa-f]{2}\.){5}[0-9A-Fa-f]{2}",
    r"|([0-9A-Fa-f]{4}\.){2}[0-9A-Fa-f]{4}",
);

/// Two labeled serial notations; exactly one group is set per match.
pub const SERIAL_PATTERN: &str =
    r"(?i)System\s+[Ss]erial\s+[Nn]umber\s*:\s*(\S+)|Processor\s+board ID\s+(\S+)";

/// First configured address, taken as the management address.
pub const MANAGEMENT_IP_PATTERN: &str = r"ip\s+address\s+(\d+\.\d+\.\d+\.\d+)";

/// Address and mask inside an interface block. Both are required.
pub const INTERFACE_IP_PATTERN: &str = r"ip\s+address\s+(\d+\.\d+\.\d+\.\d+)\s+(\S+)";

/// Remainder of a description line.
pub const DESCRIPTION_PATTERN: &str = r"description\s+(\S.*)";

/// Extract device facts and interfaces for an identified device.
///
/// Every field degrades to empty on a miss; unknown vendors get no
/// hostname and no interfaces.
pub fn extract(text: &str, metadata: &DeviceMetadata) -> (DeviceInfo, Vec<InterfaceRecord>) {
    (
        extract_device_info(text, metadata),
        extract_interfaces(text, metadata),
    )
}

/// Extract hostname, MAC, serial number and management IP.
pub fn extract_device_info(text: &str, metadata: &DeviceMetadata) -> DeviceInfo {
    let hostname = metadata
        .vendor
        .definition()
        .and_then(|def| def.hostname_pattern.as_deref())
        .and_then(|p| pattern::first_capture(p, text))
        .unwrap_or_default();

    let mac_address = pattern::compiled_or_log(MAC_PATTERN)
        .and_then(|re| re.find(text).map(|m| m.as_str().to_string()))
        .unwrap_or_default();

    let serial_number = pattern::compiled_or_log(SERIAL_PATTERN)
        .and_then(|re| {
            let caps = re.captures(text)?;
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_default();

    // Heuristic: the first "ip address" in the file is the management one.
    let management_ip = pattern::first_capture(MANAGEMENT_IP_PATTERN, text).unwrap_or_default();

    DeviceInfo {
        hostname,
        management_ip,
        mac_address,
        serial_number,
    }
}

/// Split the config into interface blocks and parse each one.
pub fn extract_interfaces(text: &str, metadata: &DeviceMetadata) -> Vec<InterfaceRecord> {
    let Some(blocks) = metadata
        .vendor
        .definition()
        .and_then(|def| def.interface_blocks.as_ref())
    else {
        debug!("No interface block pattern for vendor {:?}", metadata.vendor);
        return Vec::new();
    };

    let interfaces: Vec<InterfaceRecord> = blocks
        .split(text)
        .into_iter()
        .map(|block| parse_block(block.name, block.body))
        .collect();

    debug!("Extracted {} interface blocks", interfaces.len());
    interfaces
}

/// Parse one interface block body.
pub fn parse_block(name: &str, body: &str) -> InterfaceRecord {
    let mut record = InterfaceRecord::new(name);

    if let Some(caps) =
        pattern::compiled_or_log(INTERFACE_IP_PATTERN).and_then(|re| re.captures(body))
    {
        record.ip_address = caps[1].to_string();
        record.subnet_mask = caps[2].to_string();
    }

    if let Some(description) = pattern::first_capture(DESCRIPTION_PATTERN, body) {
        record.description = description.trim().to_string();
    }

    record.status = status_of(body);
    record
}

/// "no shutdown" or "enable" means up; a bare "shutdown" means down.
fn status_of(body: &str) -> InterfaceStatus {
    if body.contains("no shutdown") || body.contains("enable") {
        InterfaceStatus::Up
    } else if body.contains("shutdown") {
        InterfaceStatus::Down
    } else {
        InterfaceStatus::Unset
    }
}
