//! Device identification from raw configuration text.

use log::debug;

use crate::model::DeviceMetadata;
use crate::pattern;
use crate::vendor::VendorRegistry;

/// Device type keywords, in priority order.
///
/// Searched as written over the lowercased text, so keywords with
/// uppercase letters never match.
pub const DEVICE_TYPE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Router", &["router", "serial", "WAN"]),
    (
        "Switch",
        &["switch", "vlan", "trunk", r"interface\s+GigabitEthernet"],
    ),
    ("Firewall", &["firewall", "security-zone", "policy"]),
    ("Load Balancer", &["load-balance", "slb", "serverfarm"]),
];

/// Model patterns, in priority order. The whole match is the model.
pub const MODEL_PATTERNS: &[&str] = &[r"Catalyst\s+(\S+)", r"NE\d+E?", r"S\d+", r"MX\d+", r"SRG\d+"];

/// Identify vendor, type, model, version and format using the built-in vendors.
pub fn identify(text: &str) -> DeviceMetadata {
    identify_with(VendorRegistry::global(), text)
}

/// Identify against a specific registry.
///
/// Vendors are tried in registration order; the first with any matching
/// fingerprint wins. An unrecognized config yields empty metadata.
pub fn identify_with(registry: &VendorRegistry, text: &str) -> DeviceMetadata {
    for definition in registry.definitions() {
        let Some(fingerprint) = definition.match_fingerprint(text) else {
            continue;
        };

        let software_version = definition
            .version_pattern
            .as_deref()
            .and_then(|p| pattern::first_capture(p, text))
            .unwrap_or_default();

        let metadata = DeviceMetadata {
            vendor: definition.vendor,
            device_type: device_type(text),
            model: model(text),
            software_version,
            config_format: fingerprint.label.clone(),
        };

        debug!(
            "Identified {} ({}) type={:?} model={:?} version={:?}",
            metadata.vendor,
            metadata.config_format,
            metadata.device_type,
            metadata.model,
            metadata.software_version
        );
        return metadata;
    }

    debug!("No vendor fingerprint matched");
    DeviceMetadata::default()
}

/// First device type with any keyword present, or empty.
fn device_type(text: &str) -> String {
    let folded = text.to_lowercase();
    DEVICE_TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| pattern::is_match(kw, &folded)))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

/// Whole span of the first matching model pattern, or empty.
fn model(text: &str) -> String {
    MODEL_PATTERNS
        .iter()
        .find_map(|p| {
            pattern::compiled_or_log(&format!("(?i){p}"))?
                .find(text)
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::{Vendor, VendorDefinition};

    const CISCO_SWITCH: &str = "\
hostname SW-CORE-01
!
interface GigabitEthernet0/1
 description Uplink to Core
 ip address 192.168.1.1 255.255.255.0
 no shutdown
!
vlan 10
 name SALES
!
";

    #[test]
    fn test_identify_cisco_switch() {
        let metadata = identify(CISCO_SWITCH);
        assert_eq!(metadata.vendor, Vendor::Cisco);
        assert_eq!(metadata.config_format, "Cisco IOS");
        assert_eq!(metadata.device_type, "Switch");
        assert_eq!(metadata.software_version, "");
    }

    #[test]
    fn test_identify_unknown_is_empty() {
        let metadata = identify("this is not a device config\n");
        assert_eq!(metadata, DeviceMetadata::default());
        assert!(!metadata.is_recognized());
    }

    #[test]
    fn test_identify_empty_text() {
        assert_eq!(identify(""), DeviceMetadata::default());
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        // Matches both Cisco and Ruijie fingerprints; Cisco is declared first
        let metadata = identify("hostname RG-S5750\n");
        assert_eq!(metadata.vendor, Vendor::Cisco);
    }

    #[test]
    fn test_identify_huawei_by_separator() {
        let text = "#\nsysname HW-AGG-01\n#\n version 5.170\n#\nreturn\n";
        let metadata = identify(text);
        assert_eq!(metadata.vendor, Vendor::Huawei);
        assert_eq!(metadata.config_format, "Huawei VRP");
        assert_eq!(metadata.software_version, "5.170");
    }

    #[test]
    fn test_identify_juniper() {
        let text = "set system host-name mx-edge-01\nset routing-options router-id 10.0.0.1\n";
        let metadata = identify(text);
        assert_eq!(metadata.vendor, Vendor::Juniper);
        assert_eq!(metadata.device_type, "Router");
    }

    #[test]
    fn test_version_and_model() {
        let text = "version 15.2\nhostname R1\n! Catalyst 3850 stack\n";
        let metadata = identify(text);
        assert_eq!(metadata.software_version, "15.2");
        assert_eq!(metadata.model, "Catalyst 3850");
    }

    #[test]
    fn test_device_type_priority() {
        // Both router and switch keywords present: Router wins
        let text = "hostname X\nrouter ospf 1\nvlan 20\n";
        assert_eq!(identify(text).device_type, "Router");

        // Case-folded matching
        let text = "hostname X\nFIREWALL enable\n";
        assert_eq!(identify(text).device_type, "Firewall");

        let text = "hostname X\nslb server-farm WEB\n";
        assert_eq!(identify(text).device_type, "Load Balancer");
    }

    #[test]
    fn test_uppercase_keywords_never_match() {
        // "WAN" is searched against lowercased text, so vlan decides
        let text = "hostname X\ndescription WAN uplink\nvlan 10\n";
        assert_eq!(identify(text).device_type, "Switch");

        let text = "hostname X\ninterface GigabitEthernet0/1\n";
        assert_eq!(identify(text).device_type, "");
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = VendorRegistry::new();
        registry.register(
            VendorDefinition::new(Vendor::Ruijie).with_fingerprint(r"(?m)^hostname", "Ruijie OS"),
        );
        let metadata = identify_with(&registry, "hostname RG-S5750\n");
        assert_eq!(metadata.vendor, Vendor::Ruijie);
        assert_eq!(metadata.config_format, "Ruijie OS");
    }
}
