//! Hosted extraction service collaborator.
//!
//! A hosted language model can extract far more than the regex stages do
//! (routing, VLAN tables, security policy). This module holds the contract
//! such a service must meet and the logic around it: prompt templating,
//! locating JSON in the answer, and scoring the result. No HTTP client is
//! shipped; callers plug one in through [`ExtractionService`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ferrocfg::service::{ExtractionService, ServiceExtractor, score_extracted};
//! use ferrocfg::error::ServiceError;
//!
//! struct MyClient;
//!
//! impl ExtractionService for MyClient {
//!     async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ServiceError> {
//!         Ok(r#"{"device_info": {"hostname": "R1"}}"#.to_string())
//!     }
//! }
//!
//! # async fn example() -> Result<(), ServiceError> {
//! let extractor = ServiceExtractor::new(MyClient);
//! let data = extractor.extract_full_config("hostname R1", "Cisco", "Router").await?;
//! let report = score_extracted(&data);
//! println!("score {:.2}", report.score);
//! # Ok(())
//! # }
//! ```

mod json;
mod score;

pub use json::extract_json;
pub use score::{SERVICE_QUALITY_THRESHOLD, score_extracted};

use std::future::Future;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::model::DeviceMetadata;
use crate::vendor::Vendor;

/// Placeholder replaced by the config text in instruction templates.
pub const CONFIG_PLACEHOLDER: &str = "{{CONFIG}}";

const SYSTEM_PROMPT: &str = "\
You are an expert in network device configuration.
You know the configuration syntax of the major vendors (Cisco, Huawei, H3C, Juniper and others).
Analyse the configuration file you are given and extract structured information from it.
Be accurate and complete. If an item is not configured, return null or an empty array.";

const JSON_SUFFIX: &str = "\n\nReturn the result as JSON, following the requested structure exactly.";

const IDENTIFY_TEMPLATE: &str = r#"Analyse the following network device configuration and identify the device.

Configuration:
```
{{CONFIG}}
```

Return this JSON object:
{
  "vendor": "Cisco/Huawei/H3C/Juniper/Ruijie/...",
  "device_type": "Router/Switch/Firewall/Load_Balancer/...",
  "model": "device model, if recognisable",
  "software_version": "software version",
  "config_format": "Cisco_IOS/Huawei_VRP/H3C_Comware/...",
  "confidence": "high/medium/low",
  "evidence": ["reason 1", "reason 2"]
}

Notes:
1. Identify the vendor from command syntax (Huawei uses "sysname", Cisco uses "hostname").
2. Routing protocols suggest a Router; VLAN tables suggest a Switch.
3. Give concrete evidence."#;

const FULL_CONFIG_TEMPLATE: &str = r#"Analyse the following {{VENDOR}} {{DEVICE_TYPE}} configuration and extract every key setting.

Configuration:
```
{{CONFIG}}
```

Return this JSON object:
{
  "device_info": {"hostname": "", "management_ip": "", "domain_name": "", "mac_address": "", "serial_number": "", "location": "", "contact_info": ""},
  "interfaces": [{"name": "", "type": "", "ip_address": "", "subnet_mask": "", "description": "", "status": "up/down/administratively_down", "duplex": "", "speed": "", "vlan_id": "", "ip_helper": [], "is_trunk": false, "allowed_vlans": "", "is_shutdown": false}],
  "routing": {
    "static_routes": [{"destination": "", "mask": "", "next_hop": "", "metric": ""}],
    "ospf": [{"process_id": "", "router_id": "", "areas": [{"area_id": "", "networks": []}]}],
    "bgp": [{"as_number": "", "router_id": "", "neighbors": [{"ip": "", "remote_as": "", "description": ""}], "networks": [], "redistribute": []}]
  },
  "vlans": [{"id": "", "name": "", "description": "", "interfaces": []}],
  "security": {
    "aaa": {"authentication": "", "authorization": "", "accounting": ""},
    "acl_rules": [{"name": "", "type": "standard/extended", "rules": []}],
    "firewall_rules": [{"from": "", "to": "", "policy": ""}]
  },
  "services": {
    "ntp": {"servers": [], "source_interface": ""},
    "snmp": {"community": [], "trap_hosts": []},
    "syslog": {"servers": [], "facility": ""},
    "dhcp": {"enabled": false, "pools": [{"name": "", "network": "", "mask": "", "default_router": "", "dns_servers": []}]}
  },
  "high_availability": {
    "hsrp": {"groups": [{"group_id": "", "virtual_ip": "", "priority": "", "authentication": ""}]},
    "vrrp": {"groups": [{"group_id": "", "virtual_ip": "", "priority": ""}]}
  },
  "qos": {"policies": [{"name": "", "type": "", "rules": []}]},
  "other_config": {"banner": "", "boot_config": "", "line_consoles": [], "line_vtys": []}
}

Notes:
1. Extract every item; do not skip any.
2. Return null or an empty array for items that are not configured.
3. Keep the configuration hierarchy.
4. Pay particular attention to routing protocols, VLANs and security settings."#;

/// A hosted text-completion service.
///
/// Implementations own transport, authentication and retries. The answer
/// is returned verbatim; JSON is located by the caller.
pub trait ExtractionService: Send + Sync {
    /// Complete `prompt` under `system_prompt`.
    fn complete(
        &self,
        system_prompt: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

/// What an extraction service reported about the device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentification {
    pub metadata: DeviceMetadata,
    pub confidence: String,
    pub evidence: Vec<String>,
}

/// Drives an [`ExtractionService`] with the built-in instruction templates.
#[derive(Debug)]
pub struct ServiceExtractor<S> {
    service: S,
    timeout: Duration,
}

impl<S: ExtractionService> ServiceExtractor<S> {
    /// Wrap a service with a 60 second per-call timeout.
    pub fn new(service: S) -> Self {
        Self {
            service,
            timeout: Duration::from_secs(60),
        }
    }

    /// Wrap a service using the timeout from `config`.
    ///
    /// Fails if the configuration has no API key.
    pub fn from_config(service: S, config: &ServiceConfig) -> Result<Self, ServiceError> {
        config.ensure_configured()?;
        Ok(Self::new(service).with_timeout(config.timeout))
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The wrapped service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fill `template` with the config text, call the service and parse the
    /// JSON it answers with.
    pub async fn parse_config(&self, config_text: &str, template: &str) -> Result<Value, ServiceError> {
        let mut prompt = template.replace(CONFIG_PLACEHOLDER, config_text);
        prompt.push_str(JSON_SUFFIX);

        debug!("Calling extraction service ({} prompt bytes)", prompt.len());
        let response = tokio::time::timeout(self.timeout, self.service.complete(SYSTEM_PROMPT, &prompt))
            .await
            .map_err(|_| ServiceError::Timeout(self.timeout))??;

        extract_json(&response)
    }

    /// Ask the service to identify the device.
    pub async fn identify_device(&self, config_text: &str) -> Result<DeviceIdentification, ServiceError> {
        let value = self.parse_config(config_text, IDENTIFY_TEMPLATE).await?;

        let text = |key: &str| value[key].as_str().unwrap_or_default().to_string();
        let metadata = DeviceMetadata {
            vendor: Vendor::parse(value["vendor"].as_str().unwrap_or_default()),
            device_type: text("device_type"),
            model: text("model"),
            software_version: text("software_version"),
            config_format: text("config_format"),
        };
        let evidence = value["evidence"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(DeviceIdentification {
            metadata,
            confidence: text("confidence"),
            evidence,
        })
    }

    /// Ask the service for the full structured configuration.
    pub async fn extract_full_config(
        &self,
        config_text: &str,
        vendor: &str,
        device_type: &str,
    ) -> Result<Value, ServiceError> {
        let template = FULL_CONFIG_TEMPLATE
            .replace("{{VENDOR}}", vendor)
            .replace("{{DEVICE_TYPE}}", device_type);
        self.parse_config(config_text, &template).await
    }
}
