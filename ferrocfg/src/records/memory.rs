//! In-process record store.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, info};

use super::{
    ConfigFile, ParseEvent, ParseStatistics, ParsedRecord, RecordStore, StoredRule, rule_category,
};
use crate::error::StoreError;
use crate::model::DeviceMetadata;
use crate::rules::RuleSet;

/// (vendor, device type, model, software version)
type MetadataKey = (String, String, String, String);

#[derive(Debug, Clone)]
struct MetadataRow {
    id: u64,
    metadata: DeviceMetadata,
}

#[derive(Debug, Clone)]
struct FileRow {
    id: u64,
    file: ConfigFile,
    metadata_id: u64,
    parsed_at: DateTime<Utc>,
    events: Vec<ParseEvent>,
}

#[derive(Debug, Clone)]
struct ResultRow {
    file_id: u64,
    parsed: ParsedRecord,
}

/// Record store held in memory. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    next_id: u64,
    metadata: IndexMap<MetadataKey, MetadataRow>,
    files: IndexMap<String, FileRow>,
    results: Vec<ResultRow>,
    rules: IndexMap<(u64, String), StoredRule>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct config files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of parse results.
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Parse results recorded for a file, oldest first.
    pub fn results_for(&self, content_hash: &str) -> Vec<&ParsedRecord> {
        let Some(file) = self.files.get(content_hash) else {
            return Vec::new();
        };
        self.results
            .iter()
            .filter(|r| r.file_id == file.id)
            .map(|r| &r.parsed)
            .collect()
    }

    /// When a file was last parsed.
    pub fn parsed_at(&self, content_hash: &str) -> Option<DateTime<Utc>> {
        self.files.get(content_hash).map(|f| f.parsed_at)
    }

    /// Parse log of a file, oldest first.
    pub fn events_for(&self, content_hash: &str) -> &[ParseEvent] {
        self.files
            .get(content_hash)
            .map(|f| f.events.as_slice())
            .unwrap_or_default()
    }

    /// Enable or disable a stored rule. Returns false if no such rule.
    pub fn set_rule_active(&mut self, metadata_id: u64, rule_name: &str, active: bool) -> bool {
        match self.rules.get_mut(&(metadata_id, rule_name.to_string())) {
            Some(rule) => {
                rule.is_active = active;
                true
            }
            None => false,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn upsert_metadata(&mut self, metadata: &DeviceMetadata) -> u64 {
        let key = (
            metadata.vendor.to_string(),
            metadata.device_type.clone(),
            metadata.model.clone(),
            metadata.software_version.clone(),
        );

        if let Some(row) = self.metadata.get(&key) {
            return row.id;
        }

        let id = self.allocate_id();
        self.metadata.insert(
            key,
            MetadataRow {
                id,
                metadata: metadata.clone(),
            },
        );
        id
    }

    fn metadata_by_id(&self, id: u64) -> Option<&DeviceMetadata> {
        self.metadata
            .values()
            .find(|row| row.id == id)
            .map(|row| &row.metadata)
    }
}

impl RecordStore for MemoryRecordStore {
    fn save_parse_result(
        &mut self,
        file: &ConfigFile,
        parsed: &ParsedRecord,
    ) -> Result<u64, StoreError> {
        if file.content.is_empty() {
            return Err(StoreError::Rejected {
                message: format!("config file '{}' is empty", file.file_name),
            });
        }

        let metadata_id = self.upsert_metadata(&parsed.metadata);

        let hash = file.content_hash();
        let file_id = match self.files.get_mut(&hash) {
            Some(row) => {
                debug!("Config file {} already stored as {}", &hash[..12], row.id);
                row.file.parse_status = file.parse_status.clone();
                row.parsed_at = Utc::now();
                row.id
            }
            None => {
                let id = self.allocate_id();
                self.files.insert(
                    hash,
                    FileRow {
                        id,
                        file: file.clone(),
                        metadata_id,
                        parsed_at: Utc::now(),
                        events: Vec::new(),
                    },
                );
                id
            }
        };

        let id = self.allocate_id();
        self.results.push(ResultRow {
            file_id,
            parsed: parsed.clone(),
        });
        info!("Saved parse result {} for {}", id, file.file_name);
        Ok(id)
    }

    fn save_rules(&mut self, ruleset: &RuleSet) -> Result<u64, StoreError> {
        let metadata_id = self.upsert_metadata(&ruleset.metadata);

        for (rule_name, pattern) in &ruleset.patterns {
            let key = (metadata_id, rule_name.clone());
            if let Some(rule) = self.rules.get_mut(&key) {
                rule.pattern = pattern.clone();
                continue;
            }

            let category = rule_category(rule_name);
            let id = self.allocate_id();
            self.rules.insert(
                key,
                StoredRule {
                    id,
                    metadata_id,
                    rule_name: rule_name.clone(),
                    category: category.to_string(),
                    pattern: pattern.clone(),
                    description: format!("Generated {category} rule"),
                    priority: 0,
                    is_active: true,
                    success_rate: None,
                },
            );
        }

        info!(
            "Saved {} rules for {}",
            ruleset.patterns.len(),
            ruleset.key()
        );
        Ok(metadata_id)
    }

    fn load_rules(&self, vendor: &str, device_type: &str) -> Result<Vec<StoredRule>, StoreError> {
        let mut rules: Vec<StoredRule> = self
            .rules
            .values()
            .filter(|rule| rule.is_active)
            .filter(|rule| {
                self.metadata_by_id(rule.metadata_id).is_some_and(|m| {
                    m.vendor.as_str() == vendor && m.device_type == device_type
                })
            })
            .cloned()
            .collect();

        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });
        Ok(rules)
    }

    fn log_parse_event(&mut self, file: &ConfigFile, event: ParseEvent) -> Result<(), StoreError> {
        let hash = file.content_hash();
        let Some(row) = self.files.get_mut(&hash) else {
            return Err(StoreError::Rejected {
                message: format!("config file '{}' has not been stored", file.file_name),
            });
        };
        debug!("Parse event for {}: {}", file.file_name, event.message);
        row.events.push(event);
        Ok(())
    }

    fn statistics(&self) -> Result<ParseStatistics, StoreError> {
        let mut stats = ParseStatistics {
            total_files: self.files.len(),
            ..Default::default()
        };

        for row in self.files.values() {
            *stats
                .status_distribution
                .entry(row.file.parse_status.clone())
                .or_default() += 1;

            if let Some(metadata) = self.metadata_by_id(row.metadata_id) {
                *stats
                    .vendor_distribution
                    .entry(metadata.vendor.to_string())
                    .or_default() += 1;
            }
        }
        stats.vendor_distribution.sort_by(|_, a, _, b| b.cmp(a));

        if !self.results.is_empty() {
            let total: f64 = self.results.iter().map(|r| r.parsed.quality.score).sum();
            stats.average_quality_score = total / self.results.len() as f64;
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::QualityReport;
    use crate::records::EventLevel;
    use crate::vendor::Vendor;

    fn metadata(vendor: Vendor, device_type: &str) -> DeviceMetadata {
        DeviceMetadata {
            vendor,
            device_type: device_type.to_string(),
            ..Default::default()
        }
    }

    fn parsed(vendor: Vendor, score: f64) -> ParsedRecord {
        ParsedRecord {
            metadata: metadata(vendor, "Switch"),
            device_info: Default::default(),
            interfaces: Vec::new(),
            quality: QualityReport {
                is_valid: score >= 0.9,
                score,
                warnings: Vec::new(),
                filled_fields: 0,
                total_fields: 0,
            },
        }
    }

    #[test]
    fn test_files_upsert_by_content_hash() {
        let mut store = MemoryRecordStore::new();
        let file = ConfigFile::new("sw.cfg", "/cfg/sw.cfg", "hostname SW\n");

        let first = store.save_parse_result(&file, &parsed(Vendor::Cisco, 1.0)).unwrap();
        let renamed = ConfigFile::new("copy.cfg", "/cfg/copy.cfg", "hostname SW\n").with_status("partial");
        let second = store.save_parse_result(&renamed, &parsed(Vendor::Cisco, 0.5)).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.file_count(), 1);
        assert_eq!(store.result_count(), 2);
        assert_eq!(store.results_for(&file.content_hash()).len(), 2);
        assert!(store.parsed_at(&file.content_hash()).is_some());

        let stats = store.statistics().unwrap();
        // The status follows the latest save
        assert_eq!(stats.status_distribution["partial"], 1);
        assert!(!stats.status_distribution.contains_key("success"));
    }

    #[test]
    fn test_empty_file_rejected() {
        let mut store = MemoryRecordStore::new();
        let err = store
            .save_parse_result(&ConfigFile::new("e", "e", ""), &parsed(Vendor::Cisco, 0.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        assert_eq!(store.file_count(), 0);
    }

    #[test]
    fn test_rules_upsert_and_order() {
        let mut store = MemoryRecordStore::new();
        let mut ruleset = RuleSet::generate(&metadata(Vendor::Cisco, "Switch"));

        let id = store.save_rules(&ruleset).unwrap();
        ruleset
            .patterns
            .insert("hostname".to_string(), r"sysname\s+(?P<hostname>\S+)".to_string());
        assert_eq!(store.save_rules(&ruleset).unwrap(), id);

        let rules = store.load_rules("Cisco", "Switch").unwrap();
        let names: Vec<&str> = rules.iter().map(|r| r.rule_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["description", "hostname", "interface", "ip_address", "vlan"]
        );
        assert_eq!(rules[1].pattern, r"sysname\s+(?P<hostname>\S+)");
        assert_eq!(rules[1].category, "hostname");
        assert!(rules.iter().all(|r| r.metadata_id == id));
    }

    #[test]
    fn test_rules_scoped_by_metadata() {
        let mut store = MemoryRecordStore::new();
        store
            .save_rules(&RuleSet::generate(&metadata(Vendor::Cisco, "Switch")))
            .unwrap();
        let huawei = store
            .save_rules(&RuleSet::generate(&metadata(Vendor::Huawei, "Switch")))
            .unwrap();

        let rules = store.load_rules("Huawei", "Switch").unwrap();
        assert_eq!(rules.len(), 5);
        assert!(rules.iter().all(|r| r.metadata_id == huawei));
        assert!(store.load_rules("Cisco", "Router").unwrap().is_empty());
    }

    #[test]
    fn test_inactive_rules_hidden() {
        let mut store = MemoryRecordStore::new();
        let id = store
            .save_rules(&RuleSet::generate(&metadata(Vendor::Cisco, "Switch")))
            .unwrap();

        assert!(store.set_rule_active(id, "vlan", false));
        assert!(!store.set_rule_active(id, "missing", false));
        let rules = store.load_rules("Cisco", "Switch").unwrap();
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| r.rule_name != "vlan"));
    }

    #[test]
    fn test_statistics() {
        let mut store = MemoryRecordStore::new();
        assert_eq!(store.statistics().unwrap(), ParseStatistics::default());

        store
            .save_parse_result(&ConfigFile::new("a", "a", "a"), &parsed(Vendor::Huawei, 1.0))
            .unwrap();
        store
            .save_parse_result(&ConfigFile::new("b", "b", "b"), &parsed(Vendor::Cisco, 0.5))
            .unwrap();
        store
            .save_parse_result(&ConfigFile::new("c", "c", "c"), &parsed(Vendor::Cisco, 0.0))
            .unwrap();

        let stats = store.statistics().unwrap();
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.status_distribution["success"], 3);
        assert_eq!(stats.average_quality_score, 0.5);
        let vendors: Vec<(&String, &usize)> = stats.vendor_distribution.iter().collect();
        assert_eq!(vendors[0], (&"Cisco".to_string(), &2));
        assert_eq!(vendors[1], (&"Huawei".to_string(), &1));
    }

    #[test]
    fn test_parse_log_per_file() {
        let mut store = MemoryRecordStore::new();
        let file = ConfigFile::new("sw.cfg", "/cfg/sw.cfg", "hostname SW\n");
        let other = ConfigFile::new("r.cfg", "/cfg/r.cfg", "hostname R\n");

        let err = store
            .log_parse_event(&file, ParseEvent::new(EventLevel::Info, "early"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));

        store.save_parse_result(&file, &parsed(Vendor::Cisco, 1.0)).unwrap();
        store.save_parse_result(&other, &parsed(Vendor::Cisco, 1.0)).unwrap();
        store
            .log_parse_event(&file, ParseEvent::new(EventLevel::Info, "parsed"))
            .unwrap();
        store
            .log_parse_event(&file, ParseEvent::new(EventLevel::Warning, "no routing"))
            .unwrap();

        let events = store.events_for(&file.content_hash());
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["parsed", "no routing"]);
        assert_eq!(events[1].level, EventLevel::Warning);
        assert!(store.events_for(&other.content_hash()).is_empty());
        assert!(store.events_for("unknown").is_empty());
    }
}
