//! Parse a device configuration file end to end.
//!
//! Identifies the vendor, extracts device facts and interfaces, scores the
//! result, and optionally persists, applies and exports the rule set.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example parse_config -- examples/configs/cisco_switch.cfg
//! ```
//!
//! Huawei configs with `interface` lines also match the Cisco fingerprint;
//! pass the vendor explicitly to parse them as VRP:
//! ```bash
//! cargo run --example parse_config -- examples/configs/huawei_switch.cfg \
//!     --vendor huawei --device-type Switch --apply
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use ferrocfg::records::{
    ConfigFile, EventLevel, MemoryRecordStore, ParseEvent, ParsedRecord, RecordStore,
};
use ferrocfg::{DeviceMetadata, Pipeline, Vendor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let Some(input) = args.input.clone() else {
        eprintln!("Error: a config file is required");
        Args::print_help();
        std::process::exit(1);
    };

    let mut builder = Pipeline::builder()
        .rules_dir(&args.rules_dir)
        .quality_threshold(args.threshold)
        .load_rules(args.reuse)
        .persist_rules(args.persist)
        .apply_rules(args.apply);

    if let Some(vendor) = &args.vendor {
        builder = builder.metadata(DeviceMetadata {
            vendor: Vendor::parse(vendor),
            device_type: args.device_type.clone().unwrap_or_default(),
            ..Default::default()
        });
    }

    let pipeline = builder.build()?;
    let started = Instant::now();
    let report = pipeline.run_file(&input)?;
    let elapsed = started.elapsed();

    println!("{}", "=".repeat(60));
    println!(
        "Vendor:       {} {}",
        report.metadata.vendor, report.metadata.device_type
    );
    if !report.metadata.model.is_empty() {
        println!("Model:        {}", report.metadata.model);
    }
    if !report.metadata.software_version.is_empty() {
        println!("Version:      {}", report.metadata.software_version);
    }
    println!("Hostname:     {}", report.device_info.hostname);
    println!("Mgmt IP:      {}", report.device_info.management_ip);
    println!("{}", "-".repeat(60));

    for iface in &report.interfaces {
        let address = if iface.ip_address.is_empty() {
            String::new()
        } else {
            format!("{}/{}", iface.ip_address, iface.subnet_mask)
        };
        println!(
            "  {:<28} {:<6} {:<32} {}",
            iface.name,
            iface.status.as_str(),
            address,
            iface.description
        );
    }

    println!("{}", "-".repeat(60));
    println!(
        "Quality: {:.2} ({}/{} fields) -> {}",
        report.quality.score,
        report.quality.filled_fields,
        report.quality.total_fields,
        if report.quality.is_valid { "valid" } else { "invalid" }
    );
    for warning in &report.quality.warnings {
        println!("  warning: {}", warning);
    }

    if !report.matches.is_empty() {
        println!("{}", "-".repeat(60));
        for (field, matches) in &report.matches {
            println!("  {:<14} {} matches", field, matches.len());
        }
    }

    println!("{}", "-".repeat(60));
    for stage in &report.stages {
        let mark = if stage.succeeded { "ok" } else { "FAILED" };
        println!("  [{:<6}] {:<15} {}", mark, stage.stage.as_str(), stage.message);
    }

    if let Some(path) = &args.json {
        report.to_export().write_json(path)?;
        println!("\nJSON written to {}", path.display());
    }
    if let Some(path) = &args.csv {
        report.to_export().write_csv(path)?;
        println!("CSV written to {}", path.display());
    }

    let mut store = MemoryRecordStore::new();
    let file = ConfigFile::from_path(&input)?;
    let id = store.save_parse_result(&file, &ParsedRecord::from(&report))?;
    for event in ParseEvent::from_report(&report) {
        store.log_parse_event(&file, event)?;
    }
    let summary = ParseEvent::new(EventLevel::Info, "parse finished")
        .with_details(serde_json::json!({
            "interfaces": report.interfaces.len(),
            "score": report.quality.score,
        }))
        .with_duration(elapsed);
    store.log_parse_event(&file, summary)?;
    if let Some(ruleset) = &report.ruleset {
        store.save_rules(ruleset)?;
    }
    let stats = store.statistics()?;
    println!(
        "\nRecorded as parse result {} ({} file, {} log events, average quality {:.2}, {} ms)",
        id,
        stats.total_files,
        store.events_for(&file.content_hash()).len(),
        stats.average_quality_score,
        elapsed.as_millis()
    );

    Ok(())
}

/// Simple argument parser (avoiding external dependencies)
struct Args {
    input: Option<PathBuf>,
    vendor: Option<String>,
    device_type: Option<String>,
    rules_dir: PathBuf,
    threshold: f64,
    reuse: bool,
    persist: bool,
    apply: bool,
    json: Option<PathBuf>,
    csv: Option<PathBuf>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut input = None;
        let mut vendor = None;
        let mut device_type = None;
        let mut rules_dir = PathBuf::from("rules");
        let mut threshold = 0.9;
        let mut reuse = false;
        let mut persist = false;
        let mut apply = false;
        let mut json = None;
        let mut csv = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--vendor" | "-v" => {
                    i += 1;
                    if i < args.len() {
                        vendor = Some(args[i].clone());
                    }
                }
                "--device-type" | "-d" => {
                    i += 1;
                    if i < args.len() {
                        device_type = Some(args[i].clone());
                    }
                }
                "--rules-dir" | "-r" => {
                    i += 1;
                    if i < args.len() {
                        rules_dir = PathBuf::from(&args[i]);
                    }
                }
                "--threshold" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        threshold = args[i].parse().unwrap_or(0.9);
                    }
                }
                "--json" => {
                    i += 1;
                    if i < args.len() {
                        json = Some(PathBuf::from(&args[i]));
                    }
                }
                "--csv" => {
                    i += 1;
                    if i < args.len() {
                        csv = Some(PathBuf::from(&args[i]));
                    }
                }
                "--reuse" => reuse = true,
                "--persist" => persist = true,
                "--apply" => apply = true,
                "--help" | "-h" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other if !other.starts_with('-') && input.is_none() => {
                    input = Some(PathBuf::from(other));
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                }
            }
            i += 1;
        }

        Self {
            input,
            vendor,
            device_type,
            rules_dir,
            threshold,
            reuse,
            persist,
            apply,
            json,
            csv,
        }
    }

    fn print_help() {
        println!(
            r#"ferrocfg parse_config example

USAGE:
    cargo run --example parse_config -- <FILE> [OPTIONS]

OPTIONS:
    -v, --vendor <NAME>         Skip identification and use this vendor
    -d, --device-type <TYPE>    Device type used with --vendor
    -r, --rules-dir <DIR>       Rules directory [default: rules]
    -t, --threshold <SCORE>     Quality threshold [default: 0.9]
    --reuse                     Load stored rules before generating
    --persist                   Write the rule set to the rules directory
    --apply                     Apply the rule set and count matches
    --json <PATH>               Write a JSON export
    --csv <PATH>                Write a CSV export
    -h, --help                  Print this help message

EXAMPLES:
    # Parse a Cisco config and persist its rules
    cargo run --example parse_config -- examples/configs/cisco_switch.cfg --persist --apply

    # Parse a Huawei config with known vendor
    cargo run --example parse_config -- examples/configs/huawei_switch.cfg -v huawei -d Switch
"#
        );
    }
}
