//! Report assembly and output formatting.
//!
//! Three output formats:
//! - YAML: the default structured document
//! - JSON: structured output for programmatic consumption
//! - Pretty: colored terminal output for human readability
//!
//! The serialized field names (`produced_apis`, `consumed_apis`,
//! `constants`) are the output contract and must stay stable.

use std::collections::BTreeMap;

use colored::*;
use serde::{Deserialize, Serialize};

use crate::extract::{ConsumedApi, ProducedApi, Value};
use crate::scan::{FileOutcome, FileStatus, ScanOutput};

/// The final scan document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub produced_apis: Vec<ProducedApi>,
    pub consumed_apis: Vec<ConsumedApi>,
    pub constants: BTreeMap<String, Value>,
}

impl Report {
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, output: &ScanOutput, show_failures: bool) {
    let report = &output.report;
    let failed = output.failures().count();

    // Header
    println!();
    print!("  ");
    print!("{}", "apimap".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Files:    ".dimmed());
    print!("{} scanned", output.scanned);
    if failed > 0 {
        print!(", {}", format!("{} failed", failed).red());
    }
    println!();
    println!();

    if !report.produced_apis.is_empty() {
        write_produced(&report.produced_apis);
        println!();
    }

    if !report.consumed_apis.is_empty() {
        write_consumed(&report.consumed_apis);
        println!();
    }

    if !report.constants.is_empty() {
        write_constants(&report.constants);
        println!();
    }

    if failed > 0 {
        write_failures(&output.outcomes, show_failures);
        println!();
    }
}

fn display_value(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn write_produced(apis: &[ProducedApi]) {
    println!("  {} ({}):", "Produced APIs".bold(), apis.len());
    for api in apis {
        print!("    {:<8}", api.method.as_str().green());
        print!("{:<32}", display_value(&api.path));
        print!("{}", api.file.blue());
        if let Some(function) = &api.function {
            print!("{}", format!(":{}", function).dimmed());
        }
        println!();
    }
}

fn write_consumed(apis: &[ConsumedApi]) {
    println!("  {} ({}):", "Consumed APIs".bold(), apis.len());
    for api in apis {
        print!("    {:<8}", api.method.as_str().yellow());
        print!("{:<32}", display_value(&api.target));
        println!("{}", api.file.blue());
    }
}

fn write_constants(constants: &BTreeMap<String, Value>) {
    println!("  {} ({}):", "Constants".bold(), constants.len());
    for (name, value) in constants {
        println!("    {:<24}{}", name, value.to_string().dimmed());
    }
}

fn write_failures(outcomes: &[FileOutcome], show_details: bool) {
    let failures: Vec<_> = outcomes.iter().filter(|o| o.is_failure()).collect();
    println!("  {} ({}):", "Failed files".red(), failures.len());

    if !show_details {
        println!("    {}", "(use --show-failures to see reasons)".dimmed());
        return;
    }

    for outcome in failures {
        if let FileStatus::Failed { reason } = &outcome.status {
            println!("    {}  {}", outcome.file.blue(), reason.dimmed());
        }
    }
}
