//! Apimap - polyglot API surface scanner.
//!
//! Apimap scans a source tree containing files in multiple programming
//! languages and extracts two API surfaces: **produced APIs** (HTTP
//! endpoints a codebase exposes) and **consumed APIs** (external HTTP calls
//! a codebase makes), together with a constant/environment resolution table
//! that turns symbolic path and URL references into concrete strings.
//!
//! # Architecture
//!
//! - `extract`: per-language extractors behind a common trait. Python gets
//!   a structural tree-sitter parse; JavaScript/TypeScript, Java and Go are
//!   matched with regex patterns.
//! - `resolve`: the shared constant table, `<ENV:NAME>` placeholder
//!   resolution, and the post-resolution pass over accumulated records.
//! - `scan`: the repository walker - deterministic ordering, per-file
//!   failure isolation, optional parallel extraction.
//! - `config`: optional YAML scan configuration.
//! - `report`: the output document (YAML, JSON, pretty).
//!
//! # Adding a New Language
//!
//! Implement `Extractor` in `src/extract/` and register it in
//! `extract/mod.rs`. See `extract/go.rs` for a pattern-based reference and
//! `extract/python.rs` for a structural one.

pub mod cli;
pub mod config;
pub mod extract;
pub mod report;
pub mod resolve;
pub mod scan;

pub use config::ScanConfig;
pub use extract::{
    register_extractors, ConsumedApi, Extraction, Extractor, HttpMethod, ProducedApi, Value,
};
pub use report::Report;
pub use resolve::{resolve_records, ConstantTable};
pub use scan::{FileOutcome, FileStatus, ScanError, ScanOutput, Scanner};

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    register_extractors();
}
