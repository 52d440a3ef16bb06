//! Repository scanner.
//!
//! Walks a root directory, dispatches each recognized file to its extractor,
//! merges discovered constants into the shared table in walk order, and runs
//! the post-resolution pass over the accumulated records.
//!
//! The walk order is deterministic for a fixed tree (entries sorted by file
//! name per directory), so last-write-wins constant merging is reproducible
//! across runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::extract::{for_extension, ConsumedApi, Extraction, ProducedApi};
use crate::report::Report;
use crate::resolve::{resolve_records, ConstantTable};

/// Directories never descended into.
const SKIP_DIRS: &[&str] = &["node_modules", "vendor"];

/// The only fatal error of a scan: the root itself cannot be enumerated.
/// Everything below the root degrades to per-file outcomes.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot enumerate root directory {path:?}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-file result, kept for diagnostics instead of being swallowed.
#[derive(Debug, Clone)]
pub enum FileStatus {
    Extracted {
        constants: usize,
        produced: usize,
        consumed: usize,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: String,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FileStatus::Failed { .. })
    }
}

/// Everything a scan returns: the report plus per-file diagnostics.
#[derive(Debug)]
pub struct ScanOutput {
    pub report: Report,
    pub outcomes: Vec<FileOutcome>,
    /// Number of files dispatched to an extractor.
    pub scanned: usize,
}

impl ScanOutput {
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }
}

/// Walks a source tree and accumulates API records.
pub struct Scanner {
    root: PathBuf,
    config: ScanConfig,
    parallel: bool,
}

impl Scanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config: ScanConfig::default(),
            parallel: false,
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract files in parallel. Output is identical to the sequential
    /// path: extraction is pure and results are merged in walk-list order.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the scan.
    pub fn scan(&self) -> Result<ScanOutput, ScanError> {
        let files = self.collect_files()?;

        let extractions: Vec<(String, anyhow::Result<Extraction>)> = if self.parallel {
            use rayon::prelude::*;
            files.par_iter().map(|p| self.extract_one(p)).collect()
        } else {
            files.iter().map(|p| self.extract_one(p)).collect()
        };

        let table = ConstantTable::new();
        let mut produced: Vec<ProducedApi> = Vec::new();
        let mut consumed: Vec<ConsumedApi> = Vec::new();
        let mut outcomes = Vec::with_capacity(extractions.len());

        for (file, result) in extractions {
            match result {
                Ok(extraction) => {
                    for (name, value) in &extraction.constants {
                        table.define(name, value.clone());
                    }
                    outcomes.push(FileOutcome {
                        file,
                        status: FileStatus::Extracted {
                            constants: extraction.constants.len(),
                            produced: extraction.produced.len(),
                            consumed: extraction.consumed.len(),
                        },
                    });
                    produced.extend(extraction.produced);
                    consumed.extend(extraction.consumed);
                }
                Err(e) => {
                    eprintln!("Warning: skipping {}: {}", file, e);
                    outcomes.push(FileOutcome {
                        file,
                        status: FileStatus::Failed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }

        // Constants declared anywhere in the tree resolve references
        // extracted anywhere else; this pass is what makes resolution
        // independent of the walk order.
        resolve_records(&table, &mut produced, &mut consumed);

        // Stable sort: records keep their source order within a file.
        produced.sort_by(|a, b| a.file.cmp(&b.file));
        consumed.sort_by(|a, b| a.file.cmp(&b.file));

        let scanned = outcomes.len();
        Ok(ScanOutput {
            report: Report {
                produced_apis: produced,
                consumed_apis: consumed,
                constants: table.snapshot(),
            },
            outcomes,
            scanned,
        })
    }

    /// Read and extract a single file. Never panics; any failure becomes
    /// this file's outcome.
    fn extract_one(&self, path: &Path) -> (String, anyhow::Result<Extraction>) {
        let rel = self.relative(path);
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let result = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|source| match for_extension(ext) {
                Some(extractor) => extractor.extract(&rel, &source),
                None => Ok(Extraction::new()),
            });

        (rel, result)
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Enumerate files with a recognized extension, in deterministic order.
    fn collect_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| ScanError::Root {
            path: self.root.clone(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::Root {
                path: self.root.clone(),
                source: io::Error::new(io::ErrorKind::Other, "not a directory"),
            });
        }

        let excludes = match self.config.build_excludes() {
            Ok(set) => set,
            Err(e) => {
                // validate() catches this earlier on the CLI path.
                eprintln!("Warning: ignoring excluded_paths: {}", e);
                globset::GlobSet::empty()
            }
        };
        let include_hidden = self.config.should_include_hidden();

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.should_follow_links())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if entry.file_type().is_dir() {
                    if !include_hidden && name.starts_with('.') {
                        return false;
                    }
                    if SKIP_DIRS.contains(&name.as_ref()) {
                        return false;
                    }
                }
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or(entry.path());
                !excludes.is_match(rel)
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    eprintln!("Warning: skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if for_extension(ext).is_some() {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{HttpMethod, Value};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_basic_tree() {
        crate::init();

        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("routes.js"),
            "app.get(\"/v1/users\", list);\n",
        )
        .unwrap();
        fs::write(
            temp.path().join("client.go"),
            "package main\n\nfunc main() { http.Get(\"http://svc/users\") }\n",
        )
        .unwrap();
        fs::write(temp.path().join("README.md"), "# nothing to see\n").unwrap();

        let output = Scanner::new(temp.path()).scan().unwrap();

        assert_eq!(output.scanned, 2);
        assert_eq!(output.report.produced_apis.len(), 1);
        assert_eq!(output.report.consumed_apis.len(), 1);
        assert_eq!(output.report.produced_apis[0].method, HttpMethod::Get);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let err = Scanner::new("/definitely/not/a/real/root").scan();
        assert!(matches!(err, Err(ScanError::Root { .. })));
    }

    #[test]
    fn test_excluded_paths_are_pruned() {
        crate::init();

        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("generated")).unwrap();
        fs::write(
            temp.path().join("generated/stubs.js"),
            "app.get(\"/generated\", stub);\n",
        )
        .unwrap();
        fs::write(temp.path().join("app.js"), "app.get(\"/real\", real);\n").unwrap();

        let config = ScanConfig {
            excluded_paths: vec!["generated/**".to_string()],
            ..Default::default()
        };
        let output = Scanner::new(temp.path()).with_config(config).scan().unwrap();

        assert_eq!(output.report.produced_apis.len(), 1);
        assert_eq!(
            output.report.produced_apis[0].path,
            Some(Value::Str("/real".into()))
        );
    }

    #[test]
    fn test_constants_merge_in_walk_order() {
        crate::init();

        // Both files define PATH; b.js is walked after a.js, so it wins.
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.js"), "const PATH = \"/from-a\";\n").unwrap();
        fs::write(temp.path().join("b.js"), "const PATH = \"/from-b\";\n").unwrap();

        let output = Scanner::new(temp.path()).scan().unwrap();

        assert_eq!(
            output.report.constants.get("PATH"),
            Some(&Value::Str("/from-b".into()))
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        crate::init();

        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.js"), "const P = \"/a\";\napp.get(P, h);\n").unwrap();
        fs::write(temp.path().join("b.js"), "const P = \"/b\";\n").unwrap();
        fs::write(
            temp.path().join("c.go"),
            "const q = \"/c\"\nhttp.HandleFunc(q, h)\n",
        )
        .unwrap();

        let sequential = Scanner::new(temp.path()).scan().unwrap();
        let parallel = Scanner::new(temp.path()).parallel(true).scan().unwrap();

        assert_eq!(
            sequential.report.to_yaml().unwrap(),
            parallel.report.to_yaml().unwrap()
        );
    }
}
