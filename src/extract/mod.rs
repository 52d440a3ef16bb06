//! Per-language API extraction.
//!
//! Each supported language implements [`Extractor`]: file content in, an
//! [`Extraction`] (constants, produced APIs, consumed APIs) out. Python gets
//! a structural tree-sitter parse; JavaScript/TypeScript, Java and Go are
//! matched with per-language regex patterns, which degrade gracefully on
//! files a structural parser would reject outright.
//!
//! Extractors are pure: they never touch the constant table or the process
//! environment. Symbolic names and `<ENV:NAME>` placeholders are recorded
//! verbatim and resolved later by the scanner's post-resolution pass.

mod go;
mod java;
mod javascript;
#[cfg(feature = "tree-sitter")]
mod python;
mod record;

pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
#[cfg(feature = "tree-sitter")]
pub use python::PythonExtractor;
pub use record::{ConsumedApi, Extraction, HttpMethod, ProducedApi, Value};

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

/// Language-specific extractor trait.
///
/// # Thread Safety
///
/// tree_sitter::Parser is not Sync, so implementations create parsers per
/// call rather than holding one.
pub trait Extractor: Send + Sync {
    /// Language identifier (e.g. "python", "go").
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Extract constants and API records from one file.
    ///
    /// `path` is only recorded into the returned records; `source` is the
    /// full file content. A file with zero matches returns an empty
    /// extraction, not an error. An `Err` aborts that file only.
    fn extract(&self, path: &str, source: &str) -> anyhow::Result<Extraction>;

    /// Check if this extractor handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}

/// Static storage for the Python extractor.
#[cfg(feature = "tree-sitter")]
static PYTHON_EXTRACTOR: OnceCell<PythonExtractor> = OnceCell::new();

/// Static storage for the JavaScript/TypeScript extractor.
static JAVASCRIPT_EXTRACTOR: OnceCell<JavaScriptExtractor> = OnceCell::new();

/// Static storage for the Java extractor.
static JAVA_EXTRACTOR: OnceCell<JavaExtractor> = OnceCell::new();

/// Static storage for the Go extractor.
static GO_EXTRACTOR: OnceCell<GoExtractor> = OnceCell::new();

/// Whether extractors have been registered.
static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Register all available extractors.
///
/// Idempotent; call once at startup.
pub fn register_extractors() {
    if REGISTERED.swap(true, Ordering::SeqCst) {
        return; // Already registered
    }

    #[cfg(feature = "tree-sitter")]
    PYTHON_EXTRACTOR.get_or_init(PythonExtractor::new);
    JAVASCRIPT_EXTRACTOR.get_or_init(JavaScriptExtractor::new);
    JAVA_EXTRACTOR.get_or_init(JavaExtractor::new);
    GO_EXTRACTOR.get_or_init(GoExtractor::new);
}

/// Get the extractor for a file extension.
///
/// Returns None for unrecognized extensions; the walker skips those files
/// silently.
pub fn for_extension(ext: &str) -> Option<&'static dyn Extractor> {
    register_extractors();

    match ext {
        #[cfg(feature = "tree-sitter")]
        "py" => PYTHON_EXTRACTOR.get().map(|e| e as &'static dyn Extractor),
        "js" | "jsx" | "mjs" | "ts" | "tsx" | "mts" => JAVASCRIPT_EXTRACTOR
            .get()
            .map(|e| e as &'static dyn Extractor),
        "java" => JAVA_EXTRACTOR.get().map(|e| e as &'static dyn Extractor),
        "go" => GO_EXTRACTOR.get().map(|e| e as &'static dyn Extractor),
        _ => None,
    }
}

/// All file extensions with a registered extractor.
pub fn registered_extensions() -> Vec<&'static str> {
    let mut exts = vec!["js", "jsx", "mjs", "ts", "tsx", "mts", "java", "go"];
    #[cfg(feature = "tree-sitter")]
    exts.insert(0, "py");
    exts
}
