//! End-to-end scanner tests.
//!
//! These exercise the full walk -> extract -> merge -> post-resolution
//! pipeline against temporary trees and the fixtures under testdata/.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use apimap::{HttpMethod, Scanner, Value};

fn setup() {
    apimap::init();
}

fn write(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).unwrap();
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_repeated_scans_are_byte_identical() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "alpha.js",
        "const P = \"/a\";\napp.get(P, h);\naxios.post(\"http://svc/x\");\n",
    );
    write(temp.path(), "beta.go", "const p = \"/b\"\nhttp.HandleFunc(p, h)\n");
    fs::create_dir_all(temp.path().join("nested")).unwrap();
    write(
        temp.path(),
        "nested/gamma.java",
        "@GetMapping(\"/c\")\npublic void c() {}\n",
    );

    let first = Scanner::new(temp.path()).scan().unwrap();
    let second = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(
        first.report.to_yaml().unwrap(),
        second.report.to_yaml().unwrap()
    );
}

#[test]
fn test_parallel_scan_matches_sequential() {
    setup();

    let temp = TempDir::new().unwrap();
    for i in 0..20 {
        write(
            temp.path(),
            &format!("file{:02}.js", i),
            &format!("const P{i} = \"/p/{i}\";\napp.get(P{i}, h);\n"),
        );
    }

    let sequential = Scanner::new(temp.path()).scan().unwrap();
    let parallel = Scanner::new(temp.path()).parallel(true).scan().unwrap();

    assert_eq!(
        sequential.report.to_yaml().unwrap(),
        parallel.report.to_yaml().unwrap()
    );
}

// =============================================================================
// Isolation
// =============================================================================

#[test]
fn test_unreadable_file_does_not_abort_the_scan() {
    setup();

    let temp = TempDir::new().unwrap();
    // Invalid UTF-8 makes the read fail; the file must contribute nothing
    // while the rest of the tree is still extracted.
    fs::write(temp.path().join("broken.py"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
    write(temp.path(), "ok.js", "app.get(\"/still-here\", h);\n");

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.failures().count(), 1);
    assert_eq!(output.report.produced_apis.len(), 1);
    assert_eq!(
        output.report.produced_apis[0].path,
        Some(Value::Str("/still-here".into()))
    );
}

#[test]
#[cfg(feature = "tree-sitter")]
fn test_syntax_errors_degrade_to_partial_extraction() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "partial.py",
        "@app.get(\"/ok\")\ndef ok():\n    pass\n\nclass Broken(\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.failures().count(), 0);
    assert_eq!(output.report.produced_apis.len(), 1);
}

// =============================================================================
// Constant resolution
// =============================================================================

#[test]
#[cfg(feature = "tree-sitter")]
fn test_constant_round_trip() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "api.py",
        "API_PATH = \"/v1/users\"\n\n@app.get(API_PATH)\ndef list_users():\n    pass\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.report.produced_apis.len(), 1);
    assert_eq!(
        output.report.produced_apis[0].path,
        Some(Value::Str("/v1/users".into()))
    );
    assert_eq!(
        output.report.constants.get("API_PATH"),
        Some(&Value::Str("/v1/users".into()))
    );
}

#[test]
fn test_forward_reference_resolves_after_the_walk() {
    setup();

    // aa.js is walked before zz.js but references a constant zz.js declares.
    let temp = TempDir::new().unwrap();
    write(temp.path(), "aa.js", "app.get(SHARED_PATH, h);\n");
    write(temp.path(), "zz.js", "const SHARED_PATH = \"/v2/shared\";\n");

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.report.produced_apis.len(), 1);
    assert_eq!(
        output.report.produced_apis[0].path,
        Some(Value::Str("/v2/shared".into()))
    );
}

#[test]
fn test_unresolvable_symbolic_name_survives() {
    setup();

    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.js", "app.get(NEVER_DEFINED, h);\n");

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(
        output.report.produced_apis[0].path,
        Some(Value::Str("NEVER_DEFINED".into()))
    );
}

#[test]
fn test_duplicate_constants_last_walk_order_write_wins() {
    setup();

    let temp = TempDir::new().unwrap();
    write(temp.path(), "aa.js", "const PATH = \"/first\";\n");
    write(temp.path(), "zz.js", "const PATH = \"/second\";\napp.get(PATH, h);\n");

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(
        output.report.constants.get("PATH"),
        Some(&Value::Str("/second".into()))
    );
    assert_eq!(
        output.report.produced_apis[0].path,
        Some(Value::Str("/second".into()))
    );
}

// =============================================================================
// Environment placeholders
// =============================================================================

#[test]
fn test_env_miss_becomes_sentinel() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "env.js",
        "const host = process.env.APIMAP_IT_MISSING_VAR;\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(
        output.report.constants.get("APIMAP_IT_MISSING_VAR"),
        Some(&Value::Str("<UNRESOLVED_ENV:APIMAP_IT_MISSING_VAR>".into()))
    );
}

#[test]
fn test_env_hit_resolves_to_process_value() {
    setup();

    std::env::set_var("APIMAP_IT_PRESENT_VAR", "billing.internal");

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "env.js",
        "const host = process.env.APIMAP_IT_PRESENT_VAR;\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();
    std::env::remove_var("APIMAP_IT_PRESENT_VAR");

    assert_eq!(
        output.report.constants.get("APIMAP_IT_PRESENT_VAR"),
        Some(&Value::Str("billing.internal".into()))
    );
}

#[test]
#[cfg(feature = "tree-sitter")]
fn test_env_placeholder_in_call_target() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "push.py",
        "import requests\n\ndef push():\n    requests.get(\"<ENV:APIMAP_IT_TARGET_VAR>\")\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(
        output.report.consumed_apis[0].target,
        Some(Value::Str("<UNRESOLVED_ENV:APIMAP_IT_TARGET_VAR>".into()))
    );
}

// =============================================================================
// Walker edges
// =============================================================================

#[test]
fn test_unknown_extensions_contribute_nothing() {
    setup();

    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.rb", "app.get(\"/ruby\", h)\n");
    write(temp.path(), "data.json", "{\"path\": \"/nope\"}\n");

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.scanned, 0);
    assert!(output.report.produced_apis.is_empty());
    assert!(output.report.consumed_apis.is_empty());
    assert!(output.report.constants.is_empty());
}

#[test]
fn test_registration_without_path_yields_null_record() {
    setup();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "Controller.java",
        "@DeleteMapping\npublic void wipe() {}\n",
    );

    let output = Scanner::new(temp.path()).scan().unwrap();

    assert_eq!(output.report.produced_apis.len(), 1);
    assert_eq!(output.report.produced_apis[0].path, None);
    assert_eq!(output.report.produced_apis[0].method, HttpMethod::Delete);
}

#[test]
fn test_missing_root_is_the_only_fatal_error() {
    setup();
    assert!(Scanner::new("/no/such/root/anywhere").scan().is_err());
}

// =============================================================================
// Fixture tree
// =============================================================================

#[test]
#[cfg(feature = "tree-sitter")]
fn test_testdata_tree() {
    setup();
    std::env::remove_var("LISTEN_ADDR");

    let output = Scanner::new("testdata").scan().unwrap();
    let report = &output.report;

    // api.py: two verb decorators plus a bare route().
    assert!(report
        .produced_apis
        .iter()
        .any(|a| a.file == "api.py"
            && a.function.as_deref() == Some("list_users")
            && a.method == HttpMethod::Get
            && a.path == Some(Value::Str("/v1/users".into()))));
    assert!(report
        .produced_apis
        .iter()
        .any(|a| a.file == "api.py" && a.function.as_deref() == Some("fallback") && a.path.is_none()));

    // routes.js: symbolic path resolved through the constant table.
    assert!(report
        .produced_apis
        .iter()
        .any(|a| a.file == "routes.js" && a.path == Some(Value::Str("/v1/orders".into()))));

    // Controller.java + server.go registrations.
    assert!(report
        .produced_apis
        .iter()
        .any(|a| a.file == "Controller.java" && a.path == Some(Value::Str("/v1/profiles".into()))));
    assert!(report
        .produced_apis
        .iter()
        .any(|a| a.file == "server.go" && a.path == Some(Value::Str("/healthz".into()))));

    // Consumed calls across all four languages.
    assert!(report
        .consumed_apis
        .iter()
        .any(|a| a.file == "api.py"
            && a.target == Some(Value::Str("http://reports.internal/v1/submit".into()))));
    assert!(report
        .consumed_apis
        .iter()
        .any(|a| a.file == "routes.js" && a.method == HttpMethod::Unknown));
    assert!(report
        .consumed_apis
        .iter()
        .any(|a| a.file == "Controller.java" && a.method == HttpMethod::Post));
    assert!(report
        .consumed_apis
        .iter()
        .any(|a| a.file == "server.go"
            && a.target == Some(Value::Str("http://inventory.internal/v1/stock".into()))));

    // Env references surface as constants (unset in the test environment).
    assert_eq!(
        report.constants.get("LISTEN_ADDR"),
        Some(&Value::Str("<UNRESOLVED_ENV:LISTEN_ADDR>".into()))
    );

    // notes.txt is skipped: four recognized files scanned.
    assert_eq!(output.scanned, 4);
    assert_eq!(output.failures().count(), 0);
}
