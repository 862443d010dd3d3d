//! Runs the on-disk conformance fixtures.
//!
//! Convention:
//!   positive/  -- *.cp + *.expected.json (parses with the current grammar)
//!   legacy/    -- *.cp + *.expected.json (parses with the legacy grammar)
//!   negative/  -- *.cp + *.expected-error.json (first fault expected)
//!
//! Expected JSON for a successful parse is the whole serialized `File`, and
//! it must read back into an equal tree. Expected errors list only the
//! fields they pin down; each must match `ParseError::to_json_value()`.

use cloudpact_core::{
    parse_source, parse_with_options, File, FileSystemProvider, Grammar, LoadError, ParseError,
    ParseOptions, SourceProvider,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

fn conformance_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance")
}

fn cp_files(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "cp"))
        .collect();
    paths.sort();
    paths
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap().to_string_lossy();
    path.with_file_name(format!("{}.{}", stem, suffix))
}

fn read_json(path: &Path) -> Value {
    let src = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    serde_json::from_str(&src).unwrap_or_else(|e| panic!("bad JSON in {}: {}", path.display(), e))
}

/// Parse without a file name so expected positions do not depend on where
/// the checkout lives.
fn parse_fixture(path: &Path, grammar: Grammar) -> Result<File, ParseError> {
    let src = FileSystemProvider
        .read_source(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    parse_with_options(&src, &ParseOptions::new().with_grammar(grammar))
}

fn run_positive_dir(name: &str, grammar: Grammar) -> usize {
    let dir = conformance_root().join(name);
    let mut failures = Vec::new();
    let files = cp_files(&dir);
    for path in &files {
        let expected = read_json(&sibling(path, "expected.json"));
        let file = match parse_fixture(path, grammar) {
            Ok(file) => file,
            Err(e) => {
                failures.push(format!("{}: {}", path.display(), e));
                continue;
            }
        };
        let got = serde_json::to_value(&file).unwrap();
        if got != expected {
            failures.push(format!(
                "{}: output mismatch\nexpected: {}\ngot:      {}",
                path.display(),
                serde_json::to_string_pretty(&expected).unwrap(),
                serde_json::to_string_pretty(&got).unwrap()
            ));
            continue;
        }
        let back: File = serde_json::from_value(got)
            .unwrap_or_else(|e| panic!("{}: cannot read tree back: {}", path.display(), e));
        if back != file {
            failures.push(format!("{}: tree changed across JSON", path.display()));
        }
    }
    assert!(
        failures.is_empty(),
        "{} of {} {} fixtures failed:\n{}",
        failures.len(),
        files.len(),
        name,
        failures.join("\n")
    );
    files.len()
}

#[test]
fn positive_fixtures_parse() {
    let tested = run_positive_dir("positive", Grammar::Current);
    assert!(tested > 0, "no positive fixtures found -- check paths");
}

#[test]
fn legacy_fixtures_parse() {
    let tested = run_positive_dir("legacy", Grammar::Legacy);
    assert!(tested > 0, "no legacy fixtures found -- check paths");
}

#[test]
fn negative_fixtures_report_first_fault() {
    let dir = conformance_root().join("negative");
    let files = cp_files(&dir);
    assert!(!files.is_empty(), "no negative fixtures found -- check paths");

    let mut failures = Vec::new();
    for path in &files {
        let expected = read_json(&sibling(path, "expected-error.json"));
        let err = match parse_source(&FileSystemProvider, path, Grammar::Current) {
            Ok(_) => {
                failures.push(format!("{}: parsed without error", path.display()));
                continue;
            }
            Err(LoadError::Parse(e)) => e,
            Err(e) => panic!("{}: {}", path.display(), e),
        };
        let got = err.to_json_value();
        let Some(fields) = expected.as_object() else {
            panic!("{}: expected an object", path.display());
        };
        for (key, want) in fields {
            if got.get(key) != Some(want) {
                failures.push(format!(
                    "{}: {} expected {}, got {}",
                    path.display(),
                    key,
                    want,
                    got.get(key).unwrap_or(&Value::Null)
                ));
            }
        }
        let file = err.position.file.as_deref().unwrap_or_default();
        if !file.ends_with(".cp") {
            failures.push(format!("{}: position has no file name", path.display()));
        }
    }
    assert!(
        failures.is_empty(),
        "{} negative fixture checks failed:\n{}",
        failures.len(),
        failures.join("\n")
    );
}
