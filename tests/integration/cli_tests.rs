use clap::Parser;
use dirdupes::cli::Cli;
use dirdupes::error::ExitCode;
use dirdupes::index::{Index, IndexError};
use dirdupes::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dirdupes", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("tree/a")).unwrap();
    fs::create_dir_all(root.join("tree/b")).unwrap();
    fs::write(root.join("tree/a/x.txt"), b"duplicated").unwrap();
    fs::write(root.join("tree/b/x.txt"), b"duplicated").unwrap();
    fs::write(root.join("tree/b/unique.txt"), b"only here").unwrap();
}

#[test]
fn test_prepare_then_analyze() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();
    let tree = dir.path().join("tree");

    let code = run(&["-i", index_arg, "prepare", tree.to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let saved = Index::load(&index).unwrap();
    assert_eq!(saved.records.len(), 3);
    assert_eq!(saved.hashed_count(), 2);
    assert_eq!(saved.algorithm.as_deref(), Some("blake3"));

    let code = run(&["-i", index_arg, "analyze", "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_analyze_without_pairs() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("tree")).unwrap();
    fs::write(dir.path().join("tree/one"), b"1").unwrap();
    fs::write(dir.path().join("tree/two"), b"22").unwrap();
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();

    let tree = dir.path().join("tree");
    run(&["-i", index_arg, "prepare", tree.to_str().unwrap()]).unwrap();
    let code = run(&["-i", index_arg, "analyze"]).unwrap();
    assert_eq!(code, ExitCode::NoPairs);
}

#[test]
fn test_prepare_no_hash_then_analyze_hashes_and_saves() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();
    let tree = dir.path().join("tree");

    run(&["-i", index_arg, "prepare", tree.to_str().unwrap(), "--no-hash"]).unwrap();
    assert_eq!(Index::load(&index).unwrap().hashed_count(), 0);

    run(&["-i", index_arg, "analyze", "--no-save"]).unwrap();
    assert_eq!(Index::load(&index).unwrap().hashed_count(), 0);

    run(&["-i", index_arg, "analyze"]).unwrap();
    assert_eq!(Index::load(&index).unwrap().hashed_count(), 2);
}

#[test]
fn test_clear_removes_hashes() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();
    let tree = dir.path().join("tree");

    run(&["-i", index_arg, "prepare", tree.to_str().unwrap()]).unwrap();
    let code = run(&["-i", index_arg, "clear"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    let cleared = Index::load(&index).unwrap();
    assert_eq!(cleared.hashed_count(), 0);
    assert_eq!(cleared.records.len(), 3);
    assert!(cleared.algorithm.is_none());
}

#[test]
fn test_update_prunes_vanished_files() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();
    let tree = dir.path().join("tree");

    run(&["-i", index_arg, "prepare", tree.to_str().unwrap()]).unwrap();
    fs::remove_file(tree.join("b/unique.txt")).unwrap();
    run(&["-i", index_arg, "update"]).unwrap();

    let updated = Index::load(&index).unwrap();
    assert_eq!(updated.records.len(), 2);
}

#[test]
fn test_algorithm_mismatch_is_an_error() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let index = dir.path().join("index.json");
    let index_arg = index.to_str().unwrap();
    let tree = dir.path().join("tree");

    run(&["-i", index_arg, "prepare", tree.to_str().unwrap()]).unwrap();
    let err = run(&["-i", index_arg, "update", "--algorithm", "sha256"]).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<IndexError>(),
        Some(IndexError::AlgorithmMismatch { .. })
    ));
}

#[test]
fn test_malformed_index_is_an_error() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.json");
    fs::write(&index, r#"[{"path": "a/x"}]"#).unwrap();

    let err = run(&["-i", index.to_str().unwrap(), "analyze"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<IndexError>(),
        Some(IndexError::Malformed { .. })
    ));
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.json");
    let missing = dir.path().join("nope");

    let result = run(&["-i", index.to_str().unwrap(), "prepare", missing.to_str().unwrap()]);
    assert!(result.is_err());
    assert!(!index.exists());
}
