use dirdupes::duplicates::{DirectoryPair, FinderConfig, HashConfig, PairFinder, SelectiveHasher};
use dirdupes::error::ExitCode;
use dirdupes::index::FileRecord;
use dirdupes::output::{write_report, OutputFormat};
use dirdupes::scanner::path_utils::to_index_path;
use dirdupes::scanner::{HashAlgorithm, Walker, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn list(root: &Path) -> Vec<FileRecord> {
    let (records, errors) = Walker::new(root, WalkerConfig::default()).walk().unwrap();
    assert!(errors.is_empty());
    records
}

fn dir_of(root: &Path, name: &str) -> String {
    to_index_path(&root.join(name)).unwrap()
}

#[test]
fn test_shared_file_between_two_directories() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), &[7u8; 100]);
    write(&root.join("b/y"), &[7u8; 100]);
    write(&root.join("c/z"), &[1u8; 50]);

    let mut records = list(root);
    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();

    assert_eq!(report.pairs.len(), 1);
    assert_eq!(
        report.pairs[0].pair,
        DirectoryPair::new(dir_of(root, "a"), dir_of(root, "b"))
    );
    assert_eq!(report.pairs[0].total_size, 100);
    assert_eq!(report.pairs[0].match_count, 1);
    assert_eq!(report.summary.duplicate_sets, 1);
    assert_eq!(report.summary.skipped_unique, 1);

    let unique = records.iter().find(|r| r.path.ends_with("c/z")).unwrap();
    assert!(unique.hash.is_none());
}

#[test]
fn test_three_copies_in_two_directories() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/1"), b"same content");
    write(&root.join("a/2"), b"same content");
    write(&root.join("b/3"), b"same content");
    let size = "same content".len() as u64;

    let mut records = list(root);
    let report = PairFinder::new(FinderConfig::default().with_details(true))
        .find_pairs(&mut records)
        .unwrap();

    assert_eq!(report.pairs.len(), 2);
    assert_eq!(
        report.pairs[0].pair,
        DirectoryPair::new(dir_of(root, "a"), dir_of(root, "b"))
    );
    assert_eq!(report.pairs[0].total_size, 2 * size);
    assert_eq!(report.pairs[0].files.as_ref().unwrap().len(), 2);
    assert_eq!(
        report.pairs[1].pair,
        DirectoryPair::new(dir_of(root, "a"), dir_of(root, "a"))
    );
    assert_eq!(report.pairs[1].total_size, size);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), b"aaaa");
    write(&root.join("b/y"), b"bbbb");

    let mut records = list(root);
    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();

    assert!(report.pairs.is_empty());
    assert_eq!(report.summary.newly_hashed, 2);
    assert_eq!(report.summary.duplicate_sets, 0);
}

#[test]
fn test_vanished_file_excluded() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), b"dup");
    write(&root.join("b/x"), b"dup");
    write(&root.join("c/x"), b"dup");

    let mut records = list(root);
    fs::remove_file(root.join("c/x")).unwrap();

    let report = PairFinder::new(FinderConfig::default().with_details(true))
        .find_pairs(&mut records)
        .unwrap();

    assert_eq!(report.summary.total_records, 3);
    assert_eq!(report.summary.missing, 1);
    assert_eq!(records.len(), 2);
    assert_eq!(report.pairs.len(), 1);
    let gone = dir_of(root, "c");
    for ranked in &report.pairs {
        assert_ne!(ranked.pair.first, gone);
        assert_ne!(ranked.pair.second, gone);
    }
}

#[test]
fn test_hash_error_does_not_stop_others() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), b"12345");
    write(&root.join("b/x"), b"12345");
    fs::create_dir_all(root.join("odd")).unwrap();

    let mut records = list(root);
    // A directory exists but cannot be read as a file.
    records.push(FileRecord::new(dir_of(root, "odd"), 5));

    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();

    assert_eq!(report.summary.hash_failures, 1);
    assert_eq!(report.summary.newly_hashed, 2);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].total_size, 5);
    assert!(records.last().unwrap().hash.is_none());
}

#[test]
fn test_second_pass_hashes_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), b"dup");
    write(&root.join("b/x"), b"dup");

    let mut records = list(root);
    let hasher = SelectiveHasher::new(HashAlgorithm::Sha256.build(), HashConfig::default());

    let first = hasher.hash_records(&mut records);
    let snapshot = records.clone();
    let second = hasher.hash_records(&mut records);

    assert_eq!(first.newly_hashed, 2);
    assert_eq!(second.newly_hashed, 0);
    assert_eq!(second.already_hashed, 2);
    assert_eq!(records, snapshot);
}

#[test]
fn test_parallel_hashing_same_result() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    for i in 0..20 {
        write(&root.join(format!("d{}/f{}", i % 4, i)), format!("{}", i % 5).as_bytes());
    }

    let mut sequential = list(root);
    let mut parallel = sequential.clone();

    let seq = PairFinder::with_defaults().find_pairs(&mut sequential).unwrap();
    let par = PairFinder::new(FinderConfig::default().with_io_threads(4))
        .find_pairs(&mut parallel)
        .unwrap();

    assert_eq!(sequential, parallel);
    assert_eq!(seq.pairs, par.pairs);
}

#[test]
fn test_listing_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("b.txt"), b"1");
    write(&root.join("a.txt"), b"1");
    write(&root.join("sub/c.txt"), b"1");
    write(&root.join("sub/a.log"), b"1");

    let records = list(root);
    let names: Vec<String> = records
        .iter()
        .map(|r| r.path.strip_prefix(&to_index_path(root).unwrap()).unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["/a.txt", "/b.txt", "/sub/a.log", "/sub/c.txt"]);

    let config = WalkerConfig {
        extension: Some("txt".to_string()),
        ..Default::default()
    };
    let (filtered, _) = Walker::new(root, config).walk().unwrap();
    assert_eq!(filtered.len(), 3);
    assert!(filtered.iter().all(|r| r.path.ends_with(".txt")));
}

#[test]
fn test_decomposed_names_found_as_duplicates() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let name = "cafe\u{0301}.txt";
    write(&root.join("a").join(name), b"same bytes");
    write(&root.join("b").join(name), b"same bytes");

    let mut records = list(root);
    assert!(records.iter().all(|r| r.path.ends_with(name)));

    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();

    assert_eq!(report.summary.missing, 0);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(
        report.pairs[0].pair,
        DirectoryPair::new(dir_of(root, "a"), dir_of(root, "b"))
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_name_reported_and_skipped() {
    use dirdupes::scanner::ScanError;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let root = dir.path();
    let odd = OsStr::from_bytes(b"f\xff.bin");
    write(&root.join("a").join(odd), b"payload");
    write(&root.join("b").join(odd), b"payload");
    write(&root.join("a/plain.bin"), b"payload");
    write(&root.join("b/plain.bin"), b"payload");

    let (mut records, errors) = Walker::new(root, WalkerConfig::default()).walk().unwrap();

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ScanError::InvalidUtf8(_))));
    assert_eq!(records.len(), 2);

    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();
    assert_eq!(report.summary.missing, 0);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].total_size, 7);
}

#[test]
fn test_csv_report_keeps_missing_count() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a/x"), b"dup");
    write(&root.join("b/x"), b"dup");
    write(&root.join("c/x"), b"dup");

    let mut records = list(root);
    fs::remove_file(root.join("c/x")).unwrap();
    let report = PairFinder::with_defaults().find_pairs(&mut records).unwrap();

    let mut rows = Vec::new();
    let mut summary = Vec::new();
    write_report(
        &report,
        OutputFormat::Csv,
        false,
        ExitCode::Success,
        &mut rows,
        &mut summary,
    )
    .unwrap();

    let rows = String::from_utf8(rows).unwrap();
    let summary = String::from_utf8(summary).unwrap();
    assert_eq!(rows.lines().count(), 2);
    assert!(summary.contains("Missing (skipped):     1/3"));
}
