use dirdupes::index::{clear_hashes, prune_missing, FileRecord, Index, IndexError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_roundtrip_keeps_order_and_missing_hashes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.json");

    let records = vec![
        FileRecord::with_hash("z/last", 3, "abc"),
        FileRecord::new("a/first", 1),
    ];
    let mut index = Index::new(records.clone(), Some("blake3".to_string()));
    index.save(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("\"hash\"").count(), 1);
    assert!(!dir.path().join("index.json.tmp").exists());

    let loaded = Index::load(&path).unwrap();
    assert_eq!(loaded.records, records);
    assert!(loaded.updated_at.is_some());
}

#[test]
fn test_bare_array_accepted() {
    let index = Index::from_json(r#"[{"path": "a/x", "size": 4, "hash": "h"}]"#).unwrap();
    assert_eq!(index.records.len(), 1);
    assert!(index.algorithm.is_none());
}

#[test]
fn test_negative_size_is_malformed() {
    let result = Index::from_json(r#"[{"path": "a/x", "size": -4}]"#);
    assert!(matches!(result, Err(IndexError::Malformed { .. })));
}

#[test]
fn test_duplicate_paths_rejected() {
    let result = Index::from_json(r#"[{"path": "a/x", "size": 1}, {"path": "a/x", "size": 2}]"#);
    assert!(matches!(result, Err(IndexError::DuplicatePath(p)) if p == "a/x"));
}

#[test]
fn test_unreadable_index_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match Index::load(&path) {
        Err(IndexError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_prune_and_clear_on_disk() {
    let dir = tempdir().unwrap();
    let kept = dir.path().join("kept");
    fs::write(&kept, b"x").unwrap();

    let mut records = vec![
        FileRecord::with_hash(kept.to_str().unwrap(), 1, "h"),
        FileRecord::with_hash(dir.path().join("gone").to_str().unwrap(), 1, "h"),
    ];

    let stats = prune_missing(&mut records, Path::exists);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.removed, 1);

    assert_eq!(clear_hashes(&mut records), 1);
    assert!(records.iter().all(|r| r.hash.is_none()));
}
