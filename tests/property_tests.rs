use dirdupes::duplicates::{
    group_by_hash, size_buckets, DirectoryPair, HashConfig, PairAggregator, SelectiveHasher,
};
use dirdupes::index::FileRecord;
use dirdupes::scanner::hasher::ContentHasher;
use dirdupes::scanner::path_utils::parent_dir;
use dirdupes::scanner::HashError;
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Hashes the file name, so records named alike are "identical".
struct NameHasher;

impl ContentHasher for NameHasher {
    fn name(&self) -> &'static str {
        "name"
    }

    fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        Ok(path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default())
    }
}

/// Records with unique paths: `d{dir}/f{content}_{idx}`, hashed by content.
fn hashed_records() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::vec((0u8..5, 0u8..6), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(idx, (dir, content))| {
                FileRecord::with_hash(
                    format!("d{dir}/f{content}_{idx}"),
                    u64::from(content) * 10 + 1,
                    format!("h{content}"),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_set_total_size_is_size_times_count(records in hashed_records()) {
        let (sets, stats) = group_by_hash(&records);

        for set in &sets {
            prop_assert!(set.len() >= 2);
            prop_assert_eq!(set.total_size(), set.file_size * set.len() as u64);
            let holders = records.iter().filter(|r| r.hash.as_deref() == Some(set.hash.as_str())).count();
            prop_assert_eq!(holders, set.len());
        }
        prop_assert_eq!(stats.duplicated_files, sets.iter().map(|s| s.len()).sum::<usize>());
        prop_assert_eq!(stats.size_conflicts, 0);
    }

    #[test]
    fn test_pair_totals_match_brute_force(records in hashed_records()) {
        let (sets, _) = group_by_hash(&records);
        let aggregator = PairAggregator::aggregate(&sets, None);

        let mut expected: HashMap<DirectoryPair, u64> = HashMap::new();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if a.hash == b.hash {
                    let key = DirectoryPair::new(parent_dir(&a.path), parent_dir(&b.path));
                    *expected.entry(key).or_default() += a.size;
                }
            }
        }

        prop_assert_eq!(aggregator.len(), expected.len());
        for (key, total) in &expected {
            prop_assert_eq!(aggregator.get(key).map(|a| a.total_size), Some(*total));
        }
    }

    #[test]
    fn test_pair_key_ignores_path_order(a in "[a-c]{1,3}/[x-z]{1,3}", b in "[a-c]{1,3}/[x-z]{1,3}") {
        let forward = DirectoryPair::of_paths(&a, &b);
        let backward = DirectoryPair::of_paths(&b, &a);
        prop_assert!(forward.first <= forward.second);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn test_ranking_is_monotonic(records in hashed_records(), head in prop::option::of(0usize..10)) {
        let (sets, _) = group_by_hash(&records);
        let aggregator = PairAggregator::aggregate(&sets, None);
        let available = aggregator.len();
        let ranked = aggregator.rank(head, false);

        prop_assert_eq!(ranked.len(), head.map_or(available, |n| n.min(available)));
        for (idx, window) in ranked.windows(2).enumerate() {
            prop_assert!(window[0].total_size >= window[1].total_size);
            prop_assert_eq!(window[0].rank, idx);
        }
    }

    #[test]
    fn test_unique_sizes_never_hashed(sizes in prop::collection::vec(0u64..8, 0..30)) {
        let mut records: Vec<FileRecord> = sizes
            .iter()
            .enumerate()
            .map(|(idx, &size)| FileRecord::new(format!("d/f{idx}"), size))
            .collect();
        let buckets = size_buckets(&records);

        let hasher = SelectiveHasher::new(Arc::new(NameHasher), HashConfig::default());
        let stats = hasher.hash_records(&mut records);

        for record in &records {
            let shared = buckets[&record.size] >= 2;
            prop_assert_eq!(record.is_hashed(), shared);
        }
        prop_assert_eq!(stats.candidates + stats.skipped_unique, records.len());
    }
}
