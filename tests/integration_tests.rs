use geo::Intersects;
use geotrie::compute::covering::cover;
use geotrie::item::ring_polygon;
use geotrie::prelude::*;
use geotrie::storage::Rows;
use geotrie::{GeoTrieError, InsertOutcome, TableDump};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn item(name: &str, ring: &[(f64, f64)]) -> Item {
    let ring: Vec<[f64; 2]> = ring.iter().map(|&(a, b)| [a, b]).collect();
    Item::from_value(json!({ "file": name, "polygon": ring })).unwrap()
}

fn square(name: &str, x: f64, y: f64, size: f64) -> Item {
    item(
        name,
        &[(x, y), (x, y + size), (x + size, y + size), (x + size, y)],
    )
}

fn unit_query() -> [(f64, f64); 4] {
    [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]
}

fn found_files(found: &PolygonIndex) -> BTreeSet<String> {
    found
        .iter()
        .filter_map(|e| e.item().get("file").and_then(|v| v.as_str()))
        .map(String::from)
        .collect()
}

/// Items that truly intersect at least one query ring, checked one by one.
fn brute_force(items: &[Item], queries: &[Vec<(f64, f64)>], lon_first: bool) -> BTreeSet<String> {
    items
        .iter()
        .filter(|item| {
            let polygon = item.polygon(lon_first);
            queries
                .iter()
                .any(|q| polygon.intersects(&ring_polygon(q, lon_first)))
        })
        .filter_map(|item| item.get("file").and_then(|v| v.as_str()))
        .map(String::from)
        .collect()
}

/// The seven-file fixture: one large square, two identical unit squares
/// with different names, nested squares and two tiny squares at the origin.
fn seven_files() -> Vec<Item> {
    vec![
        square("big", 0.0, 0.0, 2.0),
        square("one", 0.0, 0.0, 1.0),
        square("two", 0.0, 0.0, 1.0),
        item("three", &[(0.1, 0.1), (0.1, 1.0), (1.0, 1.0), (1.0, 0.1)]),
        square("four", 0.1, 0.1, 0.8),
        square("five", 0.0, 0.0, 0.0001),
        square("six", 0.0, 0.0, 0.00001),
    ]
}

#[test]
fn test_seven_file_fixture() {
    init_logger();

    for (hash_min, depth) in [(4, 3), (2, 3), (1, 5)] {
        let index = IndexBuilder::new()
            .hash_min(hash_min)
            .depth(depth)
            .build()
            .unwrap();

        let mut local = PolygonIndex::new(true);
        for item in seven_files() {
            local.insert(item.clone()).unwrap();
            index.insert(&item, true).unwrap();
        }

        let found = index.intersect(&unit_query(), true).unwrap();
        assert_eq!(
            found.len(),
            local.len(),
            "hash_min {} depth {}",
            hash_min,
            depth
        );
        assert_eq!(found_files(&found).len(), 7);
    }
}

#[test]
fn test_four_squares_match_brute_force() {
    init_logger();

    let index = IndexBuilder::new()
        .hash_min(2)
        .depth(3)
        .delta(1.5)
        .build()
        .unwrap();

    let items = vec![
        square("unit", 0.0, 0.0, 1.0),
        square("overlap", 0.5, 0.5, 1.0),
        square("touching", 1.0, 0.0, 1.0),
        square("apart", 1.5, 1.5, 1.0),
    ];
    for item in &items {
        index.insert(item, true).unwrap();
    }

    let queries = vec![unit_query().to_vec()];
    let found = index.query(&queries, true, 2).unwrap();

    let expected = brute_force(&items, &queries, true);
    assert_eq!(found_files(&found), expected);

    let named: BTreeSet<String> = ["overlap", "touching", "unit"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(expected, named);
}

#[test]
fn test_grid_of_items_matches_brute_force() {
    init_logger();

    let index = IndexBuilder::new().hash_min(2).depth(4).build().unwrap();

    let mut items = Vec::new();
    for i in 0..12 {
        for j in 0..12 {
            let size = 0.02 + ((i * 7 + j * 3) % 11) as f64 * 0.05;
            let name = format!("sq_{}_{}", i, j);
            items.push(square(&name, i as f64 * 0.37, j as f64 * 0.29, size));
        }
    }
    for item in &items {
        index.insert(item, true).unwrap();
    }

    let query_sets = vec![
        vec![unit_query().to_vec()],
        vec![vec![(1.2, 0.4), (2.9, 1.1), (1.5, 2.6)]],
        vec![
            vec![(0.05, 3.0), (0.15, 3.0), (0.15, 3.1), (0.05, 3.1)],
            vec![(3.3, 0.1), (4.4, 0.1), (4.4, 0.2)],
        ],
        vec![vec![(10.0, 10.0), (11.0, 10.0), (11.0, 11.0)]],
    ];

    for queries in &query_sets {
        let (found, stats) = index.query_with_stats(queries, true, 16).unwrap();
        let expected = brute_force(&items, queries, true);

        assert_eq!(found_files(&found), expected, "queries {:?}", queries);
        assert_eq!(stats.matched, expected.len());
        assert!(stats.candidates >= stats.matched);
    }
}

#[test]
fn test_lat_first_and_lon_first_agree() {
    let lon_first = IndexBuilder::new().hash_min(2).depth(3).build().unwrap();
    let lat_first = IndexBuilder::new().hash_min(2).depth(3).build().unwrap();

    let rings = [
        ("a", vec![(10.0, 50.0), (12.0, 50.0), (12.0, 51.0), (10.0, 51.0)]),
        ("b", vec![(11.5, 50.5), (11.6, 50.5), (11.6, 50.6)]),
        ("c", vec![(-3.0, 40.0), (-2.0, 40.0), (-2.0, 41.0)]),
    ];

    for (name, ring) in &rings {
        lon_first.insert(&item(name, ring), true).unwrap();
        let swapped: Vec<(f64, f64)> = ring.iter().map(|&(lon, lat)| (lat, lon)).collect();
        lat_first.insert(&item(name, &swapped), false).unwrap();
    }

    let query = vec![(11.0, 50.2), (11.8, 50.2), (11.8, 50.8), (11.0, 50.8)];
    let swapped: Vec<(f64, f64)> = query.iter().map(|&(lon, lat)| (lat, lon)).collect();

    let a = lon_first.intersect(&query, true).unwrap();
    let b = lat_first.intersect(&swapped, false).unwrap();

    assert_eq!(found_files(&a), found_files(&b));
    assert_eq!(found_files(&a).len(), 2);
}

#[test]
fn test_insert_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let index = IndexBuilder::new()
        .hash_min(2)
        .depth(3)
        .build_with(Arc::clone(&store))
        .unwrap();

    for item in seven_files() {
        index.insert(&item, true).unwrap();
    }

    let before: TableDump = store.dump();
    for item in seven_files() {
        let outcome = index.insert(&item, true).unwrap();
        assert!(outcome.duplicate);
    }

    assert_eq!(store.dump(), before);

    // "one" and "two" share a ring but not their content.
    let content = &before[index.schema().content()];
    assert_eq!(content.len(), 7);
    assert!(content.values().all(|values| values.len() == 1));
}

#[test]
fn test_truncated_content_ids() {
    let index = IndexBuilder::new()
        .hash_min(2)
        .depth(3)
        .content_id_len(32)
        .build()
        .unwrap();

    for item in seven_files() {
        let outcome = index.insert(&item, true).unwrap();
        assert_eq!(outcome.id.len(), 32);
    }

    let found = index.intersect(&unit_query(), true).unwrap();
    assert_eq!(found.len(), 7);
    assert!(found.iter().all(|e| e.id().len() == 32));
}

#[test]
fn test_multiple_query_polygons_are_unioned() {
    let index = IndexBuilder::new().hash_min(2).depth(3).build().unwrap();
    index.insert(&square("west", -10.0, 0.0, 1.0), true).unwrap();
    index.insert(&square("east", 10.0, 0.0, 1.0), true).unwrap();
    index.insert(&square("north", 0.0, 30.0, 1.0), true).unwrap();

    let queries = vec![
        vec![(-9.5, 0.2), (-9.4, 0.2), (-9.4, 0.3)],
        vec![(10.2, 0.2), (10.3, 0.2), (10.3, 0.3)],
    ];
    let found = index.query_default(&queries, true).unwrap();

    let expected: BTreeSet<String> = ["east", "west"].into_iter().map(String::from).collect();
    assert_eq!(found_files(&found), expected);
}

#[test]
fn test_large_queries_against_deep_item() {
    init_logger();

    let index = IndexBuilder::new().build().unwrap();
    let outcome = index.insert(&square("tiny", 10.0, 10.0, 0.0001), true).unwrap();
    assert_eq!(outcome.terminal_length, Some(index.config().hash_max()));

    for side in [0.5, 4.0, 40.0] {
        let (lo, hi) = (10.0 - side / 2.0, 10.0 + side / 2.0);
        let query = vec![(lo, lo), (lo, hi), (hi, hi), (hi, lo)];
        let (found, stats) = index.query_with_stats(&[query], true, 100).unwrap();
        assert_eq!(found_files(&found).len(), 1, "side {}", side);

        // Only the root level scales with the query; deeper levels only
        // see cells reached through the item's own edges.
        let root = cover(&BoundingBox::new(lo, lo, hi, hi), index.config().hash_min)
            .unwrap()
            .len();
        let walk = &stats.walk;
        assert_eq!(walk.cells_probed - root + walk.cells_pruned, walk.edges_followed);
        assert_eq!(walk.edges_followed, index.config().depth);
    }
}

#[test]
fn test_concurrent_inserts_converge() {
    init_logger();

    let store = Arc::new(MemoryStore::new());
    let index = IndexBuilder::new()
        .hash_min(2)
        .depth(3)
        .build_with(Arc::clone(&store))
        .unwrap();

    let shared = square("shared", 5.0, 5.0, 0.3);
    let outcomes: Vec<InsertOutcome> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let index = &index;
                let shared = &shared;
                s.spawn(move || {
                    // Every thread also inserts an overlapping item of its own.
                    let own = square(&format!("own_{}", i), 5.1, 5.1, 0.2);
                    index.insert(&own, true).unwrap();
                    index.insert(shared, true).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let id = &outcomes[0].id;
    assert!(outcomes.iter().all(|o| &o.id == id));
    assert!(outcomes.iter().any(|o| !o.duplicate));

    let dump = store.dump();
    let content = &dump[index.schema().content()];
    assert_eq!(content.len(), 9);
    assert_eq!(content[id.as_str()].len(), 1);

    let found = index
        .intersect(&[(5.0, 5.0), (5.0, 5.3), (5.3, 5.3), (5.3, 5.0)], true)
        .unwrap();
    assert_eq!(found.len(), 9);
}

/// Store that can be told to fail reads or writes.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl KvStore for FlakyStore {
    fn create_table(&self, table: &str) -> geotrie::Result<()> {
        self.inner.create_table(table)
    }

    fn put_if_absent(&self, table: &str, key: &str, value: &str) -> geotrie::Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GeoTrieError::BackingStore("write timed out".into()));
        }
        self.inner.put_if_absent(table, key, value)
    }

    fn get_many(&self, table: &str, keys: &[&str]) -> geotrie::Result<Rows> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GeoTrieError::BackingStore("read timed out".into()));
        }
        self.inner.get_many(table, keys)
    }
}

#[test]
fn test_store_failures_propagate() {
    let store = Arc::new(FlakyStore::default());
    let index = IndexBuilder::new()
        .hash_min(2)
        .depth(3)
        .build_with(Arc::clone(&store))
        .unwrap();

    let one = square("one", 0.0, 0.0, 1.0);
    index.insert(&one, true).unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    let two = square("two", 0.0, 0.0, 1.0);
    assert!(matches!(
        index.insert(&two, true),
        Err(GeoTrieError::BackingStore(_))
    ));

    // Nothing was written for "two", so a retry completes it.
    store.fail_writes.store(false, Ordering::SeqCst);
    assert!(!index.contains(&two).unwrap());
    assert!(!index.insert(&two, true).unwrap().duplicate);

    store.fail_reads.store(true, Ordering::SeqCst);
    assert!(matches!(
        index.intersect(&unit_query(), true),
        Err(GeoTrieError::BackingStore(_))
    ));

    store.fail_reads.store(false, Ordering::SeqCst);
    assert_eq!(index.intersect(&unit_query(), true).unwrap().len(), 2);
}
