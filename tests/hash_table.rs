use std::collections::BTreeSet;

use chaintable::{HashTable, TableError, Value};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dump_string(t: &HashTable<Value>) -> String {
    let mut out = Vec::new();
    t.dump(&mut out).expect("writing to a Vec");
    String::from_utf8(out).expect("keys are utf-8")
}

#[test]
fn insert_get_delete_scenario() {
    init_logger();
    let mut ht = HashTable::create(50).expect("create ok");

    ht.insert("test", Value(123)).expect("insert ok");
    assert_eq!(ht.get_value("test"), Some(&Value(123)));
    assert!(ht.key_exists("test"));

    match ht.insert("test", Value(789)) {
        Err(TableError::KeyAlreadyExists { key }) => assert_eq!(key, "test"),
        other => panic!("expected duplicate insert to error, got {other:?}"),
    }
    assert_eq!(ht.get_value("test"), Some(&Value(123)));

    assert_eq!(ht.delete("test").expect("delete ok"), Value(123));
    assert_eq!(ht.get_value("test"), None);
    assert!(!ht.key_exists("test"));

    ht.insert("ABC", Value(123)).expect("insert ABC");
    ht.insert("XYZ", Value(789)).expect("insert XYZ");
    assert_eq!(dump_string(&ht), "[main index 10] XYZ\n[main index 21] ABC\n");

    ht.delete("ABC").expect("delete ABC");
    assert_eq!(dump_string(&ht), "[main index 10] XYZ\n");
    assert_eq!(ht.len(), 1);

    ht.clear();
}

#[test]
fn create_rejects_zero_buckets() {
    init_logger();
    let err = HashTable::<Value>::create(0).unwrap_err();
    assert!(matches!(err, TableError::InvalidArgument(_)));
    assert_eq!(err.to_string(), "Invalid argument: bucket count must be at least 1");

    let single = HashTable::<Value>::create(1).expect("one bucket is enough");
    assert_eq!(single.bucket_count(), 1);
}

#[test]
fn delete_missing_key_leaves_table_unchanged() {
    init_logger();
    let mut ht = HashTable::create(4).unwrap();
    for k in ["a", "b", "c"] {
        ht.insert(k, Value(1)).unwrap();
    }
    let before = dump_string(&ht);

    let err = ht.delete("zzz").unwrap_err();
    assert!(matches!(err, TableError::KeyNotFound { ref key } if key == "zzz"));
    assert_eq!(err.to_string(), "Key \"zzz\" not found");
    assert_eq!(dump_string(&ht), before);
    assert_eq!(ht.len(), 3);
}

#[test]
fn delete_middle_of_chain_keeps_successors() {
    init_logger();
    // a single bucket puts every key in one chain
    let mut ht = HashTable::create(1).unwrap();
    for (i, k) in ["d", "a", "e", "c", "b"].into_iter().enumerate() {
        ht.insert(k, Value(i as i32)).unwrap();
    }

    assert_eq!(ht.delete("c").unwrap(), Value(3));
    assert_eq!(
        dump_string(&ht),
        "[main index 0] a\n[main index 0] b\n[main index 0] d\n[main index 0] e\n"
    );
    for k in ["a", "b", "d", "e"] {
        assert!(ht.key_exists(k), "{k} lost after deleting c");
    }

    // deleting the tail and head afterwards still works
    ht.delete("e").unwrap();
    ht.delete("a").unwrap();
    assert_eq!(dump_string(&ht), "[main index 0] b\n[main index 0] d\n");
}

#[test]
fn next_entry_yields_every_key_once() {
    init_logger();
    let mut ht = HashTable::create(13).unwrap();
    let keys: Vec<String> = (0..200).map(|i| format!("key-{i}")).collect();
    for (i, k) in keys.iter().enumerate() {
        ht.insert(k, Value(i as i32)).unwrap();
    }

    let mut seen = Vec::new();
    while let Some(entry) = ht.next_entry() {
        seen.push(entry.key().to_string());
    }

    assert_eq!(seen.len(), keys.len());
    let seen: BTreeSet<_> = seen.into_iter().collect();
    let expected: BTreeSet<_> = keys.into_iter().collect();
    assert_eq!(seen, expected);
}

#[test]
fn next_entry_order_matches_dump() {
    init_logger();
    let mut ht = HashTable::create(7).unwrap();
    for k in ["pear", "apple", "fig", "kiwi", "plum", "lime", "date", "yuzu"] {
        ht.insert(k, Value(0)).unwrap();
    }

    let mut lines = String::new();
    while let Some(entry) = ht.next_entry() {
        let key = entry.key().to_string();
        let bucket = ht.cursor().index();
        lines.push_str(&format!("[main index {bucket}] {key}\n"));
    }
    assert_eq!(lines, dump_string(&ht));
}

#[test]
fn next_entry_restarts_after_exhaustion() {
    init_logger();
    let mut ht = HashTable::create(3).unwrap();
    ht.insert("one", Value(1)).unwrap();
    ht.insert("two", Value(2)).unwrap();

    let first_pass: Vec<_> = std::iter::from_fn(|| ht.next_entry().map(|e| e.key().to_string())).collect();
    assert!(ht.cursor().is_reset());
    let second_pass: Vec<_> = std::iter::from_fn(|| ht.next_entry().map(|e| e.key().to_string())).collect();

    assert_eq!(first_pass.len(), 2);
    assert_eq!(first_pass, second_pass);
}

#[test]
fn reset_cursor_midway() {
    init_logger();
    let mut ht = HashTable::create(3).unwrap();
    for k in ["x", "y", "z"] {
        ht.insert(k, Value(0)).unwrap();
    }

    let first = ht.next_entry().map(|e| e.key().to_string());
    ht.next_entry();
    ht.reset_cursor();
    assert_eq!(ht.next_entry().map(|e| e.key().to_string()), first);
}

#[test]
fn values_are_owned_by_the_table() {
    init_logger();
    let mut ht: HashTable<Vec<u8>> = HashTable::create(8).unwrap();
    ht.insert("blob", vec![1, 2, 3]).unwrap();
    ht.get_value_mut("blob").unwrap().push(4);

    let blob = ht.delete("blob").unwrap();
    assert_eq!(blob, vec![1, 2, 3, 4]);
    assert!(ht.is_empty());
}

#[test]
fn load_factor() {
    let mut ht = HashTable::create(4).unwrap();
    assert_eq!(ht.load_factor(), 0.0);
    for i in 0..6 {
        ht.insert(&format!("{i}"), Value(i)).unwrap();
    }
    assert_eq!(ht.load_factor(), 1.5);
}

#[test]
fn next_entry_pass_over_one_long_chain_is_linear() {
    init_logger();
    const N: usize = 50_000;
    let mut ht = HashTable::create(1).unwrap();
    // descending keys always link at the head of the single chain
    for i in (0..N).rev() {
        ht.insert(&format!("{i:06}"), Value(i as i32)).unwrap();
    }

    let start = std::time::Instant::now();
    let mut steps = 0;
    let mut last = String::new();
    while let Some(entry) = ht.next_entry() {
        assert!(entry.key() > last.as_str());
        last = entry.key().to_string();
        steps += 1;
    }
    let elapsed = start.elapsed();

    assert_eq!(steps, N);
    // rewalking the chain for every step would take minutes here
    assert!(elapsed < std::time::Duration::from_secs(5), "pass took {elapsed:?}");
}
