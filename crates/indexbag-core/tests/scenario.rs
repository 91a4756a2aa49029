use indexbag_core::{
    container::Container,
    error::{ErrorClass, IndexError},
    index::{NonUniqueIndex, UniqueIndex},
    key::Key,
};

#[derive(Clone, Debug, PartialEq)]
struct Row {
    n: i64,
    s: String,
}

fn row(n: i64, s: &str) -> Row {
    Row { n, s: s.into() }
}

#[test]
fn unique_and_non_unique_lookup_scenario() {
    let mut bag = Container::new();
    let by_n = UniqueIndex::named("n", |r: &Row| r.n)
        .unwrap()
        .on(&mut bag)
        .unwrap();
    let by_s = NonUniqueIndex::named("s", |r: &Row| r.s.clone())
        .unwrap()
        .on(&mut bag)
        .unwrap();

    let first = bag.add(row(1, "a")).unwrap();
    let second = bag.add(row(2, "a")).unwrap();

    assert_eq!(bag.resolve(&by_s.get(&"a".to_string())), vec![&row(1, "a"), &row(2, "a")]);
    assert_eq!(by_n.get(&1).and_then(|id| bag.get(id)), Some(&row(1, "a")));

    let err = bag.add(row(1, "b")).unwrap_err();
    assert!(matches!(
        &err.source,
        IndexError::KeyCollision { key, existing, .. } if *key == Key::Int(1) && *existing == first
    ));
    assert_eq!(err.source.class(), ErrorClass::Conflict);
    assert_eq!(err.source.index().to_string(), "n");

    assert!(bag.delete(first).unwrap());
    assert_eq!(by_n.get(&1), None);
    assert_eq!(by_s.get(&"a".to_string()), vec![second]);
    assert!(!by_s.contains_key(&"b".to_string()));
    bag.verify().unwrap();
}

#[test]
fn late_unique_index_over_colliding_values_is_rejected() {
    let mut bag = Container::new();
    let by_n = UniqueIndex::new(|r: &Row| r.n).on(&mut bag).unwrap();
    bag.add(row(1, "dup")).unwrap();
    bag.add(row(2, "dup")).unwrap();

    let err = UniqueIndex::named("s", |r: &Row| r.s.clone())
        .unwrap()
        .on(&mut bag)
        .unwrap_err();

    assert_eq!(err.key(), &Key::from("dup"));
    assert_eq!(bag.index_count(), 1);
    assert_eq!(by_n.keys(), vec![1, 2]);

    // a non-unique index over the same key attaches fine
    let by_s = NonUniqueIndex::new(|r: &Row| r.s.clone())
        .on(&mut bag)
        .unwrap();
    assert_eq!(by_s.count(&"dup".to_string()), 2);
}

#[test]
fn structurally_equal_values_are_distinct_members() {
    let mut bag = Container::new();
    let by_s = NonUniqueIndex::new(|r: &Row| r.s.clone())
        .on(&mut bag)
        .unwrap();

    let a = bag.add(row(1, "x")).unwrap();
    let b = bag.add(row(1, "x")).unwrap();
    assert_ne!(a, b);
    assert_eq!(by_s.count(&"x".to_string()), 2);

    assert_eq!(bag.take(a).unwrap(), Some(row(1, "x")));
    assert!(by_s.contains(&"x".to_string(), b));
    assert!(!by_s.contains(&"x".to_string(), a));
}

#[test]
fn panicking_key_function_leaves_container_consistent() {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    let mut bag = Container::new();
    let by_n = UniqueIndex::new(|r: &Row| r.n).on(&mut bag).unwrap();
    NonUniqueIndex::new(|r: &Row| {
        assert!(r.s != "boom", "key function rejected row");
        r.s.clone()
    })
    .on(&mut bag)
    .unwrap();
    bag.add(row(1, "ok")).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| bag.add(row(2, "boom"))));
    assert!(result.is_err());

    assert_eq!(bag.len(), 1);
    assert_eq!(by_n.keys(), vec![1]);
    bag.verify().unwrap();
}

#[test]
fn typed_keys_over_plain_values() {
    let mut bag = Container::new();
    let by_len = UniqueIndex::new(|s: &String| s.len()).on(&mut bag).unwrap();
    let by_first = NonUniqueIndex::new(|s: &String| u32::from(s.as_bytes()[0]))
        .on(&mut bag)
        .unwrap();

    let id = bag.add("abc".to_string()).unwrap();
    bag.add("a".to_string()).unwrap();

    assert_eq!(by_len.get(&3), Some(id));
    assert_eq!(by_first.count(&u32::from(b'a')), 2);
    assert_eq!(by_len.keys(), vec![1, 3]);
}
