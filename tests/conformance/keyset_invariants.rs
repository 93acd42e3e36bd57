//! Key set invariants
//!
//! Ordering, uniqueness by name, name locking and subtree operations.

use crate::common::*;

fn tree() -> KeySet {
    keyset([
        create("user/app/z", "z"),
        create("user/app", "root"),
        create("user/app/a/deep", "deep"),
        create("user/app/a", "a"),
        create("user/app-data", "other"),
        create("system/app", "sys"),
        create("/app", "cascading"),
    ])
}

#[test]
fn test_keys_are_ordered_hierarchically() {
    assert_eq!(
        names(&tree()),
        vec![
            "/app",
            "system/app",
            "user/app",
            "user/app/a",
            "user/app/a/deep",
            "user/app/z",
            "user/app-data",
        ]
    );
}

#[test]
fn test_same_name_replaces() {
    let mut ks = tree();
    let before = ks.len();
    let replacement = create("user/app/a", "replaced");
    assert_eq!(ks.append(replacement.clone()), before);
    let found = ks.lookup_by_name("user/app/a").unwrap().unwrap();
    assert!(found.same_identity(&replacement));
}

#[test]
fn test_lookup_by_name_canonicalizes_input() {
    let ks = tree();
    let found = ks.lookup_by_name("user//app/./a/").unwrap().unwrap();
    assert_eq!(found.string(), "a");
    assert!(ks.lookup_by_name("user/app/missing").unwrap().is_none());
    assert!(ks.lookup_by_name("app").is_err());
}

#[test]
fn test_members_cannot_be_renamed() {
    let key = create("user/app/x", "");
    let mut ks = keyset([key.clone()]);
    assert!(key.is_name_locked());
    assert!(key.set_name("user/app/y").is_err());
    assert!(key.add_base_name("child").is_err());
    assert_eq!(key.name(), "user/app/x");

    key.set_string("values stay writable");
    key.set_meta("comment", "so does metadata").unwrap();

    ks.remove_by_name("user/app/x").unwrap();
    assert!(!key.is_name_locked());
    key.set_name("user/app/y").unwrap();
}

#[test]
fn test_lock_is_held_while_any_set_owns_the_key() {
    let key = create("/shared", "");
    let first = keyset([key.clone()]);
    let second = keyset([key.clone()]);
    drop(first);
    assert!(key.is_name_locked());
    drop(second);
    assert!(!key.is_name_locked());
}

#[test]
fn test_cut_and_remainder_partition_the_set() {
    let mut ks = tree();
    let total = ks.len();
    let parent = create("user/app", "");

    let below = ks.below(&parent);
    let cut = ks.cut(&parent);
    assert_eq!(names(&below), names(&cut));
    assert_eq!(
        names(&cut),
        vec!["user/app", "user/app/a", "user/app/a/deep", "user/app/z"]
    );
    assert_eq!(names(&ks), vec!["/app", "system/app", "user/app-data"]);
    assert_eq!(cut.len() + ks.len(), total);
}

#[test]
fn test_lookup_relation_selects_by_code() {
    let ks = tree();
    let anchor = create("user/app", "");
    let names_of = |relation| -> Vec<String> {
        ks.lookup_relation(&anchor, relation)
            .iter()
            .map(Key::name)
            .collect()
    };
    assert_eq!(names_of(Relation::Same), vec!["user/app"]);
    assert_eq!(names_of(Relation::DirectChild), vec!["user/app/a", "user/app/z"]);
    assert_eq!(names_of(Relation::Descendant), vec!["user/app/a/deep"]);
    assert_eq!(names_of(Relation::Unrelated).len(), 3);
}

#[test]
fn test_cursor_walk_allows_value_updates() {
    let mut ks = tree();
    ks.rewind();
    while let Some(key) = ks.next_key() {
        key.set_string(&key.string().to_uppercase());
    }
    assert_eq!(
        ks.lookup_by_name("user/app/a/deep").unwrap().unwrap().string(),
        "DEEP"
    );
}

#[test]
fn test_cursor_walk_tolerates_appends() {
    let mut ks = keyset([create("/b", ""), create("/c", "")]);
    ks.rewind();
    assert_eq!(ks.next_key().unwrap().name(), "/b");
    ks.append(create("/a", ""));
    assert_eq!(ks.current_key().unwrap().name(), "/b");
    assert_eq!(ks.next_key().unwrap().name(), "/c");
    assert!(ks.next_key().is_none());
    assert_eq!(ks.len(), 3);
}

#[test]
fn test_dup_is_deep_and_replace_swaps_contents() {
    let mut ks = tree();
    let copy = ks.dup();
    copy.head().unwrap().set_string("changed");
    assert_eq!(ks.head().unwrap().string(), "cascading");

    ks.replace(copy);
    assert_eq!(ks.head().unwrap().string(), "changed");
    assert_eq!(ks.len(), 7);
}

#[test]
fn test_append_all_shares_records() {
    let source = tree();
    let mut target = KeySet::new();
    target.append_all(&source);
    assert_eq!(names(&target), names(&source));
    assert!(target.head().unwrap().same_identity(source.head().unwrap()));
}

#[test]
fn test_names_round_trip_through_serde() {
    let ks = tree();
    let names = ks.names();
    let json = serde_json::to_string(&names).unwrap();
    let back: Vec<KeyName> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, names);
    assert!(serde_json::from_str::<KeyName>("\"no-root\"").is_err());
}
