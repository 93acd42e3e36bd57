//! Key API conformance
//!
//! Mirrors the scenarios host bindings rely on: create, wrap a handle,
//! iterate segments, typed values, metadata, relations and renames.

use crate::common::*;
use keytree::{Error, KeyHandle, Namespace};
use std::cmp::Ordering;

#[test]
fn test_create_key() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    assert_eq!(key.to_string(), KEY_1_NAME);
    assert_eq!(key.string(), KEY_1_VALUE);
}

#[test]
fn test_create_key_from_handle() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    let handle: KeyHandle = key.handle();
    let key2 = Key::from_handle(handle);
    assert_eq!(key.to_string(), key2.to_string());
    assert_eq!(key.string(), key2.string());
    assert_eq!(key.id(), key2.id());
}

#[test]
fn test_name_segments_iterate_root_first() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    let mut segments = key.segments();
    assert_eq!(segments.next().as_deref(), Some(""));
    assert_eq!(segments.next().as_deref(), Some("key_test"));
    assert_eq!(segments.next().as_deref(), Some("1"));
    assert_eq!(segments.next().as_deref(), Some("key_name"));
    assert_eq!(segments.next(), None);

    segments.restart();
    assert_eq!(segments.count(), 4);
}

#[test]
fn test_boolean_value() {
    let key = create(KEY_2_NAME, KEY_2_VALUE);
    assert!(!key.get_bool());
    key.set_bool(true);
    assert!(key.get_bool());
    key.set_string("false");
    assert!(!key.get_bool());
    assert_eq!(key.string(), "false");
}

#[test]
fn test_integer_values_check_range() {
    assert_eq!(create(KEY_3_NAME, KEY_3_VALUE).get_i8(), Ok(1));
    assert!(create("/key_test/4/key_name", "32123").get_i8().is_err());
    assert_eq!(create("/key_test/4/key_name", "32123").get_i16(), Ok(32123));
    assert!(create("/key_test/5/key_name", "214748365").get_i16().is_err());
    assert_eq!(
        create("/key_test/5/key_name", "214748365").get_i32(),
        Ok(214_748_365)
    );
    assert!(create("/key_test/6/key_name", "121424748365").get_i32().is_err());
    assert_eq!(
        create("/key_test/6/key_name", "121424748365").get_i64(),
        Ok(121_424_748_365)
    );
    let err = create("/key_test/7/key_name", "121424748365123123123123123123354")
        .get_i64()
        .unwrap_err();
    assert!(matches!(err, Error::ValueConversion { target: "i64", .. }));
}

#[test]
fn test_float_values() {
    assert_eq!(
        create("/key_test/8/key_name", "123.456").get_f32(),
        Ok("123.456".parse::<f32>().unwrap())
    );
    assert_eq!(
        create("/key_test/9/key_name", "12345.678911").get_f64(),
        Ok(12345.678911)
    );
    assert!(create(KEY_10_NAME, "blub").get_f64().is_err());
}

#[test]
fn test_meta_information() {
    let mut key = create(KEY_1_NAME, KEY_1_VALUE);
    key.set_meta(KEY_1_META_1_NAME, KEY_1_META_1_VALUE).unwrap();
    key.set_meta(KEY_1_META_2_NAME, KEY_1_META_2_VALUE).unwrap();
    key.rewind_meta();

    let meta_1 = key.current_meta().unwrap();
    assert_eq!(meta_1.name(), KEY_1_META_1_NAME);
    assert_eq!(meta_1.string(), KEY_1_META_1_VALUE);
    let meta_2 = key.next_meta().unwrap();
    assert_eq!(meta_2.name(), KEY_1_META_2_NAME);
    assert_eq!(meta_2.string(), KEY_1_META_2_VALUE);
    assert!(key.next_meta().is_none());

    let mut key2 = create(KEY_2_NAME, KEY_2_VALUE);
    key2.copy_all_meta(&key);
    key2.rewind_meta();

    let meta_1 = key2.current_meta().unwrap();
    assert_eq!(meta_1.name(), KEY_1_META_1_NAME);
    assert_eq!(meta_1.string(), KEY_1_META_1_VALUE);
    let meta_2 = key2.next_meta().unwrap();
    assert_eq!(meta_2.name(), KEY_1_META_2_NAME);
    assert_eq!(meta_2.string(), KEY_1_META_2_VALUE);

    assert_eq!(key.meta_count(), 2);
}

#[test]
fn test_copy_all_meta_replaces_in_place() {
    let source = create(KEY_1_NAME, "");
    source.set_meta("b", "source").unwrap();
    let mut target = create(KEY_2_NAME, "");
    target.set_meta("a", "target").unwrap();
    target.set_meta("b", "target").unwrap();

    target.copy_all_meta(&source);
    target.rewind_meta();
    assert_eq!(target.next_meta().unwrap().string(), "target");
    let replaced = target.next_meta().unwrap();
    assert_eq!(replaced.name(), "/b");
    assert_eq!(replaced.string(), "source");
    assert_eq!(source.meta_count(), 1);
}

#[test]
fn test_compare() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    let key2 = create(KEY_2_NAME, KEY_2_VALUE);
    assert_eq!(key.compare(&key), Ordering::Equal);
    assert_eq!(key.compare(&key2), Ordering::Less);
    assert_eq!(key2.compare(&key), Ordering::Greater);
}

#[test]
fn test_compare_is_hierarchical_not_bytewise() {
    let nested = create("/a/b", "");
    let dashed = create("/a-b", "");
    assert_eq!(nested.compare(&dashed), Ordering::Less);
    assert!("/a/b" > "/a-b");
}

#[test]
fn test_relation() {
    let key = create(KEY_10_NAME, "blub");
    let key2 = create(KEY_11_NAME, "blub2");
    let key3 = create(KEY_12_NAME, "blub3");
    assert_eq!(key.rel(&key).code(), 0);
    assert_eq!(key.rel(&key2).code(), 1);
    assert_eq!(key.rel(&key3).code(), 2);
    assert_eq!(key2.rel(&key3).code(), 1);
    assert_eq!(key2.rel(&key), Relation::DirectParent);
    assert_eq!(key3.rel(&key), Relation::Ancestor);
    assert_eq!(key.rel(&create(KEY_1_NAME, "")), Relation::Unrelated);
}

#[test]
fn test_below_predicates() {
    let key = create(KEY_10_NAME, "blub");
    let key2 = create(KEY_11_NAME, "blub2");
    let key3 = create(KEY_12_NAME, "blub3");

    assert!(key2.is_below(&key));
    assert!(key3.is_below(&key));
    assert!(key3.is_below(&key2));
    assert!(!key.is_below(&key));

    assert!(key.is_below_or_same(&key));
    assert!(key2.is_below_or_same(&key));
    assert!(key2.is_below_or_same(&key2));
    assert!(key3.is_below_or_same(&key));
    assert!(key3.is_below_or_same(&key2));
    assert!(key3.is_below_or_same(&key3));

    assert!(!key.is_direct_below(&key));
    assert!(key2.is_direct_below(&key));
    assert!(!key2.is_direct_below(&key2));
    assert!(!key2.is_direct_below(&key3));
    assert!(key3.is_direct_below(&key2));
    assert!(!key3.is_direct_below(&key));
}

#[test]
fn test_cascading_and_namespaced_are_unrelated() {
    let cascading = create("/app/x", "");
    let user = create("user/app/x", "");
    assert_eq!(cascading.rel(&user), Relation::Unrelated);
    assert_eq!(user.namespace(), Namespace::User);
    assert!(!user.is_below(&create("/", "")));
}

#[test]
fn test_name_and_value_sizes() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    let key2 = create(KEY_2_NAME, KEY_2_VALUE);
    let key3 = create(KEY_3_NAME, KEY_3_VALUE);
    assert_eq!(key.name_size(), KEY_1_NAME.len() + 1);
    assert_eq!(key2.name_size(), KEY_2_NAME.len() + 1);
    assert_eq!(key3.name_size(), KEY_3_NAME.len() + 1);
    assert_eq!(key.value_size(), KEY_1_VALUE.len() + 1);
    assert_eq!(key2.value_size(), KEY_2_VALUE.len() + 1);
    assert_eq!(key3.value_size(), KEY_3_VALUE.len() + 1);
}

#[test]
fn test_set_name() {
    let new_name = "/some_random/test/stuff_or/whatever";
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    key.set_name(new_name).unwrap();
    assert_eq!(key.name(), new_name);
}

#[test]
fn test_set_name_without_root_fails() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    let err = key.set_name("some_random/test/stuff_or/whatever").unwrap_err();
    assert!(err.is_invalid_name());
    assert_eq!(key.name(), KEY_1_NAME);
}

#[test]
fn test_set_name_canonicalizes() {
    let key = create(KEY_1_NAME, "");
    key.set_name("/a//b/./c/../d/").unwrap();
    assert_eq!(key.name(), "/a/b/d");
    key.set_name("/a/../..").unwrap();
    assert_eq!(key.name(), "/");
}

#[test]
fn test_base_name() {
    assert_eq!(create(KEY_1_NAME, KEY_1_VALUE).base_name(), "key_name");
    assert_eq!(create(KEY_2_NAME, KEY_2_VALUE).base_name(), "key_name");
    assert_eq!(create("/", "").base_name(), "");
}

#[test]
fn test_set_base_name_escapes_delimiters() {
    let new_base = "/some_random/string";
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    key.set_base_name(new_base).unwrap();
    assert_eq!(key.base_name(), new_base);
    assert_eq!(key.name(), "/key_test/1/\\/some_random\\/string");
    assert!(create("/", "").set_base_name("x").unwrap_err().is_invalid_name());
}

#[test]
fn test_add_base_name_adds_levels() {
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    key.add_base_name("/some_random/string").unwrap();
    assert_eq!(key.base_name(), "string");
    assert_eq!(key.name(), "/key_test/1/key_name/some_random/string");
    key.add_base_name("another_new/nice/basename").unwrap();
    assert_eq!(key.base_name(), "basename");
    assert_eq!(key.segments().len(), 9);
}

#[test]
fn test_get_set_string() {
    let new_string = "some_random new key value.blub";
    let key = create(KEY_1_NAME, KEY_1_VALUE);
    assert_eq!(key.string(), KEY_1_VALUE);
    key.set_string(new_string);
    assert_eq!(key.string(), new_string);
}

#[test]
fn test_escaped_names() {
    let key = Key::new("/a/\\%/\\./%/x\\\\y").unwrap();
    let segments: Vec<String> = key.segments().collect();
    assert_eq!(segments, vec!["", "a", "%", ".", "", "x\\y"]);
    assert_eq!(KeyName::parse(&key.name()).unwrap(), key.key_name());
    assert!(Key::new("/a/\\q").unwrap_err().is_invalid_name());
    assert!(Key::new("/a\\").unwrap_err().is_invalid_name());
}
