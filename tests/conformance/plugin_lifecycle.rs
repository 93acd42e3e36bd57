//! Plugin lifecycle conformance
//!
//! Drives plugins through open → get → set → error → close the way a host
//! pipeline does, using the memory store as the storage plugin.

use std::io::Write;

use crate::common::*;
use keytree::{Iconv, PluginInfo, Stage};

/// Filter plugin that fails `set` on values containing a forbidden word
struct Censor {
    word: String,
}

impl Plugin for Censor {
    fn name(&self) -> &str {
        "censor"
    }

    fn open(&mut self, _error_key: &Key) -> Status {
        Status::SUCCESS
    }

    fn get(&mut self, _ks: &mut KeySet, _parent: &Key) -> Status {
        Status::NO_UPDATE
    }

    fn set(&mut self, ks: &mut KeySet, parent: &Key) -> Status {
        let offending = ks
            .below(parent)
            .iter()
            .find(|key| key.string().contains(self.word.as_str()))
            .map(Key::name);
        match offending {
            Some(name) => {
                let error = report::ErrorReport::new(
                    report::VALIDATION,
                    "Validation",
                    self.name(),
                    format!("{} contains '{}'", name, self.word),
                );
                report::set_error(parent, &error).expect("error meta names are valid");
                Status::ERROR
            }
            None => Status::NO_UPDATE,
        }
    }
}

/// Run `set` over a pipeline; on failure run `error` on the plugins that
/// already ran, newest first
fn commit(pipeline: &mut [Box<dyn Plugin>], ks: &mut KeySet, parent: &Key) -> Status {
    for index in 0..pipeline.len() {
        let status = pipeline[index].set(ks, parent);
        if status.is_error() {
            for plugin in pipeline[..index].iter_mut().rev() {
                plugin.error(ks, parent);
            }
            return status;
        }
    }
    Status::SUCCESS
}

#[test]
fn test_full_lifecycle_round_trip() {
    init_tracing();
    let mut store = opened_store("");
    let parent = Key::new("user/app").unwrap();

    let mut ks = keyset([
        create("user/app/colour", "blue"),
        create("user/app/size", "12"),
    ]);
    assert_eq!(store.set(&mut ks, &parent), Status::SUCCESS);

    let mut loaded = KeySet::new();
    assert_eq!(store.get(&mut loaded, &parent), Status::SUCCESS);
    assert_eq!(names(&loaded), vec!["user/app/colour", "user/app/size"]);
    assert_eq!(
        loaded.lookup_by_name("user/app/size").unwrap().unwrap().get_i32(),
        Ok(12)
    );
    assert_eq!(store.get(&mut loaded, &parent), Status::NO_UPDATE);
    assert_eq!(store.close(&parent), Status::SUCCESS);
}

#[test]
fn test_set_only_touches_the_parent_subtree() {
    let mut store = opened_store("");
    let app = Key::new("user/app").unwrap();
    let other = Key::new("user/other").unwrap();

    let mut ks = keyset([create("user/app/a", "1"), create("user/other/b", "2")]);
    store.set(&mut ks, &app);
    store.set(&mut ks, &other);
    assert_eq!(store.store().lock().len(), 2);

    let mut replaced = keyset([create("user/app/c", "3")]);
    store.set(&mut replaced, &app);
    let stored = names(&store.store().lock());
    assert_eq!(stored, vec!["user/app/c", "user/other/b"]);
}

#[test]
fn test_failing_pipeline_rolls_back_the_store() {
    init_tracing();
    let store = opened_store("");
    let shared = store.store();
    let parent = Key::new("user/app").unwrap();

    let mut pipeline: Vec<Box<dyn Plugin>> = vec![
        Box::new(store),
        Box::new(Censor {
            word: "secret".to_string(),
        }),
    ];

    let mut good = keyset([create("user/app/motd", "hello")]);
    assert_eq!(commit(&mut pipeline, &mut good, &parent), Status::SUCCESS);

    let mut bad = keyset([create("user/app/motd", "the secret is out")]);
    assert_eq!(commit(&mut pipeline, &mut bad, &parent), Status::ERROR);

    let stored = shared.lock();
    let motd = stored.lookup_by_name("user/app/motd").unwrap().unwrap();
    assert_eq!(motd.string(), "hello");

    let error = report::error_report(&parent).unwrap();
    assert_eq!(error.module, "censor");
    assert_eq!(error.number, report::VALIDATION);
    assert!(error.reason.contains("user/app/motd"));
}

#[test]
fn test_readonly_store_reports_on_parent() {
    let mut store = opened_store("readonly = true");
    let parent = Key::new("/app").unwrap();
    let mut ks = keyset([create("/app/x", "1")]);

    assert_eq!(store.set(&mut ks, &parent), Status::ERROR);
    assert!(report::has_error(&parent));
    assert_eq!(
        report::error_report(&parent).unwrap().module,
        keytree::memory::MODULE_NAME
    );
}

#[test]
fn test_stages_before_open_fail() {
    let mut store = MemoryStore::new(PluginConfig::new());
    let parent = Key::new("/app").unwrap();
    let mut ks = KeySet::new();
    assert!(store.set(&mut ks, &parent).is_error());
    assert!(report::has_error(&parent));

    report::clear_error(&parent).unwrap();
    assert!(store.get(&mut ks, &parent).is_error());
    assert!(report::has_error(&parent));
}

#[test]
fn test_config_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "readonly = false").unwrap();
    writeln!(file, "[limits]").unwrap();
    writeln!(file, "names = [\"a\", \"b\"]").unwrap();

    let config = PluginConfig::from_file(file.path()).unwrap();
    let names = names(config.keyset());
    assert_eq!(
        names,
        vec!["/limits/names/#0", "/limits/names/#1", "/readonly"]
    );

    let mut store = MemoryStore::new(config);
    let error_key = Key::new("/").unwrap();
    assert_eq!(store.open(&error_key), Status::SUCCESS);
    assert!(report::warnings(&error_key).is_empty());
    let parent = Key::new("/app").unwrap();
    let mut ks = keyset([create("/app/x", "1")]);
    assert_eq!(store.set(&mut ks, &parent), Status::SUCCESS);
}

#[test]
fn test_plugin_info_as_keys() {
    let store = MemoryStore::new(PluginConfig::new());
    let info = store.info();
    let ks = info.to_keyset().unwrap();

    let root = ks
        .lookup_by_name("system/elektra/modules/memory")
        .unwrap()
        .unwrap();
    assert_eq!(root.string(), "memory");
    for stage in Stage::ALL {
        let name = format!("system/elektra/modules/memory/exports/{}", stage);
        assert!(ks.lookup_by_name(&name).unwrap().is_some(), "{}", name);
    }
    assert_eq!(PluginInfo::from_keyset(&ks, "memory"), Some(info));
}

#[test]
fn test_charset_filter_in_front_of_store() {
    init_tracing();
    let config = PluginConfig::from_toml_str("from = \"ISO-8859-1\"\nto = \"UTF-8\"").unwrap();
    let mut filter = Iconv::new(config);
    let error_key = Key::new("/").unwrap();
    assert_eq!(filter.open(&error_key), Status::SUCCESS);
    let store = opened_store("");
    let shared = store.store();
    let parent = Key::new("user/app").unwrap();
    let latin1 = vec![b'K', 0xE4, b's', b'e'];

    let mut pipeline: Vec<Box<dyn Plugin>> = vec![Box::new(filter), Box::new(store)];
    let entry = create("user/app/food", "");
    entry.set_encoded_string(latin1.clone());
    entry.set_meta("comment", "").unwrap();
    entry.meta("comment").unwrap().set_encoded_string(vec![0xE4]);
    let mut ks = keyset([entry]);
    assert_eq!(commit(&mut pipeline, &mut ks, &parent), Status::SUCCESS);

    let stored = shared.lock().lookup_by_name("user/app/food").unwrap().unwrap();
    assert_eq!(stored.string(), "Käse");
    assert_eq!(stored.meta_string("comment").as_deref(), Some("ä"));

    // Reading runs storage first, then the filter.
    let mut loaded = KeySet::new();
    assert_eq!(pipeline[1].get(&mut loaded, &parent), Status::SUCCESS);
    assert_eq!(pipeline[0].get(&mut loaded, &parent), Status::SUCCESS);
    let food = loaded.lookup_by_name("user/app/food").unwrap().unwrap();
    assert_eq!(food.value(), latin1);
    assert_eq!(food.meta("comment").unwrap().value(), vec![0xE4]);
}
