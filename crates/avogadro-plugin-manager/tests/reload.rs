mod common;

use std::sync::{Arc, Mutex};
use std::thread;

use avogadro_plugin_manager::builtins::BALL_AND_STICK;
use avogadro_plugin_manager::sdk::{Category, MemorySettings, SettingValue, Settings};
use avogadro_plugin_manager::{
    DiscoveryConfig, JsonSettings, PluginManager, RegistryEvent, RegistryState,
};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use common::{labels, library, manager, owner, touch, Counters, FakeLoader};

/// Two tools, one extension and one color on disk.
fn populated(counters: &Counters) -> (TempDir, FakeLoader) {
    let dir = tempdir().unwrap();
    touch(dir.path(), Category::Tool, &library("draw"));
    touch(dir.path(), Category::Tool, &library("select"));
    touch(dir.path(), Category::Extension, &library("export"));
    touch(dir.path(), Category::Color, &library("charge"));
    let loader = FakeLoader::new()
        .factory(&library("draw"), "Draw", Category::Tool, counters)
        .factory(&library("select"), "Select", Category::Tool, counters)
        .factory(&library("export"), "Export", Category::Extension, counters)
        .factory(&library("charge"), "Charge", Category::Color, counters);
    (dir, loader)
}

#[test]
fn bulk_accessors_cache_within_an_epoch() {
    let counters = Counters::default();
    let (dir, loader) = populated(&counters);
    let mut plugins = manager(dir.path(), loader, MemorySettings::new());
    let owner = owner();

    let first = labels(plugins.tools(&owner));
    let second = labels(plugins.tools(&owner));
    assert_eq!(first, vec!["Draw#1", "Select#2"]);
    assert_eq!(first, second);
    assert_eq!(counters.created(), 2);

    let colors = labels(plugins.colors(&owner));
    assert_eq!(colors.len(), 2);
    assert_eq!(labels(plugins.colors(&owner)), colors);
    assert_eq!(labels(plugins.extensions(&owner)), vec!["Export#4"]);
    assert_eq!(counters.created(), 4);
}

#[test]
fn engines_are_never_cached() {
    let dir = tempdir().unwrap();
    let mut plugins = manager(dir.path(), FakeLoader::new(), MemorySettings::new());
    let owner = owner();

    let first = plugins.engines(&owner);
    let second = plugins.engines(&owner);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0].name(), BALL_AND_STICK);
}

#[test]
fn reload_releases_and_rebuilds_cached_instances() {
    let counters = Counters::default();
    let (dir, loader) = populated(&counters);
    let mut plugins = manager(dir.path(), loader, MemorySettings::new());
    let owner = owner();

    let before = labels(plugins.tools(&owner));
    plugins.extensions(&owner);
    plugins.colors(&owner);
    assert_eq!(counters.live(), 4);

    plugins.reload();
    assert_eq!(counters.live(), 0);
    assert_eq!(plugins.state(), RegistryState::Unloaded);

    let after = labels(plugins.tools(&owner));
    assert_eq!(after.len(), before.len());
    assert!(after.iter().all(|label| !before.contains(label)));
    assert_eq!(plugins.epoch(), 2);
}

#[test]
fn disabled_plugin_stays_disabled_after_reload() {
    let counters = Counters::default();
    let (dir, loader) = populated(&counters);
    let mut plugins = manager(dir.path(), loader, MemorySettings::new());

    assert!(plugins.set_plugin_enabled(Category::Tool, "Draw", false));
    assert!(!plugins.set_plugin_enabled(Category::Tool, "Missing", false));
    assert_eq!(plugins.names(Category::Tool), vec!["Select"]);

    plugins.reload();
    assert_eq!(
        plugins.settings().value("Plugins/0/Draw"),
        Some(SettingValue::Bool(false))
    );
    assert_eq!(
        plugins.settings().value("Plugins/0/Select"),
        Some(SettingValue::Bool(true))
    );

    assert_eq!(plugins.names(Category::Tool), vec!["Select"]);
    let descriptor = plugins
        .plugin_descriptors(Category::Tool)
        .iter()
        .find(|descriptor| descriptor.name() == "Draw")
        .cloned()
        .unwrap();
    assert!(!descriptor.is_enabled());
    assert_eq!(plugins.disabled_factories(Category::Tool).len(), 1);
}

#[test]
fn tool_and_extension_settings_are_written_but_not_colors() {
    let counters = Counters::default();
    let (dir, loader) = populated(&counters);
    let mut plugins = manager(dir.path(), loader, MemorySettings::new());
    let owner = owner();

    plugins.tools(&owner);
    plugins.extensions(&owner);
    plugins.colors(&owner);
    plugins.reload();

    let settings = plugins.settings();
    assert_eq!(settings.value("tools/Draw"), Some(SettingValue::Bool(true)));
    assert_eq!(settings.value("tools/Select"), Some(SettingValue::Bool(true)));
    assert_eq!(
        settings.value("extensions/Export"),
        Some(SettingValue::Bool(true))
    );
    assert_eq!(settings.value("colors/Charge"), None);
}

#[test]
fn observers_hear_about_each_reload() {
    let dir = tempdir().unwrap();
    let mut plugins = manager(dir.path(), FakeLoader::new(), MemorySettings::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = plugins.subscribe(Box::new(move |event| sink.lock().unwrap().push(*event)));

    plugins.factories(Category::Engine);
    plugins.reload();
    plugins.factories(Category::Engine);
    plugins.reload();
    assert!(plugins.unsubscribe(subscription));
    plugins.reload();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            RegistryEvent::PluginsReloaded { epoch: 1 },
            RegistryEvent::PluginsReloaded { epoch: 2 },
        ]
    );
}

#[test]
fn queued_reload_requests_collapse_into_one_reload() {
    let dir = tempdir().unwrap();
    let mut plugins = manager(dir.path(), FakeLoader::new(), MemorySettings::new());
    let events = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&events);
    plugins.subscribe(Box::new(move |_| *sink.lock().unwrap() += 1));

    plugins.factories(Category::Engine);
    let requester = plugins.reload_requester();
    assert!(!plugins.process_reload_requests());
    assert!(requester.request());
    assert!(requester.request());

    assert!(plugins.process_reload_requests());
    assert!(!plugins.process_reload_requests());
    assert_eq!(*events.lock().unwrap(), 1);
    assert_eq!(plugins.state(), RegistryState::Unloaded);
}

#[test]
fn enabled_state_survives_a_new_process() {
    let counters = Counters::default();
    let (dir, loader) = populated(&counters);
    let settings_path = dir.path().join("settings.json");
    {
        let settings = JsonSettings::open(&settings_path).unwrap();
        let mut plugins = manager(dir.path(), loader, settings);
        assert!(plugins.set_plugin_enabled(Category::Extension, "Export", false));
    }

    let (_, loader) = populated(&counters);
    let settings = JsonSettings::open(&settings_path).unwrap();
    let mut plugins = manager(dir.path(), loader, settings);
    assert!(plugins.names(Category::Extension).is_empty());
    assert_eq!(plugins.plugin_descriptors(Category::Extension).len(), 1);
}

#[test]
fn shared_registry_can_be_used_from_another_thread() {
    let dir = tempdir().unwrap();
    let config = DiscoveryConfig::with_search_paths(vec![dir.path().to_path_buf()]);
    let shared =
        PluginManager::with_loader(config, MemorySettings::new(), FakeLoader::new()).into_shared();

    let worker = Arc::clone(&shared);
    let names = thread::spawn(move || worker.lock().names(Category::Engine))
        .join()
        .unwrap();
    assert_eq!(names, vec![BALL_AND_STICK]);
    assert_eq!(shared.lock().state(), RegistryState::Loaded);
}
