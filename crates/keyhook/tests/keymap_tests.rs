//! Tests for keymap files and file-backed services.

use std::fs;
use std::sync::Arc;

use keyhook::{
    Bindings, ChannelSource, KeyboardService, KeymapError, Operation, RawKeyCode, ServiceConfig,
    load_keymap, load_keymap_or_default, read_keymap, save_keymap,
};
use parking_lot::Mutex;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("keymap.toml");

    let bindings = load_keymap(&path).unwrap();

    assert_eq!(bindings, Bindings::defaults());
    assert!(path.exists());
    assert_eq!(read_keymap(&path).unwrap(), Bindings::defaults());
}

#[test]
fn test_read_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_keymap(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, KeymapError::Io { .. }));
}

#[test]
fn test_save_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    let bindings: Bindings = [
        (Operation::Refresh, "Ctrl+R;F9"),
        (Operation::Open, "Enter"),
    ]
    .into_iter()
    .collect();

    save_keymap(&path, &bindings).unwrap();
    assert_eq!(read_keymap(&path).unwrap(), bindings);

    // Saving again replaces the file rather than appending.
    save_keymap(&path, &Bindings::new()).unwrap();
    assert!(read_keymap(&path).unwrap().is_empty());
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    fs::write(&path, "[bindings\nCopy = ").unwrap();

    assert!(matches!(
        load_keymap(&path),
        Err(KeymapError::Parse { .. })
    ));
    assert_eq!(load_keymap_or_default(&path), Bindings::defaults());
    // The broken file is left for the user to fix.
    assert_eq!(fs::read_to_string(&path).unwrap(), "[bindings\nCopy = ");
}

#[test]
fn test_service_loads_configured_keymap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    fs::write(&path, "[bindings]\nRefresh = \"F5\"\n").unwrap();

    let (service, mut ui) = KeyboardService::with_context(ServiceConfig::with_keymap(&path));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    service.on_operation(move |operation| sink.lock().push(operation));

    let (source, keys) = ChannelSource::new();
    service.start(source).unwrap();
    keys.tap(RawKeyCode::F5);
    keys.tap(RawKeyCode::F8);
    service.stop();
    ui.process_pending();

    assert_eq!(*seen.lock(), vec![Operation::Refresh]);
}

#[test]
fn test_service_creates_keymap_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");

    let (service, _ui) = KeyboardService::with_context(ServiceConfig::with_keymap(&path));

    assert!(path.exists());
    assert_eq!(service.registry().bindings(), Bindings::defaults());
}

#[test]
fn test_reload_keymap_picks_up_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::with_keymap(&path));

    fs::write(&path, "[bindings]\nDelete = [\"F8\", \"Ctrl+D\"]\n").unwrap();
    let report = service.reload_keymap().unwrap();

    assert!(report.is_clean());
    assert_eq!(service.registry().bindings().len(), 1);
    assert_eq!(
        service.registry().bindings().get(Operation::Delete),
        Some("F8;Ctrl+D")
    );
}

#[test]
fn test_reload_from_broken_file_keeps_bindings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "not = [valid").unwrap();
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::default());

    assert!(service.reload_from_file(&path).is_err());
    assert_eq!(service.registry().bindings(), Bindings::defaults());
}

#[test]
fn test_save_keymap_writes_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keymap.toml");
    let (service, _ui) = KeyboardService::with_context(ServiceConfig::with_keymap(&path));

    service.set_binding(Operation::Refresh, "Ctrl+R");
    service.save_keymap().unwrap();

    let saved = read_keymap(&path).unwrap();
    assert_eq!(saved.get(Operation::Refresh), Some("Ctrl+R"));
    assert_eq!(saved.get(Operation::Copy), Some("Ctrl+C"));
}
