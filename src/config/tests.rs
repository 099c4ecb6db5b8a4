// Author: Dustin Pilgrim
// License: MIT

#[cfg(test)]
use super::*;
use std::sync::{Arc, Mutex};
use std::time::{Duration, UNIX_EPOCH};

use proptest::prelude::*;
use tempfile::TempDir;

use crate::ast::Value;
use crate::parser::DiagnosticKind;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

/// Rewrite a file and stamp it with an mtime that differs from anything recorded.
fn touch_with(path: &Path, content: &str, secs: u64) {
    fs::write(path, content).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
}

#[test]
fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "app.xcl", "[a'b]\nx = i'42\n");

    let mut config = Xcl::open(&path).expect("Failed to open config");
    assert!(config.find("a'b").is_some());
    assert_eq!(config.get::<i64>("a'b'x").unwrap(), 42);
    assert!(config.find("a'c").is_none());

    config.insert_or_assign("a'b'y", "hi").unwrap();
    assert!(config.save(true).unwrap());

    let fresh = Xcl::open(&path).unwrap();
    assert_eq!(fresh.get::<String>("a'b'y").unwrap(), "hi");
    assert_eq!(fresh.get::<i64>("a'b'x").unwrap(), 42);
}

#[test]
fn test_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = Xcl::open(dir.path().join("absent.xcl")).unwrap();

    assert!(config.is_empty());
    assert!(config.last_write_time().is_none());
    assert!(config.path().unwrap().is_absolute());
}

#[test]
fn test_directory_path_is_not_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let config = Xcl::open(dir.path()).unwrap();
    assert!(config.is_empty());
    assert!(config.last_write_time().is_none());
}

#[test]
fn test_empty_path_is_resolution_error() {
    assert!(matches!(
        Xcl::open(""),
        Err(XclError::FileError { code: Some(303), .. })
    ));
}

#[test]
fn test_new_swallows_resolution_failure() {
    let mut config = Xcl::new("");
    assert!(config.path().is_none());
    assert!(config.is_empty());

    config.insert_or_assign("k", 1i64).unwrap();
    assert!(!config.save(true).unwrap());
    assert!(!config.reload(true).unwrap());
}

#[test]
fn test_new_loads_like_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "n.xcl", "k = u'9\n");
    let config = Xcl::new(&path);
    assert_eq!(config.get::<u64>("k").unwrap(), 9);
    assert!(config.last_write_time().is_some());
}

#[test]
fn test_tilde_expands_to_home() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let config = Xcl::new("~/.xcl-test-never-created/settings.xcl");
    assert!(config.path().unwrap().starts_with(&home));
}

#[test]
fn test_save_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idem.xcl");

    let mut config = Xcl::open(&path).unwrap();
    config.insert_or_assign("srv'port", 80u64).unwrap();

    assert!(config.save(false).unwrap());
    assert!(!config.needs_write());
    assert!(!config.save(false).unwrap());

    config.insert_or_assign("srv'port", 81u64).unwrap();
    assert!(config.save(false).unwrap());
}

#[test]
fn test_loaded_document_needs_first_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "fresh.xcl", "k = i'1\n");

    let mut config = Xcl::open(&path).unwrap();
    assert!(config.needs_write());
    assert!(config.save(false).unwrap());
    assert!(!config.save(false).unwrap());
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep").join("er").join("cfg.xcl");

    let mut config = Xcl::open(&path).unwrap();
    config.insert_or_assign("k", "v").unwrap();
    assert!(config.save(false).unwrap());

    assert_eq!(fs::read_to_string(&path).unwrap(), "k = s'v\n\n");
    assert_eq!(config.last_write_time(), helpers::modified_time(&path));
}

#[test]
fn test_save_to_directory_is_silent_noop() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("taken");

    let mut config = Xcl::open(&target).unwrap();
    fs::create_dir(&target).unwrap();
    config.insert_or_assign("k", 1i64).unwrap();

    assert!(!config.save(true).unwrap());
    assert!(config.needs_write());
}

#[test]
fn test_failed_write_is_error_and_keeps_markers() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = write_file(&dir, "plain-file", "");
    let path = blocker.join("nested").join("cfg.xcl");

    let mut config = Xcl::open(&path).unwrap();
    config.insert_or_assign("k", 1i64).unwrap();

    assert!(matches!(
        config.save(true),
        Err(XclError::FileError { code: Some(302), .. })
    ));
    assert!(config.needs_write());
    assert!(config.last_write_time().is_none());
}

#[test]
fn test_reload_only_when_mtime_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "r.xcl", "k = i'1\n");

    let mut config = Xcl::open(&path).unwrap();
    assert!(!config.reload(false).unwrap());

    touch_with(&path, "k = i'2\n", 1_000_000);
    assert!(config.reload(false).unwrap());
    assert_eq!(config.get::<i64>("k").unwrap(), 2);
    assert_eq!(
        config.last_write_time(),
        Some(UNIX_EPOCH + Duration::from_secs(1_000_000))
    );

    assert!(!config.reload(false).unwrap());
}

#[test]
fn test_content_change_without_mtime_change_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "same.xcl", "k = i'1\n");
    touch_with(&path, "k = i'1\n", 2_000_000);

    let mut config = Xcl::open(&path).unwrap();
    touch_with(&path, "k = i'5\n", 2_000_000);

    assert!(!config.reload(false).unwrap());
    assert_eq!(config.get::<i64>("k").unwrap(), 1);

    assert!(config.reload(true).unwrap());
    assert_eq!(config.get::<i64>("k").unwrap(), 5);
}

#[test]
fn test_reload_discards_unsaved_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "d.xcl", "[a]\nk = i'1\n");

    let mut config = Xcl::open(&path).unwrap();
    config.insert_or_assign("a'local", "edit").unwrap();
    config.try_insert("b").unwrap();

    assert!(config.reload(true).unwrap());
    assert!(!config.has("a'local"));
    assert!(config.find("b").is_none());
    assert_eq!(config.get::<i64>("a'k").unwrap(), 1);
}

#[test]
fn test_reload_after_own_save_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("own.xcl");

    let mut config = Xcl::open(&path).unwrap();
    config.insert_or_assign("k", 1i64).unwrap();
    config.save(false).unwrap();

    assert!(!config.reload(false).unwrap());
}

#[test]
fn test_reload_picks_up_created_and_deleted_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("late.xcl");

    let mut config = Xcl::open(&path).unwrap();
    assert!(!config.reload(false).unwrap());

    fs::write(&path, "k = i'3\n").unwrap();
    assert!(config.reload(false).unwrap());
    assert_eq!(config.get::<i64>("k").unwrap(), 3);

    fs::remove_file(&path).unwrap();
    assert!(config.reload(false).unwrap());
    assert!(config.is_empty());
    assert!(config.last_write_time().is_none());
}

#[test]
fn test_diagnostics_reach_handler_on_open_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "diag.xcl", "ok = i'1\nbad = i'x\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut config = Xcl::open_with(&path, move |d: &Diagnostic| {
        sink.lock().unwrap().push(d.kind);
    })
    .unwrap();

    assert_eq!(config.get::<i64>("ok").unwrap(), 1);
    assert!(!config.has("bad"));
    assert_eq!(*seen.lock().unwrap(), vec![DiagnosticKind::InvalidValue]);

    config.reload(true).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_invalid_utf8_line_does_not_fail_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bytes.xcl");
    fs::write(&path, b"a = i'1\nbad = s'\xff\n[sec]\nb = i'2\n").unwrap();

    let config = Xcl::open(&path).expect("Failed to open config");
    assert_eq!(config.get::<i64>("a").unwrap(), 1);
    assert_eq!(config.get::<i64>("sec'b").unwrap(), 2);
    assert!(!config.has("bad"));

    let lenient = Xcl::new(&path);
    assert!(lenient.has("a"));
    assert!(lenient.has("sec'b"));
}

#[cfg(unix)]
#[test]
fn test_symlink_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let real = write_file(&dir, "real.xcl", "k = s'linked\n");
    let link = dir.path().join("link.xcl");
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let config = Xcl::open(&link).unwrap();
    assert_eq!(config.get::<String>("k").unwrap(), "linked");
}

#[test]
fn test_deref_exposes_root() {
    let mut config = Xcl::new(std::env::temp_dir().join("xcl-deref-never-written.xcl"));
    config.insert_or_assign("x", 1i64).unwrap();
    assert_eq!(config.root().get::<i64>("x").unwrap(), 1);
    assert!(config.root_mut().remove_value("x").is_some());
    assert!(config.into_root().is_empty());
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9,.'=_-]{0,12}".prop_map(Value::String),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        any::<f32>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Float),
        any::<f64>().prop_filter("finite", |f| f.is_finite()).prop_map(Value::Double),
    ]
}

fn entry_strategy() -> impl Strategy<Value = (Vec<String>, String, Value)> {
    (
        prop::collection::vec("[a-z]{1,4}", 0..3),
        "[a-z][a-z0-9_]{0,6}",
        value_strategy(),
    )
}

proptest! {
    #[test]
    fn prop_save_then_load_round_trips(entries in prop::collection::vec(entry_strategy(), 0..16)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prop.xcl");

        let mut config = Xcl::open(&path).unwrap();
        for (sections, key, value) in &entries {
            let mut full = sections.clone();
            full.push(key.clone());
            config.insert_or_assign(&full.join("'"), value.clone()).unwrap();
        }
        config.save(true).unwrap();

        let loaded = Xcl::open(&path).unwrap();
        prop_assert_eq!(loaded.root(), config.root());
    }
}
