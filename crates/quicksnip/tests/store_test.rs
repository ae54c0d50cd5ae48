use chrono::Utc;
use quicksnip::model::{NewSnippet, Snippet, SnippetUpdate};
use quicksnip::store::{FsBackend, SnippetStore};
use quicksnip::QuicksnipError;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const THREE_VALID_ONE_INVALID: &str = r#"version: 1
snippets:
  - id: one
    name: First
    content: echo one
    tags: [python, code]
    created: 2025-11-04
    modified: 2025-11-04
  - name: Missing id
    content: echo skipped
  - id: two
    name: Second
    content: echo two
    tags: [python, testing]
  - id: three
    name: Third
    content: echo three
    tags: [javascript]
"#;

fn setup() -> (TempDir, PathBuf, SnippetStore) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snippets.yaml");
    let store = SnippetStore::new(FsBackend::new(&path), 5);
    (dir, path, store)
}

fn ids(store: &SnippetStore) -> Vec<String> {
    store.snapshot().iter().map(|s| s.id.clone()).collect()
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    done()
}

#[test]
fn test_first_load_writes_sample_file() {
    let (_dir, path, store) = setup();
    let loaded = store.load();
    assert!(loaded.report.created_defaults);
    assert_eq!(loaded.snippets.len(), 6);
    assert!(path.exists());

    // A second store over the same file reads the same library.
    let again = SnippetStore::new(FsBackend::new(&path), 5).load();
    assert!(!again.report.created_defaults);
    assert_eq!(again.snippets.as_ref(), loaded.snippets.as_ref());
}

#[test]
fn test_invalid_entry_is_skipped_with_warning() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    let loaded = store.load();
    assert_eq!(loaded.snippets.len(), 3);
    assert_eq!(loaded.report.invalid_entries.len(), 1);
    assert!(matches!(
        loaded.report.errors().as_slice(),
        [QuicksnipError::EntryInvalid(_)]
    ));
    assert_eq!(store.all_tags(), vec!["code", "javascript", "python", "testing"]);
}

#[test]
fn test_save_then_load_round_trip() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    let original = store.load().snippets;

    store.save(original.to_vec()).unwrap();

    let reloaded = SnippetStore::new(FsBackend::new(&path), 5).load();
    assert!(reloaded.report.is_clean());
    assert_eq!(reloaded.snippets.as_ref(), original.as_ref());
}

#[test]
fn test_crud_persists() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    store.load();

    let added = store
        .add(NewSnippet::new("Docker cleanup", "docker system prune -f").with_tags(["Docker"]))
        .unwrap();
    assert_eq!(added.id, "docker-cleanup");

    store
        .update(
            "one",
            SnippetUpdate {
                description: Some("updated".into()),
                ..Default::default()
            },
        )
        .unwrap();
    store.remove(&["two"]).unwrap();

    let reopened = SnippetStore::new(FsBackend::new(&path), 5);
    reopened.load();
    assert_eq!(ids(&reopened), vec!["one", "three", "docker-cleanup"]);
    assert_eq!(reopened.get("one").unwrap().description, "updated");
    assert_eq!(reopened.get("docker-cleanup").unwrap().tags, vec!["docker"]);
}

#[test]
fn test_corrupt_file_recovers_from_backup() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    store.load();
    store.add(NewSnippet::new("Fourth", "echo four")).unwrap();

    fs::write(&path, "snippets: [this is : not yaml").unwrap();

    let loaded = store.load();
    assert!(loaded.report.corruption.is_some());
    assert_eq!(loaded.report.recovered_from_backup, Some(1));
    let recovered: Vec<_> = loaded.snippets.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(recovered, vec!["one", "two", "three"]);
}

#[test]
fn test_corrupt_file_without_backup_loads_empty() {
    let (_dir, path, store) = setup();
    fs::write(&path, "{{{{").unwrap();
    let loaded = store.load();
    assert!(loaded.snippets.is_empty());
    assert!(loaded.report.corruption.is_some());
    // The broken file is left for the user to inspect.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{{{{");
}

#[test]
fn test_backup_ring_is_bounded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snippets.yaml");
    let store = SnippetStore::new(FsBackend::new(&path), 3);
    store.load();
    for i in 0..6 {
        store.add(NewSnippet::new(format!("Snippet {}", i), "")).unwrap();
    }
    let indexes: Vec<_> = store.list_backups().unwrap().iter().map(|b| b.index).collect();
    assert_eq!(indexes, vec![1, 2, 3]);
}

#[test]
fn test_blocked_backup_slot_aborts_save() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snippets.yaml");
    let store = SnippetStore::new(FsBackend::new(&path), 1);
    store.load();
    let before = fs::read_to_string(&path).unwrap();

    let slot = dir.path().join("snippets.yaml.backup.001");
    fs::create_dir(&slot).unwrap();
    fs::write(slot.join("keep"), "x").unwrap();

    assert!(store.add(NewSnippet::new("Never written", "")).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.len(), 6);
}

#[test]
fn test_fresh_snippets_round_trip_exactly() {
    let (_dir, path, store) = setup();
    store.load();
    let now = Utc::now();
    let fresh = Snippet {
        id: "fresh".to_string(),
        name: "Fresh".to_string(),
        description: "built in memory".to_string(),
        content: "echo {{who:world}}".to_string(),
        tags: vec!["demo".to_string()],
        created: now,
        modified: now,
    };
    store.save(vec![fresh]).unwrap();

    let reread = SnippetStore::new(FsBackend::new(&path), 5).load();
    assert_eq!(reread.snippets.as_ref(), store.snapshot().as_ref());
}

#[test]
fn test_save_with_blank_id_writes_nothing() {
    let (_dir, path, store) = setup();
    store.load();
    let before = fs::read_to_string(&path).unwrap();

    let mut snippets = store.snapshot().to_vec();
    snippets[0].id = String::new();
    let err = store.save(snippets).unwrap_err();
    assert!(matches!(err, QuicksnipError::EntryInvalid(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert!(store.list_backups().unwrap().is_empty());
    assert_eq!(store.len(), 6);
}

#[test]
fn test_restore_backup() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    store.load();
    store.remove(&["one", "two", "three"]).unwrap();
    assert!(store.is_empty());

    let restored = store.restore_backup(1).unwrap();
    assert_eq!(restored.len(), 3);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_concurrent_adds_do_not_lose_writes() {
    let (_dir, path, store) = setup();
    fs::write(&path, "version: 1\nsnippets: []\n").unwrap();
    store.load();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..5 {
                    store
                        .add(NewSnippet::new(format!("T{} item {}", t, i), "x"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.len(), 20);
    let reopened = SnippetStore::new(FsBackend::new(&path), 5);
    assert_eq!(reopened.load().snippets.len(), 20);
}

#[test]
fn test_watch_reloads_external_edit_once() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    store.load();

    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(Vec::<String>::new()));
    let (calls_in, last_in) = (Arc::clone(&calls), Arc::clone(&last));
    store.subscribe(move |snapshot| {
        calls_in.fetch_add(1, Ordering::SeqCst);
        *last_in.lock().unwrap() = snapshot.iter().map(|s| s.id.clone()).collect();
    });

    let _watch = store.watch(Duration::from_millis(150)).unwrap();
    thread::sleep(Duration::from_millis(100));

    // A burst of external writes inside one window.
    for n in 1..=3 {
        fs::write(
            &path,
            format!("version: 1\nsnippets:\n  - {{id: ext, name: External {}}}\n", n),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(20));
    }

    assert!(wait_until(Duration::from_secs(5), || calls.load(Ordering::SeqCst) >= 1));
    thread::sleep(Duration::from_millis(400));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*last.lock().unwrap(), vec!["ext"]);
    assert_eq!(store.get("ext").unwrap().name, "External 3");
}

#[test]
fn test_watch_ignores_own_saves() {
    let (_dir, path, store) = setup();
    fs::write(&path, THREE_VALID_ONE_INVALID).unwrap();
    store.load();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let _watch = store.watch(Duration::from_millis(50)).unwrap();
    thread::sleep(Duration::from_millis(100));
    store.add(NewSnippet::new("Mine", "echo mine")).unwrap();
    thread::sleep(Duration::from_millis(500));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
