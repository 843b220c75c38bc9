//! Behavioral properties of the asset store
//!
//! Conflicts between different bytes can only happen when the hash is not
//! part of the file ID, so the conflict-policy tests for differing content
//! run in legacy filename mode.

use assetstore_core::hash::hash_bytes;
use assetstore_core::{AssetIdentity, AssetStore, ConflictPolicy, StoreError};
use assetstore_storage::mock::MockBackend;
use assetstore_storage::{LocalBackend, StorageBackend};
use std::collections::HashSet;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use tempfile::TempDir;

const HELLO: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

fn mock_store(legacy: bool) -> (MockBackend, AssetStore) {
    let backend = MockBackend::new();
    let store = AssetStore::new(Arc::new(backend.clone())).with_legacy_filenames(legacy);
    (backend, store)
}

/// Reader that hides `Seek`, like a network body
struct OneWay<R>(R);

impl<R: Read> Read for OneWay<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

/// Reader that fails halfway through
struct Truncated {
    sent: bool,
}

impl Read for Truncated {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"));
        }
        self.sent = true;
        let n = buf.len().min(4);
        buf[..n].copy_from_slice(&b"part"[..n]);
        Ok(n)
    }
}

#[test]
fn use_existing_deduplicates_identical_bytes() {
    for legacy in [false, true] {
        let (backend, store) = mock_store(legacy);

        let first = store
            .store_from_bytes(b"same bytes", "docs/a.txt", ConflictPolicy::UseExisting)
            .unwrap();
        let second = store
            .store_from_bytes(b"same bytes", "docs/a.txt", ConflictPolicy::UseExisting)
            .unwrap();

        assert_eq!(backend.write_count(), 1);
        assert_eq!(first.hash, second.hash);
        assert_eq!(first, second);
    }
}

#[test]
fn exception_policy_leaves_first_object_untouched() {
    let (backend, store) = mock_store(true);

    let first = store
        .store_from_bytes(b"version one", "report.pdf", ConflictPolicy::default())
        .unwrap();
    let err = store
        .store_from_bytes(b"version two", "report.pdf", ConflictPolicy::Exception)
        .unwrap_err();

    assert!(err.is_conflict());
    assert!(matches!(err, StoreError::AlreadyExists { ref file_id } if file_id == "report.pdf"));
    assert_eq!(store.read_as_bytes(&first).unwrap(), b"version one");
    assert_eq!(backend.write_count(), 1);
}

#[test]
fn exception_policy_conflicts_on_identical_bytes_when_hashed() {
    let (_backend, store) = mock_store(false);
    store.store_from_bytes(b"x", "a.bin", ConflictPolicy::default()).unwrap();
    let err = store
        .store_from_bytes(b"x", "a.bin", ConflictPolicy::Exception)
        .unwrap_err();
    assert!(err.is_conflict());

    // Different bytes land under a different hash directory
    assert!(store.store_from_bytes(b"y", "a.bin", ConflictPolicy::Exception).is_ok());
}

#[test]
fn rename_yields_distinct_readable_objects() {
    let (backend, store) = mock_store(true);
    let n = 6;

    let mut ids = HashSet::new();
    let mut stored = Vec::new();
    for i in 0..n {
        let data = format!("payload {}", i).into_bytes();
        let identity = store
            .store_from_bytes(&data, "uploads/photo.jpg", ConflictPolicy::Rename)
            .unwrap();
        ids.insert(store.file_id(&identity).unwrap());
        stored.push((identity, data));
    }

    assert_eq!(ids.len(), n);
    assert_eq!(backend.len(), n);
    for (identity, data) in &stored {
        assert_eq!(&store.read_as_bytes(identity).unwrap(), data);
        assert_eq!(identity.hash, hash_bytes(data));
    }
    assert_eq!(stored[0].0.filename, "uploads/photo.jpg");
    assert_eq!(stored[1].0.filename, "uploads/photo-1.jpg");
    assert_eq!(stored[5].0.filename, "uploads/photo-5.jpg");
}

#[test]
fn returned_hash_matches_persisted_bytes() {
    let (backend, store) = mock_store(true);

    store
        .store_from_bytes(b"original", "notes.txt", ConflictPolicy::default())
        .unwrap();
    let reused = store
        .store_from_bytes(b"replacement", "notes.txt", ConflictPolicy::UseExisting)
        .unwrap();

    let persisted = backend.get("notes.txt").unwrap();
    assert_eq!(persisted, b"original");
    assert_eq!(reused.hash, hash_bytes(&persisted));
    assert_ne!(reused.hash, hash_bytes(b"replacement"));

    let replaced = store
        .store_from_bytes(b"replacement", "notes.txt", ConflictPolicy::Overwrite)
        .unwrap();
    assert_eq!(replaced.hash, hash_bytes(&backend.get("notes.txt").unwrap()));
}

#[test]
fn hello_scenario() {
    let (backend, store) = mock_store(false);

    let first = store
        .store_from_bytes(b"hello", "reports/q1.txt", ConflictPolicy::default())
        .unwrap();
    assert_eq!(first, AssetIdentity::new(HELLO, "reports/q1.txt"));
    assert_eq!(store.file_id(&first).unwrap(), "reports/aaf4c61ddc/q1.txt");

    let second = store
        .store_from_bytes(b"hello", "reports/q1.txt", ConflictPolicy::Rename)
        .unwrap();
    let second_id = store.file_id(&second).unwrap();
    assert_ne!(second_id, "reports/aaf4c61ddc/q1.txt");
    assert_eq!(second_id, "reports/aaf4c61ddc/q1-1.txt");
    assert_eq!(store.parse_file_id(&second_id).filename, "reports/q1-1.txt");
    assert_eq!(backend.keys().len(), 2);
}

#[test]
fn non_seekable_stream_leaves_no_temp_files() {
    let spool = TempDir::new().unwrap();
    let (_backend, store) = mock_store(false);
    let store = store.with_temp_dir(spool.path());

    let id = store
        .store_from_stream(&mut OneWay(Cursor::new(b"hello".to_vec())), "s/q1.txt", ConflictPolicy::default())
        .unwrap();
    assert_eq!(id.hash, HELLO);
    assert_eq!(store.read_as_bytes(&id).unwrap(), b"hello");
    assert_eq!(std::fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[test]
fn temp_files_are_removed_when_backend_fails() {
    let spool = TempDir::new().unwrap();
    let (backend, store) = mock_store(false);
    let store = store.with_temp_dir(spool.path());
    backend.set_fail_writes(true);

    let err = store
        .store_from_stream(&mut OneWay(Cursor::new(b"hello".to_vec())), "q1.txt", ConflictPolicy::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend { ref file_id, .. } if file_id == "aaf4c61ddc/q1.txt"));
    assert_eq!(std::fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[test]
fn temp_files_are_removed_when_source_stream_fails() {
    let spool = TempDir::new().unwrap();
    let (backend, store) = mock_store(false);
    let store = store.with_temp_dir(spool.path());

    let err = store
        .store_from_stream(&mut Truncated { sent: false }, "q1.txt", ConflictPolicy::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
    assert!(backend.is_empty());
    assert_eq!(std::fs::read_dir(spool.path()).unwrap().count(), 0);
}

#[test]
fn caller_stream_remains_usable() {
    let (_backend, store) = mock_store(false);
    let mut cursor = Cursor::new(b"hello".to_vec());

    store
        .store_from_seekable_stream(&mut cursor, "a.txt", ConflictPolicy::default())
        .unwrap();
    // Still ours: we can rewind and read it again
    cursor.set_position(0);
    let mut again = String::new();
    cursor.read_to_string(&mut again).unwrap();
    assert_eq!(again, "hello");
}

#[test]
fn local_disk_layout() {
    let root = TempDir::new().unwrap();
    let backend: Arc<dyn StorageBackend> = Arc::new(LocalBackend::new(root.path()).unwrap());
    let store = AssetStore::new(backend);

    let original = store
        .store_from_bytes(b"hello", "folder/photo.jpg", ConflictPolicy::default())
        .unwrap();
    store.store_variant(b"tiny", &original, "thumb").unwrap();

    assert!(root.path().join("folder/aaf4c61ddc/photo.jpg").is_file());
    assert!(root.path().join("folder/aaf4c61ddc/photo__thumb.jpg").is_file());

    let meta = store.metadata_for(&original).unwrap();
    assert_eq!(meta.size, 5);
    assert_eq!(meta.mime_type.as_deref(), Some("image/jpeg"));

    store.delete(&original).unwrap();
    assert!(!root.path().join("folder").exists());
    store.delete(&original).unwrap();
}
