//! Directory-backed slot store: one file per key.

use super::{validate_key, KeyValueStore, KvResult};
use log::debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SLOT_EXTENSION: &str = "json";

/// Persistent slot store rooted at one directory.
///
/// Each write stages into its own uniquely named sibling temp file that is
/// renamed over the slot, so readers see either the old or the new value and
/// overlapping writers never share a staging file. The last rename wins.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Creates the store, creating `dir` when missing.
    pub fn open(dir: impl Into<PathBuf>) -> KvResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{SLOT_EXTENSION}"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        validate_key(key)?;
        match fs::read_to_string(self.slot_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        validate_key(key)?;
        let target = self.slot_path(key);

        let mut staging = NamedTempFile::new_in(&self.dir)?;
        staging.write_all(value.as_bytes())?;
        staging.as_file().sync_all()?;
        staging.persist(&target).map_err(|err| err.error)?;

        debug!(
            "event=kv_write module=kv status=ok key={} bytes={}",
            key,
            value.len()
        );
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        validate_key(key)?;
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileKeyValueStore;
    use crate::kv::{KeyValueStore, KvError};
    use std::sync::Barrier;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileKeyValueStore::open(dir.path()).expect("open store");
        assert_eq!(store.get_item("notas").expect("get_item should succeed"), None);
    }

    #[test]
    fn set_item_replaces_value_and_survives_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        {
            let store = FileKeyValueStore::open(dir.path()).expect("open store");
            store.set_item("notas", "[1]").expect("set_item should succeed");
            store.set_item("notas", "[1,2]").expect("set_item should succeed");
        }

        let reopened = FileKeyValueStore::open(dir.path()).expect("open store");
        let value = reopened.get_item("notas").expect("get_item should succeed");
        assert_eq!(value.as_deref(), Some("[1,2]"));
    }

    #[test]
    fn remove_item_is_idempotent() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileKeyValueStore::open(dir.path()).expect("open store");
        store.set_item("notas", "[]").expect("set_item should succeed");
        store.remove_item("notas").expect("remove_item should succeed");
        store.remove_item("notas").expect("remove_item should succeed");
        assert_eq!(store.get_item("notas").expect("get_item should succeed"), None);
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileKeyValueStore::open(dir.path()).expect("open store");
        let err = store.set_item("../escape", "x").expect_err("set_item should fail");
        assert!(matches!(err, KvError::InvalidKey(_)));
    }

    #[test]
    fn overlapping_writes_all_succeed_and_last_value_is_whole() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = FileKeyValueStore::open(dir.path()).expect("open store");
        let writers = 4;
        let values: Vec<String> = (0..writers)
            .map(|n| format!("[{}]", vec![n.to_string(); 256].join(",")))
            .collect();

        for _round in 0..50 {
            let barrier = Barrier::new(writers);
            std::thread::scope(|scope| {
                let handles: Vec<_> = values
                    .iter()
                    .map(|value| {
                        let store = &store;
                        let barrier = &barrier;
                        scope.spawn(move || {
                            barrier.wait();
                            store.set_item("notas", value)
                        })
                    })
                    .collect();
                for handle in handles {
                    handle
                        .join()
                        .expect("writer thread should not panic")
                        .expect("overlapping set_item should succeed");
                }
            });

            let stored = store
                .get_item("notas")
                .expect("read slot")
                .expect("slot should hold a value");
            assert!(values.contains(&stored), "slot holds a torn value");
        }

        let leftovers = std::fs::read_dir(dir.path())
            .expect("list store dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() != "notas.json")
            .count();
        assert_eq!(leftovers, 0, "staging files should not be left behind");
    }
}
