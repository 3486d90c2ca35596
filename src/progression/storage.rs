use std::path::{Path, PathBuf};

use chrono::Utc;
use log::warn;
use sled::IVec;

use crate::progression::errors::ProgressionError;
use crate::progression::types::{CharacterRecord, CHARACTER_SCHEMA_VERSION};

const TREE_CHARACTERS: &str = "characters";
const TREE_LOGS: &str = "progression_logs";

fn next_timestamp_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
}

/// Persistence collaborator for the progression engine.
///
/// `commit` must be all-or-nothing: either the full record is durably written or
/// an error is returned and the previously stored record remains visible.
pub trait CharacterRepository {
    fn load(&self, id: &str) -> Result<CharacterRecord, ProgressionError>;
    fn commit(&self, record: &CharacterRecord) -> Result<(), ProgressionError>;
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct CharacterStoreBuilder {
    path: PathBuf,
    audit_log: bool,
}

impl CharacterStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            audit_log: true,
        }
    }

    /// Skip writing audit lines for each commit.
    pub fn without_audit_log(mut self) -> Self {
        self.audit_log = false;
        self
    }

    pub fn open(self) -> Result<CharacterStore, ProgressionError> {
        CharacterStore::open_with_options(self.path, self.audit_log)
    }
}

/// Sled-backed persistence for character progression state.
pub struct CharacterStore {
    _db: sled::Db,
    characters: sled::Tree,
    logs: sled::Tree,
    audit_log: bool,
}

impl CharacterStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressionError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, audit_log: bool) -> Result<Self, ProgressionError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let characters = db.open_tree(TREE_CHARACTERS)?;
        let logs = db.open_tree(TREE_LOGS)?;
        Ok(Self {
            _db: db,
            characters,
            logs,
            audit_log,
        })
    }

    fn character_key(id: &str) -> Vec<u8> {
        format!("characters:{}", id.to_ascii_lowercase()).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ProgressionError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, ProgressionError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Insert or update a character record.
    pub fn put_character(&self, record: &CharacterRecord) -> Result<(), ProgressionError> {
        let mut record = record.clone();
        record.schema_version = CHARACTER_SCHEMA_VERSION;
        let key = Self::character_key(&record.id);
        let bytes = Self::serialize(&record)?;
        self.insert_durably(key, bytes, || self.characters.flush().map(|_| ()))?;
        if self.audit_log {
            // The record is already committed; an audit failure must not report otherwise.
            let line = format!(
                "commit {} level={} xp={}/{} hp={}/{} streak={} logins={}",
                record.id,
                record.level,
                record.current_xp,
                record.xp_to_next_level,
                record.stats.hp,
                record.stats.max_hp,
                record.streak,
                record.total_login_count
            );
            if let Err(e) = self.append_log(&line) {
                warn!("audit log append failed for {}: {}", record.id, e);
            }
        }
        Ok(())
    }

    /// Insert `bytes` under `key`, then run `sync`. If `sync` fails the previous
    /// value is restored (or the key removed) before the error is returned.
    fn insert_durably<F>(
        &self,
        key: Vec<u8>,
        bytes: Vec<u8>,
        sync: F,
    ) -> Result<(), ProgressionError>
    where
        F: FnOnce() -> sled::Result<()>,
    {
        let previous = self.characters.insert(key.as_slice(), bytes)?;
        if let Err(e) = sync() {
            let restored = match previous {
                Some(old) => self.characters.insert(key.as_slice(), old).map(|_| ()),
                None => self.characters.remove(key.as_slice()).map(|_| ()),
            };
            if let Err(undo) = restored {
                warn!("rollback after failed flush also failed: {}", undo);
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Insert a new character, failing if the id is already taken.
    pub fn create_character(&self, record: &CharacterRecord) -> Result<(), ProgressionError> {
        if self.contains_character(&record.id)? {
            return Err(ProgressionError::AlreadyExists(format!(
                "character: {}",
                record.id
            )));
        }
        self.put_character(record)
    }

    pub fn contains_character(&self, id: &str) -> Result<bool, ProgressionError> {
        Ok(self.characters.contains_key(Self::character_key(id))?)
    }

    /// Fetch a character record by id.
    pub fn get_character(&self, id: &str) -> Result<CharacterRecord, ProgressionError> {
        let key = Self::character_key(id);
        let Some(bytes) = self.characters.get(&key)? else {
            return Err(ProgressionError::NotFound(format!("character: {}", id)));
        };
        let record: CharacterRecord = Self::deserialize(bytes)?;
        if record.schema_version != CHARACTER_SCHEMA_VERSION {
            return Err(ProgressionError::SchemaMismatch {
                entity: "character",
                expected: CHARACTER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// List all character ids currently stored, as they were given at creation.
    ///
    /// Lookups are case-insensitive, so no two listed ids differ only by case.
    pub fn list_character_ids(&self) -> Result<Vec<String>, ProgressionError> {
        let mut ids = Vec::new();
        for entry in self.characters.scan_prefix(b"characters:") {
            let (_, value) = entry?;
            let record: CharacterRecord = Self::deserialize(value)?;
            ids.push(record.id);
        }
        Ok(ids)
    }

    /// Append a line to the diagnostic log tree.
    pub fn append_log(&self, message: &str) -> Result<(), ProgressionError> {
        let key = format!("logs:{:020}", next_timestamp_nanos()).into_bytes();
        self.logs.insert(key, message.as_bytes())?;
        self.logs.flush()?;
        Ok(())
    }

    /// Most recent `limit` audit lines, oldest first.
    pub fn recent_logs(&self, limit: usize) -> Result<Vec<String>, ProgressionError> {
        let mut lines = Vec::new();
        for entry in self.logs.scan_prefix(b"logs:").rev().take(limit) {
            let (_, value) = entry?;
            lines.push(String::from_utf8_lossy(&value).into_owned());
        }
        lines.reverse();
        Ok(lines)
    }
}

impl CharacterRepository for CharacterStore {
    fn load(&self, id: &str) -> Result<CharacterRecord, ProgressionError> {
        self.get_character(id)
    }

    fn commit(&self, record: &CharacterRecord) -> Result<(), ProgressionError> {
        self.put_character(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn store_round_trip_character() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        let mut record = CharacterRecord::new("Alice", Utc::now());
        record.stats.hp = 42;
        store.put_character(&record).expect("put");
        let fetched = store.get_character("alice").expect("get");
        assert_eq!(fetched, record);
        assert_eq!(fetched.schema_version, CHARACTER_SCHEMA_VERSION);
    }

    #[test]
    fn missing_character_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        let err = store.get_character("ghost").expect_err("missing");
        assert!(matches!(err, ProgressionError::NotFound(_)));
    }

    #[test]
    fn create_refuses_duplicates() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        let record = CharacterRecord::new("bob", Utc::now());
        store.create_character(&record).expect("first create");
        let err = store.create_character(&record).expect_err("duplicate");
        assert!(matches!(err, ProgressionError::AlreadyExists(_)));
        assert_eq!(store.list_character_ids().expect("list"), vec!["bob"]);
    }

    #[test]
    fn failed_sync_restores_previous_record() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        let original = CharacterRecord::new("gil", Utc::now());
        store.commit(&original).expect("commit");

        let mut updated = original.clone();
        updated.current_xp = 40;
        updated.habits_completed = 1;
        let key = CharacterStore::character_key(&updated.id);
        let bytes = CharacterStore::serialize(&updated).expect("serialize");
        let err = store
            .insert_durably(key, bytes, || {
                Err(sled::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            })
            .expect_err("sync fails");
        assert!(matches!(err, ProgressionError::Sled(_)));
        assert_eq!(store.load("gil").expect("load"), original);
    }

    #[test]
    fn failed_sync_of_new_record_leaves_nothing_behind() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        let record = CharacterRecord::new("hana", Utc::now());
        let key = CharacterStore::character_key(&record.id);
        let bytes = CharacterStore::serialize(&record).expect("serialize");
        store
            .insert_durably(key, bytes, || Err(sled::Error::Unsupported("no sync".into())))
            .expect_err("sync fails");
        assert!(matches!(
            store.load("hana").expect_err("rolled back"),
            ProgressionError::NotFound(_)
        ));
        assert!(store.list_character_ids().expect("list").is_empty());
    }

    #[test]
    fn listed_ids_keep_their_original_case() {
        let dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
        store
            .create_character(&CharacterRecord::new("Alice", Utc::now()))
            .expect("create");
        assert_eq!(store.list_character_ids().expect("list"), vec!["Alice"]);
        assert!(store.contains_character("ALICE").expect("contains"));
    }

    #[test]
    fn commits_are_audited_unless_disabled() {
        let dir = TempDir::new().expect("tempdir");
        {
            let store = CharacterStoreBuilder::new(dir.path()).open().expect("store");
            store
                .put_character(&CharacterRecord::new("erin", Utc::now()))
                .expect("put");
            let logs = store.recent_logs(10).expect("logs");
            assert_eq!(logs.len(), 1);
            assert!(logs[0].starts_with("commit erin level=1"));
        }

        let quiet_dir = TempDir::new().expect("tempdir");
        let store = CharacterStoreBuilder::new(quiet_dir.path())
            .without_audit_log()
            .open()
            .expect("store");
        store
            .put_character(&CharacterRecord::new("erin", Utc::now()))
            .expect("put");
        assert!(store.recent_logs(10).expect("logs").is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let record = CharacterRecord::new("frank", Utc::now());
        {
            let store = CharacterStore::open(dir.path()).expect("store");
            store.put_character(&record).expect("put");
        }
        let store = CharacterStore::open(dir.path()).expect("reopen");
        assert_eq!(store.get_character("frank").expect("get"), record);
    }
}
