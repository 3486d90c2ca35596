//! Test utilities & fixtures.
//! Throwaway sled stores and fixed timestamps for progression tests.

use chrono::{DateTime, TimeZone, Utc};
use habitquest::progression::{CharacterRecord, CharacterStore, CharacterStoreBuilder};
use tempfile::TempDir;

/// Open an empty store in a fresh temp dir. Keep the `TempDir` alive for the
/// duration of the test.
#[allow(dead_code)] // not every test binary uses every helper
pub fn temp_store() -> (TempDir, CharacterStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CharacterStoreBuilder::new(dir.path().join("characters"))
        .open()
        .expect("store");
    (dir, store)
}

/// Store holding one freshly created character.
#[allow(dead_code)]
pub fn store_with(id: &str, created_at: DateTime<Utc>) -> (TempDir, CharacterStore) {
    let (dir, store) = temp_store();
    store
        .create_character(&CharacterRecord::new(id, created_at))
        .expect("create");
    (dir, store)
}

#[allow(dead_code)]
pub fn day(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}
