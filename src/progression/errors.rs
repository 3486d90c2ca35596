use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can arise while applying progression rules or persisting characters.
#[derive(Debug, Error)]
pub enum ProgressionError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, seed files, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file could not be parsed.
    #[error("seed parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when fetching a character that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when creating a character whose id is already taken.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// The level-up cascade ran past its iteration ceiling. Only reachable if the
    /// XP curve stops being strictly positive.
    #[error("level-up cascade aborted after {levels} levels")]
    CascadeLimit { levels: u32 },

    /// Adding the award to the running XP total overflowed.
    #[error("experience total overflowed")]
    ExperienceOverflow,

    /// The stored last login lies on a later calendar day than the evaluation time.
    #[error("last login {last_login} is after evaluation time {now}")]
    FutureLogin {
        last_login: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}
