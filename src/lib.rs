//! # Habitquest - Character Progression Engine
//!
//! Habitquest turns habit completion into RPG progression. A character earns
//! experience for each completed habit, levels up (possibly several times in one
//! award), grows fixed attributes per level, gains and loses HP within a clamped
//! range, and keeps a calendar-day login streak.
//!
//! ## Features
//!
//! - **Leveling**: `100 + (level - 1) * 50` XP per level with multi-level cascades.
//! - **Vitality**: Saturating heal and damage; HP always stays in `0..=max_hp`.
//! - **Streaks**: Continued, broken or same-day evaluation by calendar date in the caller's time zone.
//! - **Explicit commits**: Engine functions load, mutate a working copy, and return only after a single successful write.
//! - **Persistence**: Sled-backed store with bincode records and schema checks.
//! - **Seeds**: JSON import of partially-populated characters with per-field defaults.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use habitquest::progression::{
//!     award_experience, check_daily_streak, CharacterRecord, CharacterStore, FutureLoginPolicy,
//! };
//!
//! fn main() -> Result<(), habitquest::progression::ProgressionError> {
//!     let store = CharacterStore::open("./data/characters")?;
//!     store.create_character(&CharacterRecord::new("alice", Utc::now()))?;
//!
//!     let leveled = award_experience(&store, "alice", 250)?;
//!     assert_eq!(leveled.record.level, 3);
//!
//!     check_daily_streak(&store, "alice", &Utc::now(), FutureLoginPolicy::Ignore)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progression`] - Character model, progression rules, engine and storage
//! - [`config`] - CLI configuration loading and defaults
//! - [`metrics`] - Process-wide progression counters

pub mod config;
pub mod metrics;
pub mod progression;
