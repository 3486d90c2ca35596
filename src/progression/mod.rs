//! Character progression: data model, leveling, vitality and daily streaks.
//! Record-level rules live on [`CharacterRecord`]; the [`engine`] functions
//! wrap them with an explicit load/commit against a [`CharacterRepository`].

pub mod engine;
pub mod errors;
pub mod leveling;
pub mod seed_loader;
pub mod sheet;
pub mod storage;
pub mod streak;
pub mod types;
pub mod vitality;

pub use engine::{award_experience, check_daily_streak, lose_hp, recover_hp, Committed};
pub use errors::ProgressionError;
pub use leveling::{xp_for_next_level, MAX_LEVEL_UPS_PER_AWARD};
pub use seed_loader::{load_characters_from_json, CharacterSeed};
pub use sheet::{format_character_sheet, level_progress_percent};
pub use storage::{CharacterRepository, CharacterStore, CharacterStoreBuilder};
pub use streak::days_between;
pub use types::*;
