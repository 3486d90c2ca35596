use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CHARACTER_SCHEMA_VERSION: u8 = 1;

pub const STARTING_LEVEL: u32 = 1;
/// XP needed to leave level 1; each further level adds [`XP_STEP_PER_LEVEL`].
pub const BASE_XP_TO_NEXT_LEVEL: u64 = 100;
pub const XP_STEP_PER_LEVEL: u64 = 50;

pub const DEFAULT_HEAL_POINTS: u32 = 15;
pub const DEFAULT_DAMAGE_POINTS: u32 = 25;

/// Vital and attribute block carried by every character.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterStats {
    pub hp: u32,
    pub max_hp: u32,
    pub strength: u32,
    pub vitality: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub luck: u32,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            hp: 50,
            max_hp: 50,
            strength: 5,
            vitality: 5,
            dexterity: 3,
            intelligence: 3,
            luck: 1,
        }
    }
}

/// Fixed attribute growth applied once per level gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGrowth {
    pub max_hp: u32,
    pub strength: u32,
    pub vitality: u32,
    pub dexterity: u32,
    pub intelligence: u32,
    pub luck: u32,
}

pub const LEVEL_GROWTH: LevelGrowth = LevelGrowth {
    max_hp: 10,
    strength: 5,
    vitality: 4,
    dexterity: 3,
    intelligence: 2,
    luck: 1,
};

impl CharacterStats {
    pub fn apply_growth(&mut self, growth: &LevelGrowth) {
        self.max_hp = self.max_hp.saturating_add(growth.max_hp);
        self.strength = self.strength.saturating_add(growth.strength);
        self.vitality = self.vitality.saturating_add(growth.vitality);
        self.dexterity = self.dexterity.saturating_add(growth.dexterity);
        self.intelligence = self.intelligence.saturating_add(growth.intelligence);
        self.luck = self.luck.saturating_add(growth.luck);
    }
}

/// Progression state of a single character, as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub level: u32,
    pub current_xp: u64,
    pub xp_to_next_level: u64,
    /// Number of experience awards received, regardless of amount.
    pub habits_completed: u64,
    pub stats: CharacterStats,
    pub streak: u32,
    /// Longest streak ever reached.
    pub best_streak: u32,
    pub total_login_count: u64,
    pub last_login: DateTime<Utc>,
    pub schema_version: u8,
}

impl CharacterRecord {
    pub fn new(id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            created_at: now,
            level: STARTING_LEVEL,
            current_xp: 0,
            xp_to_next_level: BASE_XP_TO_NEXT_LEVEL,
            habits_completed: 0,
            stats: CharacterStats::default(),
            streak: 0,
            best_streak: 0,
            total_login_count: 0,
            last_login: now,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    /// True when HP and XP sit inside their valid ranges.
    pub fn is_consistent(&self) -> bool {
        self.level >= STARTING_LEVEL
            && self.stats.max_hp > 0
            && self.stats.hp <= self.stats.max_hp
            && self.current_xp < self.xp_to_next_level
    }
}

/// Result of a single experience award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUpReport {
    pub xp_awarded: u32,
    pub previous_level: u32,
    pub new_level: u32,
    pub levels_gained: u32,
}

impl LevelUpReport {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// HP before and after a healing or damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub before: u32,
    pub after: u32,
    pub max_hp: u32,
}

impl HpChange {
    /// Signed difference actually applied after clamping.
    pub fn delta(&self) -> i64 {
        i64::from(self.after) - i64::from(self.before)
    }
}

/// Which calendar case a daily login evaluation fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakOutcome {
    /// Last login was the previous calendar day.
    Continued { streak: u32 },
    /// Two or more days were missed; streak restarted at 1.
    Broken { previous: u32 },
    /// Already logged in today.
    SameDay { streak: u32 },
    /// Last login is dated after today (clock skew or zone mismatch).
    FutureLastLogin { streak: u32 },
}

/// How a login dated before the stored last login is handled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FutureLoginPolicy {
    /// Leave the streak unchanged and log a warning.
    #[default]
    Ignore,
    /// Fail the evaluation without touching the record.
    Reject,
}
