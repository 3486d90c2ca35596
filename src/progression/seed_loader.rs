//! Seed data loaders for importing partially-populated characters.
//!
//! A seed names a character and any subset of its progression fields. Absent
//! fields take the starting defaults; present fields are kept as-is, then the
//! result is normalized so HP and XP sit inside their valid ranges.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::progression::errors::ProgressionError;
use crate::progression::leveling::xp_for_next_level;
use crate::progression::types::{CharacterRecord, CharacterStats, STARTING_LEVEL};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CharacterSeed {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub level: Option<u32>,
    pub current_xp: Option<u64>,
    pub xp_to_next_level: Option<u64>,
    pub habits_completed: Option<u64>,
    pub hp: Option<u32>,
    pub max_hp: Option<u32>,
    pub strength: Option<u32>,
    pub vitality: Option<u32>,
    pub dexterity: Option<u32>,
    pub intelligence: Option<u32>,
    pub luck: Option<u32>,
    pub streak: Option<u32>,
    pub best_streak: Option<u32>,
    pub total_login_count: Option<u64>,
    pub last_login: Option<DateTime<Utc>>,
}

impl CharacterSeed {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Fill every absent field with its default and normalize the result.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<CharacterRecord, ProgressionError> {
        let created_at = self.created_at.unwrap_or(now);
        let mut record = CharacterRecord::new(&self.id, created_at);
        let base = CharacterStats::default();

        record.level = self.level.unwrap_or(record.level).max(STARTING_LEVEL);
        record.current_xp = self.current_xp.unwrap_or(record.current_xp);
        record.habits_completed = self.habits_completed.unwrap_or(record.habits_completed);
        record.stats = CharacterStats {
            max_hp: self.max_hp.filter(|hp| *hp > 0).unwrap_or(base.max_hp),
            hp: self.hp.unwrap_or(base.hp),
            strength: self.strength.unwrap_or(base.strength),
            vitality: self.vitality.unwrap_or(base.vitality),
            dexterity: self.dexterity.unwrap_or(base.dexterity),
            intelligence: self.intelligence.unwrap_or(base.intelligence),
            luck: self.luck.unwrap_or(base.luck),
        };
        record.stats.hp = record.stats.hp.min(record.stats.max_hp);
        record.streak = self.streak.unwrap_or(record.streak);
        record.best_streak = self
            .best_streak
            .unwrap_or(record.best_streak)
            .max(record.streak);
        record.total_login_count = self.total_login_count.unwrap_or(record.total_login_count);
        record.last_login = self.last_login.unwrap_or(created_at);

        record.xp_to_next_level = xp_for_next_level(record.level);
        if let Some(seeded) = self.xp_to_next_level {
            if seeded != record.xp_to_next_level {
                warn!(
                    "seed {}: xp_to_next_level {} does not match level {}, using {}",
                    record.id, seeded, record.level, record.xp_to_next_level
                );
            }
        }
        // Carried XP may already exceed the threshold. Growth from those levels
        // only lands on attributes the seed left unset.
        let levels = record.level_up_cascade()?;
        if levels > 0 {
            let stats = &mut record.stats;
            if let Some(max_hp) = self.max_hp.filter(|hp| *hp > 0) {
                stats.max_hp = max_hp;
            }
            if let Some(strength) = self.strength {
                stats.strength = strength;
            }
            if let Some(vitality) = self.vitality {
                stats.vitality = vitality;
            }
            if let Some(dexterity) = self.dexterity {
                stats.dexterity = dexterity;
            }
            if let Some(intelligence) = self.intelligence {
                stats.intelligence = intelligence;
            }
            if let Some(luck) = self.luck {
                stats.luck = luck;
            }
            stats.hp = stats.hp.min(stats.max_hp);
        }
        Ok(record)
    }
}

/// Load character seeds from a JSON array file.
pub fn load_characters_from_json<P: AsRef<Path>>(
    path: P,
    now: DateTime<Utc>,
) -> Result<Vec<CharacterRecord>, ProgressionError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let seeds: Vec<CharacterSeed> = serde_json::from_str(&contents)?;
    seeds
        .into_iter()
        .map(|seed| seed.into_record(now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_seed_matches_fresh_character() {
        let now = Utc::now();
        let record = CharacterSeed::new("jo").into_record(now).expect("record");
        assert_eq!(record, CharacterRecord::new("jo", now));
    }

    #[test]
    fn present_fields_are_kept() {
        let now = Utc::now();
        let seed = CharacterSeed {
            level: Some(4),
            current_xp: Some(30),
            hp: Some(12),
            max_hp: Some(80),
            luck: Some(9),
            streak: Some(6),
            ..CharacterSeed::new("kim")
        };
        let record = seed.into_record(now).expect("record");
        assert_eq!(record.level, 4);
        assert_eq!(record.current_xp, 30);
        assert_eq!(record.xp_to_next_level, 250);
        assert_eq!(record.stats.hp, 12);
        assert_eq!(record.stats.max_hp, 80);
        assert_eq!(record.stats.luck, 9);
        assert_eq!(record.stats.strength, 5);
        assert_eq!(record.streak, 6);
        assert_eq!(record.best_streak, 6);
        assert_eq!(record.last_login, now);
    }

    #[test]
    fn out_of_range_values_are_normalized() {
        let seed = CharacterSeed {
            level: Some(0),
            current_xp: Some(250),
            hp: Some(500),
            max_hp: Some(0),
            ..CharacterSeed::new("lee")
        };
        let record = seed.into_record(Utc::now()).expect("record");
        assert_eq!(record.level, 3);
        assert_eq!(record.current_xp, 0);
        // max_hp 0 falls back to 50, then two cascaded levels add 20
        assert_eq!(record.stats.max_hp, 70);
        assert_eq!(record.stats.hp, 50);
        assert!(record.is_consistent());
    }

    #[test]
    fn carried_xp_does_not_grow_seeded_attributes() {
        let seed = CharacterSeed {
            current_xp: Some(250),
            strength: Some(40),
            max_hp: Some(90),
            hp: Some(90),
            ..CharacterSeed::new("lou")
        };
        let record = seed.into_record(Utc::now()).expect("record");
        assert_eq!(record.level, 3);
        assert_eq!(record.current_xp, 0);
        assert_eq!(record.stats.strength, 40);
        assert_eq!(record.stats.max_hp, 90);
        assert_eq!(record.stats.hp, 90);
        // unset attributes still pick up two levels of growth
        assert_eq!(record.stats.vitality, 13);
        assert_eq!(record.stats.luck, 3);
    }

    #[test]
    fn loads_seed_array_from_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"[{{"id": "mo"}}, {{"id": "ned", "level": 2, "hp": 10, "total_login_count": 14}}]"#
        )
        .expect("write");
        let now = Utc::now();
        let records = load_characters_from_json(file.path(), now).expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], CharacterRecord::new("mo", now));
        assert_eq!(records[1].level, 2);
        assert_eq!(records[1].xp_to_next_level, 150);
        assert_eq!(records[1].stats.hp, 10);
        assert_eq!(records[1].total_login_count, 14);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "not json").expect("write");
        let err = load_characters_from_json(file.path(), Utc::now()).expect_err("parse");
        assert!(matches!(err, ProgressionError::Json(_)));
    }
}
