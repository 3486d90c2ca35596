//! Experience awards and the level-up cascade.
//!
//! An award is applied to a working copy of the record; the caller's record is
//! only replaced once the whole cascade has completed, so an aborted cascade
//! never leaves a half-leveled character behind.

use log::{debug, error, info};

use crate::progression::errors::ProgressionError;
use crate::progression::types::{
    CharacterRecord, LevelUpReport, BASE_XP_TO_NEXT_LEVEL, LEVEL_GROWTH, XP_STEP_PER_LEVEL,
};

/// Upper bound on levels gained from a single award. A `u32` award can raise a
/// level 1 character roughly 13k levels, so this is never hit on a sane curve.
pub const MAX_LEVEL_UPS_PER_AWARD: u32 = 100_000;

/// XP required to advance out of `level`: `100 + (level - 1) * 50`.
pub fn xp_for_next_level(level: u32) -> u64 {
    BASE_XP_TO_NEXT_LEVEL + u64::from(level.saturating_sub(1)) * XP_STEP_PER_LEVEL
}

impl CharacterRecord {
    /// Award `amount` XP for one completed habit and resolve any level-ups.
    pub fn gain_xp(&mut self, amount: u32) -> Result<LevelUpReport, ProgressionError> {
        let previous_level = self.level;
        let mut next = self.clone();
        next.current_xp = next
            .current_xp
            .checked_add(u64::from(amount))
            .ok_or(ProgressionError::ExperienceOverflow)?;
        next.habits_completed = next.habits_completed.saturating_add(1);
        let levels_gained = next.level_up_cascade()?;
        *self = next;

        let report = LevelUpReport {
            xp_awarded: amount,
            previous_level,
            new_level: self.level,
            levels_gained,
        };
        if report.leveled_up() {
            info!(
                "{} reached level {} (+{} levels, {} / {} xp)",
                self.id, self.level, levels_gained, self.current_xp, self.xp_to_next_level
            );
        } else {
            debug!(
                "{} gained {} xp ({} / {})",
                self.id, amount, self.current_xp, self.xp_to_next_level
            );
        }
        Ok(report)
    }

    /// Convert surplus XP into levels until `current_xp < xp_to_next_level`.
    /// Returns the number of levels gained.
    pub(crate) fn level_up_cascade(&mut self) -> Result<u32, ProgressionError> {
        let mut levels = 0u32;
        while self.current_xp >= self.xp_to_next_level {
            if levels >= MAX_LEVEL_UPS_PER_AWARD {
                error!(
                    "level-up cascade for {} exceeded {} iterations (threshold {})",
                    self.id, MAX_LEVEL_UPS_PER_AWARD, self.xp_to_next_level
                );
                return Err(ProgressionError::CascadeLimit { levels });
            }
            self.level_up();
            levels += 1;
        }
        Ok(levels)
    }

    fn level_up(&mut self) {
        self.current_xp -= self.xp_to_next_level;
        self.level = self.level.saturating_add(1);
        self.stats.apply_growth(&LEVEL_GROWTH);
        self.xp_to_next_level = xp_for_next_level(self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fresh() -> CharacterRecord {
        CharacterRecord::new("alice", Utc::now())
    }

    #[test]
    fn threshold_grows_fifty_per_level() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(2), 150);
        assert_eq!(xp_for_next_level(3), 200);
        assert_eq!(xp_for_next_level(10), 550);
    }

    #[test]
    fn award_below_threshold_accumulates() {
        let mut c = fresh();
        let report = c.gain_xp(40).expect("gain");
        assert_eq!(c.current_xp, 40);
        assert_eq!(c.level, 1);
        assert_eq!(c.habits_completed, 1);
        assert!(!report.leveled_up());
    }

    #[test]
    fn large_award_cascades_through_two_levels() {
        let mut c = fresh();
        let report = c.gain_xp(250).expect("gain");
        assert_eq!(c.level, 3);
        assert_eq!(c.current_xp, 0);
        assert_eq!(c.xp_to_next_level, 200);
        assert_eq!(report.levels_gained, 2);
        assert_eq!(report.previous_level, 1);
        assert_eq!(report.new_level, 3);
    }

    #[test]
    fn exact_threshold_levels_up_with_zero_remainder() {
        let mut c = fresh();
        c.gain_xp(100).expect("gain");
        assert_eq!(c.level, 2);
        assert_eq!(c.current_xp, 0);
        assert_eq!(c.xp_to_next_level, 150);
    }

    #[test]
    fn single_level_applies_fixed_growth() {
        let mut c = fresh();
        let before = c.stats;
        c.gain_xp(100).expect("gain");
        assert_eq!(c.stats.max_hp, before.max_hp + 10);
        assert_eq!(c.stats.strength, before.strength + 5);
        assert_eq!(c.stats.vitality, before.vitality + 4);
        assert_eq!(c.stats.dexterity, before.dexterity + 3);
        assert_eq!(c.stats.intelligence, before.intelligence + 2);
        assert_eq!(c.stats.luck, before.luck + 1);
        // hp is not refilled on level-up
        assert_eq!(c.stats.hp, before.hp);
    }

    #[test]
    fn zero_award_still_counts_habit() {
        let mut c = fresh();
        c.gain_xp(0).expect("gain");
        c.gain_xp(0).expect("gain");
        assert_eq!(c.habits_completed, 2);
        assert_eq!(c.current_xp, 0);
        assert_eq!(c.level, 1);
    }

    #[test]
    fn invariants_hold_across_award_sequence() {
        let mut c = fresh();
        for amount in [0u32, 1, 99, 100, 149, 5_000, 37, 123_456, 0, 7] {
            c.gain_xp(amount).expect("gain");
            assert!(c.current_xp < c.xp_to_next_level);
            assert_eq!(c.xp_to_next_level, xp_for_next_level(c.level));
        }
        assert_eq!(c.habits_completed, 10);
    }

    #[test]
    fn runaway_cascade_aborts_without_mutation() {
        let mut c = fresh();
        c.current_xp = u64::MAX / 2;
        let snapshot = c.clone();
        let err = c.gain_xp(1).expect_err("cascade must abort");
        assert!(matches!(
            err,
            ProgressionError::CascadeLimit { levels } if levels == MAX_LEVEL_UPS_PER_AWARD
        ));
        assert_eq!(c, snapshot);
    }

    #[test]
    fn overflowing_award_is_rejected() {
        let mut c = fresh();
        c.current_xp = u64::MAX - 5;
        c.xp_to_next_level = u64::MAX;
        let err = c.gain_xp(10).expect_err("overflow");
        assert!(matches!(err, ProgressionError::ExperienceOverflow));
        assert_eq!(c.habits_completed, 0);
    }
}
