//! Saturating HP adjustments. Clamping is the only error handling: results
//! always land in `0..=max_hp`.
use log::debug;

use crate::progression::types::{CharacterRecord, HpChange};

impl CharacterRecord {
    /// Heal by `points`, never exceeding `max_hp`.
    pub fn recover_hp(&mut self, points: u32) -> HpChange {
        let before = self.stats.hp;
        self.stats.hp = before.saturating_add(points).min(self.stats.max_hp);
        debug!("{} recovered hp {} -> {}", self.id, before, self.stats.hp);
        self.hp_change(before)
    }

    /// Take `points` damage, never dropping below zero.
    pub fn lose_hp(&mut self, points: u32) -> HpChange {
        let before = self.stats.hp;
        self.stats.hp = before.saturating_sub(points);
        debug!("{} lost hp {} -> {}", self.id, before, self.stats.hp);
        self.hp_change(before)
    }

    pub fn is_knocked_out(&self) -> bool {
        self.stats.hp == 0
    }

    fn hp_change(&self, before: u32) -> HpChange {
        HpChange {
            before,
            after: self.stats.hp,
            max_hp: self.stats.max_hp,
        }
    }
}
