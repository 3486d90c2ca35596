//! Compact text rendering of a character for CLI and log output.
use crate::progression::types::CharacterRecord;

/// Percentage of the way to the next level, 0..=99.
pub fn level_progress_percent(record: &CharacterRecord) -> u8 {
    if record.xp_to_next_level == 0 {
        return 0;
    }
    let pct = record.current_xp.saturating_mul(100) / record.xp_to_next_level;
    pct.min(99) as u8
}

/// Render a text bar of `width` cells filled proportionally to `value / max`.
fn bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value.min(max) as u128 * width as u128) / max as u128) as usize
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn format_character_sheet(record: &CharacterRecord) -> String {
    let s = &record.stats;
    format!(
        "{id} Lv{level}\n\
         XP {xp}/{next} {xp_bar} {pct}%\n\
         HP {hp}/{max_hp} {hp_bar}\n\
         STR {strength} VIT {vit} DEX {dex} INT {int} LCK {lck}\n\
         Habits {habits} | Streak {streak} (best {best}) | Logins {logins}\n\
         Last login {last}",
        id = record.id,
        level = record.level,
        xp = record.current_xp,
        next = record.xp_to_next_level,
        xp_bar = bar(record.current_xp, record.xp_to_next_level, 10),
        pct = level_progress_percent(record),
        hp = s.hp,
        max_hp = s.max_hp,
        hp_bar = bar(u64::from(s.hp), u64::from(s.max_hp), 10),
        strength = s.strength,
        vit = s.vitality,
        dex = s.dexterity,
        int = s.intelligence,
        lck = s.luck,
        habits = record.habits_completed,
        streak = record.streak,
        best = record.best_streak,
        logins = record.total_login_count,
        last = record.last_login.format("%Y-%m-%d %H:%M UTC"),
    )
}
