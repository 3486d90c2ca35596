//! Process-wide progression counters.
//! Updated by the engine after each successful commit; read via [`snapshot`].
use std::sync::atomic::{AtomicU64, Ordering};

static XP_AWARDED: AtomicU64 = AtomicU64::new(0);
static HABITS_COMPLETED: AtomicU64 = AtomicU64::new(0);
static LEVEL_UPS: AtomicU64 = AtomicU64::new(0);
static HP_RECOVERED: AtomicU64 = AtomicU64::new(0);
static HP_LOST: AtomicU64 = AtomicU64::new(0);
static LOGINS: AtomicU64 = AtomicU64::new(0);
static STREAK_BREAKS: AtomicU64 = AtomicU64::new(0);
static FAILED_COMMITS: AtomicU64 = AtomicU64::new(0);

pub fn record_xp_award(amount: u32, levels_gained: u32) {
    XP_AWARDED.fetch_add(u64::from(amount), Ordering::Relaxed);
    HABITS_COMPLETED.fetch_add(1, Ordering::Relaxed);
    LEVEL_UPS.fetch_add(u64::from(levels_gained), Ordering::Relaxed);
}

pub fn record_hp_recovered(points: u32) {
    HP_RECOVERED.fetch_add(u64::from(points), Ordering::Relaxed);
}

pub fn record_hp_lost(points: u32) {
    HP_LOST.fetch_add(u64::from(points), Ordering::Relaxed);
}

pub fn record_login(streak_broken: bool) {
    LOGINS.fetch_add(1, Ordering::Relaxed);
    if streak_broken {
        STREAK_BREAKS.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn inc_failed_commits() {
    FAILED_COMMITS.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub xp_awarded: u64,
    pub habits_completed: u64,
    pub level_ups: u64,
    /// HP actually restored, after clamping.
    pub hp_recovered: u64,
    /// HP actually removed, after clamping.
    pub hp_lost: u64,
    pub logins: u64,
    pub streak_breaks: u64,
    pub failed_commits: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        xp_awarded: XP_AWARDED.load(Ordering::Relaxed),
        habits_completed: HABITS_COMPLETED.load(Ordering::Relaxed),
        level_ups: LEVEL_UPS.load(Ordering::Relaxed),
        hp_recovered: HP_RECOVERED.load(Ordering::Relaxed),
        hp_lost: HP_LOST.load(Ordering::Relaxed),
        logins: LOGINS.load(Ordering::Relaxed),
        streak_breaks: STREAK_BREAKS.load(Ordering::Relaxed),
        failed_commits: FAILED_COMMITS.load(Ordering::Relaxed),
    }
}
