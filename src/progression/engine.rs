//! Load → mutate → commit wrappers around the record-level progression rules.
//!
//! Every function loads the character from the repository, applies one rule to a
//! working copy and issues exactly one `commit`. A `Committed` value is only
//! returned once that write has succeeded; on any error the stored record is
//! whatever it was before the call.
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};

use crate::metrics;
use crate::progression::errors::ProgressionError;
use crate::progression::storage::CharacterRepository;
use crate::progression::types::{
    CharacterRecord, FutureLoginPolicy, HpChange, LevelUpReport, StreakOutcome,
};

/// New character state together with what the operation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed<T> {
    pub record: CharacterRecord,
    pub outcome: T,
}

fn apply<R, T, F>(repo: &R, id: &str, op: &str, mutate: F) -> Result<Committed<T>, ProgressionError>
where
    R: CharacterRepository + ?Sized,
    F: FnOnce(&mut CharacterRecord) -> Result<T, ProgressionError>,
{
    let mut record = repo.load(id)?;
    let outcome = mutate(&mut record)?;
    debug_assert!(record.is_consistent(), "{} left {} inconsistent", op, id);
    if let Err(e) = repo.commit(&record) {
        metrics::inc_failed_commits();
        warn!("{} for {} not applied: {}", op, id, e);
        return Err(e);
    }
    debug!("{} committed for {}", op, id);
    Ok(Committed { record, outcome })
}

/// Award XP for a completed habit.
pub fn award_experience<R: CharacterRepository + ?Sized>(
    repo: &R,
    id: &str,
    amount: u32,
) -> Result<Committed<LevelUpReport>, ProgressionError> {
    let committed = apply(repo, id, "gain_xp", |record| record.gain_xp(amount))?;
    metrics::record_xp_award(amount, committed.outcome.levels_gained);
    Ok(committed)
}

pub fn recover_hp<R: CharacterRepository + ?Sized>(
    repo: &R,
    id: &str,
    points: u32,
) -> Result<Committed<HpChange>, ProgressionError> {
    let committed = apply(repo, id, "recover_hp", |record| Ok(record.recover_hp(points)))?;
    metrics::record_hp_recovered(committed.outcome.after.saturating_sub(committed.outcome.before));
    Ok(committed)
}

pub fn lose_hp<R: CharacterRepository + ?Sized>(
    repo: &R,
    id: &str,
    points: u32,
) -> Result<Committed<HpChange>, ProgressionError> {
    let committed = apply(repo, id, "lose_hp", |record| Ok(record.lose_hp(points)))?;
    metrics::record_hp_lost(committed.outcome.before.saturating_sub(committed.outcome.after));
    Ok(committed)
}

/// Evaluate a daily login at `now`.
///
/// Under [`FutureLoginPolicy::Reject`] a stored last login dated after today
/// fails with [`ProgressionError::FutureLogin`] before anything is mutated.
/// Retrying after a failed commit is safe; retrying after a successful one
/// counts a second login.
pub fn check_daily_streak<R, Tz>(
    repo: &R,
    id: &str,
    now: &DateTime<Tz>,
    policy: FutureLoginPolicy,
) -> Result<Committed<StreakOutcome>, ProgressionError>
where
    R: CharacterRepository + ?Sized,
    Tz: TimeZone,
{
    let committed = apply(repo, id, "check_daily_streak", |record| {
        if policy == FutureLoginPolicy::Reject && record.last_login_is_future(now) {
            return Err(ProgressionError::FutureLogin {
                last_login: record.last_login,
                now: now.with_timezone(&Utc),
            });
        }
        Ok(record.check_daily_streak(now))
    })?;
    metrics::record_login(matches!(
        committed.outcome,
        StreakOutcome::Broken { .. }
    ));
    Ok(committed)
}
