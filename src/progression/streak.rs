//! Daily login streak evaluation.
//!
//! Streaks are counted in calendar days, not elapsed hours: logging in at 08:00
//! and then at 23:00 the next day is a continued streak. Both timestamps are
//! reduced to dates in the time zone of the evaluation time the caller passes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info, warn};

use crate::progression::types::{CharacterRecord, StreakOutcome};

/// Whole calendar days from `last` to `today`; negative when `last` is later.
pub fn days_between(last: NaiveDate, today: NaiveDate) -> i64 {
    today.signed_duration_since(last).num_days()
}

impl CharacterRecord {
    /// Calendar date of the stored last login, seen from `now`'s time zone.
    pub fn last_login_date<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        self.last_login.with_timezone(&now.timezone()).date_naive()
    }

    /// True when the stored last login falls on a later day than `now`.
    pub fn last_login_is_future<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        days_between(self.last_login_date(now), now.date_naive()) < 0
    }

    /// Record a login at `now` and update the streak.
    ///
    /// Not idempotent: every call bumps `total_login_count` and moves
    /// `last_login`, even when the streak itself is unchanged.
    pub fn check_daily_streak<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> StreakOutcome {
        let last = self.last_login_date(now);
        let today = now.date_naive();

        let outcome = match days_between(last, today) {
            1 => {
                self.streak = self.streak.saturating_add(1);
                StreakOutcome::Continued {
                    streak: self.streak,
                }
            }
            gap if gap > 1 => {
                let previous = self.streak;
                self.streak = 1;
                info!(
                    "{} streak of {} broken after {} days away",
                    self.id, previous, gap
                );
                StreakOutcome::Broken { previous }
            }
            0 => StreakOutcome::SameDay {
                streak: self.streak,
            },
            _ => {
                warn!(
                    "{} last login {} is after today ({}); streak left at {}",
                    self.id, last, today, self.streak
                );
                StreakOutcome::FutureLastLogin {
                    streak: self.streak,
                }
            }
        };

        self.best_streak = self.best_streak.max(self.streak);
        self.last_login = now.with_timezone(&Utc);
        self.total_login_count = self.total_login_count.saturating_add(1);
        debug!(
            "{} login #{} -> {:?}",
            self.id, self.total_login_count, outcome
        );
        outcome
    }
}
