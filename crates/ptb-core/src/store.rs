//! Per-user mutable state: statistics counters and configured durations.
//!
//! All state lives in process memory and is lost on restart. Every entry sits
//! behind its own lock so one user's update never blocks another user's run.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{IntervalKind, UserId};

/// Lifetime counters for one user. Monotonically increasing; bumped only when
/// an interval completes, never mid-countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStats {
    pub pomodoros: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
}

/// Configured interval durations for one user, in seconds. Always > 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserIntervals {
    pub pomodoro: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl UserIntervals {
    pub fn duration_secs(&self, kind: IntervalKind) -> u64 {
        match kind {
            IntervalKind::Pomodoro => self.pomodoro,
            IntervalKind::ShortBreak => self.short_break,
            IntervalKind::LongBreak => self.long_break,
        }
    }
}

/// Outcome of a configuration update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalUpdate {
    Updated { minutes: u64, seconds: u64 },
    InvalidValue,
}

#[derive(Clone, Copy, Debug)]
struct UserEntry {
    stats: UserStats,
    intervals: UserIntervals,
}

/// Per-user state store with lazy initialization.
///
/// The outer map only hands out per-user entries; all reads and writes go
/// through the entry's own mutex. Runs read durations once per phase start, so
/// a configuration change mid-interval never affects the running countdown.
pub struct UserStateStore {
    defaults: UserIntervals,
    users: Mutex<HashMap<UserId, Arc<Mutex<UserEntry>>>>,
}

impl UserStateStore {
    pub fn new(defaults: UserIntervals) -> Self {
        Self {
            defaults,
            users: Mutex::new(HashMap::new()),
        }
    }

    async fn entry(&self, user: UserId) -> Arc<Mutex<UserEntry>> {
        let mut map = self.users.lock().await;
        map.entry(user)
            .or_insert_with(|| {
                Arc::new(Mutex::new(UserEntry {
                    stats: UserStats::default(),
                    intervals: self.defaults,
                }))
            })
            .clone()
    }

    pub async fn stats(&self, user: UserId) -> UserStats {
        let entry = self.entry(user).await;
        let guard = entry.lock().await;
        guard.stats
    }

    pub async fn intervals(&self, user: UserId) -> UserIntervals {
        let entry = self.entry(user).await;
        let guard = entry.lock().await;
        guard.intervals
    }

    /// Apply a configuration update from raw user input (minutes).
    ///
    /// Anything that is not a positive integer is rejected and the prior value
    /// stays intact.
    pub async fn update_interval(
        &self,
        user: UserId,
        kind: IntervalKind,
        input: &str,
    ) -> IntervalUpdate {
        let minutes = match input.trim().parse::<i64>() {
            Ok(v) if v > 0 => v as u64,
            _ => return IntervalUpdate::InvalidValue,
        };
        let seconds = minutes * 60;

        let entry = self.entry(user).await;
        let mut guard = entry.lock().await;
        match kind {
            IntervalKind::Pomodoro => guard.intervals.pomodoro = seconds,
            IntervalKind::ShortBreak => guard.intervals.short_break = seconds,
            IntervalKind::LongBreak => guard.intervals.long_break = seconds,
        }

        IntervalUpdate::Updated { minutes, seconds }
    }

    /// Record a completed interval and return the updated counters.
    pub async fn record_completion(&self, user: UserId, kind: IntervalKind) -> UserStats {
        let entry = self.entry(user).await;
        let mut guard = entry.lock().await;
        match kind {
            IntervalKind::Pomodoro => guard.stats.pomodoros += 1,
            IntervalKind::ShortBreak => guard.stats.short_breaks += 1,
            IntervalKind::LongBreak => guard.stats.long_breaks += 1,
        }
        guard.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: UserIntervals = UserIntervals {
        pomodoro: 1500,
        short_break: 300,
        long_break: 900,
    };

    #[tokio::test]
    async fn lazy_init_uses_defaults() {
        let store = UserStateStore::new(DEFAULTS);
        let user = UserId(1);

        assert_eq!(store.stats(user).await, UserStats::default());
        assert_eq!(store.intervals(user).await, DEFAULTS);
    }

    #[tokio::test]
    async fn update_interval_accepts_positive_minutes() {
        let store = UserStateStore::new(DEFAULTS);
        let user = UserId(1);

        let out = store
            .update_interval(user, IntervalKind::Pomodoro, " 30 ")
            .await;
        assert_eq!(
            out,
            IntervalUpdate::Updated {
                minutes: 30,
                seconds: 1800
            }
        );
        assert_eq!(store.intervals(user).await.pomodoro, 1800);
        // Other kinds untouched.
        assert_eq!(store.intervals(user).await.short_break, 300);
    }

    #[tokio::test]
    async fn update_interval_rejects_bad_input_keeping_prior_value() {
        let store = UserStateStore::new(DEFAULTS);
        let user = UserId(1);

        for input in ["-5", "abc", "0", "2.5", ""] {
            let out = store.update_interval(user, IntervalKind::Pomodoro, input).await;
            assert_eq!(out, IntervalUpdate::InvalidValue, "input: {input:?}");
            assert_eq!(store.intervals(user).await.pomodoro, 1500);
        }
    }

    #[tokio::test]
    async fn record_completion_bumps_the_matching_counter() {
        let store = UserStateStore::new(DEFAULTS);
        let user = UserId(1);

        store.record_completion(user, IntervalKind::Pomodoro).await;
        store.record_completion(user, IntervalKind::Pomodoro).await;
        store.record_completion(user, IntervalKind::ShortBreak).await;
        let stats = store.record_completion(user, IntervalKind::LongBreak).await;

        assert_eq!(
            stats,
            UserStats {
                pomodoros: 2,
                short_breaks: 1,
                long_breaks: 1
            }
        );
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = UserStateStore::new(DEFAULTS);

        store
            .update_interval(UserId(1), IntervalKind::LongBreak, "45")
            .await;
        store.record_completion(UserId(1), IntervalKind::Pomodoro).await;

        assert_eq!(store.intervals(UserId(2)).await, DEFAULTS);
        assert_eq!(store.stats(UserId(2)).await, UserStats::default());
    }
}
