//! The countdown primitive shared by single timers and cycle phases.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::domain::IntervalKind;

/// Receives countdown updates.
///
/// Implementations render through the Notifier and absorb its failures; a
/// stale message handle must never stop the countdown.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn progress(&self, remaining_secs: u64, kind: IntervalKind);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerOutcome {
    Completed,
    Cancelled,
}

/// Count down `duration_secs` of `kind`.
///
/// Reports once up front with the full remaining value, then once per elapsed
/// tick while remaining > 0. Each iteration sleeps `min(tick_period,
/// remaining)` and subtracts exactly the amount slept, so the countdown lands
/// on zero without overshoot and durations not divisible by the tick still
/// terminate on schedule.
///
/// Cancellation is observed during every sleep: worst-case latency between a
/// cancel request and the timer noticing it is one tick period.
///
/// The timer does not touch statistics; the caller decides what a completed
/// interval means.
pub async fn run_interval(
    duration_secs: u64,
    kind: IntervalKind,
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
    tick_period: Duration,
) -> TimerOutcome {
    let tick_secs = tick_period.as_secs().max(1);
    let mut remaining = duration_secs;

    sink.progress(remaining, kind).await;

    while remaining > 0 {
        let step = tick_secs.min(remaining);
        tokio::select! {
            _ = cancel.cancelled() => return TimerOutcome::Cancelled,
            _ = sleep(Duration::from_secs(step)) => {}
        }
        remaining -= step;
        if remaining > 0 {
            sink.progress(remaining, kind).await;
        }
    }

    TimerOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::{advance, Instant};

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<u64>>,
    }

    impl RecordingSink {
        fn calls(&self) -> Vec<u64> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn progress(&self, remaining_secs: u64, _kind: IntervalKind) {
            self.calls.lock().unwrap().push(remaining_secs);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_to_exactly_zero() {
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let outcome = run_interval(
            3,
            IntervalKind::Pomodoro,
            &sink,
            &cancel,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome, TimerOutcome::Completed);
        assert_eq!(sink.calls(), vec![3, 2, 1]);
        // Sum of sleeps equals the duration: no drift, no overshoot.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn duration_not_divisible_by_tick_still_lands_on_schedule() {
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let outcome = run_interval(
            10,
            IntervalKind::ShortBreak,
            &sink,
            &cancel,
            Duration::from_secs(7),
        )
        .await;

        assert_eq!(outcome, TimerOutcome::Completed);
        // Initial report, then one report after the 7 s sleep; the final 3 s
        // sleep reaches zero and is not reported.
        assert_eq!(sink.calls(), vec![10, 3]);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_observed_within_one_tick() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let run = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let sink = RecordingSink::default();
                run_interval(
                    3600,
                    IntervalKind::Pomodoro,
                    &sink,
                    &cancel,
                    Duration::from_secs(1),
                )
                .await
            }
        });

        advance(Duration::from_millis(2500)).await;
        cancel.cancel();
        let outcome = run.await.unwrap();

        assert_eq!(outcome, TimerOutcome::Cancelled);
        // Noticed immediately, mid-sleep, not at the end of the hour.
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn already_cancelled_token_stops_before_the_first_sleep() {
        let sink = RecordingSink::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = run_interval(
            60,
            IntervalKind::LongBreak,
            &sink,
            &cancel,
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome, TimerOutcome::Cancelled);
        // The initial report still happens; no further ones.
        assert_eq!(sink.calls(), vec![60]);
    }
}
