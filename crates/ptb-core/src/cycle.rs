//! The full work/break cycle: an unbounded run of intervals that only a
//! cancellation ends.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, IntervalKind, MessageRef, UserId},
    formatting::{break_started_text, countdown_text, cycle_stopped_text, work_started_text},
    keyboards,
    messaging::port::MessagingPort,
    store::UserStateStore,
    timer::{run_interval, ProgressSink, TimerOutcome},
};

/// Final report of a cycle run. Reaching it via stop is the designed shutdown
/// path; the count is partial progress, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub pomodoros_completed: u32,
}

/// Sink that edits one phase's announcement message with the countdown.
///
/// A failed edit (stale handle, flood control) is dropped on the floor; the
/// countdown itself never depends on the transport. A phase whose
/// announcement could not be sent at all simply runs silently.
pub(crate) struct PhaseProgress {
    notifier: Arc<dyn MessagingPort>,
    target: Option<MessageRef>,
}

impl PhaseProgress {
    pub(crate) fn new(notifier: Arc<dyn MessagingPort>, target: Option<MessageRef>) -> Self {
        Self { notifier, target }
    }
}

#[async_trait]
impl ProgressSink for PhaseProgress {
    async fn progress(&self, remaining_secs: u64, kind: IntervalKind) {
        let Some(target) = self.target else {
            return;
        };
        let _ = self
            .notifier
            .edit_inline_keyboard(
                target,
                &countdown_text(kind, remaining_secs),
                keyboards::stop_run(),
            )
            .await;
    }
}

/// In-cycle progress. Lives only while the cycle runs; the lifetime counters
/// in the store are a separate thing and can diverge from this one.
#[derive(Clone, Copy, Debug, Default)]
struct CycleProgress {
    completed: u32,
}

impl CycleProgress {
    fn record_pomodoro(&mut self) {
        self.completed += 1;
    }

    /// Every 4th completed pomodoro earns the long break.
    fn next_break(&self) -> IntervalKind {
        if self.completed % 4 == 0 {
            IntervalKind::LongBreak
        } else {
            IntervalKind::ShortBreak
        }
    }
}

enum CyclePhase {
    Starting,
    RunningWork,
    RunningBreak,
    Stopped,
}

/// Drives work and break intervals until the token is cancelled.
///
/// Durations are re-read from the store at each phase start, so configuration
/// changes apply from the next phase on. Cancellation is honored at tick
/// granularity inside a phase and checked again between phases: a stop that
/// lands in the gap never launches one more interval.
pub struct CycleScheduler {
    store: Arc<UserStateStore>,
    notifier: Arc<dyn MessagingPort>,
    chat_id: ChatId,
    user_id: UserId,
    cancel: CancellationToken,
    tick_period: Duration,
}

impl CycleScheduler {
    pub fn new(
        store: Arc<UserStateStore>,
        notifier: Arc<dyn MessagingPort>,
        chat_id: ChatId,
        user_id: UserId,
        cancel: CancellationToken,
        tick_period: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            chat_id,
            user_id,
            cancel,
            tick_period,
        }
    }

    pub async fn run(self) -> CycleReport {
        let mut progress = CycleProgress::default();
        let mut phase = CyclePhase::Starting;

        loop {
            phase = match phase {
                CyclePhase::Starting => {
                    println!("[CYCLE] user {} cycle starting", self.user_id.0);
                    CyclePhase::RunningWork
                }

                CyclePhase::RunningWork => {
                    let duration = self.store.intervals(self.user_id).await.pomodoro;
                    let number = progress.completed + 1;

                    match self
                        .run_phase(
                            IntervalKind::Pomodoro,
                            duration,
                            work_started_text(number, duration, number == 1),
                        )
                        .await
                    {
                        TimerOutcome::Cancelled => CyclePhase::Stopped,
                        TimerOutcome::Completed => {
                            progress.record_pomodoro();
                            self.store
                                .record_completion(self.user_id, IntervalKind::Pomodoro)
                                .await;
                            if self.cancel.is_cancelled() {
                                CyclePhase::Stopped
                            } else {
                                CyclePhase::RunningBreak
                            }
                        }
                    }
                }

                CyclePhase::RunningBreak => {
                    let kind = progress.next_break();
                    let duration = self.store.intervals(self.user_id).await.duration_secs(kind);

                    match self
                        .run_phase(
                            kind,
                            duration,
                            break_started_text(kind, progress.completed, duration),
                        )
                        .await
                    {
                        TimerOutcome::Cancelled => CyclePhase::Stopped,
                        TimerOutcome::Completed => {
                            self.store.record_completion(self.user_id, kind).await;
                            if self.cancel.is_cancelled() {
                                CyclePhase::Stopped
                            } else {
                                CyclePhase::RunningWork
                            }
                        }
                    }
                }

                CyclePhase::Stopped => {
                    println!(
                        "[CYCLE] user {} stopped after {} pomodoros",
                        self.user_id.0, progress.completed
                    );
                    let intervals = self.store.intervals(self.user_id).await;
                    let _ = self
                        .notifier
                        .send_inline_keyboard(
                            self.chat_id,
                            &cycle_stopped_text(progress.completed),
                            keyboards::main_menu(&intervals),
                        )
                        .await;
                    return CycleReport {
                        pomodoros_completed: progress.completed,
                    };
                }
            };
        }
    }

    /// Announce one phase and count it down on the announcement message.
    async fn run_phase(
        &self,
        kind: IntervalKind,
        duration_secs: u64,
        announcement_html: String,
    ) -> TimerOutcome {
        let announcement = self
            .notifier
            .send_inline_keyboard(self.chat_id, &announcement_html, keyboards::stop_run())
            .await
            .ok();
        let sink = PhaseProgress::new(self.notifier.clone(), announcement);
        run_interval(duration_secs, kind, &sink, &self.cancel, self.tick_period).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserIntervals;
    use crate::testing::RecordingMessenger;
    use tokio::time::sleep;

    const DEFAULTS: UserIntervals = UserIntervals {
        pomodoro: 1500,
        short_break: 300,
        long_break: 900,
    };

    fn fixture() -> (
        Arc<UserStateStore>,
        Arc<RecordingMessenger>,
        CancellationToken,
    ) {
        (
            Arc::new(UserStateStore::new(DEFAULTS)),
            Arc::new(RecordingMessenger::new()),
            CancellationToken::new(),
        )
    }

    fn scheduler(
        store: &Arc<UserStateStore>,
        notifier: &Arc<RecordingMessenger>,
        cancel: &CancellationToken,
    ) -> CycleScheduler {
        CycleScheduler::new(
            store.clone(),
            notifier.clone(),
            ChatId(10),
            UserId(1),
            cancel.clone(),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn break_selection_follows_the_every_fourth_rule() {
        let mut progress = CycleProgress::default();
        let mut kinds = Vec::new();
        for _ in 0..8 {
            progress.record_pomodoro();
            kinds.push(progress.next_break());
        }
        use IntervalKind::{LongBreak as L, ShortBreak as S};
        assert_eq!(kinds, vec![S, S, S, L, S, S, S, L]);
    }

    #[tokio::test(start_paused = true)]
    async fn five_pomodoros_schedule_four_short_and_one_long_break() {
        let (store, notifier, cancel) = fixture();
        let run = tokio::spawn(scheduler(&store, &notifier, &cancel).run());

        // 5 pomodoros, the breaks after #1..#5 (the 4th long), then a slice of
        // pomodoro #6: 5*1500 + 4*300 + 900 = 9600.
        sleep(Duration::from_secs(9610)).await;
        cancel.cancel();
        let report = run.await.unwrap();

        assert_eq!(report.pomodoros_completed, 5);
        let stats = store.stats(UserId(1)).await;
        assert_eq!(stats.pomodoros, 5);
        assert_eq!(stats.short_breaks, 4);
        assert_eq!(stats.long_breaks, 1);

        // Break announcements in order: short, short, short, long, short.
        let breaks: Vec<String> = notifier
            .sent_texts()
            .into_iter()
            .filter(|t| t.contains("TIME TO REST"))
            .collect();
        assert_eq!(breaks.len(), 5);
        for (i, text) in breaks.iter().enumerate() {
            if i == 3 {
                assert!(text.contains("Long break"), "break #{}: {text}", i + 1);
            } else {
                assert!(text.contains("Short break"), "break #{}: {text}", i + 1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_second_break_reports_two_and_launches_nothing_more() {
        let (store, notifier, cancel) = fixture();
        let run = tokio::spawn(scheduler(&store, &notifier, &cancel).run());

        // p1 (1500) + break (300) + p2 (1500), then 100 s into break #2.
        sleep(Duration::from_secs(3400)).await;
        cancel.cancel();
        let report = run.await.unwrap();

        assert_eq!(report.pomodoros_completed, 2);
        let stats = store.stats(UserId(1)).await;
        assert_eq!(stats.pomodoros, 2);
        assert_eq!(stats.short_breaks, 1); // break #2 never completed
        assert_eq!(stats.long_breaks, 0);

        // Four phase announcements (p1, b1, p2, b2) plus the stop summary;
        // no phase after the cancellation.
        let sent = notifier.sent_texts();
        assert_eq!(sent.len(), 5);
        assert!(sent[4].contains("Pomodoros completed: 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn duration_changes_apply_from_the_next_phase() {
        let (store, notifier, cancel) = fixture();
        let run = tokio::spawn(scheduler(&store, &notifier, &cancel).run());

        // Shrink the pomodoro mid-interval; the running one keeps its 1500 s.
        sleep(Duration::from_secs(100)).await;
        store
            .update_interval(UserId(1), IntervalKind::Pomodoro, "1")
            .await;

        sleep(Duration::from_secs(900)).await; // t = 1000, still inside #1
        assert_eq!(store.stats(UserId(1)).await.pomodoros, 0);

        // #1 ends at 1500, break ends at 1800, #2 runs 60 s with the new value.
        sleep(Duration::from_secs(900)).await; // t = 1900
        assert_eq!(store.stats(UserId(1)).await.pomodoros, 2);

        cancel.cancel();
        let report = run.await.unwrap();
        assert_eq!(report.pomodoros_completed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_on_the_breaks_final_tick_never_starts_another_work_phase() {
        let (store, notifier, cancel) = fixture();
        let run = tokio::spawn(scheduler(&store, &notifier, &cancel).run());

        // Cancel inside the break's last second: the break does not complete
        // and, crucially, pomodoro #2 is never announced.
        sleep(Duration::from_millis(1_799_500)).await;
        cancel.cancel();
        let report = run.await.unwrap();

        assert_eq!(report.pomodoros_completed, 1);
        assert_eq!(store.stats(UserId(1)).await.short_breaks, 0);
        let work_announcements = notifier
            .sent_texts()
            .into_iter()
            .filter(|t| t.contains("POMODORO CYCLE STARTED") || t.contains("BACK TO WORK"))
            .count();
        assert_eq!(work_announcements, 1);
    }
}
