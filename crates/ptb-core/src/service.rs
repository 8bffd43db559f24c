//! Transport-facing facade: everything the command layer may ask the core to
//! do. Start operations acquire a registry slot first, spawn the run as a
//! task, and report contention without side effects.

use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    cycle::{CycleScheduler, PhaseProgress},
    domain::{ChatId, IntervalKind, RunKind, UserId},
    formatting::{timer_completed_text, timer_started_text},
    keyboards,
    messaging::port::MessagingPort,
    registry::{CancelOutcome, RunSlot, SessionRegistry, StartOutcome},
    store::{IntervalUpdate, UserIntervals, UserStateStore, UserStats},
    timer::{run_interval, TimerOutcome},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartReply {
    Started,
    AlreadyRunning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReply {
    Stopped(RunKind),
    NotRunning,
}

pub struct PomodoroService {
    store: Arc<UserStateStore>,
    registry: Arc<SessionRegistry>,
    notifier: Arc<dyn MessagingPort>,
    tick_period: Duration,
}

impl PomodoroService {
    pub fn new(cfg: &Config, notifier: Arc<dyn MessagingPort>) -> Self {
        Self {
            store: Arc::new(UserStateStore::new(cfg.default_intervals)),
            registry: Arc::new(SessionRegistry::new()),
            notifier,
            tick_period: cfg.tick_period,
        }
    }

    pub async fn stats(&self, user: UserId) -> UserStats {
        self.store.stats(user).await
    }

    pub async fn intervals(&self, user: UserId) -> UserIntervals {
        self.store.intervals(user).await
    }

    pub async fn is_active(&self, user: UserId) -> bool {
        self.registry.is_active(user).await
    }

    pub async fn set_interval(
        &self,
        user: UserId,
        kind: IntervalKind,
        input: &str,
    ) -> IntervalUpdate {
        self.store.update_interval(user, kind, input).await
    }

    /// Run a single interval of `kind` for the user.
    pub async fn start_timer(&self, chat_id: ChatId, user: UserId, kind: IntervalKind) -> StartReply {
        let slot = match self.registry.try_start(user, RunKind::Timer(kind)).await {
            StartOutcome::Acquired(slot) => slot,
            StartOutcome::AlreadyRunning(_) => return StartReply::AlreadyRunning,
        };

        let duration = self.store.intervals(user).await.duration_secs(kind);
        println!(
            "[TIMER] user {} starting {} ({duration}s)",
            user.0,
            kind.label()
        );

        let store = self.store.clone();
        let registry = self.registry.clone();
        let notifier = self.notifier.clone();
        let tick_period = self.tick_period;
        tokio::spawn(async move {
            run_single_timer(store, registry, notifier, chat_id, slot, kind, duration, tick_period)
                .await;
        });

        StartReply::Started
    }

    /// Launch the endless work/break cycle for the user.
    pub async fn start_cycle(&self, chat_id: ChatId, user: UserId) -> StartReply {
        let slot = match self.registry.try_start(user, RunKind::Cycle).await {
            StartOutcome::Acquired(slot) => slot,
            StartOutcome::AlreadyRunning(_) => return StartReply::AlreadyRunning,
        };

        let scheduler = CycleScheduler::new(
            self.store.clone(),
            self.notifier.clone(),
            chat_id,
            user,
            slot.cancel.clone(),
            self.tick_period,
        );
        let registry = self.registry.clone();
        tokio::spawn(async move {
            let report = scheduler.run().await;
            println!(
                "[CYCLE] user {} run ended: {} pomodoros",
                slot.user.0, report.pomodoros_completed
            );
            registry.finish(&slot).await;
        });

        StartReply::Started
    }

    /// Stop whatever the user has running. Safe to race against the run's own
    /// natural completion.
    pub async fn stop_run(&self, user: UserId) -> StopReply {
        match self.registry.cancel(user).await {
            CancelOutcome::Cancelled(kind) => {
                println!("[REGISTRY] user {} run cancelled", user.0);
                StopReply::Stopped(kind)
            }
            CancelOutcome::NotRunning => StopReply::NotRunning,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_single_timer(
    store: Arc<UserStateStore>,
    registry: Arc<SessionRegistry>,
    notifier: Arc<dyn MessagingPort>,
    chat_id: ChatId,
    slot: RunSlot,
    kind: IntervalKind,
    duration_secs: u64,
    tick_period: Duration,
) {
    let announcement = notifier
        .send_inline_keyboard(
            chat_id,
            &timer_started_text(kind, duration_secs),
            keyboards::stop_run(),
        )
        .await
        .ok();
    let sink = PhaseProgress::new(notifier.clone(), announcement);

    match run_interval(duration_secs, kind, &sink, &slot.cancel, tick_period).await {
        TimerOutcome::Completed => {
            let stats = store.record_completion(slot.user, kind).await;
            let intervals = store.intervals(slot.user).await;
            let _ = notifier
                .send_inline_keyboard(
                    chat_id,
                    &timer_completed_text(kind, &stats),
                    keyboards::main_menu(&intervals),
                )
                .await;
        }
        TimerOutcome::Cancelled => {
            println!("[TIMER] user {} {} cancelled", slot.user.0, kind.label());
        }
    }

    registry.finish(&slot).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingMessenger, RecordingMessenger};
    use tokio::time::sleep;

    fn test_config() -> Config {
        Config {
            telegram_bot_token: "test-token".to_string(),
            default_intervals: UserIntervals {
                pomodoro: 3,
                short_break: 2,
                long_break: 2,
            },
            tick_period: Duration::from_secs(1),
        }
    }

    const CHAT: ChatId = ChatId(10);
    const USER: UserId = UserId(1);

    #[tokio::test(start_paused = true)]
    async fn single_pomodoro_counts_down_and_records_one_completion() {
        let notifier = Arc::new(RecordingMessenger::new());
        let service = PomodoroService::new(&test_config(), notifier.clone());

        assert_eq!(
            service.start_timer(CHAT, USER, IntervalKind::Pomodoro).await,
            StartReply::Started
        );
        sleep(Duration::from_secs(4)).await;

        assert_eq!(service.stats(USER).await.pomodoros, 1);
        assert!(!service.is_active(USER).await);

        // Progress edits carried remaining 3, 2, 1 in order.
        let edits = notifier.edit_texts();
        assert_eq!(edits.len(), 3);
        assert!(edits[0].contains("3 sec"));
        assert!(edits[1].contains("2 sec"));
        assert!(edits[2].contains("1 sec"));

        // Completion message congratulates on the lifetime total.
        let sent = notifier.sent_texts();
        assert!(sent.last().unwrap().contains("completed 1 Pomodoro"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_while_a_run_is_active() {
        let notifier = Arc::new(RecordingMessenger::new());
        let service = PomodoroService::new(&test_config(), notifier.clone());

        assert_eq!(
            service.start_timer(CHAT, USER, IntervalKind::Pomodoro).await,
            StartReply::Started
        );
        assert_eq!(service.start_cycle(CHAT, USER).await, StartReply::AlreadyRunning);
        assert_eq!(
            service.start_timer(CHAT, USER, IntervalKind::ShortBreak).await,
            StartReply::AlreadyRunning
        );

        // Contention left no trace: the original run still completes alone.
        sleep(Duration::from_secs(4)).await;
        assert_eq!(service.stats(USER).await.pomodoros, 1);
        assert_eq!(service.stats(USER).await.short_breaks, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_with_nothing_running_reports_not_running() {
        let notifier = Arc::new(RecordingMessenger::new());
        let service = PomodoroService::new(&test_config(), notifier.clone());

        assert_eq!(service.stop_run(USER).await, StopReply::NotRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_then_start_acquires_immediately() {
        let notifier = Arc::new(RecordingMessenger::new());
        let service = PomodoroService::new(&test_config(), notifier.clone());

        service.start_timer(CHAT, USER, IntervalKind::Pomodoro).await;
        sleep(Duration::from_secs(1)).await;

        assert_eq!(
            service.stop_run(USER).await,
            StopReply::Stopped(RunKind::Timer(IntervalKind::Pomodoro))
        );
        // No waiting for the cancelled task to unwind.
        assert_eq!(
            service.start_timer(CHAT, USER, IntervalKind::Pomodoro).await,
            StartReply::Started
        );

        sleep(Duration::from_secs(4)).await;
        // Only the second run completed; the first was cancelled mid-way.
        assert_eq!(service.stats(USER).await.pomodoros, 1);
        assert!(!service.is_active(USER).await);
    }

    #[tokio::test(start_paused = true)]
    async fn notifier_failures_never_disturb_the_countdown() {
        let notifier = Arc::new(FailingMessenger);
        let service = PomodoroService::new(&test_config(), notifier.clone());

        assert_eq!(
            service.start_timer(CHAT, USER, IntervalKind::Pomodoro).await,
            StartReply::Started
        );
        sleep(Duration::from_secs(4)).await;

        assert_eq!(service.stats(USER).await.pomodoros, 1);
        assert!(!service.is_active(USER).await);
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_stop_reports_partial_progress_and_frees_the_slot() {
        let notifier = Arc::new(RecordingMessenger::new());
        let service = PomodoroService::new(&test_config(), notifier.clone());

        assert_eq!(service.start_cycle(CHAT, USER).await, StartReply::Started);

        // p1 (3) + b1 (2) + p2 (3) + 1 s into b2.
        sleep(Duration::from_secs(9)).await;
        assert_eq!(service.stop_run(USER).await, StopReply::Stopped(RunKind::Cycle));
        assert!(!service.is_active(USER).await);

        // Let the cancelled task publish its summary.
        sleep(Duration::from_secs(1)).await;
        let sent = notifier.sent_texts();
        assert!(sent.last().unwrap().contains("Pomodoros completed: 2"));
        assert_eq!(service.stats(USER).await.pomodoros, 2);
    }
}
