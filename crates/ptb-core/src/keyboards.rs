//! Inline keyboard layouts and the callback data they carry.
//!
//! Callback data strings are defined next to their builders so the adapter's
//! parser and the layouts can never drift apart.

use crate::domain::IntervalKind;
use crate::messaging::types::{InlineButton, InlineKeyboard};
use crate::store::UserIntervals;

pub const CB_START_CYCLE: &str = "cycle:start";
pub const CB_STOP_RUN: &str = "run:stop";
pub const CB_SHOW_STATS: &str = "stats:show";
pub const CB_MAIN_MENU: &str = "menu:main";

const CB_START_TIMER_PREFIX: &str = "timer:start:";
const CB_SET_INTERVAL_PREFIX: &str = "interval:set:";

pub fn start_timer_data(kind: IntervalKind) -> String {
    format!("{CB_START_TIMER_PREFIX}{}", kind.as_key())
}

pub fn set_interval_data(kind: IntervalKind) -> String {
    format!("{CB_SET_INTERVAL_PREFIX}{}", kind.as_key())
}

pub fn parse_start_timer(data: &str) -> Option<IntervalKind> {
    data.strip_prefix(CB_START_TIMER_PREFIX)
        .and_then(IntervalKind::from_key)
}

pub fn parse_set_interval(data: &str) -> Option<IntervalKind> {
    data.strip_prefix(CB_SET_INTERVAL_PREFIX)
        .and_then(IntervalKind::from_key)
}

/// The main menu. Configure buttons carry the user's current minutes.
pub fn main_menu(intervals: &UserIntervals) -> InlineKeyboard {
    InlineKeyboard::new(vec![
        InlineButton::new("🔄 Start full Pomodoro cycle", CB_START_CYCLE),
        InlineButton::new(
            "🍅 Start one Pomodoro",
            start_timer_data(IntervalKind::Pomodoro),
        ),
        InlineButton::new(
            format!("🍅 Configure Pomodoro ({} min)", intervals.pomodoro / 60),
            set_interval_data(IntervalKind::Pomodoro),
        ),
        InlineButton::new(
            format!(
                "☕ Configure short break ({} min)",
                intervals.short_break / 60
            ),
            set_interval_data(IntervalKind::ShortBreak),
        ),
        InlineButton::new(
            format!("🌴 Configure long break ({} min)", intervals.long_break / 60),
            set_interval_data(IntervalKind::LongBreak),
        ),
        InlineButton::new("📊 Statistics", CB_SHOW_STATS),
        InlineButton::new("⏹ Stop timer/cycle", CB_STOP_RUN),
    ])
}

/// Shown while waiting for a new interval value.
pub fn settings() -> InlineKeyboard {
    InlineKeyboard::new(vec![InlineButton::new("🔙 Back", CB_MAIN_MENU)])
}

/// Attached to countdown messages.
pub fn stop_run() -> InlineKeyboard {
    InlineKeyboard::new(vec![InlineButton::new("⏹ Stop", CB_STOP_RUN)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_data_round_trips() {
        for kind in [
            IntervalKind::Pomodoro,
            IntervalKind::ShortBreak,
            IntervalKind::LongBreak,
        ] {
            assert_eq!(parse_start_timer(&start_timer_data(kind)), Some(kind));
            assert_eq!(parse_set_interval(&set_interval_data(kind)), Some(kind));
        }
        assert_eq!(parse_start_timer("timer:start:nap"), None);
        assert_eq!(parse_start_timer(CB_START_CYCLE), None);
    }

    #[test]
    fn main_menu_shows_current_minutes() {
        let kb = main_menu(&UserIntervals {
            pomodoro: 1500,
            short_break: 300,
            long_break: 900,
        });
        assert_eq!(kb.buttons.len(), 7);
        assert!(kb.buttons[2].label.contains("25 min"));
        assert!(kb.buttons[3].label.contains("5 min"));
        assert!(kb.buttons[4].label.contains("15 min"));
    }
}
