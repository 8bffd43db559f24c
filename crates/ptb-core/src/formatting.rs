//! Message texts and small rendering helpers (Telegram HTML parse mode).
//!
//! Everything user-visible lives here so handlers and runs share one voice.

use crate::domain::IntervalKind;
use crate::store::{UserIntervals, UserStats};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `MM:SS`, or plain seconds under a minute.
pub fn format_time(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds} sec");
    }
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn settings_block(intervals: &UserIntervals) -> String {
    format!(
        "⚙️ Current settings:\n\
         • Pomodoro: {} min\n\
         • Short break: {} min\n\
         • Long break: {} min",
        intervals.pomodoro / 60,
        intervals.short_break / 60,
        intervals.long_break / 60,
    )
}

pub fn welcome_text(intervals: &UserIntervals) -> String {
    format!(
        "🍅 Welcome to the Pomodoro bot!\n\n\
         The Pomodoro technique helps you stay productive:\n\
         • 🍅 Pomodoro: {} min\n\
         • ☕ Short break: {} min\n\
         • 🌴 Long break: {} min\n\n\
         Use the buttons below to control the timers.\n\
         You can adjust the intervals to your liking!",
        intervals.pomodoro / 60,
        intervals.short_break / 60,
        intervals.long_break / 60,
    )
}

pub fn help_text() -> String {
    "📖 How to use this bot:\n\n\
     Commands:\n\
     /start - Show the main menu\n\
     /help - Show this reference\n\
     /stats - Show your statistics\n\n\
     Buttons:\n\
     🔄 Start full cycle - run an endless Pomodoro cycle\n\
     🍅 Start one Pomodoro - run a single work interval\n\
     🍅/☕/🌴 Configure - change an interval's duration\n\
     📊 Statistics - see your totals\n\
     ⏹ Stop timer/cycle - stop whatever is running\n\n\
     💡 Tip: every 4th Pomodoro is followed by a long break!"
        .to_string()
}

pub fn menu_text(intervals: &UserIntervals) -> String {
    format!("🍅 Main menu\n\n{}", settings_block(intervals))
}

pub fn stats_text(stats: &UserStats, intervals: &UserIntervals) -> String {
    let mut out = format!(
        "📊 Your statistics:\n\n\
         🍅 Pomodoros completed: {}\n\
         ☕ Short breaks: {}\n\
         🌴 Long breaks: {}\n\n{}\n",
        stats.pomodoros,
        stats.short_breaks,
        stats.long_breaks,
        settings_block(intervals),
    );

    if stats.pomodoros > 0 {
        let focused = stats.pomodoros * intervals.pomodoro;
        out.push_str(&format!("\n⏱ Total focus time: {}", format_time(focused)));
    } else {
        out.push_str("\n💡 Start your first Pomodoro!");
    }

    out
}

/// The per-tick countdown body; edits the phase's announcement message.
pub fn countdown_text(kind: IntervalKind, remaining_secs: u64) -> String {
    format!(
        "{} {}\n\n⏱ Time left: {}",
        kind.emoji(),
        kind.label(),
        format_time(remaining_secs)
    )
}

/// Announcement for a stand-alone timer. Distinct from the countdown body so
/// the first progress edit is never a no-op edit.
pub fn timer_started_text(kind: IntervalKind, duration_secs: u64) -> String {
    format!(
        "🔔 <b>{} started!</b>\n\n⏱ Time left: {}",
        kind.label(),
        format_time(duration_secs)
    )
}

/// Completion message for a stand-alone timer. Pomodoros congratulate on the
/// lifetime total; breaks nudge back to work.
pub fn timer_completed_text(kind: IntervalKind, stats: &UserStats) -> String {
    let mut out = format!("✅ {} finished!\n\n", kind.label());
    match kind {
        IntervalKind::Pomodoro => {
            out.push_str(&format!(
                "🎉 Congratulations! You have completed {} Pomodoro sessions!",
                stats.pomodoros
            ));
            if stats.pomodoros % 4 == 0 {
                out.push_str("\n\n💡 Time to take a long break!");
            }
        }
        IntervalKind::ShortBreak | IntervalKind::LongBreak => {
            out.push_str("💪 Ready to get back to work?");
        }
    }
    out
}

/// Summary shown on the menu message when a cycle is launched.
pub fn cycle_launched_text(intervals: &UserIntervals) -> String {
    format!(
        "🔄 Full Pomodoro cycle started!\n\n{}\n\nThe cycle runs until you stop it.",
        settings_block(intervals)
    )
}

/// Announcement for a work phase; doubles as that phase's countdown handle.
pub fn work_started_text(number: u32, duration_secs: u64, first: bool) -> String {
    if first {
        format!(
            "🔔 <b>POMODORO CYCLE STARTED!</b>\n\n\
             🍅 First Pomodoro begins!\n\n\
             ⏱ Time left: {}\n\n\
             💪 Ready to work productively?",
            format_time(duration_secs)
        )
    } else {
        format!(
            "🔔 <b>BACK TO WORK!</b>\n\n\
             🍅 Pomodoro #{number} begins!\n\n\
             ⏱ Time left: {}\n\n\
             💪 Time to focus!",
            format_time(duration_secs)
        )
    }
}

/// Announcement for a break phase.
pub fn break_started_text(kind: IntervalKind, after_number: u32, duration_secs: u64) -> String {
    format!(
        "🔔 <b>TIME TO REST!</b>\n\n\
         {} {} after Pomodoro #{after_number}\n\n\
         ⏱ Time left: {}\n\n\
         😌 Relax and recharge!",
        kind.emoji(),
        kind.label(),
        format_time(duration_secs)
    )
}

/// Final report of a stopped cycle; partial progress, not an error.
pub fn cycle_stopped_text(pomodoros_completed: u32) -> String {
    format!(
        "⏹ Pomodoro cycle stopped.\n\n✅ Pomodoros completed: {pomodoros_completed}"
    )
}

pub fn interval_prompt_text(kind: IntervalKind, current_secs: u64) -> String {
    format!(
        "{} Configure {}\n\n\
         Current value: {} minutes\n\n\
         Send the new value in minutes (a number):",
        kind.emoji(),
        kind.label(),
        current_secs / 60,
    )
}

pub fn interval_updated_text(kind: IntervalKind, minutes: u64) -> String {
    format!("✅ {} interval set to {minutes} minutes", kind.label())
}

pub fn invalid_interval_text() -> String {
    "❌ Please send a positive whole number of minutes. Try again:".to_string()
}

pub fn already_running_alert() -> String {
    "⏸ You already have an active timer or cycle! Stop it before starting a new one.".to_string()
}

pub fn settings_locked_alert() -> String {
    "⏸ Stop the active timer or cycle before changing settings!".to_string()
}

pub fn nothing_running_alert() -> String {
    "❌ You have no active timer or cycle!".to_string()
}

pub fn stopped_text() -> String {
    "⏹ Timer/cycle stopped.\n\nPick an action:".to_string()
}
