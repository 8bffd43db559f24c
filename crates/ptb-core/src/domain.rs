/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The three interval flavors of the pomodoro cadence.
///
/// The label and emoji are presentation helpers; the core contract only cares
/// about which stats counter an interval feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl IntervalKind {
    pub fn label(self) -> &'static str {
        match self {
            IntervalKind::Pomodoro => "Pomodoro",
            IntervalKind::ShortBreak => "Short break",
            IntervalKind::LongBreak => "Long break",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            IntervalKind::Pomodoro => "🍅",
            IntervalKind::ShortBreak => "☕",
            IntervalKind::LongBreak => "🌴",
        }
    }

    /// Stable key used in callback data.
    pub fn as_key(self) -> &'static str {
        match self {
            IntervalKind::Pomodoro => "pomodoro",
            IntervalKind::ShortBreak => "short_break",
            IntervalKind::LongBreak => "long_break",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pomodoro" => Some(IntervalKind::Pomodoro),
            "short_break" => Some(IntervalKind::ShortBreak),
            "long_break" => Some(IntervalKind::LongBreak),
            _ => None,
        }
    }
}

/// What an acquired registry slot is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunKind {
    Timer(IntervalKind),
    Cycle,
}
