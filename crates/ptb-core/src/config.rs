use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, store::UserIntervals, Result};

/// Typed configuration, loaded from the environment (plus a local `.env`).
///
/// Only the bot token is required. The interval defaults are the classic
/// 25 / 5 / 15 minute cadence; per-user values live in the state store once a
/// user changes them.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Durations handed to a user on first contact, in seconds.
    pub default_intervals: UserIntervals,

    /// Countdown update period. One second unless overridden.
    pub tick_period: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let default_intervals = UserIntervals {
            pomodoro: positive_secs("POMODORO_SECS", 25 * 60)?,
            short_break: positive_secs("SHORT_BREAK_SECS", 5 * 60)?,
            long_break: positive_secs("LONG_BREAK_SECS", 15 * 60)?,
        };

        let tick_period = Duration::from_secs(positive_secs("TICK_PERIOD_SECS", 1)?);

        Ok(Self {
            telegram_bot_token,
            default_intervals,
            tick_period,
        })
    }
}

fn positive_secs(key: &str, default: u64) -> Result<u64> {
    let v = env_u64(key).unwrap_or(default);
    if v == 0 {
        return Err(Error::Config(format!("{key} must be a positive integer")));
    }
    Ok(v)
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
