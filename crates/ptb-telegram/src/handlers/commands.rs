use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use ptb_core::{
    domain::{ChatId, UserId},
    formatting, keyboards,
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    let (cmd, _args) = parse_command(msg.text().unwrap_or(""));

    match cmd.as_str() {
        "start" => {
            // A fresh /start always leaves the configure flow.
            state.pending.clear(user_id).await;
            let intervals = state.service.intervals(user_id).await;
            let _ = state
                .messenger
                .send_inline_keyboard(
                    chat_id,
                    &formatting::welcome_text(&intervals),
                    keyboards::main_menu(&intervals),
                )
                .await;
        }
        "help" => {
            let intervals = state.service.intervals(user_id).await;
            let _ = state
                .messenger
                .send_inline_keyboard(
                    chat_id,
                    &formatting::help_text(),
                    keyboards::main_menu(&intervals),
                )
                .await;
        }
        "stats" => {
            let stats = state.service.stats(user_id).await;
            let intervals = state.service.intervals(user_id).await;
            let _ = state
                .messenger
                .send_inline_keyboard(
                    chat_id,
                    &formatting::stats_text(&stats, &intervals),
                    keyboards::main_menu(&intervals),
                )
                .await;
        }
        _ => {
            let _ = state
                .messenger
                .send_html(chat_id, "Unknown command. Try /help.")
                .await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_strips_slash_and_bot_mention() {
        assert_eq!(parse_command("/start"), ("start".to_string(), String::new()));
        assert_eq!(
            parse_command("/stats@my_pomodoro_bot"),
            ("stats".to_string(), String::new())
        );
        assert_eq!(
            parse_command("/Help  extra words "),
            ("help".to_string(), "extra words".to_string())
        );
    }
}
