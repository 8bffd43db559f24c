use std::sync::Arc;

use teloxide::{prelude::*, types::CallbackQuery};

use ptb_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    formatting, keyboards,
    service::{StartReply, StopReply},
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();

    // Always answer the callback query eventually.
    let Some(message) = q.message.as_ref() else {
        let _ = state
            .messenger
            .answer_callback_query(&cb_id, None, false)
            .await;
        return Ok(());
    };

    let chat_id = ChatId(message.chat.id.0);
    let menu_msg = MessageRef {
        chat_id,
        message_id: MessageId(message.id.0),
    };
    let user_id = UserId(q.from.id.0 as i64);

    if data == keyboards::CB_START_CYCLE {
        match state.service.start_cycle(chat_id, user_id).await {
            StartReply::AlreadyRunning => {
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some(&formatting::already_running_alert()), true)
                    .await;
            }
            StartReply::Started => {
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some("🔄 Full Pomodoro cycle started!"), false)
                    .await;
                let intervals = state.service.intervals(user_id).await;
                let _ = state
                    .messenger
                    .edit_html(menu_msg, &formatting::cycle_launched_text(&intervals))
                    .await;
            }
        }
    } else if let Some(kind) = keyboards::parse_start_timer(&data) {
        match state.service.start_timer(chat_id, user_id, kind).await {
            StartReply::AlreadyRunning => {
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some(&formatting::already_running_alert()), true)
                    .await;
            }
            StartReply::Started => {
                let toast = format!("{} {} started!", kind.emoji(), kind.label());
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some(&toast), false)
                    .await;
            }
        }
    } else if let Some(kind) = keyboards::parse_set_interval(&data) {
        // Changing durations under a running countdown is rejected with an
        // alert, matching the start gate.
        if state.service.is_active(user_id).await {
            let _ = state
                .messenger
                .answer_callback_query(&cb_id, Some(&formatting::settings_locked_alert()), true)
                .await;
        } else {
            state.pending.set(user_id, kind).await;
            let _ = state
                .messenger
                .answer_callback_query(&cb_id, None, false)
                .await;
            let current = state.service.intervals(user_id).await.duration_secs(kind);
            let _ = state
                .messenger
                .edit_inline_keyboard(
                    menu_msg,
                    &formatting::interval_prompt_text(kind, current),
                    keyboards::settings(),
                )
                .await;
        }
    } else if data == keyboards::CB_SHOW_STATS {
        let _ = state
            .messenger
            .answer_callback_query(&cb_id, None, false)
            .await;
        let stats = state.service.stats(user_id).await;
        let intervals = state.service.intervals(user_id).await;
        let _ = state
            .messenger
            .edit_inline_keyboard(
                menu_msg,
                &formatting::stats_text(&stats, &intervals),
                keyboards::main_menu(&intervals),
            )
            .await;
    } else if data == keyboards::CB_MAIN_MENU {
        state.pending.clear(user_id).await;
        let _ = state
            .messenger
            .answer_callback_query(&cb_id, None, false)
            .await;
        let intervals = state.service.intervals(user_id).await;
        let _ = state
            .messenger
            .edit_inline_keyboard(
                menu_msg,
                &formatting::menu_text(&intervals),
                keyboards::main_menu(&intervals),
            )
            .await;
    } else if data == keyboards::CB_STOP_RUN {
        match state.service.stop_run(user_id).await {
            StopReply::Stopped(_) => {
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some("⏹ Stopped!"), false)
                    .await;
                let intervals = state.service.intervals(user_id).await;
                let _ = state
                    .messenger
                    .edit_inline_keyboard(
                        menu_msg,
                        &formatting::stopped_text(),
                        keyboards::main_menu(&intervals),
                    )
                    .await;
            }
            StopReply::NotRunning => {
                let _ = state
                    .messenger
                    .answer_callback_query(&cb_id, Some(&formatting::nothing_running_alert()), true)
                    .await;
            }
        }
    } else {
        let _ = state
            .messenger
            .answer_callback_query(&cb_id, None, false)
            .await;
    }

    Ok(())
}
