use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use ptb_core::{
    domain::{ChatId, UserId},
    formatting, keyboards,
    store::IntervalUpdate,
};

use crate::router::AppState;

/// Plain text only matters inside the configure flow: the next message from a
/// user with a pending interval is their new value in minutes.
pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    let Some(kind) = state.pending.take(user_id).await else {
        return Ok(());
    };

    match state
        .service
        .set_interval(user_id, kind, msg.text().unwrap_or(""))
        .await
    {
        IntervalUpdate::Updated { minutes, .. } => {
            let intervals = state.service.intervals(user_id).await;
            let _ = state
                .messenger
                .send_inline_keyboard(
                    chat_id,
                    &formatting::interval_updated_text(kind, minutes),
                    keyboards::main_menu(&intervals),
                )
                .await;
        }
        IntervalUpdate::InvalidValue => {
            // Keep waiting for a usable value; the prior setting is intact.
            state.pending.set(user_id, kind).await;
            let _ = state
                .messenger
                .send_html(chat_id, &formatting::invalid_interval_text())
                .await;
        }
    }

    Ok(())
}
