use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::Mutex;

use ptb_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use ptb_core::{
    config::Config,
    domain::{IntervalKind, UserId},
    messaging::port::MessagingPort,
    service::PomodoroService,
};

use crate::handlers;
use crate::TelegramMessenger;

pub struct AppState {
    pub cfg: Arc<Config>,
    pub service: Arc<PomodoroService>,
    pub messenger: Arc<dyn MessagingPort>,
    pub pending: PendingInputs,
}

/// Which users are mid-configuration (the "send a number of minutes" step).
///
/// The next plain-text message from a listed user is consumed as their new
/// interval value.
#[derive(Default)]
pub struct PendingInputs {
    inner: Mutex<HashMap<UserId, IntervalKind>>,
}

impl PendingInputs {
    pub async fn set(&self, user: UserId, kind: IntervalKind) {
        self.inner.lock().await.insert(user, kind);
    }

    pub async fn take(&self, user: UserId) -> Option<IntervalKind> {
        self.inner.lock().await.remove(&user)
    }

    pub async fn clear(&self, user: UserId) {
        self.inner.lock().await.remove(&user);
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("ptb started: @{}", me.username());
    }

    // Wrap the raw Telegram messenger with a throttling decorator: the
    // edit-per-tick countdowns are exactly the workload that trips Telegram
    // flood control. A 429 RetryAfter retry stays at the adapter layer.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let service = Arc::new(PomodoroService::new(&cfg, messenger.clone()));

    let state = Arc::new(AppState {
        cfg,
        service,
        messenger,
        pending: PendingInputs::default(),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
