//! In-memory messengers for tests.

use std::sync::{
    atomic::{AtomicI32, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessagingCapabilities},
    },
    Error, Result,
};

fn capabilities() -> MessagingCapabilities {
    MessagingCapabilities {
        supports_html: true,
        supports_edit: true,
        supports_inline_keyboards: true,
        max_message_len: 4096,
    }
}

/// Records every render call and allocates message ids locally, so tests can
/// assert on announcement order and countdown edits.
#[derive(Default)]
pub struct RecordingMessenger {
    next_id: AtomicI32,
    sent: Mutex<Vec<(ChatId, String)>>,
    edits: Mutex<Vec<(MessageRef, String)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        MessageRef {
            chat_id,
            message_id: MessageId(id),
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn edit_texts(&self) -> Vec<String> {
        self.edits.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        capabilities()
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.sent.lock().unwrap().push((chat_id, html.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        self.edits.lock().unwrap().push((msg, html.to_string()));
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        _keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.sent.lock().unwrap().push((chat_id, html.to_string()));
        Ok(self.alloc(chat_id))
    }

    async fn edit_inline_keyboard(
        &self,
        msg: MessageRef,
        html: &str,
        _keyboard: InlineKeyboard,
    ) -> Result<()> {
        self.edits.lock().unwrap().push((msg, html.to_string()));
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        _callback_id: &str,
        _text: Option<&str>,
        _show_alert: bool,
    ) -> Result<()> {
        Ok(())
    }
}

/// Messenger whose every call fails; countdowns must shrug it off.
pub struct FailingMessenger;

#[async_trait]
impl MessagingPort for FailingMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        capabilities()
    }

    async fn send_html(&self, _chat_id: ChatId, _html: &str) -> Result<MessageRef> {
        Err(Error::External("messenger down".to_string()))
    }

    async fn edit_html(&self, _msg: MessageRef, _html: &str) -> Result<()> {
        Err(Error::External("messenger down".to_string()))
    }

    async fn send_inline_keyboard(
        &self,
        _chat_id: ChatId,
        _html: &str,
        _keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        Err(Error::External("messenger down".to_string()))
    }

    async fn edit_inline_keyboard(
        &self,
        _msg: MessageRef,
        _html: &str,
        _keyboard: InlineKeyboard,
    ) -> Result<()> {
        Err(Error::External("messenger down".to_string()))
    }

    async fn answer_callback_query(
        &self,
        _callback_id: &str,
        _text: Option<&str>,
        _show_alert: bool,
    ) -> Result<()> {
        Err(Error::External("messenger down".to_string()))
    }
}
