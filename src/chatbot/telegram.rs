//! Telegram client using teloxide.

use std::sync::Arc;

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::warn;

use crate::chatbot::scheduler::SendText;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, String> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|msg| msg.id.0 as i64)
            .map_err(|e| {
                let msg = format!("Failed to send: {e}");
                warn!("{}", msg);
                msg
            })
    }
}

/// Drain outbound requests onto the Telegram API. Delivery failures are
/// logged and dropped, not retried.
pub fn spawn_sender(client: Arc<TelegramClient>, mut rx: mpsc::Receiver<SendText>) {
    tokio::spawn(async move {
        while let Some(out) = rx.recv().await {
            if let Err(e) = client.send_message(out.chat_id, &out.text).await {
                warn!("Dropping outbound message for chat {}: {e}", out.chat_id);
            }
        }
    });
}
