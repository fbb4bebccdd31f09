use async_trait::async_trait;
use serenity::{
    builder::{CreateActionRow, CreateMessage, EditMessage},
    http::Http,
    model::id::ChannelId,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    audio::{
        error::NotifyError,
        node::{MessageRef, Notice, Notifier},
    },
    ui::{buttons::now_playing_components, embeds::notice_embed},
};

/// Publica los avisos del reproductor en el canal de texto del guild
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Solo el mensaje de estado lleva controles
fn components(notice: &Notice) -> Vec<CreateActionRow> {
    match notice {
        Notice::NowPlaying { paused, disabled, .. } => now_playing_components(*paused, *disabled),
        _ => Vec::new(),
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: ChannelId, notice: Notice) -> Result<MessageRef, NotifyError> {
        let message = CreateMessage::new()
            .embed(notice_embed(&notice))
            .components(components(&notice));

        let sent = channel_id
            .send_message(&self.http, message)
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        debug!("📨 Aviso enviado al canal {}", channel_id);
        Ok(MessageRef {
            channel_id,
            message_id: sent.id,
        })
    }

    async fn edit(&self, message: MessageRef, notice: Notice) -> Result<(), NotifyError> {
        let edit = EditMessage::new()
            .embed(notice_embed(&notice))
            .components(components(&notice));

        message
            .channel_id
            .edit_message(&self.http, message.message_id, edit)
            .await
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(())
    }
}
