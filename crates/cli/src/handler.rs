use {
    async_trait::async_trait,
    editreply_config::GalleryConfig,
    editreply_reconcile::{
        DesiredContent, Error as ReconcileError, InboundEvent, PriorSource, Reconciler,
    },
    editreply_telegram::{
        Delivered, Error, Result, TelegramTransport, UpdateHandler, events, inline,
    },
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{InlineQuery, UpdateKind},
    },
    tracing::{debug, info},
};

use crate::gallery::{self, GalleryAction};

/// Whether `err` is the platform refusing an edit that changes nothing.
pub fn is_not_modified(err: &ReconcileError) -> bool {
    let ReconcileError::Transport { source, .. } = err else {
        return false;
    };
    matches!(
        source.downcast_ref::<Error>(),
        Some(Error::Telegram(RequestError::Api(ApiError::MessageNotModified)))
    )
}

pub struct GalleryBot {
    reconciler: Reconciler<TelegramTransport>,
    gallery: GalleryConfig,
}

impl GalleryBot {
    pub fn new(transport: TelegramTransport, gallery: GalleryConfig) -> Self {
        Self {
            reconciler: Reconciler::new(transport),
            gallery,
        }
    }

    fn bot(&self) -> &Bot {
        self.reconciler.transport().bot()
    }

    async fn show(&self, prior: impl Into<PriorSource>, content: &DesiredContent) -> Result<()> {
        match self.reconciler.reconcile_and_execute(prior, content).await {
            Ok(Delivered::Message(message)) => {
                debug!(
                    chat_id = message.chat.id.0,
                    message_id = message.id.0,
                    "gallery message delivered"
                );
                Ok(())
            },
            Ok(Delivered::Acknowledged) => Ok(()),
            Err(e) if is_not_modified(&e) => {
                debug!("gallery message already shows this content");
                Ok(())
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn on_message(&self, msg: Message) -> Result<()> {
        let event = InboundEvent::Chat(editreply_reconcile::ChatId(msg.chat.id.0));

        if let Some(info) = events::media_info(&msg) {
            info!(
                chat_id = msg.chat.id.0,
                kind = %info.kind,
                file_id = %info.file_id,
                "media info"
            );
            return self.show(event, &gallery::media_info_reply(&info)).await;
        }

        if msg.text().and_then(gallery::command) == Some("start") {
            return self
                .show(event, &gallery::gallery_content(&self.gallery, None))
                .await;
        }

        debug!(chat_id = msg.chat.id.0, "ignoring message");
        Ok(())
    }

    async fn on_callback(&self, query: CallbackQuery) -> Result<()> {
        // Dismiss the loading spinner whatever happens next.
        let _ = self.bot().answer_callback_query(&query.id).await;

        let Some(action) = query.data.as_deref().and_then(gallery::parse_callback) else {
            debug!(callback_data = ?query.data, "ignoring unknown callback data");
            return Ok(());
        };
        let selected = match action {
            GalleryAction::Select(i) => Some(i),
            GalleryAction::Back => None,
        };
        let content = gallery::gallery_content(&self.gallery, selected);
        let prior = gallery::callback_prior(&events::event_from_callback(&query), &content)?;
        self.show(prior, &content).await
    }

    async fn on_inline_query(&self, query: InlineQuery) -> Result<()> {
        let results = self
            .gallery
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let content = gallery::gallery_content(&self.gallery, Some(i));
                inline::build(&format!("media-{i}"), &gallery::item_title(item), &content)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(count = results.len(), "answering inline query");
        self.bot()
            .answer_inline_query(&query.id, results)
            .cache_time(0)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UpdateHandler for GalleryBot {
    async fn handle(&self, update: Update) -> Result<()> {
        match update.kind {
            UpdateKind::Message(msg) => self.on_message(msg).await,
            UpdateKind::CallbackQuery(query) => self.on_callback(query).await,
            UpdateKind::InlineQuery(query) => self.on_inline_query(query).await,
            _ => Ok(()),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_modified_is_detected_through_the_transport_error() {
        let err = ReconcileError::transport(
            "editMessageText",
            Error::Telegram(RequestError::Api(ApiError::MessageNotModified)),
        );
        assert!(is_not_modified(&err));
    }

    #[test]
    fn other_errors_are_not_swallowed() {
        let err = ReconcileError::transport(
            "editMessageText",
            Error::Telegram(RequestError::Api(ApiError::MessageToEditNotFound)),
        );
        assert!(!is_not_modified(&err));
        assert!(!is_not_modified(&ReconcileError::MissingAddress("no chat")));
    }
}
