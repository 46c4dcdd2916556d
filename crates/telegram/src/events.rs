//! Maps teloxide updates to transport-neutral [`InboundEvent`]s.

use {
    editreply_reconcile::{
        ChatId, InboundEvent, MediaInfo, MediaKind, MessageContent, MessageId, ObservedMessage,
    },
    teloxide::types::{CallbackQuery, MaybeInaccessibleMessage, Message, Update, UpdateKind},
};

/// The attached media of `msg`, if any of the supported kinds.
///
/// Animations are checked first: the platform also fills `document` for
/// them.
#[must_use]
pub fn media_info(msg: &Message) -> Option<MediaInfo> {
    let (kind, file_id) = if let Some(animation) = msg.animation() {
        (MediaKind::Animation, animation.file.id.to_string())
    } else if let Some(sizes) = msg.photo() {
        let largest = sizes.last()?;
        (MediaKind::Photo, largest.file.id.to_string())
    } else if let Some(audio) = msg.audio() {
        (MediaKind::Audio, audio.file.id.to_string())
    } else if let Some(document) = msg.document() {
        (MediaKind::Document, document.file.id.to_string())
    } else if let Some(video) = msg.video() {
        (MediaKind::Video, video.file.id.to_string())
    } else {
        return None;
    };
    Some(MediaInfo { kind, file_id })
}

fn observed(msg: &Message) -> ObservedMessage {
    ObservedMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: Some(MessageId(msg.id.0)),
        content: MessageContent::Visible {
            media: media_info(msg),
        },
    }
}

/// A message record held by the caller, typically one the bot sent earlier.
#[must_use]
pub fn event_from_message(msg: &Message) -> InboundEvent {
    InboundEvent::Message(observed(msg))
}

#[must_use]
pub fn event_from_callback(query: &CallbackQuery) -> InboundEvent {
    let message = query.message.as_ref().map(|message| match message {
        MaybeInaccessibleMessage::Regular(msg) => observed(msg),
        MaybeInaccessibleMessage::Inaccessible(inaccessible) => ObservedMessage {
            chat_id: ChatId(inaccessible.chat.id.0),
            message_id: Some(MessageId(inaccessible.message_id.0)),
            content: MessageContent::Inaccessible,
        },
    });
    InboundEvent::Callback {
        inline_message_id: query.inline_message_id.clone(),
        message,
    }
}

/// Incoming user messages are answered with a new message, so only their chat
/// is kept.
#[must_use]
pub fn event_from_update(update: &Update) -> InboundEvent {
    match &update.kind {
        UpdateKind::Message(msg) => InboundEvent::Chat(ChatId(msg.chat.id.0)),
        UpdateKind::CallbackQuery(query) => event_from_callback(query),
        _ => InboundEvent::Detached,
    }
}
