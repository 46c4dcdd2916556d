//! What is known, or guessed, about the message being replaced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    content::MediaKind,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressability and media presence of the previous message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorState {
    /// Nothing to edit; the only option is sending.
    ChatOnly { chat_id: ChatId },
    /// A chat message that can be edited and deleted. `has_media` is exact
    /// when the message was observed, a guess when it was inaccessible.
    ChatMessage {
        chat_id: ChatId,
        message_id: MessageId,
        has_media: bool,
    },
    /// A message sent through inline mode. Cannot be deleted and its content
    /// is never disclosed, so `has_media` is always a guess.
    InlineMessage {
        inline_message_id: String,
        has_media: bool,
    },
}

impl PriorState {
    /// `None` for `ChatOnly`, which has no message to inspect.
    #[must_use]
    pub fn has_media(&self) -> Option<bool> {
        match self {
            Self::ChatOnly { .. } => None,
            Self::ChatMessage { has_media, .. } | Self::InlineMessage { has_media, .. } => {
                Some(*has_media)
            },
        }
    }
}

/// Media found on a received message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub kind: MediaKind,
    pub file_id: String,
}

/// A message record as delivered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedMessage {
    pub chat_id: ChatId,
    /// Always present on well-formed updates.
    pub message_id: Option<MessageId>,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Visible { media: Option<MediaInfo> },
    /// The platform withheld the content (the message is too old or was
    /// deleted); only chat and id are known.
    Inaccessible,
}

/// Transport-neutral view of the update that triggered a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A chat message record the caller holds directly.
    Message(ObservedMessage),
    /// A button press, bound either to an inline handle or to a chat message.
    Callback {
        inline_message_id: Option<String>,
        message: Option<ObservedMessage>,
    },
    /// Only the chat is known.
    Chat(ChatId),
    /// An update with neither a chat nor a message attached.
    Detached,
}

/// Work out the prior state for `event`.
///
/// `guessed_has_media` is used whenever the platform does not reveal the
/// message content: inline messages and inaccessible chat messages. Passing
/// the desired content's own media presence assumes the old message mirrors
/// the new one.
pub fn resolve(event: &InboundEvent, guessed_has_media: bool) -> Result<PriorState> {
    match event {
        InboundEvent::Message(message) => observed(message, guessed_has_media),
        InboundEvent::Callback {
            inline_message_id: Some(inline_message_id),
            ..
        } => Ok(PriorState::InlineMessage {
            inline_message_id: inline_message_id.clone(),
            has_media: guessed_has_media,
        }),
        InboundEvent::Callback {
            inline_message_id: None,
            message: Some(message),
        } => observed(message, guessed_has_media),
        InboundEvent::Callback {
            inline_message_id: None,
            message: None,
        } => Err(Error::MissingAddress(
            "callback carries neither an inline message id nor a message",
        )),
        InboundEvent::Chat(chat_id) => Ok(PriorState::ChatOnly { chat_id: *chat_id }),
        InboundEvent::Detached => Err(Error::MissingAddress("chat is absent from the update")),
    }
}

fn observed(message: &ObservedMessage, guessed_has_media: bool) -> Result<PriorState> {
    let message_id = message
        .message_id
        .ok_or(Error::MissingAddress("message id is absent from the message"))?;
    let has_media = match &message.content {
        MessageContent::Visible { media } => media.is_some(),
        MessageContent::Inaccessible => guessed_has_media,
    };
    Ok(PriorState::ChatMessage {
        chat_id: message.chat_id,
        message_id,
        has_media,
    })
}
