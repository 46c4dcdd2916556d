//! Platform operations, one variant per method the transport must provide.

use crate::{
    content::{MediaKind, MediaRef},
    fields::Params,
    prior::{ChatId, MessageId},
};

/// Which existing message an edit applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTarget {
    Chat {
        chat_id: ChatId,
        message_id: MessageId,
    },
    Inline {
        inline_message_id: String,
    },
}

/// Replacement media for `editMessageMedia`, caption included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputMedia {
    pub kind: MediaKind,
    pub media: MediaRef,
    pub params: Params,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    SendMessage {
        chat_id: ChatId,
        text: String,
        params: Params,
    },
    SendPhoto {
        chat_id: ChatId,
        photo: MediaRef,
        params: Params,
    },
    SendAnimation {
        chat_id: ChatId,
        animation: MediaRef,
        params: Params,
    },
    SendAudio {
        chat_id: ChatId,
        audio: MediaRef,
        params: Params,
    },
    SendDocument {
        chat_id: ChatId,
        document: MediaRef,
        params: Params,
    },
    SendVideo {
        chat_id: ChatId,
        video: MediaRef,
        params: Params,
    },
    EditMessageText {
        target: MessageTarget,
        text: String,
        params: Params,
    },
    EditMessageCaption {
        target: MessageTarget,
        params: Params,
    },
    EditMessageMedia {
        target: MessageTarget,
        media: InputMedia,
        params: Params,
    },
    DeleteMessage {
        chat_id: ChatId,
        message_id: MessageId,
    },
}

impl PlatformCall {
    /// Bot API method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "sendMessage",
            Self::SendPhoto { .. } => "sendPhoto",
            Self::SendAnimation { .. } => "sendAnimation",
            Self::SendAudio { .. } => "sendAudio",
            Self::SendDocument { .. } => "sendDocument",
            Self::SendVideo { .. } => "sendVideo",
            Self::EditMessageText { .. } => "editMessageText",
            Self::EditMessageCaption { .. } => "editMessageCaption",
            Self::EditMessageMedia { .. } => "editMessageMedia",
            Self::DeleteMessage { .. } => "deleteMessage",
        }
    }

    /// The chat a send or chat-addressed edit goes to; `None` for inline edits.
    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::SendMessage { chat_id, .. }
            | Self::SendPhoto { chat_id, .. }
            | Self::SendAnimation { chat_id, .. }
            | Self::SendAudio { chat_id, .. }
            | Self::SendDocument { chat_id, .. }
            | Self::SendVideo { chat_id, .. }
            | Self::DeleteMessage { chat_id, .. } => Some(*chat_id),
            Self::EditMessageText { target, .. }
            | Self::EditMessageCaption { target, .. }
            | Self::EditMessageMedia { target, .. } => match target {
                MessageTarget::Chat { chat_id, .. } => Some(*chat_id),
                MessageTarget::Inline { .. } => None,
            },
        }
    }

    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        match self {
            Self::SendMessage { params, .. }
            | Self::SendPhoto { params, .. }
            | Self::SendAnimation { params, .. }
            | Self::SendAudio { params, .. }
            | Self::SendDocument { params, .. }
            | Self::SendVideo { params, .. }
            | Self::EditMessageText { params, .. }
            | Self::EditMessageCaption { params, .. }
            | Self::EditMessageMedia { params, .. } => Some(params),
            Self::DeleteMessage { .. } => None,
        }
    }
}
