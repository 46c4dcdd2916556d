//! The decision table.
//!
//! | prior                     | desired text      | desired media      |
//! |---------------------------|-------------------|--------------------|
//! | chat only                 | send new          | send new           |
//! | chat message, no media    | edit text         | send then delete   |
//! | chat message, media       | send then delete  | edit media         |
//! | inline message, no media  | edit text         | rejected           |
//! | inline message, media     | edit caption      | edit media         |
//!
//! Media cannot be removed by an edit, so a chat message losing its media is
//! replaced. Inline messages cannot be deleted, so the same transition keeps
//! the media and only updates the caption. Nothing can attach media to an
//! inline text message.

use std::fmt;

use crate::{
    call::MessageTarget,
    content::DesiredContent,
    prior::{ChatId, MessageId, PriorState},
};

pub const INLINE_MEDIA_REJECTION: &str =
    "original inline message had no media, but trying to add a media while editing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    EditMediaInPlace {
        target: MessageTarget,
    },
    /// Inline only: the media stays, the desired text becomes its caption.
    EditCaptionOnly {
        inline_message_id: String,
    },
    EditTextInPlace {
        target: MessageTarget,
    },
    /// Send the new content, then delete the stale chat message.
    SendThenDelete {
        chat_id: ChatId,
        stale_message_id: MessageId,
    },
    SendNew {
        chat_id: ChatId,
    },
    RejectedTransition {
        reason: &'static str,
    },
}

impl ActionPlan {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EditMediaInPlace { .. } => "edit_media_in_place",
            Self::EditCaptionOnly { .. } => "edit_caption_only",
            Self::EditTextInPlace { .. } => "edit_text_in_place",
            Self::SendThenDelete { .. } => "send_then_delete",
            Self::SendNew { .. } => "send_new",
            Self::RejectedTransition { .. } => "rejected_transition",
        }
    }
}

impl fmt::Display for ActionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the operations that turn `prior` into `desired`.
#[must_use]
pub fn decide(prior: &PriorState, desired: &DesiredContent) -> ActionPlan {
    let wants_media = desired.has_media();

    match prior {
        PriorState::ChatOnly { chat_id } => ActionPlan::SendNew { chat_id: *chat_id },
        PriorState::ChatMessage {
            chat_id,
            message_id,
            has_media,
        } => {
            if *has_media == wants_media {
                let target = MessageTarget::Chat {
                    chat_id: *chat_id,
                    message_id: *message_id,
                };
                if wants_media {
                    ActionPlan::EditMediaInPlace { target }
                } else {
                    ActionPlan::EditTextInPlace { target }
                }
            } else {
                ActionPlan::SendThenDelete {
                    chat_id: *chat_id,
                    stale_message_id: *message_id,
                }
            }
        },
        PriorState::InlineMessage {
            inline_message_id,
            has_media,
        } => {
            let inline_message_id = inline_message_id.clone();
            match (*has_media, wants_media) {
                (true, true) => ActionPlan::EditMediaInPlace {
                    target: MessageTarget::Inline { inline_message_id },
                },
                (true, false) => ActionPlan::EditCaptionOnly { inline_message_id },
                (false, false) => ActionPlan::EditTextInPlace {
                    target: MessageTarget::Inline { inline_message_id },
                },
                (false, true) => ActionPlan::RejectedTransition {
                    reason: INLINE_MEDIA_REJECTION,
                },
            }
        },
    }
}
