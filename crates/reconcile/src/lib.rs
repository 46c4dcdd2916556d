//! Reconciles a previously sent chat message with the content it should show.
//!
//! The platform edits asymmetrically: media can be replaced but never removed,
//! and inline messages can be edited but never deleted. [`engine::decide`]
//! maps what is known about the old message ([`PriorState`]) and the wanted
//! content ([`DesiredContent`]) to an [`ActionPlan`]; [`executor::execute`]
//! turns the plan into [`PlatformCall`]s on a [`Transport`].

pub mod call;
pub mod content;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fields;
pub mod inline;
pub mod prior;

pub use {
    call::{InputMedia, MessageTarget, PlatformCall},
    content::{
        Attributes, ButtonAction, DesiredContent, InlineButton, Keyboard, LinkPreview, Media,
        MediaKind, MediaRef, ParseMode, ReplyTo, TextEntity,
    },
    engine::{ActionPlan, decide},
    error::{Error, Result},
    executor::{PriorSource, Reconciler, Transport, execute},
    fields::{Field, Params, ReplyMarkup},
    inline::inline_result,
    prior::{
        ChatId, InboundEvent, MediaInfo, MessageContent, MessageId, ObservedMessage, PriorState,
        resolve,
    },
};
