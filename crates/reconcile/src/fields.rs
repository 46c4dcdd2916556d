//! Projection of caller attributes onto the parameters each platform call
//! accepts.
//!
//! Every call takes a different subset of the optional parameters. The tables
//! below list that subset per call; [`project`] copies the values that are
//! actually set, renaming where the caller-facing name differs from the
//! platform's (`text` becomes `caption`, `entities` becomes
//! `caption_entities`, the keyboard becomes `reply_markup`).

use serde::Serialize;

use crate::content::{DesiredContent, Keyboard, LinkPreview, ParseMode, ReplyTo, TextEntity};

/// A forwardable parameter, named after its platform counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BusinessConnectionId,
    Caption,
    CaptionEntities,
    DisableNotification,
    Entities,
    HasSpoiler,
    LinkPreviewOptions,
    MessageEffectId,
    MessageThreadId,
    ParseMode,
    ProtectContent,
    ReplyMarkup,
    ReplyParameters,
    ShowCaptionAboveMedia,
}

impl Field {
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            Self::BusinessConnectionId => "business_connection_id",
            Self::Caption => "caption",
            Self::CaptionEntities => "caption_entities",
            Self::DisableNotification => "disable_notification",
            Self::Entities => "entities",
            Self::HasSpoiler => "has_spoiler",
            Self::LinkPreviewOptions => "link_preview_options",
            Self::MessageEffectId => "message_effect_id",
            Self::MessageThreadId => "message_thread_id",
            Self::ParseMode => "parse_mode",
            Self::ProtectContent => "protect_content",
            Self::ReplyMarkup => "reply_markup",
            Self::ReplyParameters => "reply_parameters",
            Self::ShowCaptionAboveMedia => "show_caption_above_media",
        }
    }
}

/// `sendMessage`.
pub const SEND_MESSAGE: &[Field] = &[
    Field::BusinessConnectionId,
    Field::DisableNotification,
    Field::Entities,
    Field::LinkPreviewOptions,
    Field::MessageThreadId,
    Field::ParseMode,
    Field::ProtectContent,
    Field::ReplyMarkup,
    Field::ReplyParameters,
    Field::MessageEffectId,
];

/// `sendPhoto`, `sendAnimation`, `sendAudio`, `sendDocument`, `sendVideo`.
pub const SEND_MEDIA: &[Field] = &[
    Field::BusinessConnectionId,
    Field::DisableNotification,
    Field::MessageThreadId,
    Field::ProtectContent,
    Field::ReplyMarkup,
    Field::ReplyParameters,
    Field::MessageEffectId,
    Field::ParseMode,
    Field::Caption,
    Field::CaptionEntities,
];

/// Extra parameters for photo, animation and video.
pub const VISUAL_MEDIA: &[Field] = &[Field::HasSpoiler, Field::ShowCaptionAboveMedia];

/// `editMessageText`.
pub const EDIT_TEXT: &[Field] = &[
    Field::Entities,
    Field::LinkPreviewOptions,
    Field::ParseMode,
    Field::ReplyMarkup,
];

/// `editMessageCaption`.
pub const EDIT_CAPTION: &[Field] = &[
    Field::ReplyMarkup,
    Field::ParseMode,
    Field::Caption,
    Field::CaptionEntities,
];

/// `editMessageMedia`; the caption travels inside the input media.
pub const EDIT_MEDIA: &[Field] = &[Field::ReplyMarkup];

/// The `InputMedia` object passed to `editMessageMedia`.
pub const INPUT_MEDIA: &[Field] = &[Field::ParseMode, Field::Caption, Field::CaptionEntities];

/// `input_message_content` of an inline article.
pub const INLINE_TEXT_CONTENT: &[Field] =
    &[Field::ParseMode, Field::Entities, Field::LinkPreviewOptions];

/// Cached media inline results.
pub const INLINE_MEDIA: &[Field] = &[
    Field::Caption,
    Field::ParseMode,
    Field::CaptionEntities,
    Field::ReplyMarkup,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyMarkup {
    pub inline_keyboard: Keyboard,
}

/// Parameters projected for one call. Unset values are omitted when
/// serialized, so the JSON form is exactly what the platform receives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Params {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_connection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<Vec<TextEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<TextEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_spoiler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_effect_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protect_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_parameters: Option<ReplyTo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_caption_above_media: Option<bool>,
}

impl Params {
    /// The projected parameters as a JSON object keyed by platform name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Copy the set values of `fields` out of `content`.
///
/// Flags are forwarded only when true, strings only when non-empty and the
/// thread id only when non-zero. Empty lists are still forwarded.
#[must_use]
pub fn project(content: &DesiredContent, fields: &[Field]) -> Params {
    let attrs = content.attributes();
    let mut params = Params::default();

    for field in fields {
        match field {
            Field::BusinessConnectionId => {
                params.business_connection_id = non_empty(attrs.business_connection_id.as_deref());
            },
            Field::Caption => params.caption = non_empty(content.body()),
            Field::CaptionEntities => params.caption_entities = attrs.entities.clone(),
            Field::DisableNotification => {
                params.disable_notification = flag(attrs.disable_notification);
            },
            Field::Entities => params.entities = attrs.entities.clone(),
            Field::HasSpoiler => params.has_spoiler = flag(attrs.has_spoiler),
            Field::LinkPreviewOptions => {
                params.link_preview_options = attrs.link_preview_options.clone();
            },
            Field::MessageEffectId => {
                params.message_effect_id = non_empty(attrs.message_effect_id.as_deref());
            },
            Field::MessageThreadId => {
                params.message_thread_id = attrs.message_thread_id.filter(|id| *id != 0);
            },
            Field::ParseMode => params.parse_mode = attrs.parse_mode,
            Field::ProtectContent => params.protect_content = flag(attrs.protect_content),
            Field::ReplyMarkup => {
                params.reply_markup = attrs.keyboard.clone().map(|inline_keyboard| ReplyMarkup {
                    inline_keyboard,
                });
            },
            Field::ReplyParameters => params.reply_parameters = attrs.reply_parameters.clone(),
            Field::ShowCaptionAboveMedia => {
                params.show_caption_above_media = flag(attrs.show_caption_above_media);
            },
        }
    }

    params
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::content::{Attributes, InlineButton, MediaKind, MediaRef},
        serde_json::json,
    };

    fn decorated() -> Attributes {
        Attributes {
            keyboard: Some(vec![vec![InlineButton::callback("A", "a")]]),
            parse_mode: Some(ParseMode::Html),
            entities: Some(vec![TextEntity::new("bold", 0, 5)]),
            disable_notification: true,
            protect_content: false,
            message_thread_id: Some(0),
            business_connection_id: Some(String::new()),
            has_spoiler: true,
            ..Default::default()
        }
    }

    #[test]
    fn only_listed_fields_are_projected() {
        let content = DesiredContent::text("hello").with_attributes(decorated());
        let params = project(&content, EDIT_MEDIA);
        assert_eq!(
            serde_json::Value::Object(params.to_json()),
            json!({"reply_markup": {"inline_keyboard": [[{"text": "A", "callback_data": "a"}]]}})
        );
    }

    #[test]
    fn falsy_values_are_dropped() {
        let content = DesiredContent::text("hello").with_attributes(decorated());
        let params = project(&content, SEND_MESSAGE);
        assert_eq!(params.disable_notification, Some(true));
        assert_eq!(params.protect_content, None);
        assert_eq!(params.message_thread_id, None);
        assert_eq!(params.business_connection_id, None);
        assert_eq!(params.parse_mode, Some(ParseMode::Html));
        // Not part of sendMessage.
        assert_eq!(params.has_spoiler, None);
        assert_eq!(params.caption, None);
    }

    #[test]
    fn caption_is_taken_from_text() {
        let content = DesiredContent::text("new caption").with_attributes(decorated());
        let params = project(&content, EDIT_CAPTION);
        assert_eq!(params.caption.as_deref(), Some("new caption"));
        assert_eq!(params.caption_entities, Some(vec![TextEntity::new("bold", 0, 5)]));
        assert!(params.reply_markup.is_some());
        assert_eq!(params.entities, None);
    }

    #[test]
    fn empty_caption_is_dropped() {
        let content = DesiredContent::media(MediaKind::Photo, MediaRef::FileId("p".into()))
            .with_caption("");
        assert_eq!(project(&content, INPUT_MEDIA), Params::default());
    }

    #[test]
    fn empty_entity_list_is_still_forwarded() {
        let content = DesiredContent::text("x").with_attributes(Attributes {
            entities: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(project(&content, EDIT_TEXT).entities, Some(Vec::new()));
    }

    #[test]
    fn json_uses_platform_names() {
        let content = DesiredContent::text("hi").with_attributes(Attributes {
            parse_mode: Some(ParseMode::MarkdownV2),
            reply_parameters: Some(ReplyTo {
                message_id: 9,
                chat_id: None,
                allow_sending_without_reply: true,
            }),
            ..Default::default()
        });
        let json = serde_json::Value::Object(project(&content, SEND_MESSAGE).to_json());
        assert_eq!(
            json,
            json!({
                "parse_mode": "MarkdownV2",
                "reply_parameters": {"message_id": 9, "allow_sending_without_reply": true}
            })
        );
    }

    #[test]
    fn call_tables_cover_every_field() {
        let all = [
            SEND_MESSAGE,
            SEND_MEDIA,
            VISUAL_MEDIA,
            EDIT_TEXT,
            EDIT_CAPTION,
            EDIT_MEDIA,
            INPUT_MEDIA,
        ]
        .concat();
        let mut names: Vec<_> = all.iter().map(|f| f.api_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 14);
    }
}
