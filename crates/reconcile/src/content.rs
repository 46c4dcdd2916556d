//! The content a caller wants a message to show.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Media kinds that can be sent, edited in place, or resent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MediaKind {
    Photo,
    Animation,
    Audio,
    Document,
    Video,
}

impl MediaKind {
    pub const ALL: [Self; 5] = [
        Self::Photo,
        Self::Animation,
        Self::Audio,
        Self::Document,
        Self::Video,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Animation => "animation",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Video => "video",
        }
    }

    /// Photo, animation and video accept the spoiler and caption-placement
    /// flags; audio and document do not.
    #[must_use]
    pub fn is_visual(self) -> bool {
        matches!(self, Self::Photo | Self::Animation | Self::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnsupportedMediaKind(s.to_string()))
    }
}

impl TryFrom<String> for MediaKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where the media bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaRef {
    /// A file already stored on the platform.
    FileId(String),
    /// A URL the platform downloads itself.
    Url(String),
    /// Bytes uploaded with the request.
    Upload {
        file_name: String,
        #[serde(skip)]
        bytes: Vec<u8>,
    },
}

impl MediaRef {
    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        match self {
            Self::FileId(id) => Some(id),
            Self::Url(_) | Self::Upload { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    pub source: MediaRef,
}

impl Media {
    #[must_use]
    pub fn new(kind: MediaKind, source: MediaRef) -> Self {
        Self { kind, source }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    MarkdownV2,
    Markdown,
}

/// A formatting span, in the platform's `MessageEntity` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

impl TextEntity {
    #[must_use]
    pub fn new(kind: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind: kind.into(),
            offset,
            length,
            url: None,
            language: None,
            custom_emoji_id: None,
        }
    }
}

/// Link preview options. All fields are always serialized so the platform
/// type can be deserialized from this shape without defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPreview {
    pub is_disabled: bool,
    pub url: Option<String>,
    pub prefer_small_media: bool,
    pub prefer_large_media: bool,
    pub show_above_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTo {
    pub message_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub allow_sending_without_reply: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    CallbackData(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl InlineButton {
    #[must_use]
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::CallbackData(data.into()),
        }
    }

    #[must_use]
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

pub type Keyboard = Vec<Vec<InlineButton>>;

/// Optional decorations shared by every call. Never changes which operation
/// is chosen, only which parameters get forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub keyboard: Option<Keyboard>,
    pub parse_mode: Option<ParseMode>,
    pub entities: Option<Vec<TextEntity>>,
    pub link_preview_options: Option<LinkPreview>,
    pub disable_notification: bool,
    pub protect_content: bool,
    pub message_thread_id: Option<i32>,
    pub business_connection_id: Option<String>,
    pub has_spoiler: bool,
    pub reply_parameters: Option<ReplyTo>,
    pub message_effect_id: Option<String>,
    pub show_caption_above_media: bool,
}

/// What the message should look like after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredContent {
    TextOnly {
        text: String,
        attributes: Attributes,
    },
    WithMedia {
        media: Media,
        caption: Option<String>,
        attributes: Attributes,
    },
}

impl DesiredContent {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextOnly {
            text: text.into(),
            attributes: Attributes::default(),
        }
    }

    #[must_use]
    pub fn media(kind: MediaKind, source: MediaRef) -> Self {
        Self::WithMedia {
            media: Media::new(kind, source),
            caption: None,
            attributes: Attributes::default(),
        }
    }

    #[must_use]
    pub fn with_caption(self, text: impl Into<String>) -> Self {
        match self {
            Self::TextOnly { attributes, .. } => Self::TextOnly {
                text: text.into(),
                attributes,
            },
            Self::WithMedia {
                media, attributes, ..
            } => Self::WithMedia {
                media,
                caption: Some(text.into()),
                attributes,
            },
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attrs: Attributes) -> Self {
        *self.attributes_mut() = attrs;
        self
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        matches!(self, Self::WithMedia { .. })
    }

    /// The message text, or the caption when media is attached.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::TextOnly { text, .. } => Some(text),
            Self::WithMedia { caption, .. } => caption.as_deref(),
        }
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::TextOnly { attributes, .. } | Self::WithMedia { attributes, .. } => attributes,
        }
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            Self::TextOnly { attributes, .. } | Self::WithMedia { attributes, .. } => attributes,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("photo", MediaKind::Photo)]
    #[case("animation", MediaKind::Animation)]
    #[case("audio", MediaKind::Audio)]
    #[case("document", MediaKind::Document)]
    #[case("video", MediaKind::Video)]
    fn parses_known_kinds(#[case] input: &str, #[case] expected: MediaKind) {
        assert_eq!(input.parse::<MediaKind>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("sticker")]
    #[case("voice")]
    #[case("Photo")]
    #[case("")]
    fn rejects_unknown_kinds(#[case] input: &str) {
        let err = input.parse::<MediaKind>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMediaKind(ref k) if k == input));
    }

    #[test]
    fn kind_deserialization_reports_unsupported() {
        let err = serde_json::from_str::<MediaKind>("\"video_note\"").unwrap_err();
        assert!(err.to_string().contains("unsupported media kind: video_note"));
    }

    #[test]
    fn only_visual_kinds_take_spoilers() {
        let visual: Vec<_> = MediaKind::ALL.into_iter().filter(|k| k.is_visual()).collect();
        assert_eq!(visual, vec![MediaKind::Photo, MediaKind::Animation, MediaKind::Video]);
    }

    #[test]
    fn has_media_follows_variant() {
        assert!(!DesiredContent::text("hi").has_media());
        assert!(DesiredContent::media(MediaKind::Audio, MediaRef::FileId("a".into())).has_media());
    }

    #[test]
    fn caption_replaces_text_or_sets_caption() {
        let text = DesiredContent::text("old").with_caption("new");
        assert_eq!(text.body(), Some("new"));

        let media = DesiredContent::media(MediaKind::Photo, MediaRef::FileId("p".into()));
        assert_eq!(media.body(), None);
        assert_eq!(media.with_caption("cap").body(), Some("cap"));
    }

    #[test]
    fn button_serializes_in_platform_shape() {
        let json = serde_json::to_value(InlineButton::callback("Go", "go")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "Go", "callback_data": "go"}));
    }
}
