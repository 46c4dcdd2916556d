//! Conversions from reconcile parameters to teloxide request types.

use {
    editreply_reconcile::{
        self as reconcile, ButtonAction, InlineButton, LinkPreview, MediaKind, MediaRef, Params,
        ReplyMarkup, ReplyTo, TextEntity,
    },
    serde::{Serialize, de::DeserializeOwned},
    teloxide::types::{
        ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia,
        InputMediaAnimation, InputMediaAudio, InputMediaDocument, InputMediaPhoto,
        InputMediaVideo, LinkPreviewOptions, MessageEntity, MessageId, ParseMode, Recipient,
        ReplyParameters, ThreadId,
    },
    tracing::debug,
};

use crate::error::Result;

#[must_use]
pub fn chat_id(id: reconcile::ChatId) -> ChatId {
    ChatId(id.0)
}

#[must_use]
pub fn message_id(id: reconcile::MessageId) -> MessageId {
    MessageId(id.0)
}

#[must_use]
pub fn thread_id(id: i32) -> ThreadId {
    ThreadId(MessageId(id))
}

pub fn input_file(source: &MediaRef) -> Result<InputFile> {
    Ok(match source {
        MediaRef::FileId(id) => InputFile::file_id(id.clone()),
        MediaRef::Url(url) => InputFile::url(url.parse()?),
        MediaRef::Upload { file_name, bytes } => {
            InputFile::memory(bytes.clone()).file_name(file_name.clone())
        },
    })
}

#[allow(deprecated)]
#[must_use]
pub fn parse_mode(mode: reconcile::ParseMode) -> ParseMode {
    match mode {
        reconcile::ParseMode::Html => ParseMode::Html,
        reconcile::ParseMode::MarkdownV2 => ParseMode::MarkdownV2,
        reconcile::ParseMode::Markdown => ParseMode::Markdown,
    }
}

/// Both sides use the Bot API JSON shape, so serde does the mapping.
fn via_json<T: Serialize, U: DeserializeOwned>(value: &T) -> Result<U> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

pub fn entities(entities: Option<&Vec<TextEntity>>) -> Result<Option<Vec<MessageEntity>>> {
    entities.map(|list| via_json(list)).transpose()
}

pub fn link_preview(options: Option<&LinkPreview>) -> Result<Option<LinkPreviewOptions>> {
    options.map(|o| via_json(o)).transpose()
}

#[must_use]
pub fn reply_parameters(reply: &ReplyTo) -> ReplyParameters {
    let mut params = ReplyParameters::new(MessageId(reply.message_id));
    if reply.allow_sending_without_reply {
        params = params.allow_sending_without_reply();
    }
    params.chat_id = reply.chat_id.map(|id| Recipient::Id(ChatId(id)));
    params
}

fn button(button: &InlineButton) -> Result<InlineKeyboardButton> {
    Ok(match &button.action {
        ButtonAction::CallbackData(data) => {
            InlineKeyboardButton::callback(button.text.clone(), data.clone())
        },
        ButtonAction::Url(url) => InlineKeyboardButton::url(button.text.clone(), url.parse()?),
    })
}

pub fn keyboard(markup: &ReplyMarkup) -> Result<InlineKeyboardMarkup> {
    let rows = markup
        .inline_keyboard
        .iter()
        .map(|row| row.iter().map(button).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

pub fn inline_keyboard(params: &Params) -> Result<Option<InlineKeyboardMarkup>> {
    params.reply_markup.as_ref().map(keyboard).transpose()
}

/// Log parameters this Bot API version has no field for.
pub fn log_unsupported(method: &'static str, params: &Params) {
    if params.business_connection_id.is_some()
        || params.message_effect_id.is_some()
        || params.show_caption_above_media.is_some()
    {
        debug!(
            method,
            business_connection_id = ?params.business_connection_id,
            message_effect_id = ?params.message_effect_id,
            show_caption_above_media = ?params.show_caption_above_media,
            "dropping parameters unsupported by the bot api client"
        );
    }
}

/// The `media` argument of `editMessageMedia`.
pub fn input_media(media: &reconcile::InputMedia) -> Result<InputMedia> {
    let file = input_file(&media.media)?;
    let params = &media.params;
    let caption = params.caption.clone();
    let mode = params.parse_mode.map(parse_mode);
    let caption_entities = entities(params.caption_entities.as_ref())?;
    let spoiler = params.has_spoiler == Some(true);

    Ok(match media.kind {
        MediaKind::Photo => {
            let mut m = InputMediaPhoto::new(file);
            m.caption = caption;
            m.parse_mode = mode;
            m.caption_entities = caption_entities;
            if spoiler {
                m = m.spoiler();
            }
            InputMedia::Photo(m)
        },
        MediaKind::Animation => {
            let mut m = InputMediaAnimation::new(file);
            m.caption = caption;
            m.parse_mode = mode;
            m.caption_entities = caption_entities;
            if spoiler {
                m = m.spoiler();
            }
            InputMedia::Animation(m)
        },
        MediaKind::Video => {
            let mut m = InputMediaVideo::new(file);
            m.caption = caption;
            m.parse_mode = mode;
            m.caption_entities = caption_entities;
            if spoiler {
                m = m.spoiler();
            }
            InputMedia::Video(m)
        },
        MediaKind::Audio => {
            let mut m = InputMediaAudio::new(file);
            m.caption = caption;
            m.parse_mode = mode;
            m.caption_entities = caption_entities;
            InputMedia::Audio(m)
        },
        MediaKind::Document => {
            let mut m = InputMediaDocument::new(file);
            m.caption = caption;
            m.parse_mode = mode;
            m.caption_entities = caption_entities;
            InputMedia::Document(m)
        },
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        editreply_reconcile::{DesiredContent, dispatch, fields},
        rstest::rstest,
        teloxide::types::{InlineKeyboardButtonKind, MessageEntityKind},
    };

    #[test]
    fn keyboard_keeps_rows_and_actions() {
        let markup = ReplyMarkup {
            inline_keyboard: vec![
                vec![
                    InlineButton::callback("1", "media_0"),
                    InlineButton::callback("2", "media_1"),
                ],
                vec![InlineButton::url("site", "https://example.com/")],
            ],
        };
        let converted = keyboard(&markup).unwrap();
        assert_eq!(converted.inline_keyboard.len(), 2);
        assert_eq!(converted.inline_keyboard[0].len(), 2);
        assert!(matches!(
            &converted.inline_keyboard[0][1].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "media_1"
        ));
        assert!(matches!(
            &converted.inline_keyboard[1][0].kind,
            InlineKeyboardButtonKind::Url(url) if url.as_str() == "https://example.com/"
        ));
    }

    #[test]
    fn keyboard_rejects_bad_url() {
        let markup = ReplyMarkup {
            inline_keyboard: vec![vec![InlineButton::url("bad", "not a url")]],
        };
        assert!(keyboard(&markup).is_err());
    }

    #[test]
    fn entities_map_to_platform_kinds() {
        let mut link = TextEntity::new("text_link", 6, 4);
        link.url = Some("https://example.com/".into());
        let list = vec![TextEntity::new("bold", 0, 5), link];

        let converted = entities(Some(&list)).unwrap().unwrap();
        assert_eq!(converted[0].kind, MessageEntityKind::Bold);
        assert_eq!(converted[0].length, 5);
        assert!(matches!(converted[1].kind, MessageEntityKind::TextLink { .. }));
        assert_eq!(entities(None).unwrap(), None);
    }

    #[test]
    fn reply_parameters_carry_chat_and_flag() {
        let reply = reply_parameters(&ReplyTo {
            message_id: 7,
            chat_id: Some(-100),
            allow_sending_without_reply: true,
        });
        assert_eq!(reply.message_id, MessageId(7));
        assert_eq!(reply.chat_id, Some(Recipient::Id(ChatId(-100))));
        assert_eq!(reply.allow_sending_without_reply, Some(true));
    }

    #[rstest]
    #[case(MediaRef::FileId("AgAD".into()))]
    #[case(MediaRef::Url("https://example.com/a.png".into()))]
    #[case(MediaRef::Upload { file_name: "a.png".into(), bytes: vec![1, 2, 3] })]
    fn every_source_converts(#[case] source: MediaRef) {
        assert!(input_file(&source).is_ok());
    }

    #[test]
    fn invalid_url_source_fails() {
        assert!(input_file(&MediaRef::Url("::".into())).is_err());
    }

    #[rstest]
    #[case(MediaKind::Photo)]
    #[case(MediaKind::Animation)]
    #[case(MediaKind::Audio)]
    #[case(MediaKind::Document)]
    #[case(MediaKind::Video)]
    fn input_media_matches_kind(#[case] kind: MediaKind) {
        let content = DesiredContent::media(kind, MediaRef::FileId("f".into())).with_caption("c");
        let DesiredContent::WithMedia { media, .. } = &content else {
            panic!("media content");
        };
        let converted = input_media(&dispatch::input_media(media, &content)).unwrap();
        let caption = match (&converted, kind) {
            (InputMedia::Photo(m), MediaKind::Photo) => m.caption.clone(),
            (InputMedia::Animation(m), MediaKind::Animation) => m.caption.clone(),
            (InputMedia::Audio(m), MediaKind::Audio) => m.caption.clone(),
            (InputMedia::Document(m), MediaKind::Document) => m.caption.clone(),
            (InputMedia::Video(m), MediaKind::Video) => m.caption.clone(),
            (other, kind) => panic!("{kind} converted to {other:?}"),
        };
        assert_eq!(caption.as_deref(), Some("c"));
    }

    #[test]
    fn inline_keyboard_absent_without_markup() {
        let params = fields::project(&DesiredContent::text("x"), fields::EDIT_TEXT);
        assert!(inline_keyboard(&params).unwrap().is_none());
    }
}
