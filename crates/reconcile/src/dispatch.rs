//! Media kind → platform operation.

use crate::{
    call::{InputMedia, PlatformCall},
    content::{DesiredContent, Media, MediaKind},
    fields::{self, Field},
    prior::ChatId,
};

fn with_visual_extras(kind: MediaKind, base: &[Field]) -> Vec<Field> {
    let mut list = base.to_vec();
    if kind.is_visual() {
        list.extend_from_slice(fields::VISUAL_MEDIA);
    }
    list
}

/// Build the send call for `media` into `chat_id`.
///
/// `content` supplies the caption and attributes; spoiler and caption
/// placement are only forwarded for photo, animation and video.
#[must_use]
pub fn dispatch(chat_id: ChatId, media: &Media, content: &DesiredContent) -> PlatformCall {
    let params = fields::project(content, &with_visual_extras(media.kind, fields::SEND_MEDIA));
    let source = media.source.clone();

    match media.kind {
        MediaKind::Photo => PlatformCall::SendPhoto {
            chat_id,
            photo: source,
            params,
        },
        MediaKind::Animation => PlatformCall::SendAnimation {
            chat_id,
            animation: source,
            params,
        },
        MediaKind::Audio => PlatformCall::SendAudio {
            chat_id,
            audio: source,
            params,
        },
        MediaKind::Document => PlatformCall::SendDocument {
            chat_id,
            document: source,
            params,
        },
        MediaKind::Video => PlatformCall::SendVideo {
            chat_id,
            video: source,
            params,
        },
    }
}

/// Build the `InputMedia` used to replace media in place.
#[must_use]
pub fn input_media(media: &Media, content: &DesiredContent) -> InputMedia {
    InputMedia {
        kind: media.kind,
        media: media.source.clone(),
        params: fields::project(content, &with_visual_extras(media.kind, fields::INPUT_MEDIA)),
    }
}
