//! Inline query results built from the same content description.
//!
//! The payload is the Bot API `InlineQueryResult` JSON object. Media must
//! already be stored on the platform: inline results cannot upload files and
//! URLs would need extra metadata (thumbnails, mime types).

use serde_json::{Map, Value, json};

use crate::{
    content::{DesiredContent, MediaKind},
    error::{Error, Result},
    fields::{self, Field},
};

fn article(id: &str, title: &str, text: &str, content: &DesiredContent) -> Value {
    let mut message = Map::new();
    message.insert("message_text".into(), json!(text));
    message.extend(fields::project(content, fields::INLINE_TEXT_CONTENT).to_json());

    let mut result = Map::new();
    result.insert("type".into(), json!("article"));
    result.insert("id".into(), json!(id));
    result.insert("title".into(), json!(title));
    result.insert("input_message_content".into(), Value::Object(message));
    result.extend(fields::project(content, &[Field::ReplyMarkup]).to_json());
    Value::Object(result)
}

/// Build the inline result `id` showing `content`.
///
/// `title` is shown in the result list; articles, documents and videos
/// require it, photos and animations use it as an optional label.
pub fn inline_result(id: &str, title: &str, content: &DesiredContent) -> Result<Value> {
    let media = match content {
        DesiredContent::TextOnly { text, .. } => return Ok(article(id, title, text, content)),
        DesiredContent::WithMedia { media, .. } => media,
    };

    let file_id = media
        .source
        .file_id()
        .ok_or(Error::InlineRequiresFileId(media.kind))?;

    let (kind, file_key, extra): (&str, &str, &[Field]) = match media.kind {
        MediaKind::Animation => ("gif", "gif_file_id", &[]),
        MediaKind::Document => ("document", "document_file_id", &[]),
        // Cached audio can fail with AUDIO_TITLE_EMPTY even for uploaded
        // files, so audio goes out as a document.
        MediaKind::Audio => ("document", "document_file_id", &[]),
        MediaKind::Photo => ("photo", "photo_file_id", &[Field::ShowCaptionAboveMedia]),
        MediaKind::Video => ("video", "video_file_id", &[Field::ShowCaptionAboveMedia]),
    };

    let mut result = Map::new();
    result.insert("type".into(), json!(kind));
    result.insert("id".into(), json!(id));
    result.insert("title".into(), json!(title));
    result.insert(file_key.into(), json!(file_id));
    result.extend(fields::project(content, &[fields::INLINE_MEDIA, extra].concat()).to_json());
    Ok(Value::Object(result))
}
