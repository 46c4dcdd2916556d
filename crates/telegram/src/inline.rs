use {
    editreply_reconcile::{DesiredContent, inline_result},
    serde_json::Value,
    teloxide::types::InlineQueryResult,
    tracing::debug,
};

use crate::error::{Error, Result};

/// Fields the bot api client has no slot for yet.
const UNSUPPORTED: &[&str] = &["show_caption_above_media"];

/// Convert a Bot API `InlineQueryResult` object into the teloxide type.
///
/// Media results are the cached (file id) variants, which share their `type`
/// tag with the URL variants on the wire.
pub fn from_json(value: Value) -> Result<InlineQueryResult> {
    let Value::Object(mut fields) = value else {
        return Err(Error::message("inline result must be a JSON object"));
    };
    let kind = match fields.remove("type") {
        Some(Value::String(kind)) => kind,
        _ => return Err(Error::message("inline result has no type")),
    };
    for name in UNSUPPORTED {
        if fields.remove(*name).is_some() {
            debug!(field = *name, kind = %kind, "dropping inline result field");
        }
    }

    let body = Value::Object(fields);
    Ok(match kind.as_str() {
        "article" => InlineQueryResult::Article(serde_json::from_value(body)?),
        "photo" => InlineQueryResult::CachedPhoto(serde_json::from_value(body)?),
        "gif" => InlineQueryResult::CachedGif(serde_json::from_value(body)?),
        "document" => InlineQueryResult::CachedDocument(serde_json::from_value(body)?),
        "video" => InlineQueryResult::CachedVideo(serde_json::from_value(body)?),
        other => {
            return Err(Error::message(format!(
                "unsupported inline result type: {other}"
            )));
        },
    })
}

/// The inline result `id` that shows `content` once chosen.
pub fn build(id: &str, title: &str, content: &DesiredContent) -> Result<InlineQueryResult> {
    from_json(inline_result(id, title, content)?)
}
