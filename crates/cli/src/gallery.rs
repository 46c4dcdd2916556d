//! What the gallery bot shows: pure functions over the configured items.

use {
    editreply_config::{GalleryConfig, GalleryItem},
    editreply_reconcile::{
        Attributes, DesiredContent, InboundEvent, InlineButton, Keyboard, MediaInfo, MediaKind,
        MediaRef, ParseMode, PriorState, Result, resolve,
    },
};

const SELECT_PREFIX: &str = "media_";
const BACK: &str = "back";

/// A button press the gallery understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryAction {
    Select(usize),
    Back,
}

#[must_use]
pub fn parse_callback(data: &str) -> Option<GalleryAction> {
    if data == BACK {
        return Some(GalleryAction::Back);
    }
    data.strip_prefix(SELECT_PREFIX)?
        .parse()
        .ok()
        .map(GalleryAction::Select)
}

/// The command name of a `/command@bot args` message, without slash or
/// bot mention.
#[must_use]
pub fn command(text: &str) -> Option<&str> {
    let cmd = text.strip_prefix('/')?.split_whitespace().next()?;
    let name = cmd.split('@').next().unwrap_or(cmd);
    (!name.is_empty()).then_some(name)
}

#[must_use]
pub fn kind_emoji(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Photo => "🖼️",
        MediaKind::Animation => "🎞️",
        MediaKind::Video => "📹",
        MediaKind::Document => "📄",
        MediaKind::Audio => "🎵",
    }
}

#[must_use]
pub fn item_title(item: &GalleryItem) -> String {
    item.title
        .clone()
        .unwrap_or_else(|| format!("Send {} {}", item.kind, kind_emoji(item.kind)))
}

fn keyboard(gallery: &GalleryConfig, selected: bool) -> Keyboard {
    let mut rows = vec![
        gallery
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| InlineButton::callback(kind_emoji(item.kind), format!("{SELECT_PREFIX}{i}")))
            .collect::<Vec<_>>(),
    ];
    if selected {
        rows.push(vec![InlineButton::callback(gallery.back_label.clone(), BACK)]);
    }
    rows
}

/// The gallery message with item `selected` shown, or the text prompt when
/// nothing (or an unknown index) is selected.
#[must_use]
pub fn gallery_content(gallery: &GalleryConfig, selected: Option<usize>) -> DesiredContent {
    match selected.and_then(|i| gallery.items.get(i)) {
        Some(item) => DesiredContent::media(item.kind, MediaRef::FileId(item.file_id.clone()))
            .with_caption(format!("Media id: <code>{}</code>", item.file_id))
            .with_attributes(Attributes {
                keyboard: Some(keyboard(gallery, true)),
                parse_mode: Some(ParseMode::Html),
                ..Default::default()
            }),
        None => DesiredContent::text(gallery.prompt.clone()).with_attributes(Attributes {
            keyboard: Some(keyboard(gallery, false)),
            ..Default::default()
        }),
    }
}

/// Prior state of the message a gallery button belongs to.
///
/// Inline gallery messages are only ever created from media results, so they
/// always carry media. Chat messages fall back to mirroring `desired`.
pub fn callback_prior(event: &InboundEvent, desired: &DesiredContent) -> Result<PriorState> {
    let guess = match event {
        InboundEvent::Callback {
            inline_message_id: Some(_),
            ..
        } => true,
        _ => desired.has_media(),
    };
    resolve(event, guess)
}

/// Reply to a user who sent media, telling them how to add it to the config.
#[must_use]
pub fn media_info_reply(info: &MediaInfo) -> DesiredContent {
    DesiredContent::text(format!(
        "kind = <code>{}</code>\nfile_id = <code>{}</code>",
        info.kind, info.file_id
    ))
    .with_attributes(Attributes {
        parse_mode: Some(ParseMode::Html),
        ..Default::default()
    })
}
