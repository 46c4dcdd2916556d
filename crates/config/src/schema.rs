//! Config schema types.

use {
    editreply_reconcile::MediaKind,
    editreply_telegram::TelegramAccountConfig,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditReplyConfig {
    pub telegram: TelegramAccountConfig,
    pub gallery: GalleryConfig,
}

/// The media gallery the bot shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Text shown while nothing is selected.
    pub prompt: String,
    /// Label of the button that returns to the prompt.
    pub back_label: String,
    pub items: Vec<GalleryItem>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            prompt: "Pick the media from the options".into(),
            back_label: "Back".into(),
            items: Vec::new(),
        }
    }
}

/// One stored media file. Send a file to the bot to learn its file id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub kind: MediaKind,
    pub file_id: String,
    /// Inline result title; derived from the kind when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GalleryItem {
    #[must_use]
    pub fn new(kind: MediaKind, file_id: impl Into<String>) -> Self {
        Self {
            kind,
            file_id: file_id.into(),
            title: None,
        }
    }
}
