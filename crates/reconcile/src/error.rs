use thiserror::Error;

use crate::content::MediaKind;

#[derive(Debug, Error)]
pub enum Error {
    /// No platform operation can reach the desired content from the prior
    /// state. Raised before any call is issued.
    #[error("illegal transition: {reason}")]
    IllegalTransition { reason: &'static str },

    #[error("unsupported media kind: {0}")]
    UnsupportedMediaKind(String),

    /// The inbound event does not carry enough addressing to locate a chat or
    /// a message.
    #[error("missing address: {0}")]
    MissingAddress(&'static str),

    #[error("inline results only accept media already uploaded (file id), got {0} from another source")]
    InlineRequiresFileId(MediaKind),

    /// The primary send or edit failed. The transport error is kept as-is.
    #[error("{method} failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn transport(
        method: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            method,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
