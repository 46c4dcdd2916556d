//! Telegram transport for editreply.
//!
//! Executes reconcile calls through a teloxide [`Bot`](teloxide::Bot), maps
//! incoming updates to [`InboundEvent`](editreply_reconcile::InboundEvent)s
//! and runs the long-polling loop.

pub mod bot;
pub mod config;
pub mod convert;
pub mod error;
pub mod events;
pub mod inline;
pub mod transport;

pub use {
    bot::{PollingHandle, UpdateHandler, build_bot, start_polling},
    config::TelegramAccountConfig,
    error::{Error, Result},
    transport::{Delivered, TelegramTransport},
};
