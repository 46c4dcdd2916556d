use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{config::TelegramAccountConfig, error::Result};

/// Receives every update the polling loop accepts.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: Update) -> Result<()>;
}

/// Build a bot whose HTTP timeout outlives the long-polling timeout.
pub fn build_bot(config: &TelegramAccountConfig) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(config.client_timeout_secs))
        .build()?;
    let mut bot = Bot::with_client(config.token.expose_secret(), client);
    if let Some(api_url) = &config.api_url {
        bot = bot.set_api_url(api_url.parse()?);
    }
    Ok(bot)
}

/// A running polling loop.
pub struct PollingHandle {
    pub cancel: CancellationToken,
    pub task: JoinHandle<()>,
}

impl PollingHandle {
    /// Cancel the loop and wait for the in-flight update to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "telegram polling task ended abnormally");
        }
    }
}

fn update_label(kind: &UpdateKind) -> &'static str {
    match kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::InlineQuery(_) => "inline_query",
        _ => "other",
    }
}

/// Verify the token, clear any webhook and spawn the polling loop.
///
/// The loop stops when `cancel` fires or when another instance starts polling
/// with the same token.
pub async fn start_polling(
    bot: Bot,
    config: &TelegramAccountConfig,
    commands: Vec<BotCommand>,
    handler: Arc<dyn UpdateHandler>,
    cancel: CancellationToken,
) -> Result<PollingHandle> {
    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Long polling does not work while a webhook is set.
    bot.delete_webhook().send().await?;

    if !commands.is_empty()
        && let Err(e) = bot.set_my_commands(commands).await
    {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?bot_username, "telegram bot connected (webhook cleared)");

    let poll_timeout = config.poll_timeout_secs;
    let backoff = Duration::from_secs(config.poll_error_backoff_secs);
    let loop_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        info!(username = ?bot_username, "starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            let result = tokio::select! {
                () = loop_cancel.cancelled() => {
                    info!("telegram polling stopped");
                    break;
                },
                result = bot
                    .get_updates()
                    .offset(offset)
                    .timeout(poll_timeout)
                    .allowed_updates(vec![
                        AllowedUpdate::Message,
                        AllowedUpdate::CallbackQuery,
                        AllowedUpdate::InlineQuery,
                    ])
                    .send() => result,
            };

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        let label = update_label(&update.kind);
                        debug!(update_id = update.id.0, kind = label, "received telegram update");
                        if let Err(e) = handler.handle(update).await {
                            error!(kind = label, error = %e, "error handling telegram update");
                        }
                    }
                },
                Err(e) => {
                    // Another instance is polling with the same token.
                    if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                        warn!(
                            "telegram bot disabled: another instance is already running with this token"
                        );
                        loop_cancel.cancel();
                        break;
                    }

                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::select! {
                        () = loop_cancel.cancelled() => break,
                        () = tokio::time::sleep(backoff) => {},
                    }
                },
            }
        }
    });

    Ok(PollingHandle { cancel, task })
}
