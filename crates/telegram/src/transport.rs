use std::{future::Future, time::Duration};

use {
    async_trait::async_trait,
    editreply_reconcile::{MessageTarget, Params, PlatformCall, Transport},
    teloxide::{
        RequestError,
        prelude::*,
        requests::{HasPayload, Payload, Request},
        types::{ReplyMarkup, True},
    },
    tracing::{debug, warn},
};

use crate::{
    config::TelegramAccountConfig,
    convert,
    error::{Error, Result},
};

/// What the Bot API returned for a call.
#[derive(Debug, Clone)]
pub enum Delivered {
    /// Chat sends and chat edits return the resulting message.
    Message(Box<Message>),
    /// Inline edits and deletes only return `true`.
    Acknowledged,
}

impl Delivered {
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::Acknowledged => None,
        }
    }
}

/// [`Transport`] backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    retry_after_max_retries: usize,
}

impl TelegramTransport {
    pub fn new(bot: Bot, config: &TelegramAccountConfig) -> Self {
        Self {
            bot,
            retry_after_max_retries: config.retry_after_max_retries,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn run_with_retry<T, F, Fut>(
        &self,
        method: &'static str,
        mut request: F,
    ) -> std::result::Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, RequestError>>,
    {
        let mut retries = 0usize;

        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let Some(wait) = retry_after_duration(&err) else {
                        return Err(err);
                    };

                    if retries >= self.retry_after_max_retries {
                        warn!(
                            method,
                            retries,
                            max_retries = self.retry_after_max_retries,
                            retry_after_secs = wait.as_secs(),
                            "telegram rate limit persisted after retries"
                        );
                        return Err(err);
                    }

                    retries += 1;
                    warn!(
                        method,
                        retries,
                        max_retries = self.retry_after_max_retries,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }

    async fn message<R>(&self, method: &'static str, request: &R) -> Result<Delivered>
    where
        R: Request<Err = RequestError>,
        <R as HasPayload>::Payload: Payload<Output = Message>,
    {
        let message = self.run_with_retry(method, || request.send_ref()).await?;
        debug!(
            method,
            chat_id = message.chat.id.0,
            message_id = message.id.0,
            "telegram call returned message"
        );
        Ok(Delivered::Message(Box::new(message)))
    }

    async fn acknowledged<R>(&self, method: &'static str, request: &R) -> Result<Delivered>
    where
        R: Request<Err = RequestError>,
        <R as HasPayload>::Payload: Payload<Output = True>,
    {
        self.run_with_retry(method, || request.send_ref()).await?;
        debug!(method, "telegram call acknowledged");
        Ok(Delivered::Acknowledged)
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

fn reply_markup(params: &Params) -> Result<Option<ReplyMarkup>> {
    Ok(convert::inline_keyboard(params)?.map(ReplyMarkup::InlineKeyboard))
}

/// Fields shared by `sendPhoto`, `sendAudio` and the other media sends.
macro_rules! media_send_params {
    ($req:ident, $params:expr) => {{
        let params = $params;
        $req.caption = params.caption.clone();
        $req.parse_mode = params.parse_mode.map(convert::parse_mode);
        $req.caption_entities = convert::entities(params.caption_entities.as_ref())?;
        $req.message_thread_id = params.message_thread_id.map(convert::thread_id);
        $req.disable_notification = params.disable_notification;
        $req.protect_content = params.protect_content;
        $req.reply_parameters = params
            .reply_parameters
            .as_ref()
            .map(convert::reply_parameters);
        $req.reply_markup = reply_markup(params)?;
    }};
}

/// Fields shared by the chat and inline variants of `editMessageText`.
macro_rules! edit_text_params {
    ($req:ident, $params:expr) => {{
        let params = $params;
        $req.parse_mode = params.parse_mode.map(convert::parse_mode);
        $req.entities = convert::entities(params.entities.as_ref())?;
        $req.link_preview_options = convert::link_preview(params.link_preview_options.as_ref())?;
        $req.reply_markup = convert::inline_keyboard(params)?;
    }};
}

/// Fields shared by the chat and inline variants of `editMessageCaption`.
macro_rules! edit_caption_params {
    ($req:ident, $params:expr) => {{
        let params = $params;
        $req.caption = params.caption.clone();
        $req.parse_mode = params.parse_mode.map(convert::parse_mode);
        $req.caption_entities = convert::entities(params.caption_entities.as_ref())?;
        $req.reply_markup = convert::inline_keyboard(params)?;
    }};
}

#[async_trait]
impl Transport for TelegramTransport {
    type Error = Error;
    type Response = Delivered;

    async fn call(&self, call: PlatformCall) -> Result<Delivered> {
        let method = call.method();
        if let Some(params) = call.params() {
            convert::log_unsupported(method, params);
        }

        match call {
            PlatformCall::SendMessage {
                chat_id,
                text,
                params,
            } => {
                let mut req = self.bot.send_message(convert::chat_id(chat_id), text);
                req.parse_mode = params.parse_mode.map(convert::parse_mode);
                req.entities = convert::entities(params.entities.as_ref())?;
                req.link_preview_options =
                    convert::link_preview(params.link_preview_options.as_ref())?;
                req.message_thread_id = params.message_thread_id.map(convert::thread_id);
                req.disable_notification = params.disable_notification;
                req.protect_content = params.protect_content;
                req.reply_parameters = params
                    .reply_parameters
                    .as_ref()
                    .map(convert::reply_parameters);
                req.reply_markup = reply_markup(&params)?;
                self.message(method, &req).await
            },
            PlatformCall::SendPhoto {
                chat_id,
                photo,
                params,
            } => {
                let mut req = self
                    .bot
                    .send_photo(convert::chat_id(chat_id), convert::input_file(&photo)?);
                media_send_params!(req, &params);
                req.has_spoiler = params.has_spoiler;
                self.message(method, &req).await
            },
            PlatformCall::SendAnimation {
                chat_id,
                animation,
                params,
            } => {
                let mut req = self
                    .bot
                    .send_animation(convert::chat_id(chat_id), convert::input_file(&animation)?);
                media_send_params!(req, &params);
                req.has_spoiler = params.has_spoiler;
                self.message(method, &req).await
            },
            PlatformCall::SendAudio {
                chat_id,
                audio,
                params,
            } => {
                let mut req = self
                    .bot
                    .send_audio(convert::chat_id(chat_id), convert::input_file(&audio)?);
                media_send_params!(req, &params);
                self.message(method, &req).await
            },
            PlatformCall::SendDocument {
                chat_id,
                document,
                params,
            } => {
                let mut req = self
                    .bot
                    .send_document(convert::chat_id(chat_id), convert::input_file(&document)?);
                media_send_params!(req, &params);
                self.message(method, &req).await
            },
            PlatformCall::SendVideo {
                chat_id,
                video,
                params,
            } => {
                let mut req = self
                    .bot
                    .send_video(convert::chat_id(chat_id), convert::input_file(&video)?);
                media_send_params!(req, &params);
                req.has_spoiler = params.has_spoiler;
                self.message(method, &req).await
            },
            PlatformCall::EditMessageText {
                target,
                text,
                params,
            } => match target {
                MessageTarget::Chat {
                    chat_id,
                    message_id,
                } => {
                    let mut req = self.bot.edit_message_text(
                        convert::chat_id(chat_id),
                        convert::message_id(message_id),
                        text,
                    );
                    edit_text_params!(req, &params);
                    self.message(method, &req).await
                },
                MessageTarget::Inline { inline_message_id } => {
                    let mut req = self.bot.edit_message_text_inline(inline_message_id, text);
                    edit_text_params!(req, &params);
                    self.acknowledged(method, &req).await
                },
            },
            PlatformCall::EditMessageCaption { target, params } => match target {
                MessageTarget::Chat {
                    chat_id,
                    message_id,
                } => {
                    let mut req = self
                        .bot
                        .edit_message_caption(convert::chat_id(chat_id), convert::message_id(message_id));
                    edit_caption_params!(req, &params);
                    self.message(method, &req).await
                },
                MessageTarget::Inline { inline_message_id } => {
                    let mut req = self.bot.edit_message_caption_inline(inline_message_id);
                    edit_caption_params!(req, &params);
                    self.acknowledged(method, &req).await
                },
            },
            PlatformCall::EditMessageMedia {
                target,
                media,
                params,
            } => {
                let media = convert::input_media(&media)?;
                let markup = convert::inline_keyboard(&params)?;
                match target {
                    MessageTarget::Chat {
                        chat_id,
                        message_id,
                    } => {
                        let mut req = self.bot.edit_message_media(
                            convert::chat_id(chat_id),
                            convert::message_id(message_id),
                            media,
                        );
                        req.reply_markup = markup;
                        self.message(method, &req).await
                    },
                    MessageTarget::Inline { inline_message_id } => {
                        let mut req = self.bot.edit_message_media_inline(inline_message_id, media);
                        req.reply_markup = markup;
                        self.acknowledged(method, &req).await
                    },
                }
            },
            PlatformCall::DeleteMessage {
                chat_id,
                message_id,
            } => {
                let req = self
                    .bot
                    .delete_message(convert::chat_id(chat_id), convert::message_id(message_id));
                self.acknowledged(method, &req).await
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
        editreply_reconcile::{
            Attributes, ChatId, DesiredContent, InlineButton, MediaKind, MediaRef, MessageId,
            PriorState, Reconciler,
        },
        serde_json::{Value, json},
        std::sync::{Arc, Mutex},
        tokio::sync::oneshot,
    };

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct MockTelegramApi {
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        /// Methods answered with a Bot API error.
        failing: Arc<Vec<&'static str>>,
    }

    fn message_json(chat_id: i64, message_id: i32) -> Value {
        json!({
            "message_id": message_id,
            "date": 0,
            "chat": { "id": chat_id, "type": "private", "first_name": "Alice" },
            "text": "ok"
        })
    }

    async fn telegram_api_handler(
        State(state): State<MockTelegramApi>,
        uri: Uri,
        body: Bytes,
    ) -> Json<Value> {
        let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        state.requests.lock().expect("lock requests").push(CapturedRequest {
            method: method.clone(),
            body: body.clone(),
        });

        if state
            .failing
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&method))
        {
            return Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: message to delete not found"
            }));
        }

        let acknowledged_only =
            method.eq_ignore_ascii_case("DeleteMessage") || body.get("inline_message_id").is_some();
        let result = if acknowledged_only {
            json!(true)
        } else {
            message_json(body["chat_id"].as_i64().unwrap_or(42), 777)
        };
        Json(json!({ "ok": true, "result": result }))
    }

    async fn spawn_mock(api: MockTelegramApi) -> (Bot, oneshot::Sender<()>) {
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(api);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let api_url = reqwest::Url::parse(&format!("http://{addr}/")).expect("parse api url");
        (Bot::new("test-token").set_api_url(api_url), shutdown_tx)
    }

    fn transport(bot: Bot) -> TelegramTransport {
        TelegramTransport::new(bot, &TelegramAccountConfig::default())
    }

    #[test]
    fn retry_after_duration_extracts_wait() {
        let err = RequestError::RetryAfter(teloxide::types::Seconds::from_seconds(42));
        assert_eq!(retry_after_duration(&err), Some(Duration::from_secs(42)));
    }

    #[test]
    fn retry_after_duration_ignores_other_errors() {
        let err = RequestError::Io(std::io::Error::other("boom"));
        assert_eq!(retry_after_duration(&err), None);
    }

    #[tokio::test]
    async fn media_to_text_sends_then_deletes_over_http() {
        let api = MockTelegramApi::default();
        let requests = Arc::clone(&api.requests);
        let (bot, shutdown) = spawn_mock(api).await;
        let reconciler = Reconciler::new(transport(bot));

        let desired = DesiredContent::text("back to text").with_attributes(Attributes {
            keyboard: Some(vec![vec![InlineButton::callback("1", "media_0")]]),
            ..Default::default()
        });
        let prior = PriorState::ChatMessage {
            chat_id: ChatId(123),
            message_id: MessageId(456),
            has_media: true,
        };
        let delivered = reconciler
            .edit_or_reply_message(prior, &desired)
            .await
            .unwrap();
        let _ = shutdown.send(());

        assert_eq!(delivered.message().map(|m| m.id.0), Some(777));
        let requests = requests.lock().unwrap();
        let methods: Vec<_> = requests.iter().map(|r| r.method.as_str()).collect();
        assert_eq!(methods, vec!["SendMessage", "DeleteMessage"]);
        assert_eq!(requests[0].body["text"], "back to text");
        assert_eq!(
            requests[0].body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "media_0"
        );
        assert_eq!(requests[1].body["chat_id"], 123);
        assert_eq!(requests[1].body["message_id"], 456);
    }

    #[tokio::test]
    async fn failed_delete_keeps_send_result() {
        let api = MockTelegramApi {
            failing: Arc::new(vec!["DeleteMessage"]),
            ..Default::default()
        };
        let requests = Arc::clone(&api.requests);
        let (bot, shutdown) = spawn_mock(api).await;
        let reconciler = Reconciler::new(transport(bot));

        let desired = DesiredContent::media(MediaKind::Photo, MediaRef::FileId("AgAD".into()));
        let prior = PriorState::ChatMessage {
            chat_id: ChatId(5),
            message_id: MessageId(6),
            has_media: false,
        };
        let delivered = reconciler.edit_or_reply_message(prior, &desired).await;
        let _ = shutdown.send(());

        assert!(delivered.is_ok());
        let methods: Vec<_> = requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.method.clone())
            .collect();
        assert_eq!(methods, vec!["SendPhoto", "DeleteMessage"]);
    }

    #[tokio::test]
    async fn inline_caption_edit_is_acknowledged() {
        let api = MockTelegramApi::default();
        let requests = Arc::clone(&api.requests);
        let (bot, shutdown) = spawn_mock(api).await;
        let reconciler = Reconciler::new(transport(bot));

        let prior = PriorState::InlineMessage {
            inline_message_id: "inl-1".into(),
            has_media: true,
        };
        let delivered = reconciler
            .edit_or_reply_message(prior, &DesiredContent::text("caption only"))
            .await
            .unwrap();
        let _ = shutdown.send(());

        assert!(delivered.message().is_none());
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].method.starts_with("EditMessageCaption"));
        assert_eq!(requests[0].body["inline_message_id"], "inl-1");
        assert_eq!(requests[0].body["caption"], "caption only");
    }
}
