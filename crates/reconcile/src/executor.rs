//! Runs an [`ActionPlan`] against a [`Transport`].

use {
    async_trait::async_trait,
    tracing::{debug, info},
};

use crate::{
    call::{MessageTarget, PlatformCall},
    content::DesiredContent,
    dispatch,
    engine::{self, ActionPlan},
    error::{Error, Result},
    fields,
    prior::{self, ChatId, InboundEvent, PriorState},
};

/// The platform client. One method, one [`PlatformCall`] at a time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// What the platform returns for a send or an edit.
    type Response: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn call(&self, call: PlatformCall) -> std::result::Result<Self::Response, Self::Error>;
}

/// Either a known prior state or the event it should be resolved from.
#[derive(Debug, Clone)]
pub enum PriorSource {
    State(PriorState),
    /// Resolved with the desired content's media presence as the guess.
    Event(InboundEvent),
}

impl From<PriorState> for PriorSource {
    fn from(state: PriorState) -> Self {
        Self::State(state)
    }
}

impl From<InboundEvent> for PriorSource {
    fn from(event: InboundEvent) -> Self {
        Self::Event(event)
    }
}

/// The call that sends `desired` as a new message into `chat_id`.
#[must_use]
pub fn send_call(chat_id: ChatId, desired: &DesiredContent) -> PlatformCall {
    match desired {
        DesiredContent::TextOnly { text, .. } => PlatformCall::SendMessage {
            chat_id,
            text: text.clone(),
            params: fields::project(desired, fields::SEND_MESSAGE),
        },
        DesiredContent::WithMedia { media, .. } => dispatch::dispatch(chat_id, media, desired),
    }
}

const PLAN_CONTENT_MISMATCH: &str = "plan does not match the media presence of the desired content";

/// The single edit call for an in-place plan, or the send call for the
/// others.
///
/// Fails with [`Error::IllegalTransition`] for a rejected plan and for a plan
/// that was decided for content with different media presence.
pub fn primary_call(plan: &ActionPlan, desired: &DesiredContent) -> Result<PlatformCall> {
    let call = match (plan, desired) {
        (ActionPlan::EditMediaInPlace { target }, DesiredContent::WithMedia { media, .. }) => {
            PlatformCall::EditMessageMedia {
                target: target.clone(),
                media: dispatch::input_media(media, desired),
                params: fields::project(desired, fields::EDIT_MEDIA),
            }
        },
        (ActionPlan::EditCaptionOnly { inline_message_id }, DesiredContent::TextOnly { .. }) => {
            PlatformCall::EditMessageCaption {
                target: MessageTarget::Inline {
                    inline_message_id: inline_message_id.clone(),
                },
                params: fields::project(desired, fields::EDIT_CAPTION),
            }
        },
        (ActionPlan::EditTextInPlace { target }, DesiredContent::TextOnly { text, .. }) => {
            PlatformCall::EditMessageText {
                target: target.clone(),
                text: text.clone(),
                params: fields::project(desired, fields::EDIT_TEXT),
            }
        },
        (ActionPlan::SendThenDelete { chat_id, .. } | ActionPlan::SendNew { chat_id }, _) => {
            send_call(*chat_id, desired)
        },
        (ActionPlan::RejectedTransition { reason }, _) => {
            return Err(Error::IllegalTransition { reason: *reason });
        },
        (
            ActionPlan::EditMediaInPlace { .. }
            | ActionPlan::EditCaptionOnly { .. }
            | ActionPlan::EditTextInPlace { .. },
            _,
        ) => {
            return Err(Error::IllegalTransition {
                reason: PLAN_CONTENT_MISMATCH,
            });
        },
    };
    Ok(call)
}

/// Execute `plan` and return the primary operation's response.
///
/// For [`ActionPlan::SendThenDelete`] the stale message is deleted once the
/// send has settled, whatever its outcome; the delete result is discarded.
pub async fn execute<T: Transport + ?Sized>(
    transport: &T,
    plan: &ActionPlan,
    desired: &DesiredContent,
) -> Result<T::Response> {
    let call = primary_call(plan, desired)?;

    let method = call.method();
    let chat_id = call.chat_id();
    info!(plan = %plan, method, chat_id = ?chat_id, "reconcile primary call start");

    let result = transport
        .call(call)
        .await
        .map_err(|e| Error::transport(method, e));

    if let ActionPlan::SendThenDelete {
        chat_id,
        stale_message_id,
    } = plan
    {
        let cleanup = PlatformCall::DeleteMessage {
            chat_id: *chat_id,
            message_id: *stale_message_id,
        };
        if let Err(e) = transport.call(cleanup).await {
            debug!(
                chat_id = chat_id.0,
                message_id = stale_message_id.0,
                error = %e,
                "stale message delete failed, leaving it in place"
            );
        }
    }

    if result.is_ok() {
        info!(plan = %plan, method, chat_id = ?chat_id, "reconcile primary call done");
    }
    result
}

/// Decides and executes edits for one transport.
pub struct Reconciler<T> {
    transport: T,
}

impl<T: Transport> Reconciler<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the prior state if needed, decide, then execute.
    pub async fn reconcile_and_execute(
        &self,
        prior: impl Into<PriorSource>,
        desired: &DesiredContent,
    ) -> Result<T::Response> {
        let prior = match prior.into() {
            PriorSource::State(state) => state,
            PriorSource::Event(event) => prior::resolve(&event, desired.has_media())?,
        };
        let plan = engine::decide(&prior, desired);
        debug!(prior = ?prior, plan = %plan, "reconcile decided");
        execute(&self.transport, &plan, desired).await
    }

    /// Edit the message `event` refers to, or reply in its chat.
    ///
    /// When the old message content is unknown (inline or inaccessible) it is
    /// assumed to have media exactly when `desired` has media.
    pub async fn edit_or_reply(
        &self,
        event: &InboundEvent,
        desired: &DesiredContent,
    ) -> Result<T::Response> {
        let prior = prior::resolve(event, desired.has_media())?;
        self.edit_or_reply_message(prior, desired).await
    }

    /// Like [`Self::edit_or_reply`] for callers that already know the prior
    /// state.
    pub async fn edit_or_reply_message(
        &self,
        prior: PriorState,
        desired: &DesiredContent,
    ) -> Result<T::Response> {
        self.reconcile_and_execute(prior, desired).await
    }
}
