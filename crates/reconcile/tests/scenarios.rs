#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{collections::HashSet, sync::Mutex};

use {
    async_trait::async_trait,
    editreply_reconcile::{
        ActionPlan, ChatId, DesiredContent, Error, InboundEvent, MediaKind, MediaRef, MessageId,
        MessageTarget, PlatformCall, PriorState, Reconciler, Transport, decide,
    },
};

#[derive(Debug, thiserror::Error)]
#[error("{method} rejected by test transport")]
struct Rejected {
    method: &'static str,
}

/// Records every call and fails the methods listed in `failing`.
#[derive(Default)]
struct ScriptedTransport {
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<PlatformCall>>,
}

impl ScriptedTransport {
    fn failing(methods: &[&'static str]) -> Self {
        Self {
            failing: methods.iter().copied().collect(),
            calls: Mutex::default(),
        }
    }

    fn methods(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(PlatformCall::method)
            .collect()
    }

    fn last(&self) -> PlatformCall {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Error = Rejected;
    type Response = String;

    async fn call(&self, call: PlatformCall) -> Result<String, Rejected> {
        let method = call.method();
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(method) {
            Err(Rejected { method })
        } else {
            Ok(format!("{method} ok"))
        }
    }
}

fn chat_message(has_media: bool) -> PriorState {
    PriorState::ChatMessage {
        chat_id: ChatId(123),
        message_id: MessageId(456),
        has_media,
    }
}

fn stale_delete() -> PlatformCall {
    PlatformCall::DeleteMessage {
        chat_id: ChatId(123),
        message_id: MessageId(456),
    }
}

#[tokio::test]
async fn media_to_text_sends_then_deletes() {
    let prior = chat_message(true);
    let desired = DesiredContent::text("hello");
    assert_eq!(decide(&prior, &desired), ActionPlan::SendThenDelete {
        chat_id: ChatId(123),
        stale_message_id: MessageId(456),
    });

    let reconciler = Reconciler::new(ScriptedTransport::default());
    let response = reconciler
        .edit_or_reply_message(prior, &desired)
        .await
        .unwrap();

    assert_eq!(response, "sendMessage ok");
    assert_eq!(reconciler.transport().methods(), vec!["sendMessage", "deleteMessage"]);
    assert_eq!(reconciler.transport().last(), stale_delete());
}

#[tokio::test]
async fn text_to_document_sends_then_deletes() {
    let reconciler = Reconciler::new(ScriptedTransport::default());
    let desired = DesiredContent::media(MediaKind::Document, MediaRef::FileId("abc".into()));
    reconciler
        .edit_or_reply_message(chat_message(false), &desired)
        .await
        .unwrap();

    assert_eq!(reconciler.transport().methods(), vec!["sendDocument", "deleteMessage"]);
    assert_eq!(reconciler.transport().last(), stale_delete());
}

#[tokio::test]
async fn failed_send_still_deletes_and_reports_send_error() {
    let reconciler = Reconciler::new(ScriptedTransport::failing(&["sendMessage"]));
    let err = reconciler
        .edit_or_reply_message(chat_message(true), &DesiredContent::text("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { method: "sendMessage", .. }));
    assert_eq!(err.to_string(), "sendMessage failed: sendMessage rejected by test transport");
    assert_eq!(reconciler.transport().methods(), vec!["sendMessage", "deleteMessage"]);
}

#[tokio::test]
async fn send_error_wins_when_delete_also_fails() {
    let reconciler = Reconciler::new(ScriptedTransport::failing(&["sendPhoto", "deleteMessage"]));
    let desired = DesiredContent::media(MediaKind::Photo, MediaRef::FileId("p".into()));
    let err = reconciler
        .edit_or_reply_message(chat_message(false), &desired)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { method: "sendPhoto", .. }));
    assert_eq!(reconciler.transport().methods(), vec!["sendPhoto", "deleteMessage"]);
    assert_eq!(reconciler.transport().last(), stale_delete());
}

#[tokio::test]
async fn failed_delete_is_invisible() {
    let reconciler = Reconciler::new(ScriptedTransport::failing(&["deleteMessage"]));
    let desired = DesiredContent::media(MediaKind::Video, MediaRef::Url("https://e.x/v.mp4".into()));
    let response = reconciler
        .edit_or_reply_message(chat_message(false), &desired)
        .await
        .unwrap();

    assert_eq!(response, "sendVideo ok");
    assert_eq!(reconciler.transport().methods(), vec!["sendVideo", "deleteMessage"]);
}

#[tokio::test]
async fn inline_media_to_text_edits_caption() {
    let prior = PriorState::InlineMessage {
        inline_message_id: "inl".into(),
        has_media: true,
    };
    let reconciler = Reconciler::new(ScriptedTransport::default());
    reconciler
        .edit_or_reply_message(prior, &DesiredContent::text("only text"))
        .await
        .unwrap();

    let PlatformCall::EditMessageCaption { target, params } = reconciler.transport().last() else {
        panic!("expected a caption edit");
    };
    assert_eq!(target, MessageTarget::Inline {
        inline_message_id: "inl".into()
    });
    assert_eq!(params.caption.as_deref(), Some("only text"));
}

#[tokio::test]
async fn inline_text_to_media_is_illegal_for_every_kind() {
    for kind in MediaKind::ALL {
        let reconciler = Reconciler::new(ScriptedTransport::default());
        let prior = PriorState::InlineMessage {
            inline_message_id: "inl".into(),
            has_media: false,
        };
        let desired = DesiredContent::media(kind, MediaRef::FileId("f".into()));
        let err = reconciler
            .edit_or_reply_message(prior, &desired)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::IllegalTransition { .. }), "{kind}");
        assert!(reconciler.transport().methods().is_empty(), "{kind}");
    }
}

#[tokio::test]
async fn chat_only_photo_is_sent_new() {
    let reconciler = Reconciler::new(ScriptedTransport::default());
    let desired = DesiredContent::media(MediaKind::Photo, MediaRef::FileId("ph".into()));
    let response = reconciler
        .reconcile_and_execute(InboundEvent::Chat(ChatId(123)), &desired)
        .await
        .unwrap();

    assert_eq!(response, "sendPhoto ok");
    assert_eq!(reconciler.transport().last(), PlatformCall::SendPhoto {
        chat_id: ChatId(123),
        photo: MediaRef::FileId("ph".into()),
        params: Default::default(),
    });
}

#[tokio::test]
async fn failed_edit_is_propagated_without_cleanup() {
    let reconciler = Reconciler::new(ScriptedTransport::failing(&["editMessageText"]));
    let err = reconciler
        .edit_or_reply_message(chat_message(false), &DesiredContent::text("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport { method: "editMessageText", .. }));
    assert_eq!(reconciler.transport().methods(), vec!["editMessageText"]);
}
