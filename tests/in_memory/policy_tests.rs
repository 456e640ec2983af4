//! Collaborator outages and deadlines seen through the store.

use std::time::Duration;

use super::helpers::{ctx, directory, store_with_policy};
use rstest::rstest;
use text_chat_store::chat::{
    adapters::memory::{InMemoryExistenceCheck, InMemoryTextChatStore},
    context::OperationContext,
    domain::{MembershipUpdate, NewConversation, NewMessage},
    error::StoreError,
    ports::{EntityKind, TextChatStore},
    validation::{ReferentialValidator, UnconfirmedPolicy},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn surfaced_outage_is_transient(directory: InMemoryExistenceCheck, ctx: OperationContext) {
    let store = store_with_policy(&directory, UnconfirmedPolicy::Surface);
    let conversation = store
        .add_conversation(&ctx, NewConversation::new(["alice"], "").expect("valid"))
        .await
        .expect("conversation stored");
    directory
        .set_unreachable(EntityKind::User, true)
        .expect("toggle outage");

    let result = store
        .add_message(
            &ctx,
            NewMessage::new("alice", conversation.id().as_str(), "hi").expect("valid"),
        )
        .await;

    let err = result.expect_err("outage must fail the write");
    assert!(err.is_transient(), "expected a transient error, got {err}");
    assert!(!err.is_referential());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn game_outage_fails_closed_by_default(
    directory: InMemoryExistenceCheck,
    ctx: OperationContext,
) {
    let store = store_with_policy(&directory, UnconfirmedPolicy::default());
    let conversation = store
        .add_conversation(&ctx, NewConversation::new(["alice"], "").expect("valid"))
        .await
        .expect("conversation stored");
    directory
        .set_unreachable(EntityKind::Game, true)
        .expect("toggle outage");

    let result = store
        .add_user_to_conversation(
            &ctx,
            MembershipUpdate::new(conversation.id().as_str(), ["bob"], "chess").expect("valid"),
        )
        .await;

    assert!(matches!(result, Err(StoreError::GameNotFound(_))));
    let unchanged = store
        .get_conversation_by_id(&ctx, conversation.id())
        .await
        .expect("conversation exists");
    assert_eq!(unchanged, conversation);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn slow_directory_hits_the_deadline_without_writing() {
    let slow = InMemoryExistenceCheck::permissive().with_latency(Duration::from_secs(5));
    let store = InMemoryTextChatStore::new(ReferentialValidator::new(std::sync::Arc::new(slow)));
    let ctx = OperationContext::with_timeout(Duration::from_millis(50));

    let result = store
        .add_conversation(&ctx, NewConversation::new(["alice"], "").expect("valid"))
        .await;

    assert!(matches!(result, Err(StoreError::DeadlineExceeded)));
    assert_eq!(store.conversation_count(), 0);
}
