//! The shared backend contract run against the in-memory store.

use super::helpers::{ctx, store};
use crate::contract;
use rstest::rstest;
use text_chat_store::chat::{adapters::memory::InMemoryTextChatStore, context::OperationContext};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_then_get_round_trips(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::add_then_get_round_trips(&store, &ctx)
        .await
        .expect("round trip contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn message_requires_conversation(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::message_requires_conversation(&store, &ctx)
        .await
        .expect("conversation reference contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn references_are_checked_in_order(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::references_are_checked_in_order(&store, &ctx)
        .await
        .expect("reference ordering contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_message_twice(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::delete_message_twice(&store, &ctx)
        .await
        .expect("delete contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn membership_replacement_is_exact(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::membership_replacement_is_exact(&store, &ctx)
        .await
        .expect("membership contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn empty_conversation_lists_as_not_found(
    store: InMemoryTextChatStore,
    ctx: OperationContext,
) {
    contract::empty_conversation_lists_as_not_found(&store, &ctx)
        .await
        .expect("empty listing contract");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_conversation_lifecycle(store: InMemoryTextChatStore, ctx: OperationContext) {
    contract::full_conversation_lifecycle(&store, &ctx)
        .await
        .expect("lifecycle contract");
}
