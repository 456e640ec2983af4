//! Parallel writers against a single in-memory store.

use std::collections::HashSet;

use super::helpers::{ctx, store};
use rstest::rstest;
use text_chat_store::chat::{
    adapters::memory::InMemoryTextChatStore,
    context::OperationContext,
    domain::{NewConversation, NewMessage},
    error::StoreError,
    ports::TextChatStore,
};

const WRITERS: usize = 16;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_all_kept(store: InMemoryTextChatStore, ctx: OperationContext) {
    let conversation = store
        .add_conversation(&ctx, NewConversation::new(["alice", "bob"], "").expect("valid"))
        .await
        .expect("conversation stored");

    let handles: Vec<_> = (0..WRITERS)
        .map(|n| {
            let writer = store.clone();
            let input = NewMessage::new("alice", conversation.id().as_str(), format!("msg {n}"))
                .expect("valid message");
            tokio::spawn(async move { writer.add_message(&ctx, input).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let message = handle
            .await
            .expect("writer task joined")
            .expect("message stored");
        ids.insert(message.id().clone());
    }

    assert_eq!(ids.len(), WRITERS);
    assert_eq!(store.message_count(), WRITERS);
    let listed = store
        .get_messages_by_conversation_id(&ctx, conversation.id())
        .await
        .expect("messages listed");
    assert_eq!(listed.len(), WRITERS);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn deletes_race_to_a_single_winner(store: InMemoryTextChatStore, ctx: OperationContext) {
    let conversation = store
        .add_conversation(&ctx, NewConversation::new(["carol"], "").expect("valid"))
        .await
        .expect("conversation stored");

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let writer = store.clone();
            let id = conversation.id().clone();
            tokio::spawn(async move { writer.delete_conversation(&ctx, &id).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("delete task joined") {
            Ok(()) => successes += 1,
            Err(StoreError::ConversationNotFound(_)) => {}
            Err(other) => panic!("unexpected delete failure: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(store.conversation_count(), 0);
}
