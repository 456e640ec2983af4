//! `PostgreSQL`-specific behaviour: schema, deadlines, and shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;

use super::helpers::{FrozenClock, database_url, prepared_store, prepared_store_with_clock};
use text_chat_store::chat::{
    adapters::{memory::InMemoryExistenceCheck, postgres::PostgresTextChatStore},
    context::OperationContext,
    domain::{ConversationId, MessageId, NewConversation, NewMessage},
    error::StoreError,
    ports::TextChatStore,
    validation::ReferentialValidator,
};

#[tokio::test(flavor = "multi_thread")]
async fn connect_is_idempotent() {
    let Some(store) = prepared_store().await.expect("prepare store") else {
        return;
    };

    store.connect().await.expect("schema reapplies cleanly");
    store
        .ping_db(&OperationContext::background())
        .await
        .expect("database answers");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_are_not_found() {
    let Some(store) = prepared_store().await.expect("prepare store") else {
        return;
    };
    let ctx = OperationContext::background();

    assert!(matches!(
        store.get_message_by_id(&ctx, &MessageId::generate()).await,
        Err(StoreError::MessageNotFound(_))
    ));
    assert!(matches!(
        store
            .get_conversation_by_id(&ctx, &ConversationId::generate())
            .await,
        Err(StoreError::ConversationNotFound(_))
    ));
    assert!(matches!(
        store.delete_message(&ctx, &MessageId::generate()).await,
        Err(StoreError::MessageNotFound(_))
    ));
    assert!(matches!(
        store
            .delete_conversation(&ctx, &ConversationId::generate())
            .await,
        Err(StoreError::ConversationNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_deadline_sends_nothing() {
    let Some(store) = prepared_store().await.expect("prepare store") else {
        return;
    };
    let expired = OperationContext::with_timeout(Duration::ZERO);

    let result = store
        .add_conversation(&expired, NewConversation::new(["alice"], "").expect("valid"))
        .await;

    assert!(matches!(result, Err(StoreError::DeadlineExceeded)));
}

#[tokio::test(flavor = "multi_thread")]
async fn closed_store_is_unavailable() {
    let Some(store) = prepared_store().await.expect("prepare store") else {
        return;
    };
    let ctx = OperationContext::background();

    store.close_db().await;
    store.close_db().await;

    assert!(matches!(
        store.ping_db(&ctx).await,
        Err(StoreError::Unavailable(_))
    ));
    assert!(matches!(
        store
            .get_conversation_by_id(&ctx, &ConversationId::generate())
            .await,
        Err(StoreError::Unavailable(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn exhausted_pool_gives_up_at_the_deadline() {
    let Some(url) = database_url() else {
        return;
    };
    let pool = tokio::task::spawn_blocking(move || {
        Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_secs(30))
            .build(ConnectionManager::<PgConnection>::new(url))
    })
    .await
    .expect("join pool builder")
    .expect("build pool");
    let store = PostgresTextChatStore::new(
        pool.clone(),
        ReferentialValidator::new(Arc::new(InMemoryExistenceCheck::permissive())),
        Arc::new(DefaultClock),
    );
    store.connect().await.expect("apply schema");

    let held = tokio::task::spawn_blocking(move || pool.get())
        .await
        .expect("join checkout")
        .expect("hold the only connection");
    let ctx = OperationContext::with_timeout(Duration::from_millis(200));
    let started = Instant::now();

    let lookup = store
        .get_conversation_by_id(&ctx, &ConversationId::generate())
        .await;
    let ping = store.ping_db(&ctx).await;

    assert!(matches!(lookup, Err(StoreError::DeadlineExceeded)));
    assert!(matches!(ping, Err(StoreError::DeadlineExceeded)));
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(held);
}

#[tokio::test(flavor = "multi_thread")]
async fn messages_with_equal_timestamps_list_in_insertion_order() {
    let instant = Utc
        .timestamp_opt(1_700_000_000, 0)
        .single()
        .expect("valid instant");
    let Some(store) = prepared_store_with_clock(Arc::new(FrozenClock(instant)))
        .await
        .expect("prepare store")
    else {
        return;
    };
    let ctx = OperationContext::background();
    let conversation = store
        .add_conversation(
            &ctx,
            NewConversation::new(["alice", "bob"], "").expect("valid conversation"),
        )
        .await
        .expect("conversation stored");

    let mut written = Vec::new();
    for text in ["one", "two", "three", "four", "five"] {
        let request =
            NewMessage::new("alice", conversation.id().as_str(), text).expect("valid message");
        written.push(
            store
                .add_message(&ctx, request)
                .await
                .expect("message stored"),
        );
    }

    let listed = store
        .get_messages_by_conversation_id(&ctx, conversation.id())
        .await
        .expect("messages listed");
    assert_eq!(listed, written);
}

#[tokio::test(flavor = "multi_thread")]
async fn written_entities_equal_later_reads() {
    let instant = Utc
        .timestamp_opt(1_700_000_000, 123_456_789)
        .single()
        .expect("valid instant");
    let Some(store) = prepared_store_with_clock(Arc::new(FrozenClock(instant)))
        .await
        .expect("prepare store")
    else {
        return;
    };
    let ctx = OperationContext::background();

    let conversation = store
        .add_conversation(
            &ctx,
            NewConversation::new(["alice"], "chess").expect("valid conversation"),
        )
        .await
        .expect("conversation stored");
    let message = store
        .add_message(
            &ctx,
            NewMessage::new("alice", conversation.id().as_str(), "hi").expect("valid message"),
        )
        .await
        .expect("message stored");

    assert_eq!(conversation.created_on().timestamp_subsec_nanos(), 123_456_000);
    assert_eq!(
        store
            .get_conversation_by_id(&ctx, conversation.id())
            .await
            .expect("conversation read back"),
        conversation
    );
    assert_eq!(
        store
            .get_message_by_id(&ctx, message.id())
            .await
            .expect("message read back"),
        message
    );
}
