//! Readiness probe over in-memory dependencies.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use text_chat_store::chat::{
    adapters::memory::{InMemoryExistenceCheck, InMemoryTextChatStore},
    context::OperationContext,
    error::StoreError,
    ports::EntityKind,
    services::{ReadinessError, ReadinessProbe},
    validation::ReferentialValidator,
};

fn probe(directory: &InMemoryExistenceCheck) -> ReadinessProbe {
    let store =
        InMemoryTextChatStore::new(ReferentialValidator::new(Arc::new(directory.clone())));
    ReadinessProbe::new(Arc::new(store), Arc::new(directory.clone()))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ready_when_every_dependency_answers() {
    let directory = InMemoryExistenceCheck::permissive();

    probe(&directory)
        .check(&OperationContext::background())
        .await
        .expect("probe passes");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn user_service_outage_is_reported() {
    let directory = InMemoryExistenceCheck::permissive();
    directory
        .set_unreachable(EntityKind::User, true)
        .expect("toggle outage");

    let result = probe(&directory)
        .check(&OperationContext::background())
        .await;

    assert!(matches!(result, Err(ReadinessError::UserService(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expired_deadline_fails_the_database_ping() {
    let directory = InMemoryExistenceCheck::permissive();

    let result = probe(&directory)
        .check(&OperationContext::with_timeout(Duration::ZERO))
        .await;

    assert!(matches!(
        result,
        Err(ReadinessError::Database(StoreError::DeadlineExceeded))
    ));
}
