//! `PostgreSQL` implementation of the [`TextChatStore`] port.

use std::fmt;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::Clock;
use tokio::time::Instant;

use super::blocking::{PgPool, checkout, remaining_before, run_blocking, set_statement_timeout};
use super::conversion::{
    conversation_to_row, message_to_row, row_to_conversation, row_to_message, user_ids_to_json,
};
use super::models::{ConversationRow, MessageRow};
use super::schema::{conversations, messages};
use crate::chat::{
    context::OperationContext,
    domain::{
        Conversation, ConversationId, MembershipUpdate, Message, MessageId, NewConversation,
        NewMessage, stamp,
    },
    error::{StoreError, lock_poisoned},
    ports::{StoreResult, TextChatStore},
    validation::ReferentialValidator,
};
use crate::config::DatabaseConfig;

/// Schema applied on connect; every statement is idempotent.
pub const SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-19-000000_create_text_chat_tables/up.sql");

/// `PostgreSQL` implementation of [`TextChatStore`].
///
/// Diesel calls run on the blocking pool. Each data operation runs in its
/// own transaction whose statements are limited to the caller's remaining
/// deadline, and commits only while that deadline still holds.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use mockable::DefaultClock;
/// use text_chat_store::chat::adapters::postgres::PostgresTextChatStore;
///
/// let store = PostgresTextChatStore::connect(&config.database, validator, Arc::new(DefaultClock))
///     .await?;
/// ```
#[derive(Clone)]
pub struct PostgresTextChatStore {
    pool: Arc<RwLock<Option<PgPool>>>,
    validator: ReferentialValidator,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for PostgresTextChatStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTextChatStore")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl PostgresTextChatStore {
    /// Wraps an existing pool. The schema is not touched.
    #[must_use]
    pub fn new(
        pool: PgPool,
        validator: ReferentialValidator,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            pool: Arc::new(RwLock::new(Some(pool))),
            validator,
            clock,
        }
    }

    /// Builds the pool, checks the server answers, and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] on any failure. Callers must treat
    /// it as fatal; there is no retry.
    pub async fn connect(
        config: &DatabaseConfig,
        validator: ReferentialValidator,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> StoreResult<Self> {
        let url = config.url().map_err(|err| {
            tracing::error!(host = %config.hostname, error = %err, "invalid database address");
            StoreError::connection(err.to_string())
        })?;
        let max_size = config.pool_size;
        let timeout = config.connect_timeout();
        let host = config.hostname.clone();

        let pool = run_blocking(move || {
            let manager = ConnectionManager::<PgConnection>::new(url);
            let pool = Pool::builder()
                .max_size(max_size)
                .connection_timeout(timeout)
                .build(manager)
                .map_err(|err| StoreError::connection(err.to_string()))?;
            apply_schema(&pool)?;
            Ok(pool)
        })
        .await
        .map_err(|err| {
            tracing::error!(host = %host, error = %err, "failed to connect to database");
            match err {
                StoreError::Connection(_) => err,
                other => StoreError::connection(other.to_string()),
            }
        })?;

        tracing::info!(host = %config.hostname, database = %config.name, "connected to database");
        Ok(Self::new(pool, validator, clock))
    }

    fn pool(&self) -> StoreResult<PgPool> {
        self.pool
            .read()
            .map_err(lock_poisoned)?
            .clone()
            .ok_or_else(|| StoreError::unavailable(std::io::Error::other("store is closed")))
    }

    /// Runs `operation` in a deadline-bounded transaction.
    async fn within<F, T>(&self, ctx: &OperationContext, operation: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        ctx.ensure_live()?;
        let pool = self.pool()?;
        let deadline = ctx.deadline();

        ctx.run(run_blocking(move || {
            let mut pooled = checkout(&pool, deadline)?;
            let conn: &mut PgConnection = &mut pooled;
            conn.transaction::<_, StoreError, _>(|tx| {
                if let Some(limit) = deadline {
                    set_statement_timeout(tx, remaining_before(limit)?)?;
                }
                let value = operation(tx)?;
                // Roll back rather than commit a write the caller gave up on.
                if deadline.is_some_and(|limit| Instant::now() >= limit) {
                    return Err(StoreError::DeadlineExceeded);
                }
                Ok(value)
            })
        }))
        .await
    }

    async fn require_conversation(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<()> {
        let key = id.clone();
        let found = self
            .within(ctx, move |conn| conversation_exists(conn, &key))
            .await?;
        if found {
            Ok(())
        } else {
            Err(StoreError::ConversationNotFound(id.clone()))
        }
    }
}

fn apply_schema(pool: &PgPool) -> StoreResult<()> {
    let mut pooled = pool
        .get()
        .map_err(|err| StoreError::connection(err.to_string()))?;
    let conn: &mut PgConnection = &mut pooled;
    conn.batch_execute(SCHEMA_SQL)
        .map_err(|err| StoreError::connection(format!("failed to apply schema: {err}")))
}

/// Checks the conversation row exists and share-locks it until commit, so
/// a concurrent delete waits for the enclosing transaction.
fn conversation_exists(conn: &mut PgConnection, id: &ConversationId) -> StoreResult<bool> {
    let found = conversations::table
        .find(id.as_str())
        .select(conversations::id)
        .for_share()
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

#[async_trait]
impl TextChatStore for PostgresTextChatStore {
    async fn get_message_by_id(
        &self,
        ctx: &OperationContext,
        id: &MessageId,
    ) -> StoreResult<Message> {
        let key = id.clone();
        let row = self
            .within(ctx, move |conn| {
                Ok(messages::table
                    .find(key.as_str())
                    .select(MessageRow::as_select())
                    .first::<MessageRow>(conn)
                    .optional()?)
            })
            .await?;

        row.map(row_to_message)
            .transpose()?
            .ok_or_else(|| StoreError::MessageNotFound(id.clone()))
    }

    async fn get_conversation_by_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Conversation> {
        let key = id.clone();
        let row = self
            .within(ctx, move |conn| {
                Ok(conversations::table
                    .find(key.as_str())
                    .select(ConversationRow::as_select())
                    .first::<ConversationRow>(conn)
                    .optional()?)
            })
            .await?;

        row.map(row_to_conversation)
            .transpose()?
            .ok_or_else(|| StoreError::ConversationNotFound(id.clone()))
    }

    async fn get_messages_by_conversation_id(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<Vec<Message>> {
        let key = id.clone();
        let rows = self
            .within(ctx, move |conn| {
                Ok(messages::table
                    .filter(messages::conversation_id.eq(key.as_str()))
                    .order_by((messages::created_on.asc(), messages::seq.asc()))
                    .select(MessageRow::as_select())
                    .load::<MessageRow>(conn)?)
            })
            .await?;

        if rows.is_empty() {
            tracing::debug!(conversation_id = %id, "no messages for conversation");
            return Err(StoreError::MessageNotFound(MessageId::new(id.as_str())));
        }
        rows.into_iter().map(row_to_message).collect()
    }

    async fn add_message(
        &self,
        ctx: &OperationContext,
        message: NewMessage,
    ) -> StoreResult<Message> {
        self.require_conversation(ctx, message.conversation_id())
            .await?;
        self.validator.check_user(ctx, message.user_id()).await?;

        let now = stamp(self.clock.as_ref());
        let stored = Message::create(message, MessageId::generate(), now);
        let row = message_to_row(&stored);
        let conversation_id = stored.conversation_id().clone();

        self.within(ctx, move |conn| {
            if !conversation_exists(conn, &conversation_id)? {
                return Err(StoreError::ConversationNotFound(conversation_id));
            }
            diesel::insert_into(messages::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;

        tracing::info!(
            message_id = %stored.id(),
            conversation_id = %stored.conversation_id(),
            "inserted message"
        );
        Ok(stored)
    }

    async fn add_conversation(
        &self,
        ctx: &OperationContext,
        conversation: NewConversation,
    ) -> StoreResult<Conversation> {
        ctx.ensure_live()?;
        self.validator
            .check_membership(ctx, conversation.user_ids(), conversation.game_id())
            .await?;

        let now = stamp(self.clock.as_ref());
        let stored = Conversation::create(conversation, ConversationId::generate(), now);
        let row = conversation_to_row(&stored)?;

        self.within(ctx, move |conn| {
            diesel::insert_into(conversations::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;

        tracing::info!(conversation_id = %stored.id(), "inserted conversation");
        Ok(stored)
    }

    async fn add_user_to_conversation(
        &self,
        ctx: &OperationContext,
        update: MembershipUpdate,
    ) -> StoreResult<Conversation> {
        self.require_conversation(ctx, update.conversation_id())
            .await?;
        self.validator
            .check_membership(ctx, update.user_ids(), update.game_id())
            .await?;

        let conversation_id = update.conversation_id().clone();
        let user_ids = user_ids_to_json(update.user_ids())?;
        let now = stamp(self.clock.as_ref());
        let key = conversation_id.clone();

        let row = self
            .within(ctx, move |conn| {
                Ok(diesel::update(conversations::table.find(key.as_str()))
                    .set((
                        conversations::user_ids.eq(user_ids),
                        conversations::updated_on.eq(now),
                    ))
                    .returning(ConversationRow::as_returning())
                    .get_result::<ConversationRow>(conn)
                    .optional()?)
            })
            .await?
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.clone()))?;

        let updated = row_to_conversation(row)?;
        tracing::info!(
            conversation_id = %conversation_id,
            members = updated.user_ids().len(),
            "replaced conversation membership"
        );
        Ok(updated)
    }

    async fn delete_message(&self, ctx: &OperationContext, id: &MessageId) -> StoreResult<()> {
        let key = id.clone();
        let deleted = self
            .within(ctx, move |conn| {
                Ok(diesel::delete(messages::table.find(key.as_str())).execute(conn)?)
            })
            .await?;

        if deleted == 0 {
            return Err(StoreError::MessageNotFound(id.clone()));
        }
        tracing::info!(message_id = %id, "deleted message");
        Ok(())
    }

    async fn delete_conversation(
        &self,
        ctx: &OperationContext,
        id: &ConversationId,
    ) -> StoreResult<()> {
        let key = id.clone();
        let deleted = self
            .within(ctx, move |conn| {
                Ok(diesel::delete(conversations::table.find(key.as_str())).execute(conn)?)
            })
            .await?;

        if deleted == 0 {
            return Err(StoreError::ConversationNotFound(id.clone()));
        }
        tracing::info!(conversation_id = %id, "deleted conversation");
        Ok(())
    }

    async fn connect(&self) -> StoreResult<()> {
        let pool = self
            .pool()
            .map_err(|err| StoreError::connection(err.to_string()))?;
        run_blocking(move || apply_schema(&pool)).await
    }

    async fn ping_db(&self, ctx: &OperationContext) -> StoreResult<()> {
        ctx.ensure_live()?;
        let pool = self.pool()?;
        let deadline = ctx.deadline();
        ctx.run(run_blocking(move || {
            let mut pooled = checkout(&pool, deadline)?;
            let conn: &mut PgConnection = &mut pooled;
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(())
        }))
        .await
    }

    async fn close_db(&self) {
        match self.pool.write() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    tracing::info!("database pool closed");
                } else {
                    tracing::debug!("database pool already closed");
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to close database pool"),
        }
    }
}
