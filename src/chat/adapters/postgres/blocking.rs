//! Blocking operation helpers for the `PostgreSQL` store.
//!
//! Diesel is synchronous, so every database call is offloaded to the
//! blocking thread pool and bounded by the caller's deadline from there.

use std::time::Duration;

use diesel::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tokio::time::Instant;

use crate::chat::{error::StoreError, ports::StoreResult};

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub(crate) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// SQLSTATE `57014`, reported when `statement_timeout` cancels a query.
const QUERY_CANCELED_MESSAGE: &str = "canceling statement due to statement timeout";

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DeserializationError(cause) => Self::corrupt(cause.to_string()),
            DieselError::DatabaseError(DatabaseErrorKind::Unknown, ref info)
                if info.message().contains(QUERY_CANCELED_MESSAGE) =>
            {
                Self::DeadlineExceeded
            }
            other => Self::unavailable(other),
        }
    }
}

/// Runs a blocking database operation on the blocking thread pool.
pub(super) async fn run_blocking<F, T>(f: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(StoreError::unavailable)?
}

/// Obtains a connection from the pool.
pub(super) fn get_conn(pool: &PgPool) -> StoreResult<PooledConn> {
    pool.get().map_err(StoreError::unavailable)
}

/// Time left before `deadline`, measured now.
///
/// # Errors
///
/// Returns [`StoreError::DeadlineExceeded`] once the deadline has passed.
pub(crate) fn remaining_before(deadline: Instant) -> StoreResult<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(StoreError::DeadlineExceeded)
    } else {
        Ok(left)
    }
}

/// Obtains a connection without waiting past `deadline`.
///
/// Without a deadline the pool's own checkout timeout applies.
///
/// # Errors
///
/// Returns [`StoreError::DeadlineExceeded`] when the deadline passes before
/// a connection is free, and [`StoreError::Unavailable`] for other pool
/// failures.
pub(crate) fn checkout(pool: &PgPool, deadline: Option<Instant>) -> StoreResult<PooledConn> {
    let Some(limit) = deadline else {
        return get_conn(pool);
    };
    let left = remaining_before(limit)?;
    pool.get_timeout(left).map_err(|err| {
        if Instant::now() >= limit {
            StoreError::DeadlineExceeded
        } else {
            StoreError::unavailable(err)
        }
    })
}

/// Bounds every statement of the current transaction to `budget`.
///
/// `statement_timeout = 0` disables the limit, so the value is clamped to
/// at least one millisecond.
pub(super) fn set_statement_timeout(conn: &mut PgConnection, budget: Duration) -> StoreResult<()> {
    let millis = budget.as_millis().clamp(1, u128::from(u32::MAX));
    diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(conn)?;
    Ok(())
}
