// src/db.rs

use std::{str::FromStr, time::Duration};

use sqlx::{
    Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous},
};

/// How long a connection waits for the database write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect options shared by the server and the test harness.
///
/// WAL lets readers run alongside the single writer; the busy timeout makes
/// writers queue for the lock instead of failing with `SQLITE_BUSY`.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT))
}

/// Opens a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads and then writes cannot wait for the lock
/// on upgrade, so read-modify-write cycles must start with `BEGIN IMMEDIATE`.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
