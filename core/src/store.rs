//! Persistence gateway — a bounded pool of SQLite connections plus the
//! retired-player table and leaderboard queries.
//!
//! RULE: Only store.rs talks to the database. The engine calls store
//! functions — it never executes SQL directly.
//!
//! The pool is sized to worker concurrency. `acquire()` blocks on a
//! condvar until a connection is free (no busy-spin, no timeout — a
//! caller waits indefinitely; capacity is provisioned to match worker
//! count, so starvation is a documented risk rather than a handled
//! condition). The guard returns its connection on every exit path,
//! including panics, via `Drop`.

use crate::error::{GameError, GameResult};
use rusqlite::{params, Connection, OpenFlags};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use uuid::Uuid;

/// Cap on leaderboard page size; larger requests are rejected.
pub const MAX_RECORD_ITEMS: u64 = 100;

/// A durable leaderboard record written once, when a dog retires.
#[derive(Debug, Clone, PartialEq)]
pub struct RetiredRecord {
    pub id: Uuid,
    pub name: String,
    pub score: i64,
    pub play_time_ms: f64,
}

pub struct ConnectionPool {
    connections: Mutex<Vec<Connection>>,
    available: Condvar,
}

impl ConnectionPool {
    /// Build a pool of `capacity` connections from a factory and apply
    /// the schema through the first one.
    pub fn new<F>(capacity: usize, factory: F) -> GameResult<Self>
    where
        F: Fn() -> GameResult<Connection>,
    {
        assert!(capacity > 0, "pool capacity must be > 0");
        let mut connections = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            connections.push(factory()?);
        }
        connections[0].execute_batch(include_str!("../migrations/001_retired_players.sql"))?;
        Ok(Self {
            connections: Mutex::new(connections),
            available: Condvar::new(),
        })
    }

    /// Pool over a database file.
    pub fn open(path: &str, capacity: usize) -> GameResult<Self> {
        let path = path.to_string();
        Self::new(capacity, move || {
            let conn = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )?;
            // WAL mode only matters for real files; in-memory URIs ignore it.
            let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(conn)
        })
    }

    /// Pool over a process-private shared-memory database (tests). All
    /// connections in the pool see the same data.
    pub fn in_memory(capacity: usize) -> GameResult<Self> {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let uri = format!(
            "file:lootworld_mem_{}?mode=memory&cache=shared",
            NEXT.fetch_add(1, Ordering::Relaxed)
        );
        Self::open(&uri, capacity)
    }

    /// Block until a connection is free and take exclusive ownership
    /// of it for the lifetime of the returned guard.
    pub fn acquire(&self) -> PooledConn<'_> {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while connections.is_empty() {
            connections = self
                .available
                .wait(connections)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        let conn = connections.pop();
        PooledConn { conn, pool: self }
    }

    fn release(&self, conn: Connection) {
        let mut connections = self
            .connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        connections.push(conn);
        drop(connections);
        self.available.notify_one();
    }
}

/// Exclusively-owned pooled connection; returned to the pool on drop.
pub struct PooledConn<'a> {
    conn: Option<Connection>,
    pool: &'a ConnectionPool,
}

impl Deref for PooledConn<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken")
    }
}

impl DerefMut for PooledConn<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken")
    }
}

impl Drop for PooledConn<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
        }
    }
}

/// Write one retirement record: one transaction, one row, commit.
pub fn insert_retired(conn: &mut Connection, record: &RetiredRecord) -> GameResult<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO retired_players (id, name, score, play_time_ms) VALUES (?1, ?2, ?3, ?4)",
        params![
            record.id.to_string(),
            record.name,
            record.score,
            record.play_time_ms
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Top records ordered by (score DESC, play_time ASC, name ASC), with
/// paging. `limit` above `MAX_RECORD_ITEMS` is a caller error.
pub fn leaderboard(
    conn: &Connection,
    offset: u64,
    limit: u64,
) -> GameResult<Vec<RetiredRecord>> {
    if limit > MAX_RECORD_ITEMS {
        return Err(GameError::InvalidArgument(format!(
            "limit must not exceed {MAX_RECORD_ITEMS}, got {limit}"
        )));
    }
    let mut stmt = conn.prepare(
        "SELECT id, name, score, play_time_ms FROM retired_players
         ORDER BY score DESC, play_time_ms, name
         LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit, offset], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, f64>(3)?,
        ))
    })?;
    let mut records = Vec::new();
    for row in rows {
        let (id, name, score, play_time_ms) = row?;
        let id = id
            .parse::<Uuid>()
            .map_err(|e| GameError::InvalidArgument(format!("corrupt record id '{id}': {e}")))?;
        records.push(RetiredRecord {
            id,
            name,
            score,
            play_time_ms,
        });
    }
    Ok(records)
}
