//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The repository calls store methods — it never executes SQL directly.

use crate::error::RoiResult;
use rusqlite::{Connection, OpenFlags};

mod scenario;

pub struct ScenarioStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file or URI
}

impl ScenarioStore {
    pub fn open(path: &str) -> RoiResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RoiResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Open a second connection to the same database.
    /// For plain in-memory databases this returns a new, isolated one.
    pub fn reopen(&self) -> RoiResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order. Safe to call repeatedly.
    pub fn migrate(&self) -> RoiResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_scenarios.sql"))?;
        log::debug!("Schema migrations applied");
        Ok(())
    }
}
