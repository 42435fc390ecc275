//! Schema migrations for the index store

use rusqlite::Connection;

use crate::error::StoreError;

/// SQL for each migration version
const MIGRATIONS: &[(&str, &str)] = &[("v001_initial", include_str!("v001_initial.sql"))];

/// Applies pending migrations, tracking progress in `PRAGMA user_version`.
pub struct Migrator<'a> {
    conn: &'a Connection,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn current_version(&self) -> Result<i32, StoreError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    pub fn target_version(&self) -> i32 {
        MIGRATIONS.len() as i32
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let current = self.current_version()?;
        if current > self.target_version() {
            return Err(StoreError::Migration(format!(
                "database schema version {current} is newer than supported version {}",
                self.target_version()
            )));
        }

        for (idx, (name, sql)) in MIGRATIONS.iter().enumerate() {
            let version = (idx + 1) as i32;
            if version <= current {
                continue;
            }
            tracing::info!(version, name, "running migration");
            self.conn
                .execute_batch(sql)
                .map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
            self.conn.pragma_update(None, "user_version", version)?;
        }
        Ok(())
    }
}
