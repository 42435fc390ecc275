//! Index store backed by SQLite.
//!
//! Writes go through one connection behind a mutex, and every mutation runs
//! inside a single transaction while the lock is held. File databases run in
//! WAL mode and serve reads from a pool of read-only connections, so any
//! number of readers proceed concurrently with the writer and only ever
//! observe fully committed ontologies. In-memory databases read through the
//! writer connection.

mod migrations;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info, instrument};

pub use migrations::Migrator;

use crate::error::StoreError;
use crate::format::sort_by_preference;
use crate::ontology::{Definiendum, OntologyRecord};

/// Result of an upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Other slugs removed because they owned the same canonical IRI.
    pub displaced: Vec<String>,
}

/// One row of the ontology overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologySummary {
    pub slug: String,
    pub uri: String,
    pub alternate_uris: Vec<String>,
    /// Number of non-canonical definienda.
    pub definienda: usize,
    /// Available media types in preference order.
    pub mime_types: Vec<String>,
}

/// Where a URI is documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptMatch {
    pub slug: String,
    pub fragment: Option<String>,
}

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle read connections kept open per store.
const MAX_IDLE_READERS: usize = 16;

pub struct IndexStore {
    conn: Mutex<Connection>,
    readers: Option<ReaderPool>,
}

/// Read-only connections to a database file.
struct ReaderPool {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl ReaderPool {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            idle: Mutex::new(Vec::new()),
        }
    }

    fn acquire(&self) -> Result<Connection, StoreError> {
        let idle = self.idle.lock().map_err(|_| StoreError::Poisoned)?.pop();
        if let Some(conn) = idle {
            return Ok(conn);
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        debug!(path = %self.path.display(), "opened read connection");
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE_READERS {
                idle.push(conn);
            }
        }
    }
}

impl IndexStore {
    /// Open or create a database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        info!(path = %path.display(), journal_mode = %mode, "opened index database");
        let mut store = Self::init(conn)?;
        store.readers = Some(ReaderPool::new(path));
        Ok(store)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("opened in-memory index database");
        Self::init(Connection::open_in_memory()?)
    }

    /// Open an in-memory database holding a copy of the file at `path`.
    ///
    /// Writes to the copy never reach the file.
    pub fn open_copy_in_memory<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let store = Self::open_in_memory()?;
        let path = path.as_ref();
        if !path.exists() {
            return Ok(store);
        }

        {
            let conn = store.lock()?;
            let source = path
                .to_str()
                .ok_or_else(|| StoreError::InvalidData(format!("non-UTF-8 path {path:?}")))?;
            conn.execute("ATTACH DATABASE ?1 AS source", [source])?;
            let copied = conn.execute_batch(
                "INSERT INTO definienda SELECT * FROM source.definienda;
                 INSERT INTO representations SELECT * FROM source.representations;",
            );
            conn.execute_batch("DETACH DATABASE source")?;
            copied?;
        }
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        Migrator::new(&conn).migrate()?;
        Ok(Self {
            conn: Mutex::new(conn),
            readers: None,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run a read-only query on a pooled connection, or on the writer for
    /// in-memory databases.
    fn read<T>(
        &self,
        query: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match &self.readers {
            Some(pool) => {
                let conn = pool.acquire()?;
                let result = query(&conn);
                pool.release(conn);
                result
            }
            None => query(&*self.lock()?),
        }
    }

    /// Replace everything stored for `record.slug` in one transaction.
    ///
    /// Any other slug that owns `record.uri` as a canonical IRI is removed in
    /// the same transaction.
    #[instrument(skip(self, record), fields(slug = %record.slug), level = "debug")]
    pub fn upsert(&self, record: &OntologyRecord) -> Result<UpsertOutcome, StoreError> {
        if record.definienda.first().is_none_or(|d| !d.canonical || d.uri != record.uri) {
            return Err(StoreError::InvalidData(format!(
                "{}: first definiendum must be the canonical IRI",
                record.slug
            )));
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let displaced: Vec<String> = {
            let mut stmt = tx.prepare(
                "SELECT DISTINCT ontology_id FROM definienda
                 WHERE canonical = 1 AND uri = ?1 AND ontology_id <> ?2
                 ORDER BY ontology_id",
            )?;
            let rows = stmt.query_map(params![record.uri, record.slug], |row| row.get(0))?;
            rows.collect::<Result<_, _>>()?
        };

        for slug in displaced.iter().chain(std::iter::once(&record.slug)) {
            delete_rows(&tx, slug)?;
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO representations (ontology_id, mime_type, data) VALUES (?1, ?2, ?3)",
            )?;
            for representation in &record.representations {
                insert.execute(params![
                    record.slug,
                    representation.mime_type,
                    representation.data
                ])?;
            }

            let mut insert = tx.prepare(
                "INSERT INTO definienda (uri, ontology_id, canonical, fragment)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for definiendum in &record.definienda {
                insert.execute(params![
                    definiendum.uri,
                    record.slug,
                    definiendum.canonical,
                    definiendum.fragment
                ])?;
            }
        }

        tx.commit()?;
        if !displaced.is_empty() {
            info!(slug = %record.slug, ?displaced, "replaced ontologies with the same IRI");
        }
        Ok(UpsertOutcome { displaced })
    }

    /// Remove every row of `slug`. Returns whether anything was removed.
    #[instrument(skip(self), level = "debug")]
    pub fn delete(&self, slug: &str) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = delete_rows(&tx, slug)?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Remove all indexed data.
    #[instrument(skip(self), level = "debug")]
    pub fn truncate(&self) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM definienda", [])?;
        tx.execute("DELETE FROM representations", [])?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_representation(
        &self,
        slug: &str,
        mime_type: &str,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        self.read(|conn| {
            let data = conn
                .query_row(
                    "SELECT data FROM representations WHERE ontology_id = ?1 AND mime_type = ?2",
                    params![slug, mime_type],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(data)
        })
    }

    /// Media types stored for `slug`, in preference order.
    pub fn mime_types(&self, slug: &str) -> Result<Vec<String>, StoreError> {
        let mut types: Vec<String> = self.read(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT mime_type FROM representations WHERE ontology_id = ?1")?;
            let types = stmt
                .query_map([slug], |row| row.get(0))?
                .collect::<Result<_, _>>()?;
            Ok(types)
        })?;
        sort_by_preference(&mut types);
        Ok(types)
    }

    /// Find an ontology by slug, or by any of its canonical IRIs.
    pub fn resolve_ontology(&self, identifier: &str) -> Result<Option<String>, StoreError> {
        self.read(|conn| {
            let by_slug: Option<String> = conn
                .query_row(
                    "SELECT ontology_id FROM definienda
                     WHERE ontology_id = ?1 AND canonical = 1 LIMIT 1",
                    [identifier],
                    |row| row.get(0),
                )
                .optional()?;
            if by_slug.is_some() {
                return Ok(by_slug);
            }

            let by_uri = conn
                .query_row(
                    "SELECT ontology_id FROM definienda
                     WHERE uri = ?1 AND canonical = 1 ORDER BY id LIMIT 1",
                    [identifier],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(by_uri)
        })
    }

    /// The primary IRI of `slug`: its first canonical definiendum.
    pub fn primary_uri(&self, slug: &str) -> Result<Option<String>, StoreError> {
        self.read(|conn| {
            let uri = conn
                .query_row(
                    "SELECT uri FROM definienda
                     WHERE ontology_id = ?1 AND canonical = 1 ORDER BY id LIMIT 1",
                    [slug],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(uri)
        })
    }

    /// The first candidate URI documented anywhere, in candidate order.
    pub fn resolve_concept<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<Option<ConceptMatch>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT ontology_id, fragment FROM definienda
                 WHERE uri = ?1 ORDER BY canonical DESC, id LIMIT 1",
            )?;
            for candidate in candidates {
                let found = stmt
                    .query_row([candidate.as_ref()], |row| {
                        Ok(ConceptMatch {
                            slug: row.get(0)?,
                            fragment: row.get(1)?,
                        })
                    })
                    .optional()?;
                if found.is_some() {
                    return Ok(found);
                }
            }
            Ok(None)
        })
    }

    /// All definienda of `slug` in insertion order.
    pub fn definienda(&self, slug: &str) -> Result<Vec<Definiendum>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT uri, canonical, fragment FROM definienda WHERE ontology_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map([slug], |row| {
                Ok(Definiendum {
                    uri: row.get(0)?,
                    canonical: row.get(1)?,
                    fragment: row.get(2)?,
                })
            })?;
            let definienda = rows.collect::<Result<_, _>>()?;
            Ok(definienda)
        })
    }

    /// The overview of all ontologies, ordered by slug.
    pub fn list_ontologies(&self) -> Result<Vec<OntologySummary>, StoreError> {
        type Row = (String, String, Option<String>, i64, Option<String>);
        let rows: Vec<Row> = self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT ontology_id, uri, alternate_uris, definienda, mime_types
                 FROM ontology_overview ORDER BY ontology_id",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })?;
            let rows = rows.collect::<Result<_, _>>()?;
            Ok(rows)
        })?;

        let mut out = Vec::new();
        for (slug, uri, alternates, count, mime_types) in rows {
            let mut alternate_uris = split_words(alternates);
            alternate_uris.sort();
            let mut mime_types = split_words(mime_types);
            sort_by_preference(&mut mime_types);
            let definienda = usize::try_from(count)
                .map_err(|_| StoreError::InvalidData(format!("{slug}: negative definienda count")))?;
            out.push(OntologySummary {
                slug,
                uri,
                alternate_uris,
                definienda,
                mime_types,
            });
        }
        Ok(out)
    }
}

fn delete_rows(conn: &Connection, slug: &str) -> Result<usize, StoreError> {
    let definienda = conn.execute("DELETE FROM definienda WHERE ontology_id = ?1", [slug])?;
    let representations =
        conn.execute("DELETE FROM representations WHERE ontology_id = ?1", [slug])?;
    Ok(definienda + representations)
}

fn split_words(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
