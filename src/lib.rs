//! An embedded, single-file JSON document store queried through a
//! deliberately restricted SQL-like interface.
//!
//! A [`Store`] owns one JSON backing file and a full in-memory mirror of
//! its contents. Callers hand [`Store::query`] a statement string plus
//! positional parameters and get row objects back. The supported surface
//! is intentionally small: INSERT (append only), UPDATE (first match),
//! SELECT with equality-and-AND filtering, one hardcoded LEFT JOIN
//! relationship, single-column ORDER BY, and a single-shape DELETE.
//! Parameters are written as `$1`, `$2`, ... but are consumed in
//! evaluation order, not by their literal number; that quirk is part of
//! the contract and is pinned by tests rather than corrected.

pub mod ast;
pub mod database;
pub mod error;
pub mod executor;
pub mod join;
pub mod lexer;
pub mod parser;
pub mod storage;

pub use database::{Database, Row, TABLE_NAMES};
pub use error::{Error, Result};
pub use storage::{JsonStorageEngine, LoadOutcome, StorageEngine};

use ast::Statement;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::PathBuf;

/// Store construction options.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// When the backing file exists but cannot be read or parsed: `true`
    /// (the default) silently starts from an empty database, matching the
    /// store's historical behavior; `false` surfaces
    /// [`Error::Corrupted`] instead. Either way a recovery is observable
    /// through [`Store::load_outcome`] and a `tracing` warning.
    pub recover_on_corruption: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            recover_on_corruption: true,
        }
    }
}

/// The document store: an in-memory database plus its persistence engine.
///
/// Mutating statements take the write lock and persist the whole database
/// before releasing it, so concurrent mutations serialize and none is
/// lost. SELECTs share the read lock and may run concurrently.
pub struct Store {
    db: RwLock<Database>,
    engine: Box<dyn StorageEngine>,
    load_outcome: LoadOutcome,
}

impl Store {
    /// Open (or create) the store backed by the JSON file at `path`, with
    /// default options.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with<P: Into<PathBuf>>(path: P, options: StoreOptions) -> Result<Self> {
        let engine = JsonStorageEngine::new(path);
        let (db, load_outcome) = engine.load();
        if load_outcome == LoadOutcome::Recovered && !options.recover_on_corruption {
            return Err(Error::Corrupted(engine.path().to_path_buf()));
        }
        // A fresh or recovered database is persisted immediately so the
        // file always reflects the in-memory state from here on.
        if load_outcome != LoadOutcome::Loaded {
            engine.save(&db)?;
        }
        Ok(Store {
            db: RwLock::new(db),
            engine: Box::new(engine),
            load_outcome,
        })
    }

    /// How the backing file was brought in at open time. Distinguishes a
    /// first run ([`LoadOutcome::Created`]) from a discarded corrupt file
    /// ([`LoadOutcome::Recovered`]).
    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Execute one statement. INSERT and UPDATE return the affected row
    /// (UPDATE: empty when no row matched), DELETE returns no rows, and
    /// SELECT returns the filtered/joined/sorted rows.
    pub fn query(&self, text: &str, params: &[Value]) -> Result<Vec<Row>> {
        let statement = parser::parse(lexer::tokenize(text)?)?;
        match statement {
            Statement::Select(stmt) => {
                let db = self.db.read();
                executor::execute_select(&db, &stmt, params)
            }
            Statement::Insert(stmt) => {
                self.mutate(|db| executor::execute_insert(db, &stmt, params))
            }
            Statement::Update(stmt) => {
                self.mutate(|db| executor::execute_update(db, &stmt, params))
            }
            Statement::Delete(stmt) => {
                self.mutate(|db| executor::execute_delete(db, &stmt, params))
            }
        }
    }

    /// First row of [`Store::query`], or `None` when it returned nothing.
    pub fn query_one(&self, text: &str, params: &[Value]) -> Result<Option<Row>> {
        Ok(self.query(text, params)?.into_iter().next())
    }

    fn mutate<F>(&self, apply: F) -> Result<Vec<Row>>
    where
        F: FnOnce(&mut Database) -> Result<Vec<Row>>,
    {
        let mut db = self.db.write();
        let rows = apply(&mut db)?;
        // Persist before releasing the write lock; if the write fails,
        // memory is ahead of disk until the next successful save.
        self.engine.save(&db)?;
        Ok(rows)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("db", &self.db)
            .field("load_outcome", &self.load_outcome)
            .finish_non_exhaustive()
    }
}
