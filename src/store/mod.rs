mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, ErrorCode, ToSql, TransactionBehavior};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Error, Result, StoreError};

/// A persisted record body. Field names follow the wire contract of the
/// existing mobile clients (`id_usuario`, `titulo`, ...).
pub type Document = Map<String, Value>;

/// Collection names, kept verbatim so existing client data stays readable.
pub mod collections {
    pub const NOTES: &str = "notas";
    pub const CATEGORIES: &str = "categoriaNota";
    pub const NOTE_CATEGORIES: &str = "notas_categoriaNota";
    pub const USERS: &str = "usuarios";
    pub const TEMPLATE_UNLOCKS: &str = "usuarios_plantillas";
    pub const FEATURE_UNLOCKS: &str = "usuarios_features";
}

/// How many times a transaction body is replayed when SQLite reports a
/// busy/locked conflict before the error is surfaced.
const MAX_TXN_RETRIES: u32 = 5;

/// Document store over a single SQLite database.
///
/// Every document lives in the `documents` table keyed by
/// `(collection, id)` with a JSON body; equality-filtered scans go
/// through `json_extract`. Mutations outside [`Store::run_transaction`]
/// persist immediately; inside a transaction they commit atomically.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "tintero")
            .ok_or_else(|| Error::validation("could not determine data directory"))?;
        let db_path = dirs.data_dir().join("tintero.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("store lock poisoned");
        schema::run_migrations(&conn)
            .map_err(|e| Error::Store(StoreError::Migration(e)))
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        get_document(&conn, collection, id)
    }

    /// Equality-filtered scan over a collection, materialized in store
    /// order. An empty filter list returns the whole collection.
    pub fn query(&self, collection: &str, filters: &[(&str, Value)]) -> Result<Vec<(String, Document)>> {
        let conn = self.conn.lock().expect("store lock poisoned");
        query_documents(&conn, collection, filters)
    }

    /// Insert a new document under a store-assigned id.
    pub fn add(&self, collection: &str, fields: Document) -> Result<String> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let id = Uuid::new_v4().to_string();
        set_document(&conn, collection, &id, &fields)?;
        Ok(id)
    }

    /// Write a document under a caller-chosen id, replacing any previous
    /// body.
    pub fn set(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        let conn = self.conn.lock().expect("store lock poisoned");
        set_document(&conn, collection, id, &fields)
    }

    /// Merge `changes` into an existing document at the top level.
    /// Returns `false` (explicit no-op) when the document is absent.
    pub fn update(&self, collection: &str, id: &str, changes: Document) -> Result<bool> {
        let conn = self.conn.lock().expect("store lock poisoned");
        update_document(&conn, collection, id, changes)
    }

    /// Unconditional delete; absent ids are ignored.
    pub fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let conn = self.conn.lock().expect("store lock poisoned");
        delete_document(&conn, collection, id)
    }

    /// Run `body` inside a single SQLite transaction with all-or-nothing
    /// commit. When SQLite reports a busy/locked conflict the whole body
    /// is replayed (fresh reads included), up to [`MAX_TXN_RETRIES`]
    /// times. Any other error rolls back and propagates.
    pub fn run_transaction<T>(&self, mut body: impl FnMut(&mut Txn) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().expect("store lock poisoned");
        let mut attempts = 0;
        loop {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let outcome = body(&mut Txn::new(&tx));
            match outcome {
                Ok(value) => match tx.commit() {
                    Ok(()) => return Ok(value),
                    Err(e) if is_conflict_sqlite(&e) && attempts < MAX_TXN_RETRIES => {
                        attempts += 1;
                        tracing::debug!("transaction commit conflict, retrying (attempt {attempts})");
                    }
                    Err(e) => return Err(e.into()),
                },
                Err(e) if is_conflict(&e) && attempts < MAX_TXN_RETRIES => {
                    attempts += 1;
                    tracing::debug!("transaction body conflict, retrying (attempt {attempts})");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Handle passed to [`Store::run_transaction`] bodies. Reads see the
/// transaction's own uncommitted writes; nothing persists until commit.
pub struct Txn<'a> {
    conn: &'a Connection,
}

impl<'a> Txn<'a> {
    fn new(tx: &'a rusqlite::Transaction<'a>) -> Self {
        Self { conn: tx }
    }

    pub fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        get_document(self.conn, collection, id)
    }

    pub fn query(&self, collection: &str, filters: &[(&str, Value)]) -> Result<Vec<(String, Document)>> {
        query_documents(self.conn, collection, filters)
    }

    pub fn add(&self, collection: &str, fields: Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        set_document(self.conn, collection, &id, &fields)?;
        Ok(id)
    }

    pub fn set(&self, collection: &str, id: &str, fields: Document) -> Result<()> {
        set_document(self.conn, collection, id, &fields)
    }

    pub fn update(&self, collection: &str, id: &str, changes: Document) -> Result<bool> {
        update_document(self.conn, collection, id, changes)
    }
}

// ============================================================
// Shared statement helpers (used by both Store and Txn)
// ============================================================

fn get_document(conn: &Connection, collection: &str, id: &str) -> Result<Option<Document>> {
    let mut stmt = conn.prepare("SELECT data FROM documents WHERE collection = ? AND id = ?")?;
    let mut rows = stmt.query((collection, id))?;
    if let Some(row) = rows.next()? {
        let raw: String = row.get(0)?;
        Ok(Some(parse_document(&raw)?))
    } else {
        Ok(None)
    }
}

fn query_documents(
    conn: &Connection,
    collection: &str,
    filters: &[(&str, Value)],
) -> Result<Vec<(String, Document)>> {
    let mut sql = String::from("SELECT id, data FROM documents WHERE collection = ?");
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(collection.to_string())];

    for (field, value) in filters {
        // Field names come from code, never from request input.
        sql.push_str(&format!(" AND json_extract(data, '$.{field}') = ?"));
        params.push(filter_param(value)?);
    }
    sql.push_str(" ORDER BY rowid");

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut rows = stmt.query(params_ref.as_slice())?;

    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        let id: String = row.get(0)?;
        let raw: String = row.get(1)?;
        results.push((id, parse_document(&raw)?));
    }
    Ok(results)
}

fn set_document(conn: &Connection, collection: &str, id: &str, fields: &Document) -> Result<()> {
    let data = serde_json::to_string(fields)?;
    conn.execute(
        "INSERT INTO documents (collection, id, data) VALUES (?, ?, ?)
         ON CONFLICT (collection, id) DO UPDATE SET data = excluded.data",
        (collection, id, &data),
    )?;
    Ok(())
}

fn update_document(conn: &Connection, collection: &str, id: &str, changes: Document) -> Result<bool> {
    let Some(mut doc) = get_document(conn, collection, id)? else {
        return Ok(false);
    };
    for (field, value) in changes {
        doc.insert(field, value);
    }
    set_document(conn, collection, id, &doc)?;
    Ok(true)
}

fn delete_document(conn: &Connection, collection: &str, id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM documents WHERE collection = ? AND id = ?",
        (collection, id),
    )?;
    Ok(())
}

fn parse_document(raw: &str) -> Result<Document> {
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Store(StoreError::Malformed(format!(
            "not a JSON object: {other}"
        )))),
    }
}

fn filter_param(value: &Value) -> Result<Box<dyn ToSql>> {
    match value {
        Value::String(s) => Ok(Box::new(s.clone())),
        Value::Bool(b) => Ok(Box::new(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Box::new(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Box::new(f))
            } else {
                Err(Error::validation(format!("unsupported filter number: {n}")))
            }
        }
        other => Err(Error::validation(format!(
            "unsupported filter value: {other}"
        ))),
    }
}

fn is_conflict(e: &Error) -> bool {
    match e {
        Error::Store(StoreError::Sqlite(e)) => is_conflict_sqlite(e),
        _ => false,
    }
}

fn is_conflict_sqlite(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if matches!(f.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
