//! Repositories over the document store.
//!
//! Each repository holds its own handle to the shared [`Store`] and owns
//! one collection (plus the scans it needs into others). Repositories
//! keep no state between calls; everything lives in the store.

mod categories;
mod economy;
mod links;
mod notes;

pub use categories::Categories;
pub use economy::{Economy, BACKGROUND_PREFIX, FEATURE_COST, FONT_PREFIX, TEMPLATE_COST};
pub use links::Links;
pub use notes::Notes;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result, StoreError};
use crate::models::Note;
use crate::store::{Document, Store};

/// All repositories over one store handle, used as the axum state.
/// Clones share the underlying connection.
#[derive(Clone)]
pub struct Backend {
    pub notes: Notes,
    pub categories: Categories,
    pub links: Links,
    pub economy: Economy,
}

impl Backend {
    pub fn new(store: Store) -> Self {
        Self {
            notes: Notes::new(store.clone()),
            categories: Categories::new(store.clone()),
            links: Links::new(store.clone()),
            economy: Economy::new(store),
        }
    }

    /// Notes a user has in a category: scan link records by category,
    /// then look up each note and keep the ones owned by `owner_id`.
    /// The per-note lookup loop is the best the adapter offers (point
    /// gets and equality scans only); fine at current data sizes.
    pub fn notes_by_category(&self, owner_id: &str, category_id: &str) -> Result<Vec<Note>> {
        let links = self.links.by_category(category_id)?;

        let mut notes = Vec::new();
        for link in links {
            if let Some(note) = self.notes.get(&link.note_id)? {
                if note.owner_id == owner_id {
                    notes.push(note);
                }
            }
        }
        Ok(notes)
    }
}

/// Serialize a model into a storable document, dropping the `id` field
/// (the id is the document key, not part of the body).
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut doc) => {
            doc.remove("id");
            Ok(doc)
        }
        other => Err(Error::Store(StoreError::Malformed(format!(
            "model did not serialize to an object: {other}"
        )))),
    }
}

/// Deserialize a stored document into a model, re-attaching its id.
pub(crate) fn decode<T: DeserializeOwned>(id: &str, mut doc: Document) -> Result<T> {
    doc.insert("id".to_string(), Value::String(id.to_string()));
    Ok(serde_json::from_value(Value::Object(doc))?)
}
