use chrono::Utc;
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::{Note, UpdateNoteInput};
use crate::store::{collections, Store};

/// CRUD over the `notas` collection.
#[derive(Clone)]
pub struct Notes {
    store: Store,
}

impl Notes {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persist a new note under a store-assigned id. Both timestamps are
    /// stamped with the same server time; whatever the caller put in the
    /// model's timestamp fields is discarded.
    pub fn create(&self, note: &Note) -> Result<String> {
        let mut doc = super::encode(note)?;
        let now = Utc::now().to_rfc3339();
        doc.insert("fecha_creacion".to_string(), Value::String(now.clone()));
        doc.insert("fecha_modificacion".to_string(), Value::String(now));
        self.store.add(collections::NOTES, doc)
    }

    pub fn get(&self, id: &str) -> Result<Option<Note>> {
        match self.store.get(collections::NOTES, id)? {
            Some(doc) => Ok(Some(super::decode(id, doc)?)),
            None => Ok(None),
        }
    }

    /// Equality scan on `id_usuario`, materialized in store order.
    pub fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Note>> {
        self.store
            .query(collections::NOTES, &[("id_usuario", json!(owner_id))])?
            .into_iter()
            .map(|(id, doc)| super::decode(&id, doc))
            .collect()
    }

    /// Merge the set fields into the note. `fecha_modificacion` is always
    /// overwritten with the current server time; `fecha_creacion` is never
    /// touched. Returns `false` (no-op) when the note does not exist.
    pub fn update(&self, id: &str, changes: &UpdateNoteInput) -> Result<bool> {
        let mut doc = super::encode(changes)?;
        // categoria_nombre is request-level routing, not note data.
        doc.remove("categoria_nombre");
        doc.insert(
            "fecha_modificacion".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.store.update(collections::NOTES, id, doc)
    }

    /// Unconditional delete. Link records pointing at the note are left
    /// behind; read-side joins skip links whose note is gone.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(collections::NOTES, id)
    }
}
