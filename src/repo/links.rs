use serde_json::json;

use crate::error::Result;
use crate::models::NoteCategoryLink;
use crate::store::{collections, Store};

/// Note–category association records.
#[derive(Clone)]
pub struct Links {
    store: Store,
}

impl Links {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Always inserts a fresh record; earlier links for the same note are
    /// neither deduplicated nor retired. Readers that want a "current"
    /// category must pick their own policy over the accumulated history.
    pub fn link(&self, note_id: &str, category_id: &str) -> Result<String> {
        self.store.add(
            collections::NOTE_CATEGORIES,
            super::encode(&json!({
                "id_nota": note_id,
                "id_categoriaNota": category_id,
            }))?,
        )
    }

    pub fn by_category(&self, category_id: &str) -> Result<Vec<NoteCategoryLink>> {
        self.store
            .query(
                collections::NOTE_CATEGORIES,
                &[("id_categoriaNota", json!(category_id))],
            )?
            .into_iter()
            .map(|(id, doc)| super::decode(&id, doc))
            .collect()
    }
}
