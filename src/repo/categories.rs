use serde_json::json;

use crate::error::{Error, Result};
use crate::models::Category;
use crate::store::{collections, Store};

/// Categories, addressed by store-assigned id but looked up by name.
#[derive(Clone)]
pub struct Categories {
    store: Store,
}

impl Categories {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// First match of an equality scan on `nombre`. If a race has created
    /// duplicates, which one is returned is unspecified.
    pub fn find_by_name(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .query(collections::CATEGORIES, &[("nombre", json!(name))])?
            .into_iter()
            .next()
            .map(|(id, _)| id))
    }

    /// Find-then-create. The two steps are not atomic: concurrent calls
    /// with the same new name can each create a category. Known gap,
    /// tolerated (see find_by_name).
    pub fn get_or_create(&self, name: &str) -> Result<String> {
        if let Some(id) = self.find_by_name(name)? {
            return Ok(id);
        }
        self.store.add(
            collections::CATEGORIES,
            super::encode(&json!({ "nombre": name }))?,
        )
    }

    /// Explicit creation; an existing category with the same name is a
    /// conflict rather than a silent reuse.
    pub fn create(&self, name: &str) -> Result<Category> {
        if self.find_by_name(name)?.is_some() {
            return Err(Error::conflict("La categoría ya existe"));
        }
        let id = self.store.add(
            collections::CATEGORIES,
            super::encode(&json!({ "nombre": name }))?,
        )?;
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub fn all(&self) -> Result<Vec<Category>> {
        self.store
            .query(collections::CATEGORIES, &[])?
            .into_iter()
            .map(|(id, doc)| super::decode(&id, doc))
            .collect()
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<()> {
        let updated = self.store.update(
            collections::CATEGORIES,
            id,
            super::encode(&json!({ "nombre": name }))?,
        )?;
        if !updated {
            return Err(Error::not_found("La categoría no existe"));
        }
        Ok(())
    }

    /// Refuses (never cascades) when any note's direct `id_categoriaNota`
    /// field references the category. Link records alone do not block
    /// deletion; only notes that were re-categorized through an update
    /// carry the direct field.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self.store.get(collections::CATEGORIES, id)?.is_none() {
            return Err(Error::not_found("La categoría no existe"));
        }

        let referencing = self
            .store
            .query(collections::NOTES, &[("id_categoriaNota", json!(id))])?;
        if !referencing.is_empty() {
            return Err(Error::conflict(
                "La categoría no puede eliminarse porque tiene notas relacionadas",
            ));
        }

        self.store.delete(collections::CATEGORIES, id)
    }
}
