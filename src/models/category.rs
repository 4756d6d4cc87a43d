use serde::{Deserialize, Serialize};

/// A named grouping for notes.
///
/// Name uniqueness is enforced by lookup-before-create, not by a store
/// constraint; concurrent get-or-create calls with the same new name can
/// still race a duplicate into existence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    /// Defaults to empty on read; old documents may lack the field.
    #[serde(rename = "nombre", default)]
    pub name: String,
}

/// A note–category association. Links are append-only: relinking a note
/// creates a new record without retiring earlier ones, so a note's link
/// history accumulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteCategoryLink {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "id_nota")]
    pub note_id: String,
    #[serde(rename = "id_categoriaNota")]
    pub category_id: String,
}

/// Body of `POST /api/categorias` and `PUT /api/categorias/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryNameInput {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
}
