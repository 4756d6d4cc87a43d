use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A user's note.
///
/// Timestamps are server-assigned: `created_at` is written once and never
/// changes; `updated_at` is overwritten with the current server time on
/// every successful mutation, so it is monotonically non-decreasing.
/// Stored timestamps that are absent or unparseable read back as `None`
/// rather than failing the whole listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Store-assigned id. Not part of the stored body; attached on read.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "id_usuario")]
    pub owner_id: String,
    /// Trusted as-is; templates are not validated on create.
    #[serde(rename = "id_plantilla")]
    pub template_id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
    /// Free-form drawing payload produced by the client canvas.
    #[serde(rename = "dibujo", default)]
    pub drawing: Option<Value>,
    #[serde(rename = "estado", default)]
    pub state: NoteState,
    #[serde(rename = "favorita", default)]
    pub favorite: bool,
    #[serde(rename = "animacion_fondo", default)]
    pub background_animation: Option<String>,
    #[serde(rename = "color_fondo", default)]
    pub background_color: Option<String>,
    /// Direct category reference. Only stamped when an update resolves a
    /// category; freshly created notes carry it solely through link records.
    #[serde(
        rename = "id_categoriaNota",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
    #[serde(
        rename = "fecha_creacion",
        default,
        deserialize_with = "super::lenient_datetime"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "fecha_modificacion",
        default,
        deserialize_with = "super::lenient_datetime"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a note. Clients only send `activa` today; the
/// archived state exists for soft-delete flows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoteState {
    #[default]
    Activa,
    Archivada,
}

impl NoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activa => "activa",
            Self::Archivada => "archivada",
        }
    }
}

/// Body of `POST /api/notas/nueva`.
///
/// Required fields are `Option` so the handler can report missing input
/// as a 400 with the established message instead of a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNoteInput {
    #[serde(rename = "id_usuario")]
    pub owner_id: Option<String>,
    #[serde(rename = "id_plantilla")]
    pub template_id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "contenido")]
    pub content: Option<String>,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
    #[serde(rename = "dibujo", default)]
    pub drawing: Option<Value>,
    #[serde(rename = "estado", default)]
    pub state: Option<NoteState>,
    #[serde(rename = "animacion_fondo", default)]
    pub background_animation: Option<String>,
    #[serde(rename = "color_fondo", default)]
    pub background_color: Option<String>,
    /// Direct category id; alternative to `category_name`.
    #[serde(rename = "id_categoriaNota", default)]
    pub category_id: Option<String>,
    /// Category by name, resolved via get-or-create.
    #[serde(rename = "categoria_nombre", default)]
    pub category_name: Option<String>,
}

/// Partial update for a note. `None` fields are left untouched;
/// `updated_at` is always overwritten with server time regardless.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    #[serde(rename = "titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "contenido", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "etiquetas", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "dibujo", skip_serializing_if = "Option::is_none")]
    pub drawing: Option<Value>,
    #[serde(rename = "estado", skip_serializing_if = "Option::is_none")]
    pub state: Option<NoteState>,
    #[serde(rename = "favorita", skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(rename = "animacion_fondo", skip_serializing_if = "Option::is_none")]
    pub background_animation: Option<String>,
    #[serde(rename = "color_fondo", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "id_categoriaNota", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Request-level category routing; resolved by the handler and never
    /// persisted on the note body.
    #[serde(rename = "categoria_nombre", skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Body of `PUT /api/notas/favorita/{id_nota}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoriteInput {
    #[serde(rename = "favorita")]
    pub favorite: Option<bool>,
}
