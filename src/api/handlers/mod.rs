use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::error::Error;
use crate::models::*;
use crate::repo::{Backend, FEATURE_COST, TEMPLATE_COST};

use super::ApiError;

type ApiResult<T> = Result<T, ApiError>;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

// ============================================================
// Notes
// ============================================================

pub async fn create_note(
    State(backend): State<Backend>,
    Json(input): Json<CreateNoteInput>,
) -> ApiResult<Json<Value>> {
    let (Some(owner_id), Some(template_id), Some(title), Some(content)) = (
        input.owner_id,
        input.template_id,
        input.title,
        input.content,
    ) else {
        return Err(Error::validation("Faltan campos requeridos").into());
    };

    let category_id = match (input.category_id, input.category_name) {
        (Some(id), _) => id,
        (None, Some(name)) => backend.categories.get_or_create(&name)?,
        (None, None) => {
            return Err(
                Error::validation("Debes enviar 'id_categoriaNota' o 'categoria_nombre'").into(),
            )
        }
    };

    let note_id = backend.notes.create(&Note {
        id: String::new(),
        owner_id,
        template_id,
        title,
        content,
        tags: input.tags,
        drawing: input.drawing,
        state: input.state.unwrap_or_default(),
        favorite: false,
        background_animation: input.background_animation,
        background_color: input.background_color,
        category_id: None,
        created_at: None,
        updated_at: None,
    })?;

    backend.links.link(&note_id, &category_id)?;

    Ok(Json(json!({
        "ok": true,
        "id_nota": note_id,
        "id_categoriaNota": category_id,
    })))
}

pub async fn list_notes(
    State(backend): State<Backend>,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(backend.notes.list_by_owner(&owner_id)?))
}

pub async fn get_note(
    State(backend): State<Backend>,
    Path(note_id): Path<String>,
) -> ApiResult<Json<Note>> {
    backend
        .notes
        .get(&note_id)?
        .map(Json)
        .ok_or_else(|| Error::not_found("Nota no encontrada").into())
}

pub async fn update_note(
    State(backend): State<Backend>,
    Path(note_id): Path<String>,
    Json(mut input): Json<UpdateNoteInput>,
) -> ApiResult<Json<Value>> {
    // A category sent by name is resolved first; either way the note is
    // re-linked and its direct category field stamped.
    if let Some(name) = input.category_name.take() {
        input.category_id = Some(backend.categories.get_or_create(&name)?);
    }
    if let Some(category_id) = &input.category_id {
        backend.links.link(&note_id, category_id)?;
    }

    if !backend.notes.update(&note_id, &input)? {
        tracing::debug!("update for missing note {note_id} was a no-op");
    }

    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_note(
    State(backend): State<Backend>,
    Path(note_id): Path<String>,
) -> ApiResult<Json<Value>> {
    backend.notes.delete(&note_id)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn toggle_favorite(
    State(backend): State<Backend>,
    Path(note_id): Path<String>,
    Json(input): Json<FavoriteInput>,
) -> ApiResult<Json<Value>> {
    let Some(favorite) = input.favorite else {
        return Err(Error::validation("Falta 'favorita': true/false").into());
    };

    backend.notes.update(
        &note_id,
        &UpdateNoteInput {
            favorite: Some(favorite),
            ..Default::default()
        },
    )?;

    let category_name = if favorite { "Favoritos" } else { "General" };
    let category_id = backend.categories.get_or_create(category_name)?;
    backend.links.link(&note_id, &category_id)?;

    Ok(Json(json!({
        "ok": true,
        "favorita": favorite,
        "id_categoriaNota": category_id,
    })))
}

// ============================================================
// Categories
// ============================================================

pub async fn list_categories(State(backend): State<Backend>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(backend.categories.all()?))
}

pub async fn create_category(
    State(backend): State<Backend>,
    Json(input): Json<CategoryNameInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Some(name) = input.name else {
        return Err(Error::validation("Falta 'nombre'").into());
    };

    let category = backend.categories.create(&name)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "ok": true,
            "id": category.id,
            "nombre": category.name,
        })),
    ))
}

pub async fn update_category(
    State(backend): State<Backend>,
    Path(category_id): Path<String>,
    Json(input): Json<CategoryNameInput>,
) -> ApiResult<Json<Value>> {
    let Some(name) = input.name else {
        return Err(Error::validation("Falta 'nombre'").into());
    };

    backend.categories.rename(&category_id, &name)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_category(
    State(backend): State<Backend>,
    Path(category_id): Path<String>,
) -> ApiResult<Json<Value>> {
    backend.categories.delete(&category_id)?;
    Ok(Json(json!({
        "ok": true,
        "msg": "Categoría eliminada correctamente",
    })))
}

pub async fn notes_by_category(
    State(backend): State<Backend>,
    Path((owner_id, category_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Note>>> {
    Ok(Json(backend.notes_by_category(&owner_id, &category_id)?))
}

// ============================================================
// Economy
// ============================================================

pub async fn purchase_template(
    State(backend): State<Backend>,
    Json(input): Json<PurchaseTemplateInput>,
) -> ApiResult<Json<Value>> {
    let (Some(user_id), Some(template_id)) = (input.user_id, input.template_id) else {
        return Err(Error::validation("Faltan 'id_usuario' o 'id_plantilla'").into());
    };

    let outcome = backend
        .economy
        .purchase_template(&user_id, &template_id, TEMPLATE_COST)?;

    let mensaje = match outcome {
        PurchaseOutcome::AlreadyOwned => "Ya tienes esta plantilla",
        PurchaseOutcome::Purchased { .. } => "Compra exitosa",
    };
    Ok(Json(json!({ "ok": true, "mensaje": mensaje })))
}

pub async fn unlocked_templates(
    State(backend): State<Backend>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(backend.economy.unlocked_templates(&user_id)?))
}

pub async fn check_feature(
    State(backend): State<Backend>,
    Path((user_id, feature)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let unlocked = backend.economy.feature_unlocked(&user_id, &feature)?;
    Ok(Json(json!({ "desbloqueado": unlocked })))
}

pub async fn purchase_feature(
    State(backend): State<Backend>,
    Json(input): Json<PurchaseFeatureInput>,
) -> ApiResult<Json<Value>> {
    let (Some(user_id), Some(feature)) = (input.user_id, input.feature) else {
        return Err(Error::validation("Faltan 'id_usuario' o 'feature'").into());
    };
    let cost = input.cost.unwrap_or(FEATURE_COST);

    let outcome = backend.economy.purchase_feature(&user_id, &feature, cost)?;

    let mensaje = match outcome {
        PurchaseOutcome::AlreadyOwned => "Ya lo tienes",
        PurchaseOutcome::Purchased { .. } => "Desbloqueado correctamente",
    };
    Ok(Json(json!({ "ok": true, "mensaje": mensaje })))
}

pub async fn unlocked_fonts(
    State(backend): State<Backend>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(backend.economy.unlocked_fonts(&user_id)?))
}

pub async fn unlocked_backgrounds(
    State(backend): State<Backend>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(backend.economy.unlocked_backgrounds(&user_id)?))
}
