mod handlers;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::Error;
use crate::repo::Backend;

pub fn create_router(backend: Backend) -> Router {
    let api = Router::new()
        // Notes
        .route("/notas/nueva", post(handlers::create_note))
        .route("/notas/{id_usuario}", get(handlers::list_notes))
        .route("/nota/{id_nota}", get(handlers::get_note))
        .route("/nota/{id_nota}", put(handlers::update_note))
        .route("/nota/{id_nota}", delete(handlers::delete_note))
        .route("/notas/favorita/{id_nota}", put(handlers::toggle_favorite))
        // Categories
        .route("/categorias", get(handlers::list_categories))
        .route("/categorias", post(handlers::create_category))
        .route("/categorias/{id_categoria}", put(handlers::update_category))
        .route("/categorias/{id_categoria}", delete(handlers::delete_category))
        .route(
            "/notas/categoria/{id_usuario}/{id_categoria}",
            get(handlers::notes_by_category),
        )
        // Economy
        .route("/usuarios/comprar_plantilla", post(handlers::purchase_template))
        .route(
            "/usuarios/plantillas_desbloqueadas/{id_usuario}",
            get(handlers::unlocked_templates),
        )
        // Feature names contain slashes (asset paths), hence the wildcard.
        .route(
            "/usuarios/check_feature/{id_usuario}/{*feature}",
            get(handlers::check_feature),
        )
        .route("/usuarios/comprar_feature", post(handlers::purchase_feature))
        .route(
            "/usuarios/fonts_unlocked/{id_usuario}",
            get(handlers::unlocked_fonts),
        )
        .route(
            "/usuarios/unlocked_backgrounds/{id_usuario}",
            get(handlers::unlocked_backgrounds),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(backend)
}

/// Maps the typed error taxonomy to client responses. Response keys and
/// messages match what the mobile clients already parse; store failures
/// are logged in full and surfaced as a generic 500.
pub struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": msg }),
            ),
            Error::InsufficientFunds { balance } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "ok": false,
                    "error": format!("Monedas insuficientes. Tienes {balance}"),
                }),
            ),
            Error::UserNotFound => (
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "Usuario no existe" }),
            ),
            Error::Store(e) => {
                tracing::error!("store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Error interno del servidor" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}
