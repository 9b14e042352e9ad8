//! Genre, language and home page summary endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{CreateGenre, CreateLanguage, Genre, Language},
    services::catalog::LibrarySummary,
};

use super::AuthenticatedUser;

/// Header carrying the caller's session id for the visit counter
const SESSION_HEADER: &str = "x-session-id";

/// List all genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "catalog",
    responses(
        (status = 200, description = "List of genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 403, description = "Capability missing"),
        (status = 409, description = "Genre already exists (names are case-insensitive)")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    claims.require_mark_returned()?;

    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created = state.services.catalog.create_genre(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List all languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "catalog",
    responses(
        (status = 200, description = "List of languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateLanguage,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 403, description = "Capability missing"),
        (status = 409, description = "Language already exists")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLanguage>,
) -> AppResult<(StatusCode, Json<Language>)> {
    claims.require_mark_returned()?;

    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let created = state.services.catalog.create_language(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Home page summary: catalog counts plus a per-session visit counter.
/// The session id comes from the caller; sessions themselves are owned by
/// the presentation layer.
#[utoipa::path(
    get,
    path = "/summary",
    tag = "catalog",
    params(
        ("x-session-id" = String, Header, description = "Caller session id")
    ),
    responses(
        (status = 200, description = "Library summary", body = LibrarySummary),
        (status = 400, description = "Missing session id")
    )
)]
pub async fn summary(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
) -> AppResult<Json<LibrarySummary>> {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", SESSION_HEADER)))?;

    let summary = state.services.catalog.summary(session_id).await?;
    Ok(Json(summary))
}
