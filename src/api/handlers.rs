use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::types::{ErrorBody, SimplifiedMovie};
use crate::picker::PickError;
use crate::server::AppState;

pub const API_KEY_MISSING: &str = "TMDB API key no encontrada";
pub const NO_MOVIES: &str = "No se han encontrado películas";
pub const MOVIE_FAILED: &str = "Error al obtener la película";
pub const MOVIES_FAILED: &str = "Error al obtener las películas";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Config(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Upstream(&'static str),
}

impl ApiError {
    /// Map a picker failure to a caller-facing error. The cause is logged, not returned.
    fn from_pick(err: PickError, not_found: &'static str, failed: &'static str) -> Self {
        match err {
            PickError::Exhausted | PickError::NoneFetched => ApiError::NotFound(not_found),
            PickError::Upstream(e) if e.is_not_found() => ApiError::NotFound(not_found),
            PickError::Upstream(e) => {
                error!(error = %e, "{}", failed);
                ApiError::Upstream(failed)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) | ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn random_movie(
    State(state): State<AppState>,
) -> Result<Json<SimplifiedMovie>, ApiError> {
    let details = state
        .picker
        .pick_one()
        .await
        .map_err(|e| ApiError::from_pick(e, NO_MOVIES, MOVIE_FAILED))?;

    Ok(Json(SimplifiedMovie::from_details(
        details,
        &state.config.tmdb.image_base_url,
    )))
}

pub async fn sort_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<SimplifiedMovie>>, ApiError> {
    let movies = state
        .picker
        .pick_batch()
        .await
        .map_err(|e| ApiError::from_pick(e, NO_MOVIES, MOVIES_FAILED))?;

    let image_base_url = &state.config.tmdb.image_base_url;
    Ok(Json(
        movies
            .into_iter()
            .map(|m| SimplifiedMovie::from_details(m, image_base_url))
            .collect(),
    ))
}
