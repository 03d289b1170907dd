use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::Config;
use crate::picker::MoviePicker;
use crate::tmdb::MovieCatalog;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub picker: Arc<MoviePicker>,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn MovieCatalog>) -> Self {
        let picker = MoviePicker::new(catalog, config.picker.clone(), config.tmdb.max_page);
        Self {
            config: Arc::new(config),
            picker: Arc::new(picker),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin(&state.config.cors.origin))
        .allow_methods([Method::GET]);

    Router::new()
        .route("/api/random-movie", get(crate::api::random_movie))
        .route("/api/sort-movies", get(crate::api::sort_movies))
        .fallback(fallback_handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::require_api_key,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allowed_origin(origin: &str) -> AllowOrigin {
    match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(e) => {
            warn!("Invalid CORS origin {:?}: {}, cross-origin requests disabled", origin, e);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    }
}

async fn fallback_handler() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
