use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{DeleteAck, ListParams, Movie, MovieDraft, MoviePatch},
};

/// JSON extractor and responder whose rejections use the `{"erro": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = state.config.cors_layer();
    Router::new()
        .route("/api/movies", get(list_movies).post(create_movie))
        .route(
            "/api/movies/{id}",
            get(get_movie).put(replace_movie).patch(update_movie).delete(delete_movie),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> AppResult<AppJson<Vec<Movie>>> {
    let filter = params.into_filter();
    Ok(AppJson(state.store.list(&filter).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<AppJson<Movie>> {
    Ok(AppJson(state.store.get(&id).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    AppJson(draft): AppJson<MovieDraft>,
) -> AppResult<(StatusCode, AppJson<Movie>)> {
    let input = draft.into_input()?;
    let movie = state.store.create(input).await?;
    Ok((StatusCode::CREATED, AppJson(movie)))
}

pub async fn replace_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(draft): AppJson<MovieDraft>,
) -> AppResult<AppJson<Movie>> {
    let input = draft.into_input()?;
    Ok(AppJson(state.store.replace(&id, input).await?))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<MoviePatch>,
) -> AppResult<AppJson<Movie>> {
    let changes = patch.into_changes()?;
    Ok(AppJson(state.store.update(&id, changes).await?))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<AppJson<DeleteAck>> {
    state.store.delete(&id).await?;
    Ok(AppJson(DeleteAck { sucesso: true }))
}
