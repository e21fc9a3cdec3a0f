//! Home page

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    session::{self, Session},
    AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status `a`
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Earlier visits in this session
    pub num_visits: i64,
}

/// Catalog counts and the session's visit counter
#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    responses(
        (status = 200, description = "Site overview", body = HomeResponse)
    )
)]
pub async fn index(State(state): State<AppState>, session: Session) -> AppResult<Json<HomeResponse>> {
    let counts = state.services.catalog.counts().await?;
    let num_visits = session::record_visit(&session).await?;

    Ok(Json(HomeResponse {
        num_books: counts.num_books,
        num_instances: counts.num_instances,
        num_instances_available: counts.num_instances_available,
        num_authors: counts.num_authors,
        num_visits,
    }))
}
