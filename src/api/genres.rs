//! Genre endpoints

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        genre::{Genre, GenreDetails, GenreForm},
        pagination::{Page, PageQuery},
    },
    AppState,
};

use super::{parse_id, FormView, JsonForm, Librarian};

#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of genres", body = crate::models::pagination::GenrePage),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Genre>>> {
    let page = state.services.catalog.list_genres(&query).await?;
    Ok(Json(page))
}

/// Genre with the books filed under it
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre details", body = GenreDetails),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GenreDetails>> {
    let genre = state.services.catalog.get_genre_details(parse_id(&id)?).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    get,
    path = "/genres/create",
    tag = "genres",
    responses(
        (status = 200, description = "Genre form", body = crate::api::GenreFormView),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn create_genre_form(Librarian(_librarian): Librarian) -> Json<FormView<GenreForm>> {
    Json(FormView::new(&GenreForm::FIELDS, GenreForm::default()))
}

#[utoipa::path(
    post,
    path = "/genres/create",
    tag = "genres",
    request_body = GenreForm,
    responses(
        (status = 303, description = "Created, redirect to the genre"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 409, description = "Genre name already used"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_genre(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    JsonForm(form): JsonForm<GenreForm>,
) -> AppResult<Redirect> {
    let genre = state.services.catalog.create_genre(&form).await?;
    Ok(Redirect::to(&format!("/genres/{}", genre.id)))
}

#[utoipa::path(
    get,
    path = "/genres/{id}/update",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre form", body = crate::api::GenreFormView),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre_form(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FormView<GenreForm>>> {
    let genre = state.services.catalog.get_genre(parse_id(&id)?).await?;
    Ok(Json(FormView::new(&GenreForm::FIELDS, GenreForm::from(&genre))))
}

#[utoipa::path(
    post,
    path = "/genres/{id}/update",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = GenreForm,
    responses(
        (status = 303, description = "Updated, redirect to the genre"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Genre not found"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_genre(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<GenreForm>,
) -> AppResult<Redirect> {
    let genre = state.services.catalog.update_genre(parse_id(&id)?, &form).await?;
    Ok(Redirect::to(&format!("/genres/{}", genre.id)))
}

#[utoipa::path(
    get,
    path = "/genres/{id}/delete",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre to delete", body = Genre),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre_confirm(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.catalog.get_genre(parse_id(&id)?).await?;
    Ok(Json(genre))
}

#[utoipa::path(
    post,
    path = "/genres/{id}/delete",
    tag = "genres",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 303, description = "Deleted, redirect to the genre list"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_genre(parse_id(&id)?).await?;
    Ok(Redirect::to("/genres"))
}
