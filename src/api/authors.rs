//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        pagination::{Page, PageQuery},
    },
    AppState,
};

use super::{parse_id, FormView, JsonForm, Librarian};

/// List authors, by last then first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of authors", body = crate::models::pagination::AuthorPage),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Author>>> {
    let page = state.services.catalog.list_authors(&query).await?;
    Ok(Json(page))
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<AuthorDetails>> {
    let author = state.services.catalog.get_author_details(parse_id(&id)?).await?;
    Ok(Json(author))
}

#[utoipa::path(
    get,
    path = "/authors/create",
    tag = "authors",
    responses(
        (status = 200, description = "Author form", body = crate::api::AuthorFormView),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn create_author_form(Librarian(_librarian): Librarian) -> Json<FormView<AuthorForm>> {
    Json(FormView::new(&AuthorForm::FIELDS, AuthorForm::default()))
}

#[utoipa::path(
    post,
    path = "/authors/create",
    tag = "authors",
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Created, redirect to the author"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    JsonForm(form): JsonForm<AuthorForm>,
) -> AppResult<Redirect> {
    let author = state.services.catalog.create_author(&form).await?;
    Ok(Redirect::to(&format!("/authors/{}", author.id)))
}

#[utoipa::path(
    get,
    path = "/authors/{id}/update",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author form", body = crate::api::AuthorFormView),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author_form(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FormView<AuthorForm>>> {
    let author = state.services.catalog.get_author(parse_id(&id)?).await?;
    Ok(Json(FormView::new(&AuthorForm::FIELDS, AuthorForm::from(&author))))
}

#[utoipa::path(
    post,
    path = "/authors/{id}/update",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Updated, redirect to the author"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Author not found"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<AuthorForm>,
) -> AppResult<Redirect> {
    let author = state.services.catalog.update_author(parse_id(&id)?, &form).await?;
    Ok(Redirect::to(&format!("/authors/{}", author.id)))
}

#[utoipa::path(
    get,
    path = "/authors/{id}/delete",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author to delete", body = Author),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author_confirm(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.get_author(parse_id(&id)?).await?;
    Ok(Json(author))
}

/// Delete an author; their books lose the author reference
#[utoipa::path(
    post,
    path = "/authors/{id}/delete",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 303, description = "Deleted, redirect to the author list"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_author(parse_id(&id)?).await?;
    Ok(Redirect::to("/authors"))
}
