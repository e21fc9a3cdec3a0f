//! Book instance (copy) endpoints

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstanceDetails, BookInstanceForm},
        pagination::{Page, PageQuery},
    },
    AppState,
};

use super::{parse_uuid, FormView, JsonForm, Librarian};

/// List all copies, by due date
#[utoipa::path(
    get,
    path = "/book-instances",
    tag = "book-instances",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of copies", body = crate::models::pagination::BookInstancePage),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_instances(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let page = state.services.inventory.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    tag = "book-instances",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy details", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_instance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.inventory.get_details(parse_uuid(&id)?).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    get,
    path = "/book-instances/create",
    tag = "book-instances",
    responses(
        (status = 200, description = "Copy form", body = crate::api::BookInstanceFormView),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn create_instance_form(Librarian(_librarian): Librarian) -> Json<FormView<BookInstanceForm>> {
    Json(FormView::new(
        &BookInstanceForm::FIELDS,
        BookInstanceForm::default(),
    ))
}

/// Create a copy and redirect to its book
#[utoipa::path(
    post,
    path = "/book-instances/create",
    tag = "book-instances",
    request_body = BookInstanceForm,
    responses(
        (status = 303, description = "Created, redirect to the owning book"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_instance(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    JsonForm(form): JsonForm<BookInstanceForm>,
) -> AppResult<Redirect> {
    let instance = state.services.inventory.create(&form).await?;
    Ok(Redirect::to(&format!("/books/{}", instance.book_id)))
}

#[utoipa::path(
    get,
    path = "/book-instances/{id}/update",
    tag = "book-instances",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy form", body = crate::api::BookInstanceFormView),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance_form(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FormView<BookInstanceForm>>> {
    let form = state.services.inventory.form(parse_uuid(&id)?).await?;
    Ok(Json(FormView::new(&BookInstanceForm::FIELDS, form)))
}

/// Update a copy and redirect to it
#[utoipa::path(
    post,
    path = "/book-instances/{id}/update",
    tag = "book-instances",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    request_body = BookInstanceForm,
    responses(
        (status = 303, description = "Updated, redirect to the copy"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_instance(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<BookInstanceForm>,
) -> AppResult<Redirect> {
    let instance = state.services.inventory.update(parse_uuid(&id)?, &form).await?;
    Ok(Redirect::to(&format!("/book-instances/{}", instance.id)))
}

#[utoipa::path(
    get,
    path = "/book-instances/{id}/delete",
    tag = "book-instances",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Copy to delete", body = BookInstanceDetails),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance_confirm(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.inventory.get_details(parse_uuid(&id)?).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    post,
    path = "/book-instances/{id}/delete",
    tag = "book-instances",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 303, description = "Deleted, redirect to the copy list"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    state.services.inventory.delete(parse_uuid(&id)?).await?;
    Ok(Redirect::to("/book-instances"))
}
