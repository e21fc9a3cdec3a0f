//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookDetails, BookForm},
        pagination::{Page, PageQuery},
        BookSummary,
    },
    AppState,
};

use super::{parse_id, FormView, JsonForm, Librarian};

/// List books, by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of books", body = crate::models::pagination::BookPage),
        (status = 404, description = "No such page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookSummary>>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(page))
}

/// Book with its author, genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book_details(parse_id(&id)?).await?;
    Ok(Json(book))
}

/// Empty book form
#[utoipa::path(
    get,
    path = "/books/create",
    tag = "books",
    responses(
        (status = 200, description = "Book form", body = crate::api::BookFormView),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn create_book_form(Librarian(_librarian): Librarian) -> Json<FormView<BookForm>> {
    Json(FormView::new(&BookForm::FIELDS, BookForm::default()))
}

/// Create a book and redirect to it
#[utoipa::path(
    post,
    path = "/books/create",
    tag = "books",
    request_body = BookForm,
    responses(
        (status = 303, description = "Created, redirect to the book"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 409, description = "ISBN already used"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    JsonForm(form): JsonForm<BookForm>,
) -> AppResult<Redirect> {
    let book = state.services.catalog.create_book(&form).await?;
    Ok(Redirect::to(&format!("/books/{}", book.id)))
}

/// Current values of a book
#[utoipa::path(
    get,
    path = "/books/{id}/update",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book form", body = crate::api::BookFormView),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book_form(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FormView<BookForm>>> {
    let form = state.services.catalog.book_form(parse_id(&id)?).await?;
    Ok(Json(FormView::new(&BookForm::FIELDS, form)))
}

/// Update a book and redirect to it
#[utoipa::path(
    post,
    path = "/books/{id}/update",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookForm,
    responses(
        (status = 303, description = "Updated, redirect to the book"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<BookForm>,
) -> AppResult<Redirect> {
    let book = state.services.catalog.update_book(parse_id(&id)?, &form).await?;
    Ok(Redirect::to(&format!("/books/{}", book.id)))
}

/// Book to confirm deletion of
#[utoipa::path(
    get,
    path = "/books/{id}/delete",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book to delete", body = Book),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book_confirm(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(parse_id(&id)?).await?;
    Ok(Json(book))
}

/// Delete a book and redirect to the list
#[utoipa::path(
    post,
    path = "/books/{id}/delete",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Deleted, redirect to the book list"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_book(parse_id(&id)?).await?;
    Ok(Redirect::to("/books"))
}
