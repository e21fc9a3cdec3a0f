//! Borrowed books and loan renewal endpoints

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book_instance::BookInstanceDetails,
        pagination::{Page, PageQuery},
        renewal::{RenewBookForm, RenewalFormView},
    },
    AppState,
};

use super::{parse_uuid, AuthenticatedUser, JsonForm, Librarian};

/// Copies on loan to the current user, earliest due first
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "Current user's loans", body = crate::models::pagination::BookInstancePage),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 404, description = "No such page")
    )
)]
pub async fn my_borrowed(
    AuthenticatedUser(claims): AuthenticatedUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let page = state
        .services
        .loans
        .my_borrowed(claims.user_id, &query)
        .await?;
    Ok(Json(page))
}

/// Every copy on loan, earliest due first
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    params(PageQuery),
    responses(
        (status = 200, description = "All loans", body = crate::models::pagination::BookInstancePage),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "No such page")
    )
)]
pub async fn all_borrowed(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstanceDetails>>> {
    let page = state.services.loans.all_borrowed(&query).await?;
    Ok(Json(page))
}

/// Renewal form with the proposed date (three weeks from today)
#[utoipa::path(
    get,
    path = "/book-instance/{id}/renew",
    tag = "loans",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Renewal form", body = RenewalFormView),
        (status = 303, description = "Not logged in, redirect to login"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RenewalFormView>> {
    let view = state.services.loans.renewal_form(parse_uuid(&id)?).await?;
    Ok(Json(view))
}

/// Set a new due date; redirects to all borrowed books on success
#[utoipa::path(
    post,
    path = "/book-instance/{id}/renew",
    tag = "loans",
    params(("id" = uuid::Uuid, Path, description = "Book instance ID")),
    request_body = RenewBookForm,
    responses(
        (status = 303, description = "Renewed, redirect to all borrowed books"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Invalid date; form redisplayed with errors", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew(
    Librarian(_librarian): Librarian,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonForm(form): JsonForm<RenewBookForm>,
) -> AppResult<Redirect> {
    state.services.loans.renew(parse_uuid(&id)?, &form).await?;
    Ok(Redirect::to("/borrowed"))
}
