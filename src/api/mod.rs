//! HTTP handlers for the LocalLibrary endpoints

pub mod accounts;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod extract;
pub mod genres;
pub mod health;
pub mod home;
pub mod loans;
pub mod openapi;


use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorForm, book::BookForm, book_instance::BookInstanceForm, genre::GenreForm,
        user::UserClaims,
    },
    session::{self, session_layer, Session},
    AppState,
};

pub use self::extract::JsonForm;

/// Extractor for the logged-in user; anonymous visitors are sent to the login page.
///
/// The session holds only the user id. Account and permissions are loaded on
/// every request, so a deleted account or a revoked permission takes effect
/// at once.
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let Some(user_id) = session::user_id(&session).await? else {
            return Err(AppError::LoginRequired(next));
        };

        match state.services.accounts.claims_for(user_id).await? {
            Some(claims) => Ok(AuthenticatedUser(claims)),
            None => {
                tracing::info!(user_id, "Session user no longer exists");
                session::flush(&session).await?;
                Err(AppError::LoginRequired(next))
            }
        }
    }
}

/// Logged-in user holding `can_mark_returned`.
///
/// Place it before any other extractor so the permission check runs before
/// the path or body is looked at.
pub struct Librarian(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for Librarian {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_can_mark_returned()?;
        Ok(Librarian(claims))
    }
}

/// Form as returned by the GET side of create/update views
#[derive(Serialize, ToSchema)]
#[aliases(
    AuthorFormView = FormView<AuthorForm>,
    BookFormView = FormView<BookForm>,
    GenreFormView = FormView<GenreForm>,
    BookInstanceFormView = FormView<BookInstanceForm>
)]
pub struct FormView<F>
where
    F: for<'a> ToSchema<'a>,
{
    /// Fields accepted on submission
    pub fields: Vec<String>,
    /// Current (or initial) values
    pub form: F,
}

impl<F> FormView<F>
where
    F: for<'a> ToSchema<'a>,
{
    pub fn new(fields: &[&str], form: F) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            form,
        }
    }
}

/// Integer primary key from a path segment; anything else does not exist
pub(crate) fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("No object with id {}", raw)))
}

/// UUID primary key from a path segment; malformed values do not exist
pub(crate) fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(format!("No book instance with id {}", raw)))
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home
        .route("/", get(home::index))
        // Accounts
        .route("/accounts/login", get(accounts::login_form).post(accounts::login))
        .route("/accounts/logout", post(accounts::logout))
        .route("/accounts/me", get(accounts::me))
        // Books
        .route("/books", get(books::list_books))
        .route("/books/create", get(books::create_book_form).post(books::create_book))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id/update", get(books::update_book_form).post(books::update_book))
        .route("/books/:id/delete", get(books::delete_book_confirm).post(books::delete_book))
        // Authors
        .route("/authors", get(authors::list_authors))
        .route("/authors/create", get(authors::create_author_form).post(authors::create_author))
        .route("/authors/:id", get(authors::get_author))
        .route("/authors/:id/update", get(authors::update_author_form).post(authors::update_author))
        .route("/authors/:id/delete", get(authors::delete_author_confirm).post(authors::delete_author))
        // Genres
        .route("/genres", get(genres::list_genres))
        .route("/genres/create", get(genres::create_genre_form).post(genres::create_genre))
        .route("/genres/:id", get(genres::get_genre))
        .route("/genres/:id/update", get(genres::update_genre_form).post(genres::update_genre))
        .route("/genres/:id/delete", get(genres::delete_genre_confirm).post(genres::delete_genre))
        // Book instances
        .route("/book-instances", get(book_instances::list_instances))
        .route(
            "/book-instances/create",
            get(book_instances::create_instance_form).post(book_instances::create_instance),
        )
        .route("/book-instances/:id", get(book_instances::get_instance))
        .route(
            "/book-instances/:id/update",
            get(book_instances::update_instance_form).post(book_instances::update_instance),
        )
        .route(
            "/book-instances/:id/delete",
            get(book_instances::delete_instance_confirm).post(book_instances::delete_instance),
        )
        // Loans
        .route("/mybooks", get(loans::my_borrowed))
        .route("/borrowed", get(loans::all_borrowed))
        .route("/book-instance/:id/renew", get(loans::renewal_form).post(loans::renew))
        .layer(session_layer(
            state.services.sessions.clone(),
            &state.config.session,
        ))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
