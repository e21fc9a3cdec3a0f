//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, authors, book_instances, books, genres, health, home, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "0.1.0",
        description = "Library catalog, loans and renewals",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        home::index,
        // Accounts
        accounts::login_form,
        accounts::login,
        accounts::logout,
        accounts::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book_form,
        books::create_book,
        books::update_book_form,
        books::update_book,
        books::delete_book_confirm,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author_form,
        authors::create_author,
        authors::update_author_form,
        authors::update_author,
        authors::delete_author_confirm,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre_form,
        genres::create_genre,
        genres::update_genre_form,
        genres::update_genre,
        genres::delete_genre_confirm,
        genres::delete_genre,
        // Book instances
        book_instances::list_instances,
        book_instances::get_instance,
        book_instances::create_instance_form,
        book_instances::create_instance,
        book_instances::update_instance_form,
        book_instances::update_instance,
        book_instances::delete_instance_confirm,
        book_instances::delete_instance,
        // Loans
        loans::my_borrowed,
        loans::all_borrowed,
        loans::renewal_form,
        loans::renew,
    ),
    components(
        schemas(
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::BookForm,
            crate::models::book::AuthorRef,
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorForm,
            crate::models::genre::Genre,
            crate::models::genre::GenreDetails,
            crate::models::genre::GenreForm,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::BookInstanceForm,
            crate::models::book_instance::LoanStatus,
            // Pages and forms
            crate::models::pagination::AuthorPage,
            crate::models::pagination::BookPage,
            crate::models::pagination::GenrePage,
            crate::models::pagination::BookInstancePage,
            crate::api::AuthorFormView,
            crate::api::BookFormView,
            crate::api::GenreFormView,
            crate::api::BookInstanceFormView,
            // Loans
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewalFormView,
            // Accounts
            crate::models::user::LoginRequest,
            crate::models::user::UserInfo,
            accounts::LoginForm,
            // Home
            home::HomeResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "home", description = "Site overview"),
        (name = "accounts", description = "Session login"),
        (name = "books", description = "Books"),
        (name = "authors", description = "Authors"),
        (name = "genres", description = "Genres"),
        (name = "book-instances", description = "Physical copies"),
        (name = "loans", description = "Borrowed books and renewals")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
