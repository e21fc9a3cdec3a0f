//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod form;
pub mod genre;
pub mod pagination;
pub mod renewal;
pub mod user;

use chrono::{Local, NaiveDate};

// Re-export commonly used types
pub use author::{Author, AuthorDetails, AuthorForm};
pub use book::{Book, BookDetails, BookForm, BookSummary};
pub use book_instance::{BookInstance, BookInstanceDetails, BookInstanceForm, LoanStatus};
pub use genre::{Genre, GenreDetails, GenreForm};
pub use pagination::{Page, PageQuery, PageWindow};
pub use user::{Permission, User, UserClaims};

/// Current date in the server's local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
