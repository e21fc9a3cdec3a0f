//! Book (title) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book_instance::BookInstanceDetails;
use super::form::{self, FormErrors, FormInput};
use super::genre::Genre;

/// Book row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "last, first" of the author, if any
    pub author_name: Option<String>,
}

/// Reference to the author of a book
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorRef {
    pub id: i32,
    pub name: String,
}

/// Book with author, genres and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<AuthorRef>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstanceDetails>,
}

/// Book create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Enter a title of at most 200 characters."))]
    pub title: String,
    /// Author id
    #[validate(required(message = "This field is required."))]
    pub author: Option<i32>,
    /// Brief description of the book
    #[validate(length(min = 1, max = 1000, message = "Enter a summary of at most 1000 characters."))]
    pub summary: String,
    /// 13 character ISBN number
    #[validate(length(equal = 13, message = "ISBN must be exactly 13 characters."))]
    pub isbn: String,
    /// Genre ids
    #[validate(length(min = 1, message = "This field is required."))]
    pub genre: Vec<i32>,
}

impl FormInput for BookForm {
    fn invalid_value(field: &str) -> &'static str {
        match field {
            "author" | "genre" => form::INVALID_CHOICE,
            _ => form::INVALID_VALUE,
        }
    }
}

impl BookForm {
    pub const FIELDS: [&'static str; 5] = ["title", "author", "summary", "isbn", "genre"];

    pub fn check(&self) -> Result<(), FormErrors> {
        self.validate().map_err(|e| form::from_validation(&e))
    }

    /// Genre ids without repeats, in submission order
    pub fn genre_ids(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(self.genre.len());
        for id in &self.genre {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    pub fn from_book(book: &Book, genres: &[Genre]) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author_id,
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: genres.iter().map(|g| g.id).collect(),
        }
    }
}
