//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookSummary;
use super::form::{self, FormErrors, FormInput};

/// Genre row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Genre with the books filed under it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenreDetails {
    pub genre: Genre,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GenreForm {
    /// e.g. Science Fiction, French Poetry
    #[validate(length(min = 1, max = 200, message = "Enter a genre name of at most 200 characters."))]
    pub name: String,
}

impl GenreForm {
    pub const FIELDS: [&'static str; 1] = ["name"];

    pub fn check(&self) -> Result<(), FormErrors> {
        self.validate().map_err(|e| form::from_validation(&e))
    }
}

impl FormInput for GenreForm {}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
        }
    }
}
