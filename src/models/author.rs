//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::BookSummary;
use super::form::{self, FormErrors, FormInput};

/// Author row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name, "last, first"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books they wrote
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetails {
    pub author: Author,
    pub books: Vec<BookSummary>,
}

/// Author create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "Enter a first name of at most 100 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Enter a last name of at most 100 characters."))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Labelled "Died"
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorForm {
    pub const FIELDS: [&'static str; 4] = ["first_name", "last_name", "date_of_birth", "date_of_death"];

    /// Field rules plus the birth/death ordering check
    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => form::from_validation(&e),
        };

        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if died < born {
                form::add_error(
                    &mut errors,
                    "date_of_death",
                    "Date of death cannot be before date of birth.",
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl FormInput for AuthorForm {
    fn invalid_value(field: &str) -> &'static str {
        match field {
            "date_of_birth" | "date_of_death" => form::INVALID_DATE,
            _ => form::INVALID_VALUE,
        }
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn display_name_is_last_then_first() {
        let author = Author {
            id: 1,
            first_name: "Ursula".to_string(),
            last_name: "Le Guin".to_string(),
            date_of_birth: date(1929, 10, 21),
            date_of_death: date(2018, 1, 22),
        };
        assert_eq!(author.display_name(), "Le Guin, Ursula");
    }

    #[test]
    fn death_before_birth_is_rejected() {
        let form = AuthorForm {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            date_of_birth: date(2000, 1, 1),
            date_of_death: date(1999, 1, 1),
        };
        let errors = form.check().unwrap_err();
        assert!(errors.contains_key("date_of_death"));
    }

    #[test]
    fn names_are_required() {
        let errors = AuthorForm::default().check().unwrap_err();
        assert!(errors.contains_key("first_name"));
        assert!(errors.contains_key("last_name"));
    }
}
