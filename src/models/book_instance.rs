//! Book instance (loanable copy) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::form::{self, FormErrors, FormInput};

/// Availability of a copy, stored as a single character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_code(), buf)
    }
}

/// Book instance row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Book instance joined with its title and borrower, used by list and detail views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceDetails {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    /// Due date already passed
    pub is_overdue: bool,
}

/// Book instance create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookInstanceForm {
    /// Book id
    #[validate(required(message = "This field is required."))]
    pub book: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Enter an imprint of at most 200 characters."))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Borrower user id
    pub borrower: Option<i32>,
    pub status: LoanStatus,
}

impl BookInstanceForm {
    pub const FIELDS: [&'static str; 5] = ["book", "imprint", "due_back", "borrower", "status"];

    pub fn check(&self) -> Result<(), FormErrors> {
        self.validate().map_err(|e| form::from_validation(&e))
    }
}

impl FormInput for BookInstanceForm {
    fn invalid_value(field: &str) -> &'static str {
        match field {
            "due_back" => form::INVALID_DATE,
            "book" | "borrower" | "status" => form::INVALID_CHOICE,
            _ => form::INVALID_VALUE,
        }
    }
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            book: Some(instance.book_id),
            imprint: instance.imprint.clone(),
            due_back: instance.due_back,
            borrower: instance.borrower_id,
            status: instance.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip_through_text() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(status.as_code().parse::<LoanStatus>(), Ok(status));
        }
        assert!("x".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_code() {
        assert_eq!(serde_json::to_string(&LoanStatus::OnLoan).unwrap(), "\"o\"");
        let parsed: LoanStatus = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(parsed, LoanStatus::Available);
    }

    #[test]
    fn new_copies_default_to_maintenance() {
        let form: BookInstanceForm =
            serde_json::from_str(r#"{"book": 1, "imprint": "Gollancz, 1974"}"#).unwrap();
        assert_eq!(form.status, LoanStatus::Maintenance);
        assert!(form.check().is_ok());
    }
}
