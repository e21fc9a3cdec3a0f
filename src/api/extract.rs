//! JSON body extractor reporting failures as [`AppError`]s

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::{
    error::AppError,
    models::form::{self, FormErrors, FormInput},
};

/// Submitted form as JSON.
///
/// A body that is not JSON at all is a 400. A JSON object whose fields do
/// not fit the form's types is redisplayed as an invalid form, with the
/// message the form names for each offending field.
pub struct JsonForm<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonForm<T>
where
    T: DeserializeOwned + FormInput,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(raw) = axum::Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        parse_form(raw).map(JsonForm)
    }
}

/// Deserialize a submitted form, mapping type mismatches to field errors
pub(crate) fn parse_form<T>(raw: Value) -> Result<T, AppError>
where
    T: DeserializeOwned + FormInput,
{
    match serde_path_to_error::deserialize::<_, T>(&raw) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            let field = match e.path().iter().next() {
                Some(Segment::Map { key }) => key.clone(),
                _ => form::NON_FIELD_ERRORS.to_string(),
            };
            tracing::debug!(field = %field, "Rejected form value: {}", e.inner());

            let mut errors = FormErrors::new();
            let message = if field == form::NON_FIELD_ERRORS {
                form::INVALID_VALUE
            } else {
                T::invalid_value(&field)
            };
            form::add_error(&mut errors, &field, message);
            Err(AppError::InvalidForm { form: raw, errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{
        author::AuthorForm, book_instance::BookInstanceForm, renewal::RenewBookForm,
    };

    fn field_errors<T: DeserializeOwned + FormInput>(raw: Value) -> (Value, FormErrors) {
        match parse_form::<T>(raw) {
            Err(AppError::InvalidForm { form, errors }) => (form, errors),
            Err(other) => panic!("expected InvalidForm, got {:?}", other),
            Ok(_) => panic!("expected InvalidForm, got a parsed form"),
        }
    }

    #[test]
    fn non_string_renewal_date_is_not_a_valid_date() {
        let (form, errors) = field_errors::<RenewBookForm>(json!({ "renewal_date": 5 }));
        assert_eq!(errors["renewal_date"], vec![form::INVALID_DATE.to_string()]);
        assert_eq!(form["renewal_date"], 5);
    }

    #[test]
    fn impossible_calendar_date_is_reported_on_its_field() {
        let (_, errors) = field_errors::<AuthorForm>(json!({
            "first_name": "Ursula",
            "last_name": "Le Guin",
            "date_of_birth": "1929-13-40"
        }));
        assert_eq!(errors["date_of_birth"], vec![form::INVALID_DATE.to_string()]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_status_is_an_invalid_choice() {
        let (_, errors) = field_errors::<BookInstanceForm>(json!({ "book": 1, "status": "x" }));
        assert_eq!(errors["status"], vec![form::INVALID_CHOICE.to_string()]);
    }

    #[test]
    fn non_object_body_is_a_form_level_error() {
        let (_, errors) = field_errors::<RenewBookForm>(json!("2024-01-15"));
        assert!(errors.contains_key(form::NON_FIELD_ERRORS));
    }

    #[test]
    fn well_typed_body_parses() {
        let parsed: RenewBookForm = parse_form(json!({ "renewal_date": "2024-01-15" })).unwrap();
        assert_eq!(parsed.renewal_date.as_deref(), Some("2024-01-15"));
    }
}
