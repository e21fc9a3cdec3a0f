//! Field-level form errors shared by every create/update form

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Field name to the messages reported for it
pub type FormErrors = BTreeMap<String, Vec<String>>;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_VALUE: &str = "Enter a valid value.";
/// Key for errors that belong to the form as a whole
pub const NON_FIELD_ERRORS: &str = "__all__";

/// A submitted form body.
///
/// Names the message reported when a field's value has the wrong type,
/// such as a number where a date string is expected.
pub trait FormInput {
    fn invalid_value(field: &str) -> &'static str {
        let _ = field;
        INVALID_VALUE
    }
}

/// Append a message for `field`
pub fn add_error(errors: &mut FormErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// Flatten `validator` output into form errors, falling back to the rule code
/// when a rule carries no message.
pub fn from_validation(errors: &ValidationErrors) -> FormErrors {
    let mut out = FormErrors::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            add_error(&mut out, &field.to_string(), message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "This field is required."))]
        name: String,
        #[validate(length(max = 3))]
        code: String,
    }

    #[test]
    fn collects_messages_and_codes() {
        let sample = Sample {
            name: String::new(),
            code: "toolong".to_string(),
        };
        let errors = from_validation(&sample.validate().unwrap_err());
        assert_eq!(errors["name"], vec![REQUIRED.to_string()]);
        assert_eq!(errors["code"], vec!["length".to_string()]);
    }

    struct Dated;

    impl FormInput for Dated {
        fn invalid_value(field: &str) -> &'static str {
            match field {
                "born" => INVALID_DATE,
                _ => INVALID_VALUE,
            }
        }
    }

    #[test]
    fn form_input_names_field_messages() {
        assert_eq!(Dated::invalid_value("born"), INVALID_DATE);
        assert_eq!(Dated::invalid_value("name"), INVALID_VALUE);
    }

    #[test]
    fn add_error_accumulates_per_field() {
        let mut errors = FormErrors::new();
        add_error(&mut errors, "isbn", "first");
        add_error(&mut errors, "isbn", "second");
        assert_eq!(errors["isbn"].len(), 2);
    }
}
