//! Loan renewal rule and form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::CatalogConfig;

use super::book_instance::BookInstanceDetails;
use super::form::{self, FormErrors, FormInput};

/// Date format accepted by the renewal form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than {weeks} weeks ahead")]
    TooFarAhead { weeks: i64 },
}

/// Bounds on how far a loan may be extended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    pub proposal_weeks: i64,
    pub max_weeks: i64,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            proposal_weeks: 3,
            max_weeks: 4,
        }
    }
}

impl From<&CatalogConfig> for RenewalPolicy {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            proposal_weeks: config.renewal_proposal_weeks,
            max_weeks: config.max_renewal_weeks,
        }
    }
}

impl RenewalPolicy {
    /// Date pre-filled on the renewal form
    pub fn proposed_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.proposal_weeks)
    }

    /// Latest date a renewal may be set to (inclusive)
    pub fn latest_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.max_weeks)
    }

    /// Accept `date` when `today <= date <= today + max_weeks`
    pub fn validate(&self, date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
        if date < today {
            return Err(RenewalError::InPast);
        }
        if date > self.latest_date(today) {
            return Err(RenewalError::TooFarAhead {
                weeks: self.max_weeks,
            });
        }
        Ok(date)
    }
}

/// Submitted renewal form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// New due date (YYYY-MM-DD), between now and 4 weeks (default 3)
    #[serde(default)]
    pub renewal_date: Option<String>,
}

impl FormInput for RenewBookForm {
    fn invalid_value(_field: &str) -> &'static str {
        form::INVALID_DATE
    }
}

impl RenewBookForm {
    /// Parse and validate the submitted date
    pub fn clean(&self, policy: &RenewalPolicy, today: NaiveDate) -> Result<NaiveDate, FormErrors> {
        let mut errors = FormErrors::new();

        let raw = match self.renewal_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                form::add_error(&mut errors, "renewal_date", form::REQUIRED);
                return Err(errors);
            }
        };

        let date = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                form::add_error(&mut errors, "renewal_date", form::INVALID_DATE);
                return Err(errors);
            }
        };

        policy.validate(date, today).map_err(|e| {
            form::add_error(&mut errors, "renewal_date", e.to_string());
            errors
        })
    }
}

/// Renewal form as displayed: the copy and the date field
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalFormView {
    pub book_instance: BookInstanceDetails,
    pub renewal_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn submit(date: &str) -> RenewBookForm {
        RenewBookForm {
            renewal_date: Some(date.to_string()),
        }
    }

    #[test]
    fn proposes_three_weeks_ahead() {
        let policy = RenewalPolicy::default();
        assert_eq!(policy.proposed_date(day(2024, 1, 1)), day(2024, 1, 22));
    }

    #[test]
    fn rejects_dates_in_the_past() {
        let policy = RenewalPolicy::default();
        assert_eq!(
            policy.validate(day(2023, 12, 31), day(2024, 1, 1)),
            Err(RenewalError::InPast)
        );
    }

    #[test]
    fn rejects_dates_more_than_four_weeks_ahead() {
        let policy = RenewalPolicy::default();
        let today = day(2024, 1, 1);
        assert_eq!(
            policy.validate(day(2024, 2, 15), today),
            Err(RenewalError::TooFarAhead { weeks: 4 })
        );
        assert!(policy.validate(day(2024, 1, 30), today).is_err());
    }

    #[test]
    fn accepts_the_whole_window_inclusive() {
        let policy = RenewalPolicy::default();
        let today = day(2024, 1, 1);
        for offset in 0..=28 {
            let date = today + Duration::days(offset);
            assert_eq!(policy.validate(date, today), Ok(date));
        }
    }

    #[test]
    fn error_messages_match_form_wording() {
        assert_eq!(RenewalError::InPast.to_string(), "Invalid date - renewal in past");
        assert_eq!(
            RenewalError::TooFarAhead { weeks: 4 }.to_string(),
            "Invalid date - renewal more than 4 weeks ahead"
        );
    }

    #[test]
    fn clean_accepts_valid_submission() {
        let policy = RenewalPolicy::default();
        assert_eq!(
            submit("2024-01-15").clean(&policy, day(2024, 1, 1)),
            Ok(day(2024, 1, 15))
        );
    }

    #[test]
    fn clean_reports_field_errors() {
        let policy = RenewalPolicy::default();
        let today = day(2024, 1, 1);

        let errors = submit("2023-12-31").clean(&policy, today).unwrap_err();
        assert_eq!(errors["renewal_date"], vec!["Invalid date - renewal in past".to_string()]);

        let errors = submit("15/01/2024").clean(&policy, today).unwrap_err();
        assert_eq!(errors["renewal_date"], vec!["Enter a valid date.".to_string()]);

        let errors = RenewBookForm::default().clean(&policy, today).unwrap_err();
        assert_eq!(errors["renewal_date"], vec![form::REQUIRED.to_string()]);
    }
}
