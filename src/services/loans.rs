//! Loans service: borrowed-books views and renewals

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::BookInstanceDetails,
        pagination::{Page, PageQuery, PageWindow},
        renewal::{RenewBookForm, RenewalFormView, RenewalPolicy, DATE_FORMAT},
        today,
    },
    repository::Repository,
};

pub const MY_BORROWED_PER_PAGE: i64 = 5;
pub const ALL_BORROWED_PER_PAGE: i64 = 10;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: RenewalPolicy,
}

impl LoansService {
    pub fn new(repository: Repository, policy: RenewalPolicy) -> Self {
        Self { repository, policy }
    }

    /// Copies on loan to the given user
    pub async fn my_borrowed(
        &self,
        user_id: i32,
        query: &PageQuery,
    ) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.book_instances.count_borrowed_by(user_id).await?;
        let window = PageWindow::resolve(query, total, MY_BORROWED_PER_PAGE)?;
        let instances = self
            .repository
            .book_instances
            .borrowed_by(user_id, window.limit(), window.offset())
            .await?;
        Ok(window.into_page(instances))
    }

    /// Every copy currently on loan
    pub async fn all_borrowed(&self, query: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.book_instances.count_all_borrowed().await?;
        let window = PageWindow::resolve(query, total, ALL_BORROWED_PER_PAGE)?;
        let instances = self
            .repository
            .book_instances
            .all_borrowed(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(instances))
    }

    /// Renewal form pre-filled with the proposed date
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalFormView> {
        let book_instance = self.repository.book_instances.get_details(id).await?;
        let proposed = self.policy.proposed_date(today());
        Ok(RenewalFormView {
            book_instance,
            renewal_date: Some(proposed.format(DATE_FORMAT).to_string()),
        })
    }

    /// Validate the submitted date and set it as the copy's due date
    pub async fn renew(&self, id: Uuid, form: &RenewBookForm) -> AppResult<NaiveDate> {
        let book_instance = self.repository.book_instances.get_details(id).await?;

        match form.clean(&self.policy, today()) {
            Ok(due_back) => {
                self.repository
                    .book_instances
                    .update_due_back(id, due_back)
                    .await?;
                tracing::info!(instance_id = %id, %due_back, "Loan renewed");
                Ok(due_back)
            }
            Err(errors) => {
                let view = RenewalFormView {
                    book_instance,
                    renewal_date: form.renewal_date.clone(),
                };
                Err(AppError::invalid_form(&view, errors))
            }
        }
    }
}
