//! Book instances (physical copies) service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceDetails, BookInstanceForm},
        form,
        pagination::{Page, PageQuery, PageWindow},
    },
    repository::Repository,
};

use super::catalog::reject_if_invalid;

pub const INSTANCES_PER_PAGE: i64 = 10;

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &PageQuery) -> AppResult<Page<BookInstanceDetails>> {
        let total = self.repository.book_instances.count().await?;
        let window = PageWindow::resolve(query, total, INSTANCES_PER_PAGE)?;
        let instances = self
            .repository
            .book_instances
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(instances))
    }

    pub async fn get_details(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        self.repository.book_instances.get_details(id).await
    }

    pub async fn form(&self, id: Uuid) -> AppResult<BookInstanceForm> {
        let instance = self.repository.book_instances.get_by_id(id).await?;
        Ok(BookInstanceForm::from(&instance))
    }

    pub async fn create(&self, form: &BookInstanceForm) -> AppResult<BookInstance> {
        let book_id = self.check_form(form).await?;
        let instance = self.repository.book_instances.create(form, book_id).await?;
        tracing::info!(instance_id = %instance.id, book_id, "Book instance created");
        Ok(instance)
    }

    pub async fn update(&self, id: Uuid, form: &BookInstanceForm) -> AppResult<BookInstance> {
        self.repository.book_instances.get_by_id(id).await?;
        let book_id = self.check_form(form).await?;
        let instance = self
            .repository
            .book_instances
            .update(id, form, book_id)
            .await?;
        tracing::info!(instance_id = %id, status = %instance.status, "Book instance updated");
        Ok(instance)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances.delete(id).await?;
        tracing::info!(instance_id = %id, "Book instance deleted");
        Ok(())
    }

    /// Field rules plus existence of the referenced book and borrower
    async fn check_form(&self, form: &BookInstanceForm) -> AppResult<i32> {
        let mut errors = form.check().err().unwrap_or_default();

        if let Some(book_id) = form.book {
            if !self.repository.books.exists(book_id).await? {
                form::add_error(&mut errors, "book", form::INVALID_CHOICE);
            }
        }
        if let Some(borrower_id) = form.borrower {
            if !self.repository.users.exists(borrower_id).await? {
                form::add_error(&mut errors, "borrower", form::INVALID_CHOICE);
            }
        }

        reject_if_invalid(form, errors)?;
        form.book
            .ok_or_else(|| AppError::Internal("Validated form has no book".to_string()))
    }
}
