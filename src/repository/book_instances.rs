//! Book instances repository: copies, loans and the borrowed-books filters

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceDetails, BookInstanceForm, LoanStatus},
        today,
    },
};

/// Copies joined with their title and borrower.
///
/// `$1` is today's date from the server clock, the same one renewals use.
const DETAILS_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back, bi.status,
           bi.borrower_id, u.username AS borrower_username,
           (bi.due_back IS NOT NULL AND bi.due_back < $1) AS is_overdue
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "SELECT id, book_id, imprint, due_back, status, borrower_id FROM book_instances WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    pub async fn get_details(&self, id: Uuid) -> AppResult<BookInstanceDetails> {
        let query = format!("{} WHERE bi.id = $2", DETAILS_SELECT);
        sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(today())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// One page of all copies, by due date
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!(
            "{} ORDER BY bi.due_back, bi.id LIMIT $2 OFFSET $3",
            DETAILS_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(today())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// All copies of a title
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!("{} WHERE bi.book_id = $2 ORDER BY bi.due_back, bi.id", DETAILS_SELECT);
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(today())
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    // =========================================================================
    // BORROWED
    // =========================================================================

    pub async fn count_borrowed_by(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(LoanStatus::OnLoan)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn count_all_borrowed(&self) -> AppResult<i64> {
        self.count_by_status(LoanStatus::OnLoan).await
    }

    /// Copies on loan to `user_id`, earliest due date first
    pub async fn borrowed_by(
        &self,
        user_id: i32,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!(
            "{} WHERE bi.borrower_id = $2 AND bi.status = $3 ORDER BY bi.due_back, bi.id LIMIT $4 OFFSET $5",
            DETAILS_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(today())
            .bind(user_id)
            .bind(LoanStatus::OnLoan)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    /// Copies on loan to anyone, earliest due date first
    pub async fn all_borrowed(&self, limit: i64, offset: i64) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!(
            "{} WHERE bi.status = $2 ORDER BY bi.due_back, bi.id LIMIT $3 OFFSET $4",
            DETAILS_SELECT
        );
        let instances = sqlx::query_as::<_, BookInstanceDetails>(&query)
            .bind(today())
            .bind(LoanStatus::OnLoan)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(instances)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    pub async fn create(&self, form: &BookInstanceForm, book_id: i32) -> AppResult<BookInstance> {
        let instance = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id, imprint, due_back, status, borrower_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(&form.imprint)
        .bind(form.due_back)
        .bind(form.status)
        .bind(form.borrower)
        .fetch_one(&self.pool)
        .await?;
        Ok(instance)
    }

    pub async fn update(
        &self,
        id: Uuid,
        form: &BookInstanceForm,
        book_id: i32,
    ) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET book_id = $1, imprint = $2, due_back = $3, status = $4, borrower_id = $5
            WHERE id = $6
            RETURNING id, book_id, imprint, due_back, status, borrower_id
            "#,
        )
        .bind(book_id)
        .bind(&form.imprint)
        .bind(form.due_back)
        .bind(form.status)
        .bind(form.borrower)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Set the due date of a copy, leaving every other column alone
    pub async fn update_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
