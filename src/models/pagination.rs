//! Page-number pagination for list views

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::{
    author::Author,
    book::BookSummary,
    book_instance::BookInstanceDetails,
    genre::Genre,
};

/// `?page=` query parameter. Kept as text so that garbage yields 404 instead
/// of a rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number, or `last`
    pub page: Option<String>,
}

/// One page of a list view
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AuthorPage = Page<Author>,
    BookPage = Page<BookSummary>,
    GenrePage = Page<Genre>,
    BookInstancePage = Page<BookInstanceDetails>
)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Objects on this page
    pub items: Vec<T>,
    /// Total number of objects across all pages
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Objects per page
    pub per_page: i64,
    /// Number of pages (at least 1)
    pub num_pages: i64,
}

/// Resolved position of a requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
}

impl PageWindow {
    /// Resolve `query` against a list of `total` objects.
    ///
    /// Page 1 always exists, even for an empty list. Anything below 1, past
    /// the last page or not a number is reported as not found.
    pub fn resolve(query: &PageQuery, total: i64, per_page: i64) -> AppResult<Self> {
        let num_pages = if total <= 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };

        let page = match query.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some("last") => num_pages,
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::NotFound("That page number is not an integer".to_string())
            })?,
        };

        if page < 1 {
            return Err(AppError::NotFound(
                "That page number is less than 1".to_string(),
            ));
        }
        if page > num_pages {
            return Err(AppError::NotFound(
                "That page contains no results".to_string(),
            ));
        }

        Ok(Self {
            page,
            per_page,
            total,
            num_pages,
        })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Wrap the fetched objects
    pub fn into_page<T>(self, items: Vec<T>) -> Page<T>
    where
        T: for<'a> ToSchema<'a>,
    {
        Page {
            items,
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            num_pages: self.num_pages,
        }
    }
}
