//! Catalog management service: books, authors and genres

use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorForm},
        book::{AuthorRef, Book, BookDetails, BookForm, BookSummary},
        book_instance::LoanStatus,
        form::{self, FormErrors},
        genre::{Genre, GenreDetails, GenreForm},
        pagination::{Page, PageQuery, PageWindow},
    },
    repository::Repository,
};

pub const BOOKS_PER_PAGE: i64 = 5;
pub const AUTHORS_PER_PAGE: i64 = 5;
pub const GENRES_PER_PAGE: i64 = 5;

/// Aggregate counts shown on the home page
#[derive(Debug, Clone, Copy)]
pub struct CatalogCounts {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        Ok(CatalogCounts {
            num_books: self.repository.books.count().await?,
            num_instances: self.repository.book_instances.count().await?,
            num_instances_available: self
                .repository
                .book_instances
                .count_by_status(LoanStatus::Available)
                .await?,
            num_authors: self.repository.authors.count().await?,
        })
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, query: &PageQuery) -> AppResult<Page<BookSummary>> {
        let total = self.repository.books.count().await?;
        let window = PageWindow::resolve(query, total, BOOKS_PER_PAGE)?;
        let books = self
            .repository
            .books
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(books))
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Book with author, genres and copies
    pub async fn get_book_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => {
                let author = self.repository.authors.get_by_id(author_id).await?;
                Some(AuthorRef {
                    id: author.id,
                    name: author.display_name(),
                })
            }
            None => None,
        };
        let genres = self.repository.genres.for_book(id).await?;
        let copies = self.repository.book_instances.for_book(id).await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            genres,
            copies,
        })
    }

    /// Current values of a book as its update form
    pub async fn book_form(&self, id: i32) -> AppResult<BookForm> {
        let book = self.repository.books.get_by_id(id).await?;
        let genres = self.repository.genres.for_book(id).await?;
        Ok(BookForm::from_book(&book, &genres))
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        self.check_book_form(form).await?;
        let book = self.repository.books.create(form).await?;
        tracing::info!(book_id = book.id, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await?;
        self.check_book_form(form).await?;
        let book = self.repository.books.update(id, form).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    /// Delete a book; fails with a conflict while copies of it exist
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        match self.repository.books.delete(id).await {
            Err(AppError::Database(e))
                if e.as_database_error()
                    .map(|d| d.is_foreign_key_violation())
                    .unwrap_or(false) =>
            {
                Err(AppError::Conflict(format!(
                    "Book with id {} still has copies; delete them first",
                    id
                )))
            }
            Err(e) => Err(e),
            Ok(()) => {
                tracing::info!(book_id = id, "Book deleted");
                Ok(())
            }
        }
    }

    /// Field rules plus existence of the chosen author and genres
    async fn check_book_form(&self, form: &BookForm) -> AppResult<()> {
        let mut errors = form.check().err().unwrap_or_default();

        if let Some(author_id) = form.author {
            if !self.repository.authors.exists(author_id).await? {
                form::add_error(&mut errors, "author", form::INVALID_CHOICE);
            }
        }

        let wanted = form.genre_ids();
        if !wanted.is_empty() {
            let found = self.repository.genres.existing_ids(&wanted).await?;
            for missing in wanted.iter().filter(|id| !found.contains(id)) {
                form::add_error(
                    &mut errors,
                    "genre",
                    format!("Select a valid choice. {} is not one of the available choices.", missing),
                );
            }
        }

        reject_if_invalid(form, errors)
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, query: &PageQuery) -> AppResult<Page<Author>> {
        let total = self.repository.authors.count().await?;
        let window = PageWindow::resolve(query, total, AUTHORS_PER_PAGE)?;
        let authors = self
            .repository
            .authors
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(authors))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn get_author_details(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.by_author(id).await?;
        Ok(AuthorDetails { author, books })
    }

    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        reject_if_invalid(form, form.check().err().unwrap_or_default())?;
        let author = self.repository.authors.create(form).await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await?;
        reject_if_invalid(form, form.check().err().unwrap_or_default())?;
        let author = self.repository.authors.update(id, form).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self, query: &PageQuery) -> AppResult<Page<Genre>> {
        let total = self.repository.genres.count().await?;
        let window = PageWindow::resolve(query, total, GENRES_PER_PAGE)?;
        let genres = self
            .repository
            .genres
            .list(window.limit(), window.offset())
            .await?;
        Ok(window.into_page(genres))
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn get_genre_details(&self, id: i32) -> AppResult<GenreDetails> {
        let genre = self.repository.genres.get_by_id(id).await?;
        let books = self.repository.books.by_genre(id).await?;
        Ok(GenreDetails { genre, books })
    }

    pub async fn create_genre(&self, form: &GenreForm) -> AppResult<Genre> {
        reject_if_invalid(form, form.check().err().unwrap_or_default())?;
        let genre = self.repository.genres.create(form).await?;
        tracing::info!(genre_id = genre.id, "Genre created");
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, form: &GenreForm) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await?;
        reject_if_invalid(form, form.check().err().unwrap_or_default())?;
        let genre = self.repository.genres.update(id, form).await?;
        tracing::info!(genre_id = id, "Genre updated");
        Ok(genre)
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!(genre_id = id, "Genre deleted");
        Ok(())
    }
}

/// Turn collected field errors into an `InvalidForm` error
pub(crate) fn reject_if_invalid<F: Serialize>(form: &F, errors: FormErrors) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_form(form, errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_errors_pass() {
        assert!(reject_if_invalid(&GenreForm::default(), FormErrors::new()).is_ok());
    }

    #[test]
    fn errors_echo_the_submitted_form() {
        let form = GenreForm {
            name: String::new(),
        };
        let errors = form.check().unwrap_err();
        match reject_if_invalid(&form, errors) {
            Err(AppError::InvalidForm { form, errors }) => {
                assert_eq!(form["name"], "");
                assert!(errors.contains_key("name"));
            }
            other => panic!("expected InvalidForm, got {:?}", other),
        }
    }
}
