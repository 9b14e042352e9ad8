//! Catalog service: authors, books, genres, languages, home page summary

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorDetails, CreateAuthor, UpdateAuthor},
        book::{
            Book, BookDetails, BookShort, CreateBook, CreateGenre, CreateLanguage, Genre,
            Language, UpdateBook,
        },
        copy::{BookCopy, CreateCopy},
    },
    repository::Repository,
};

/// Home page summary counts
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibrarySummary {
    pub num_books: i64,
    pub num_copies: i64,
    pub num_copies_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
    pub num_books_with_the: i64,
    /// Visits by this session, incremented per request
    pub num_visits: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // --- Authors ---

    pub async fn list_authors(&self, limit: i64, offset: i64) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(limit, offset).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.get_books(id).await?;
        Ok(AuthorDetails::from_author(author, books))
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(&author).await
    }

    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.update(id, &author).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }

    // --- Books ---

    pub async fn list_books(
        &self,
        title: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        self.repository.books.list(title, limit, offset).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_details(id).await
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &book).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    // --- Copies ---

    pub async fn create_copy(&self, book_id: i32, copy: CreateCopy) -> AppResult<BookCopy> {
        self.repository.copies.create(book_id, &copy).await
    }

    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.repository.copies.delete(id).await
    }

    // --- Genres and languages ---

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.books.list_genres().await
    }

    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        self.repository.books.create_genre(&genre).await
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.books.list_languages().await
    }

    pub async fn create_language(&self, language: CreateLanguage) -> AppResult<Language> {
        self.repository.books.create_language(&language).await
    }

    // --- Summary ---

    /// Home page counts plus the per-session visit counter
    pub async fn summary(&self, session_id: &str) -> AppResult<LibrarySummary> {
        Ok(LibrarySummary {
            num_books: self.repository.books.count().await?,
            num_copies: self.repository.copies.count().await?,
            num_copies_available: self.repository.copies.count_available().await?,
            num_authors: self.repository.authors.count().await?,
            num_genres: self.repository.books.count_genres().await?,
            num_books_with_the: self.repository.books.count_title_containing("the").await?,
            num_visits: self.repository.visits.increment(session_id).await?,
        })
    }
}
