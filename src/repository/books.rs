//! Books, genres and languages repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{
            Book, BookDetails, BookShort, CreateBook, CreateGenre, CreateLanguage, Genre,
            Language, UpdateBook,
        },
        copy::BookCopy,
    },
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Books
    // =========================================================================

    /// Get book row by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book with joined author, language, genres and copies
    pub async fn get_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.get_by_id(id).await?;

        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(book.author_id)
            .fetch_one(&self.pool)
            .await?;

        let language = sqlx::query_as::<_, Language>("SELECT * FROM languages WHERE id = $1")
            .bind(book.language_id)
            .fetch_one(&self.pool)
            .await?;

        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let copies = sqlx::query_as::<_, BookCopy>(
            "SELECT * FROM book_copies WHERE book_id = $1 ORDER BY imprint, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            language,
            genres,
            copies,
        })
    }

    /// List books ordered by title, optionally filtered by title substring
    pub async fn list(
        &self,
        title: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        let pattern = title.map(|t| format!("%{}%", t));

        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT id, title, isbn FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY title, id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a book and its genre links in one transaction
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, summary, isbn, author_id, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .bind(book.language_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_book_write_error)?;

        for genre_id in &book.genre_ids {
            sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                .bind(created.id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await
                .map_err(map_book_write_error)?;
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Update a book; when genre_ids is present the genre set is replaced
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let current = self.get_by_id(id).await?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, summary = $2, isbn = $3, author_id = $4, language_id = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(update.title.as_ref().unwrap_or(&current.title))
        .bind(update.summary.as_ref().unwrap_or(&current.summary))
        .bind(update.isbn.as_ref().unwrap_or(&current.isbn))
        .bind(update.author_id.unwrap_or(current.author_id))
        .bind(update.language_id.unwrap_or(current.language_id))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_book_write_error)?;

        if let Some(genre_ids) = &update.genre_ids {
            sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for genre_id in genre_ids {
                sqlx::query("INSERT INTO book_genres (book_id, genre_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(genre_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_book_write_error)?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a book (copies and genre links cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all books (home page summary)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books whose title contains the given word, case-insensitively
    pub async fn count_title_containing(&self, word: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE title ILIKE $1")
            .bind(format!("%{}%", word))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Genres and languages
    // =========================================================================

    /// List all genres ordered by name
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    /// Create a genre; names are unique regardless of case
    pub async fn create_genre(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let created = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (name) VALUES ($1) RETURNING *",
        )
        .bind(&genre.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict(format!("Genre '{}' already exists", genre.name))
            }
            e => e.into(),
        })?;

        Ok(created)
    }

    /// List all languages ordered by name
    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>("SELECT * FROM languages ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(languages)
    }

    /// Create a language
    pub async fn create_language(&self, language: &CreateLanguage) -> AppResult<Language> {
        let created = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING *",
        )
        .bind(&language.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict(format!("Language '{}' already exists", language.name))
            }
            e => e.into(),
        })?;

        Ok(created)
    }

    /// Count all genres (home page summary)
    pub async fn count_genres(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Translate constraint violations on book writes into client errors:
/// duplicate ISBN is a conflict, an unknown author/language/genre id is a
/// bad request.
fn map_book_write_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Conflict("A book with this ISBN already exists".to_string())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
            AppError::BadRequest("Referenced author, language or genre does not exist".to_string())
        }
        e => e.into(),
    }
}
