//! Book copies repository: loan queries and status transitions

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookShort,
        copy::{BookCopy, CopyStatus, CreateCopy, LoanDetails},
        user::UserShort,
    },
};

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>("SELECT * FROM book_copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Copies on loan to one borrower, soonest due first. The id tiebreak
    /// keeps the order total so pagination is deterministic.
    pub async fn loans_by_borrower(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.imprint, c.due_back, c.status,
                   b.id AS book_id, b.title, b.isbn,
                   u.id AS borrower_id, u.username, u.first_name, u.last_name
            FROM book_copies c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.borrower_id = u.id
            WHERE c.borrower_id = $1 AND c.status = 'o'
            ORDER BY c.due_back, c.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(loan_details_from_row).collect()
    }

    /// All copies on loan, soonest due first
    pub async fn loans_all(&self) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.imprint, c.due_back, c.status,
                   b.id AS book_id, b.title, b.isbn,
                   u.id AS borrower_id, u.username, u.first_name, u.last_name
            FROM book_copies c
            JOIN books b ON c.book_id = b.id
            LEFT JOIN users u ON c.borrower_id = u.id
            WHERE c.status = 'o'
            ORDER BY c.due_back, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(loan_details_from_row).collect()
    }

    /// Set a new due date on a copy (renewal). Last write wins; the single
    /// row update is the only concurrency safeguard.
    pub async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(
            "UPDATE book_copies SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Check a copy out to a borrower. The status guard in the WHERE clause
    /// makes the transition atomic: only an available copy can be borrowed.
    pub async fn borrow(
        &self,
        id: Uuid,
        user_id: i32,
        due_back: NaiveDate,
    ) -> AppResult<BookCopy> {
        let updated = sqlx::query_as::<_, BookCopy>(
            r#"
            UPDATE book_copies
            SET status = 'o', borrower_id = $1, due_back = $2
            WHERE id = $3 AND status = 'a'
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(copy) => Ok(copy),
            None => {
                let copy = self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Copy is not available (status: {})",
                    copy.status
                )))
            }
        }
    }

    /// Return a copy. Leaving the OnLoan state clears borrower and due date
    /// in the same update, so stale loan fields never linger.
    pub async fn return_copy(&self, id: Uuid) -> AppResult<BookCopy> {
        let updated = sqlx::query_as::<_, BookCopy>(
            r#"
            UPDATE book_copies
            SET status = 'a', borrower_id = NULL, due_back = NULL
            WHERE id = $1 AND status = 'o'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(copy) => Ok(copy),
            None => {
                let copy = self.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Copy is not on loan (status: {})",
                    copy.status
                )))
            }
        }
    }

    /// Create a copy for a book (librarian adds stock)
    pub async fn create(&self, book_id: i32, copy: &CreateCopy) -> AppResult<BookCopy> {
        let status = copy.status.unwrap_or_default();

        let created = sqlx::query_as::<_, BookCopy>(
            r#"
            INSERT INTO book_copies (id, book_id, imprint, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(book_id)
        .bind(&copy.imprint)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            }
            e => e.into(),
        })?;

        Ok(created)
    }

    /// Delete a copy
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all copies (home page summary)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_copies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count available copies (home page summary)
    pub async fn count_available(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_copies WHERE status = 'a'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

fn loan_details_from_row(row: sqlx::postgres::PgRow) -> AppResult<LoanDetails> {
    let today = Utc::now().date_naive();
    let due_back: Option<NaiveDate> = row.get("due_back");
    let status: CopyStatus = row.get("status");

    let borrower = row
        .get::<Option<i32>, _>("borrower_id")
        .map(|id| UserShort {
            id,
            username: row.get("username"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
        });

    Ok(LoanDetails {
        id: row.get("id"),
        imprint: row.get("imprint"),
        due_back,
        status,
        book: BookShort {
            id: row.get("book_id"),
            title: row.get("title"),
            isbn: row.get("isbn"),
        },
        borrower,
        is_overdue: due_back.map(|d| d < today).unwrap_or(false),
    })
}
