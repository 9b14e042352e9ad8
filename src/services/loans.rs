//! Loan management service: query scoping, borrow/return, renewal

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::copy::{BookCopy, LoanDetails},
    repository::Repository,
};

/// Loan duration and default renewal length, in days (3 weeks)
pub const LOAN_DAYS: i64 = 21;

/// Furthest a renewal may be set ahead of today, in days (4 weeks)
pub const RENEWAL_MAX_DAYS: i64 = 28;

/// Proposed renewal date: always relative to today, never to the copy's
/// current due date.
pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(LOAN_DAYS)
}

/// Validate a proposed renewal date against today. Both bounds are
/// inclusive: today and today + 4 weeks are accepted.
pub fn validate_renewal_date(today: NaiveDate, proposed: NaiveDate) -> AppResult<()> {
    if proposed < today {
        return Err(AppError::validation(
            "due_back",
            "Invalid date - renewal in past",
        ));
    }
    if proposed > today + Duration::days(RENEWAL_MAX_DAYS) {
        return Err(AppError::validation(
            "due_back",
            "Invalid date - renewal more than 4 weeks ahead",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to the calling user, soonest due first
    pub async fn my_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.copies.loans_by_borrower(user_id).await
    }

    /// All copies on loan, soonest due first. Authorization is enforced at
    /// the API layer before this is reached.
    pub async fn all_loans(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.copies.loans_all().await
    }

    /// Look up a copy and propose a renewal date of today + 3 weeks.
    /// Librarians may renew any borrower's copy, not just their own.
    pub async fn renewal_default(&self, copy_id: Uuid) -> AppResult<(BookCopy, NaiveDate)> {
        let copy = self.repository.copies.get_by_id(copy_id).await?;
        let proposed = default_renewal_date(Utc::now().date_naive());
        Ok((copy, proposed))
    }

    /// Validate and apply a new due date to a copy. The window is evaluated
    /// against today at call time, not the copy's prior due date.
    pub async fn renew(&self, copy_id: Uuid, due_back: NaiveDate) -> AppResult<BookCopy> {
        // Surface 404 before validation errors
        self.repository.copies.get_by_id(copy_id).await?;

        validate_renewal_date(Utc::now().date_naive(), due_back)?;

        self.repository.copies.set_due_back(copy_id, due_back).await
    }

    /// Check an available copy out to a borrower for the standard period
    pub async fn borrow(&self, copy_id: Uuid, user_id: i32) -> AppResult<BookCopy> {
        // Verify the borrower exists
        self.repository.users.get_by_id(user_id).await?;

        let due_back = Utc::now().date_naive() + Duration::days(LOAN_DAYS);
        self.repository.copies.borrow(copy_id, user_id, due_back).await
    }

    /// Mark a copy as returned
    pub async fn return_copy(&self, copy_id: Uuid) -> AppResult<BookCopy> {
        self.repository.copies.return_copy(copy_id).await
    }
}
