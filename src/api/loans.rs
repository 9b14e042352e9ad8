//! Loan and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::copy::{BookCopy, LoanDetails},
};

use super::{page_bounds, AuthenticatedUser, PaginatedResponse};

/// Page size matching the original self-service loan listing
const MY_LOANS_PER_PAGE: i64 = 2;

/// Page size matching the original all-borrowed listing
const ALL_LOANS_PER_PAGE: i64 = 3;

/// Loan list query parameters
#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Renewal form data: the target copy and the proposed due date
#[derive(Serialize, ToSchema)]
pub struct RenewalProposal {
    pub copy: BookCopy,
    /// Today + 3 weeks, regardless of the copy's current due date
    pub proposed_due_back: NaiveDate,
}

/// Renew request
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    /// New due date; must fall within today..=today + 4 weeks
    pub due_back: NaiveDate,
}

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// The borrower checking the copy out
    pub user_id: i32,
}

/// List the calling user's loans, soonest due first
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Loans per page (default: 2)")
    ),
    responses(
        (status = 200, description = "Copies on loan to the caller", body = PaginatedResponse<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let loans = state.services.loans.my_loans(claims.user_id).await?;
    Ok(Json(paginate(loans, query, MY_LOANS_PER_PAGE)))
}

/// List all copies on loan, soonest due first. Capability-gated: callers
/// without can_mark_returned get a 403, never an empty list.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Loans per page (default: 3)")
    ),
    responses(
        (status = 200, description = "All copies on loan", body = PaginatedResponse<LoanDetails>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Capability missing")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_mark_returned()?;

    let loans = state.services.loans.all_loans().await?;
    Ok(Json(paginate(loans, query, ALL_LOANS_PER_PAGE)))
}

/// Get the renewal form defaults for a copy
#[utoipa::path(
    get,
    path = "/copies/{id}/renewal",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal proposal", body = RenewalProposal),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Capability missing"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalProposal>> {
    claims.require_mark_returned()?;

    let (copy, proposed_due_back) = state.services.loans.renewal_default(id).await?;
    Ok(Json(RenewalProposal {
        copy,
        proposed_due_back,
    }))
}

/// Renew a copy: set a new due date within the allowed window
#[utoipa::path(
    post,
    path = "/copies/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Copy renewed", body = BookCopy),
        (status = 400, description = "Due date outside the allowed window"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Capability missing"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<BookCopy>> {
    claims.require_mark_returned()?;

    let copy = state.services.loans.renew(id, request.due_back).await?;
    Ok(Json(copy))
}

/// Check an available copy out to a borrower
#[utoipa::path(
    post,
    path = "/copies/{id}/borrow",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Copy borrowed", body = BookCopy),
        (status = 404, description = "Copy or user not found"),
        (status = 409, description = "Copy not available")
    )
)]
pub async fn borrow_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<BookCopy>> {
    claims.require_mark_returned()?;

    let copy = state.services.loans.borrow(id, request.user_id).await?;
    Ok(Json(copy))
}

/// Mark a copy as returned
#[utoipa::path(
    post,
    path = "/copies/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = BookCopy),
        (status = 404, description = "Copy not found"),
        (status = 409, description = "Copy not on loan")
    )
)]
pub async fn return_copy(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookCopy>> {
    claims.require_mark_returned()?;

    let copy = state.services.loans.return_copy(id).await?;
    Ok(Json(copy))
}

/// Page over an already-ordered loan list. The underlying query orders by
/// due date then id, so slices are stable between requests.
fn paginate(
    loans: Vec<LoanDetails>,
    query: LoanQuery,
    default_per_page: i64,
) -> PaginatedResponse<LoanDetails> {
    let total = loans.len() as i64;
    let (limit, offset, page, per_page) = page_bounds(query.page, query.per_page, default_per_page);

    let items = loans
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }
}
