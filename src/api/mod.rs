//! API handlers for the Biblios REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// Resolve page/per_page query values into SQL limit/offset. Each listing
/// carries its own default page size.
pub fn page_bounds(
    page: Option<i64>,
    per_page: Option<i64>,
    default_per_page: i64,
) -> (i64, i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(default_per_page).clamp(1, 100);
    // The page number is client-supplied; saturate rather than overflow the
    // offset multiply. A saturated offset is simply past the end of any
    // result set.
    let offset = (page - 1).saturating_mul(per_page);
    (per_page, offset, page, per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds_defaults() {
        let (limit, offset, page, per_page) = page_bounds(None, None, 5);
        assert_eq!((limit, offset, page, per_page), (5, 0, 1, 5));
    }

    #[test]
    fn test_page_bounds_third_page() {
        let (limit, offset, _, _) = page_bounds(Some(3), Some(2), 5);
        assert_eq!((limit, offset), (2, 4));
    }

    #[test]
    fn test_page_bounds_clamps_bad_input() {
        let (limit, offset, page, per_page) = page_bounds(Some(0), Some(0), 3);
        assert_eq!((limit, offset, page, per_page), (1, 0, 1, 1));

        let (limit, _, _, _) = page_bounds(Some(1), Some(10_000), 3);
        assert_eq!(limit, 100);
    }

    #[test]
    fn test_page_bounds_huge_page_saturates() {
        let (_, offset, _, _) = page_bounds(Some(i64::MAX), Some(100), 5);
        assert_eq!(offset, i64::MAX);

        let (_, offset, _, _) = page_bounds(Some(i64::MAX - 1), None, 5);
        assert!(offset > 0);
    }
}
