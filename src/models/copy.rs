//! Book copy model: one loanable physical copy of a catalog book

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::book::BookShort;
use super::user::UserShort;

/// Availability status of a copy. Stored as a one-char code in the
/// `book_copies.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl CopyStatus {
    /// Database code for this status
    pub fn code(&self) -> &'static str {
        match self {
            CopyStatus::Maintenance => "m",
            CopyStatus::OnLoan => "o",
            CopyStatus::Available => "a",
            CopyStatus::Reserved => "r",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::OnLoan => "On loan",
            CopyStatus::Available => "Available",
            CopyStatus::Reserved => "Reserved",
        }
    }
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Maintenance
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" => Ok(CopyStatus::Maintenance),
            "o" => Ok(CopyStatus::OnLoan),
            "a" => Ok(CopyStatus::Available),
            "r" => Ok(CopyStatus::Reserved),
            other => Err(format!("Invalid copy status code: {}", other)),
        }
    }
}

// SQLx conversion for CopyStatus
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.code().to_string(), buf)
    }
}

/// Physical copy of a book. `due_back` and `borrower_id` only carry meaning
/// while status is OnLoan; every transition away from OnLoan clears both.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: CopyStatus,
    pub borrower_id: Option<i32>,
}

/// Copy with joined book and borrower, for loan listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: Uuid,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: CopyStatus,
    pub book: BookShort,
    pub borrower: Option<UserShort>,
    pub is_overdue: bool,
}

/// Create copy request (librarian adds stock for a book)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCopy {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    /// Defaults to maintenance until the copy is shelved
    pub status: Option<CopyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            CopyStatus::Maintenance,
            CopyStatus::OnLoan,
            CopyStatus::Available,
            CopyStatus::Reserved,
        ] {
            assert_eq!(status.code().parse::<CopyStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_rejects_unknown_code() {
        assert!("x".parse::<CopyStatus>().is_err());
        assert!("".parse::<CopyStatus>().is_err());
    }

    #[test]
    fn test_status_parse_ignores_char_padding() {
        // CHAR(1) columns come back space-padded through some drivers
        assert_eq!("o ".parse::<CopyStatus>().unwrap(), CopyStatus::OnLoan);
    }

    #[test]
    fn test_default_is_maintenance() {
        assert_eq!(CopyStatus::default(), CopyStatus::Maintenance);
    }
}
