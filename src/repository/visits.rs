//! Per-session home page visit counter

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

#[derive(Clone)]
pub struct VisitsRepository {
    pool: Pool<Postgres>,
}

impl VisitsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Increment and return the visit count for a session. The session id is
    /// owned by the caller; this table only keys state on it.
    pub async fn increment(&self, session_id: &str) -> AppResult<i64> {
        let visits: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO page_visits (session_id, visits)
            VALUES ($1, 1)
            ON CONFLICT (session_id) DO UPDATE SET visits = page_visits.visits + 1
            RETURNING visits
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(visits)
    }
}
