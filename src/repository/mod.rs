//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod copies;
pub mod users;
pub mod visits;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub copies: copies::CopiesRepository,
    pub users: users::UsersRepository,
    pub visits: visits::VisitsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            visits: visits::VisitsRepository::new(pool.clone()),
            pool,
        }
    }
}
