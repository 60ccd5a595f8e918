//! Repository layer for database operations

pub mod categories;
pub mod history;
pub mod loans;
pub mod requests;
pub mod returns;
pub mod tools;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub tools: tools::ToolsRepository,
    pub categories: categories::CategoriesRepository,
    pub requests: requests::RequestsRepository,
    pub loans: loans::LoansRepository,
    pub returns: returns::ReturnsRepository,
    pub users: users::UsersRepository,
    pub history: history::HistoryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            tools: tools::ToolsRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            history: history::HistoryRepository::new(pool.clone()),
            pool,
        }
    }
}
