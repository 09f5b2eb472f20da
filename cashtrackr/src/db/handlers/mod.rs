//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: account records and the token-gated identity lifecycle
//! - [`Budgets`]: owner-scoped budgets
//! - [`Expenses`]: expenses nested under a budget
//!
//! # Common Pattern
//!
//! ```ignore
//! use cashtrackr::db::handlers::{Budgets, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let mut repo = Budgets::new(&mut conn);
//!     let budget = repo.get_by_id(1).await?;
//!     Ok(())
//! }
//! ```

pub mod budgets;
pub mod expenses;
pub mod repository;
pub mod users;

pub use budgets::Budgets;
pub use expenses::Expenses;
pub use repository::Repository;
pub use users::Users;
