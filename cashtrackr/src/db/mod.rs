//! Database access layer.
//!
//! Persistence follows the repository pattern: each entity has a repository
//! in [`handlers`] wrapping a `PgConnection` and owning its SQL, and a
//! request/response model triple in [`models`]. Entity shape is decoupled
//! from persistence mechanics - handlers never see SQL, repositories never
//! see HTTP.

pub mod errors;
pub mod handlers;
pub mod models;
