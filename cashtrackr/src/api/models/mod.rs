//! API request and response data models.
//!
//! Raw payload types (suffixed `Payload`) deserialize permissively - every
//! field optional - so validation can report the complete set of failures
//! for a body instead of a deserialization error. Each payload validates
//! into its well-formed counterpart via
//! [`crate::api::validation::ValidateInput`].
//!
//! Response models convert from the database models in
//! [`crate::db::models`]; the two layers evolve independently.

pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod users;
