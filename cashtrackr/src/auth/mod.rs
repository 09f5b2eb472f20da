//! Authentication and credential utilities.
//!
//! Identity in the API is carried two ways:
//!
//! - **Session tokens**: signed, time-limited assertions presented as
//!   `Authorization: Bearer <token>` on every authenticated request. They are
//!   stateless - nothing is stored server-side. See [`session`].
//! - **Opaque account tokens**: short single-purpose codes stored on the user
//!   row and consumed by exactly one state transition (account confirmation
//!   or password reset). See [`password::generate_token`].
//!
//! Passwords are hashed with Argon2id; parameters come from configuration.
//!
//! # Modules
//!
//! - [`current_user`]: extractor resolving a bearer credential to the
//!   authenticated user for handlers
//! - [`password`]: password hashing/verification and opaque token generation
//! - [`session`]: session token creation and verification

pub mod current_user;
pub mod password;
pub mod session;
