//! Session authentication
//!
//! Handles:
//! - Signed session tokens
//! - Authentication middleware and extractors
//!
//! Signing users in is the identity provider's job; this module only
//! verifies the tokens it issues.

mod middleware;
pub mod session;

pub use middleware::{CurrentUser, MaybeUser, SESSION_COOKIE, require_auth};
pub use session::{Session, create_session_token, verify_session_token};
