//! `ironmonger-auth`: client-side identity (roles, user profile, session).
//!
//! This crate is intentionally decoupled from HTTP and storage. The client
//! crate owns the session store that talks to the API and persists the token.

pub mod roles;
pub mod session;
pub mod user;

pub use roles::Role;
pub use session::Session;
pub use user::{Credentials, LoginResponse, UserProfile};
