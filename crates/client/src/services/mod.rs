//! Typed wrappers over the API endpoints, one per resource area.
//!
//! Request bodies are camelCase JSON; listing rows keep the API's
//! snake_case column names. Every call goes through [`ApiClient`], so
//! each one carries the bearer token and shares the 401 handling.
//!
//! [`ApiClient`]: crate::http::ApiClient

pub mod admin;
pub mod auth;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod users;

pub use admin::{AdminService, Dashboard, DashboardSummary};
pub use auth::AuthService;
pub use products::ProductService;
pub use purchases::PurchaseService;
pub use sales::SalesService;
pub use users::{fallback_roles, NewUser, UserDto, UserService, UserUpdate};
