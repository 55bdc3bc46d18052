//! # API Route Modules
//!
//! Route modules for the Croft API surface:
//!
//! - `widgets` — per-tenant widget CRUD. Reads require authentication;
//!   writes additionally require the member or admin role.
//! - `users` — per-tenant user management, admin only.
//! - `session` — login (password → token issuance) and logout (token
//!   revocation). Tenant-scoped but mounted outside the token middleware,
//!   since login is how a caller obtains a token in the first place.
//! - `billing` — billing summary, billing role only.

pub mod billing;
pub mod session;
pub mod users;
pub mod widgets;
