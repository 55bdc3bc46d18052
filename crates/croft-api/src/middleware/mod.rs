//! # HTTP Middleware
//!
//! Cross-cutting middleware outside the gateway itself:
//!
//! - `tracing_layer` — request/response tracing spans.
//! - `metrics` — request and error counters.
//! - `rate_limit` — fixed-window rate limiting keyed by resolved tenant.

pub mod metrics;
pub mod rate_limit;
pub mod tracing_layer;
