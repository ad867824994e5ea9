//! Middleware del sistema
//!
//! Este módulo contiene el middleware para autenticación, CORS, rate limiting
//! y métricas.

pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;

pub use auth::{admin_only_middleware, auth_middleware, AuthenticatedUser};
pub use cors::cors_layer;
pub use metrics::metrics_middleware;
pub use rate_limit::{rate_limit_middleware, RateLimitState};
