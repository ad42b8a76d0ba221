//! # Rate Limiting Feature
//!
//! Guards expensive endpoints with per-client request limits.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod client_ip;
pub mod limiter;

pub use client_ip::{client_identifier, RequestHeaders, UNKNOWN_CLIENT};
pub use limiter::{
    RateLimitConfig, RateLimitEntry, RateLimitResult, RateLimiter, DEFAULT_SWEEP_INTERVAL,
};
