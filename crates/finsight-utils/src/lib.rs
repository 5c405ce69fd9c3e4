//! Shared utilities for finsight
//!
//! This crate provides common functionality used across the finsight workspace:
//! tracing setup and the ordered API key resolver chain.

pub mod config;
pub mod logging;

pub use config::{ApiKey, DotEnvFile, EnvVar, KeyResolver, KeySource, PlainTextFile};
pub use logging::{init_tracing, init_tracing_with};
