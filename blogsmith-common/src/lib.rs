//! Common types and utilities shared across Blogsmith crates.
//!
//! This crate holds the workspace-wide error type and the observability
//! helpers. It stays dependency-light so every other crate can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`BlogsmithError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use blogsmith_common::BlogsmithError;
//!
//! let err = BlogsmithError::Config("missing llm.api_key".into());
//! assert_eq!(err.to_string(), "Configuration error: missing llm.api_key");
//! ```

pub mod observability;

/// Error types shared across the Blogsmith workspace.
///
/// Stage-specific failures (fetch, extract, generation, store) have their own
/// enums in the crates that own those stages; this type covers wiring
/// problems that can surface from any of them.
#[derive(thiserror::Error, Debug)]
pub enum BlogsmithError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The user-supplied input was rejected before any work started.
    #[error("Invalid input: {0}")]
    Input(String),
}

/// Convenient alias for results that use [`BlogsmithError`].
pub type Result<T> = std::result::Result<T, BlogsmithError>;
