//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`] - domain-level errors
//! - [`json`] - helpers for reading structured model output
//! - [`string`] - UTF-8 safe string helpers

pub mod error;
pub mod json;
pub mod string;
