//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: UTF-8 safe truncation and text fingerprints

pub mod error;
pub mod string;
