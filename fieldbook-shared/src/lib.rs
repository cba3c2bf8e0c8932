//! # Fieldbook Shared Library
//!
//! Domain types, storage and business rules behind the Fieldbook API.
//!
//! ## Module Organization
//!
//! - `models`: Farm records and their SQL
//! - `repository`: Storage traits with PostgreSQL and in-process implementations
//! - `services`: Views joining several repositories, audit logging
//! - `auth`: Tokens, password hashing, authentication and access policy
//! - `db`: Connection pool and migrations
//! - `mail`: Outbound email

pub mod auth;
pub mod db;
pub mod mail;
pub mod models;
pub mod repository;
pub mod services;

/// Current version of the Fieldbook shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
