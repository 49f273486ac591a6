//! Shared configuration, errors and constants for carddav2ldap.

pub mod config;
pub mod constants;
pub mod error;
