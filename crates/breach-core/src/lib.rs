//! breach-core: Shared types, traits, and utilities for Breach
//!
//! This crate provides the identifiers, error types and gameplay data model
//! used across all Breach crates.

mod error;
mod ids;
mod symbol;

pub use error::*;
pub use ids::*;
pub use symbol::*;
