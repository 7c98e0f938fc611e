//! Vitrina Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Vitrina:
//! - Geographic types and the haversine proximity check
//! - The persisted session record
//! - Trait seams for the host device (location capability, key-value storage,
//!   tab lifecycle)
//! - Core error types

pub mod context;
pub mod error;
pub mod geo;
pub mod location;
pub mod session;
pub mod session_store;

pub use error::{Error, Result};
