//! Core taxonomy types for positions and venues.
//!
//! This module provides:
//! - `exchange`: The seven-venue `Exchange` enum with alias normalisation
//! - `variety`: Asset-family symbols and the inter-commodity pair table
//! - `position`: Position type, direction, and option-kind enums
//! - `error`: Structured error types for code parsing
//!
//! # Re-exports
//!
//! Commonly used types are re-exported at this module level:
//! - [`Exchange`] from `exchange`
//! - [`Variety`] from `variety`
//! - [`PositionType`], [`Side`], [`OptionKind`] from `position`
//! - [`CodeError`] from `error`

pub mod error;
pub mod exchange;
pub mod position;
pub mod variety;

// Re-export commonly used types at module level
pub use error::CodeError;
pub use exchange::Exchange;
pub use position::{OptionKind, PositionType, Side};
pub use variety::Variety;
