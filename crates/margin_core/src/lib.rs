//! # Margin Core (L1: Foundation)
//!
//! Exchange taxonomy, position-code grammar, and shared maths for the
//! margin analysis workspace.
//!
//! This crate provides:
//! - The closed exchange/position-type/variety taxonomy for the seven
//!   Chinese futures and options venues
//! - The position-code parser (`"<symbol>.<alias>"` → taxonomy triple)
//! - Dense linear algebra helpers (Cholesky factorisation) and order
//!   statistics (percentile) used by the stress engine

#![warn(missing_docs)]

pub mod math;
pub mod parse;
pub mod types;

pub use parse::{parse_position_code, ParsedCode};
pub use types::{CodeError, Exchange, OptionKind, PositionType, Side, Variety};
