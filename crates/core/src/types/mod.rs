//! Core types for Storekeep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod input;
pub mod price;

pub use id::*;
pub use input::{CoerceError, LooseId, LoosePrice, parse_id, truthy_text};
pub use price::{Price, PriceError};
