//! Core types for Alyssa Loops.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod price;

pub use email::{Email, EmailError};
pub use price::{Price, PriceError};
