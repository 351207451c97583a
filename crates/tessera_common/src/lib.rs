//! Shared foundational types used across the Tessera CGRA mapper.
//!
//! This crate provides the internal-error result type returned by every
//! fallible mapper stage and the macro that stamps out the opaque index
//! newtypes used for DFG and MRRG nodes.

#![warn(missing_docs)]

pub mod id;
pub mod result;

pub use result::{InternalError, TesseraResult};
