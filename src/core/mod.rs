//! Core types for binup
//!
//! This module forms the foundation of the crate's type system. It currently
//! holds the error taxonomy shared by every installer flow, along with the
//! crate-wide [`Result`] alias.

pub mod error;

pub use error::{Result, UpdateError};
