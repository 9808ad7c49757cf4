//! This crate contains generic utilities other `luz` crates depend upon but
//! not directly related to the decoy-board protocol itself.
//!
//! The main purpose of this crate is to make the `luz-protocol`/`luz-board`
//! split as self-contained as possible, matching the role `dot15d4-util`
//! plays for the `dot15d4` stack.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod log;

#[cfg(any(feature = "defmt", feature = "log"))]
pub use log::*;

/// A generic error.
///
/// Ambient, non-protocol code (e.g. position-table lookups) that needs a
/// fallible `Result` without pulling in a dependency on a richer error
/// enum uses this marker, the way `dot15d4_util::Error` does for the
/// `dot15d4` stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error;

/// A type alias for `Result<T, luz_util::Error>`.
pub type Result<T> = core::result::Result<T, Error>;
