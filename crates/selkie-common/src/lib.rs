//! Common utilities for the Selkie selector engine.
//!
//! This crate provides shared infrastructure used by all Selkie components:
//! - **Warning System** - colored terminal output for selector features that
//!   parse but can never match a static tree

pub mod warning;

pub use warning::{clear_warnings, has_warned, warn_once};
