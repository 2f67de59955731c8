//! Dialog domain model shared by lookup, mutation and persistence paths.
//!
//! # Responsibility
//! - Define the catalog value (`ResponseEntry`) and lookup result shape.
//! - Define the structured outcome returned by every engine mutation.
//!
//! # Invariants
//! - A prompt is the unique key of one `ResponseEntry`.
//! - A synonym belongs to at most one prompt at any time.

pub mod dialog;
