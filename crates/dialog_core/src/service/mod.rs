//! Core use-case services.
//!
//! # Responsibility
//! - Compose the in-memory maps into lookup/mutation use-cases.
//! - Keep callers decoupled from storage details.

pub mod dialog_engine;
