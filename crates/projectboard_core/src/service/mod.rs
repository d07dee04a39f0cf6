//! Core use-case services.
//!
//! # Responsibility
//! - Own project state and mediate every read/write from UI/FFI callers.
//! - Keep callers decoupled from slot storage details.

pub mod project_store;
