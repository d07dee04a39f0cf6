//! Project domain model.
//!
//! # Responsibility
//! - Define the canonical project record, its creation payload and patch shape.
//! - Provide the fixed seed set used on first launch.
//!
//! # Invariants
//! - Every committed project is identified by a store-assigned `ProjectId`.
//! - Drafts and patches never carry an id.
//!
//! # See also
//! - docs/architecture/project-store.md

pub mod draft;
pub mod project;
pub mod seed;
