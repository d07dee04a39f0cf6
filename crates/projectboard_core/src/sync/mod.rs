//! Connectivity tracking and offline-queue replay.
//!
//! # Responsibility
//! - Expose the platform's online/offline signal to core.
//! - Trigger reconnect-sync of queued creations when the signal turns online.
//!
//! # See also
//! - docs/architecture/project-store.md

pub mod connectivity;
pub mod listeners;
pub mod reconnect;
