//! Persistence adapters behind the project store.
//!
//! # Responsibility
//! - Define the durable key-value slot contract the store persists through.
//! - Isolate SQLite query details from store orchestration.
//!
//! # Invariants
//! - Multi-slot writes are atomic.
//! - Malformed payloads surface as `SlotError::Decode`, never as panics.

pub mod slot_repo;
