//! Flutter-facing bridge over `projectboard_core`.

pub mod api;
