//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `projectboard_core` linkage.
//! - Bootstrap a throwaway in-memory store and print its dashboard counts.

use projectboard_core::db::open_db_in_memory;
use projectboard_core::{ConnectivityObserver, ProjectStore, SqliteSlotStore};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("projectboard_core ping={}", projectboard_core::ping());
    println!("projectboard_core version={}", projectboard_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("projectboard_core store=error reason={err}");
            return ExitCode::FAILURE;
        }
    };
    let store = ProjectStore::open(
        SqliteSlotStore::new(conn),
        Arc::new(ConnectivityObserver::with_initial(true)),
    );
    let counts = store.status_counts();
    println!(
        "projectboard_core projects={} active={} completed={} on_hold={}",
        counts.total(),
        counts.active,
        counts.completed,
        counts.on_hold
    );
    ExitCode::SUCCESS
}
