//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todolist_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use todolist_core::db::default_db_path;

fn main() {
    println!("todolist_core ping={}", todolist_core::ping());
    println!("todolist_core version={}", todolist_core::core_version());
    println!("todolist_core db_path={}", default_db_path().display());
}
