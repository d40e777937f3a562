//! Presentation bridge for the todolist desktop app.
//!
//! Exposes the request surface (`groups.*`, `todos.*`, `stats.get`,
//! `system.getDatabasePath`) to the isolated UI process. Transport mechanics
//! live in the generated bindings; this crate owns argument normalization,
//! the long-lived store handle, and error-to-envelope conversion.

pub mod api;
