//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Normalize caller-supplied text before it reaches persistence.
//! - Keep bridge/CLI layers decoupled from storage details.

pub mod group_service;
pub mod todo_service;
