//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/update DTOs for writes
//! - Outcome enums for multi-step operations that can end in several ways

pub mod attendance;
pub mod dashboard;
pub mod edit_log;
pub mod scan_log;
pub mod session;
pub mod student;
pub mod user;
