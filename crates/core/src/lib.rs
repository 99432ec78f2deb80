//! Domain types and pure logic for the AttendFT attendance tracker.
//!
//! Nothing in this crate performs I/O; the database and HTTP layers build on
//! top of it.

pub mod attendance;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod roles;
pub mod search;
pub mod types;
