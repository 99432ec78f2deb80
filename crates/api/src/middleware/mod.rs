//! Request extractors that establish identity and enforce access rules.

pub mod auth;
pub mod csrf;
pub mod rbac;
