pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod export;
pub mod scan;
pub mod scan_logs;
pub mod students;
pub mod users;
