//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Multi-statement operations open their own
//! transaction; helpers shared between transactions take `&mut PgConnection`.

pub mod attendance_repo;
pub mod dashboard_repo;
pub mod edit_log_repo;
pub mod scan_log_repo;
pub mod session_repo;
pub mod student_repo;
pub mod user_repo;

pub use attendance_repo::AttendanceRepo;
pub use dashboard_repo::DashboardRepo;
pub use edit_log_repo::EditLogRepo;
pub use scan_log_repo::ScanLogRepo;
pub use session_repo::SessionRepo;
pub use student_repo::StudentRepo;
pub use user_repo::UserRepo;
