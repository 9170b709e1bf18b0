/// Web dashboard and health endpoints
pub mod dashboard;
/// Periodic poll dispatch
pub mod scheduler;
