pub mod health_handlers;
pub mod job_handlers;
pub mod status_handlers;
pub mod wanted_handlers;
