pub mod dispatch;
pub mod job_schedulers;
pub mod refresh;
pub mod schedule;
pub mod settings;
pub mod shared;
