pub mod refresh_schedules;
