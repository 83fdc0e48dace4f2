pub mod build_schedule;
pub mod delete_schedule;
