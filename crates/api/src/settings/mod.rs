pub mod save_reminder_settings;
