use crate::dispatch::send_due_reminders::SendDueRemindersUseCase;
use crate::refresh::refresh_schedules::RefreshSchedulesUseCase;
use crate::shared::usecase::execute;
use jotpush_domain::UtcSlot;
use jotpush_infra::Context;
use std::time::Duration;

/// Seconds until the next run should start so that it lands
/// `secs_before_min` seconds before the top of a minute.
pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Fires the dispatch engine once per UTC minute, aligned to the top of
/// the minute.
pub fn start_send_reminders_job(ctx: Context) {
    tokio::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        tokio::time::sleep(Duration::from_secs(secs_to_next_run as u64)).await;

        let mut minutely_interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            minutely_interval.tick().await;
            let slot = UtcSlot::from_datetime(&ctx.sys.get_utc_datetime());
            let _ = execute(SendDueRemindersUseCase { slot }, &ctx).await;
        }
    });
}

/// Fires the refresh engine once per hour.
pub fn start_refresh_schedules_job(ctx: Context) {
    tokio::spawn(async move {
        let mut hourly_interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            hourly_interval.tick().await;
            let _ = execute(RefreshSchedulesUseCase {}, &ctx).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_delay_works() {
        assert_eq!(get_start_delay(50 * 1000, 5), 5);
        assert_eq!(get_start_delay(50 * 1000, 10), 60);
        assert_eq!(get_start_delay(50 * 1000, 15), 55);
        assert_eq!(get_start_delay(60 * 1000, 60), 60);
        assert_eq!(get_start_delay(60 * 1000, 10), 50);
        assert_eq!(get_start_delay(59 * 1000, 0), 1);
        assert_eq!(get_start_delay(59 * 1000, 1), 60);
    }
}
