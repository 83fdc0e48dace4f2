use crate::shared::usecase::UseCase;
use jotpush_domain::{
    generate_random_times, local_date_in_zone, to_utc, InvalidWindow, ReminderSettings,
    ScheduleRecord, UtcSlot,
};
use jotpush_infra::Context;

/// Generates a fresh randomized schedule for "today" in the user's own
/// timezone and swaps the minute-bucket memberships over to it.
#[derive(Debug)]
pub struct BuildScheduleUseCase {
    pub user_id: String,
    pub settings: ReminderSettings,
}

#[derive(Debug)]
pub enum UseCaseError {
    RemindersDisabled,
    InvalidWindow(InvalidWindow),
    Storage,
}

#[async_trait::async_trait]
impl UseCase for BuildScheduleUseCase {
    type Response = ScheduleRecord;

    type Error = UseCaseError;

    const NAME: &'static str = "BuildSchedule";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        if !self.settings.enabled {
            return Err(UseCaseError::RemindersDisabled);
        }

        let today = local_date_in_zone(&self.settings.timezone, ctx.sys.get_utc_datetime());
        let times = generate_random_times(
            &mut rand::thread_rng(),
            self.settings.reminders_per_day as usize,
            self.settings.start_time,
            self.settings.end_time,
        )
        .map_err(UseCaseError::InvalidWindow)?;

        let utc_times = times
            .iter()
            .map(|time| {
                let (utc_date, utc_time) = to_utc(today, *time, &self.settings.timezone);
                UtcSlot::new(utc_date, utc_time)
            })
            .collect::<Vec<_>>();

        // The previous schedule's memberships have to go first, otherwise a
        // user fires from buckets their record no longer names.
        if let Some(previous) = ctx.repos.schedules.find(&self.user_id).await {
            ctx.repos
                .buckets
                .remove_schedule(&self.user_id, &previous.utc_times)
                .await
                .map_err(|_| UseCaseError::Storage)?;
        }

        let record = ScheduleRecord::new(
            self.user_id.clone(),
            today,
            &self.settings,
            times,
            utc_times,
        );
        ctx.repos
            .schedules
            .save(&record)
            .await
            .map_err(|_| UseCaseError::Storage)?;
        ctx.repos
            .buckets
            .add_schedule(&self.user_id, &record.utc_times)
            .await
            .map_err(|_| UseCaseError::Storage)?;

        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use chrono::prelude::*;
    use jotpush_infra::{FixedSys, StubPushSender};
    use std::sync::Arc;

    fn settings(enabled: bool) -> ReminderSettings {
        ReminderSettings::new(
            enabled,
            3,
            "09:00".parse().unwrap(),
            "21:00".parse().unwrap(),
            "America/New_York".parse().unwrap(),
        )
        .unwrap()
    }

    fn ctx_at(millis: i64) -> Context {
        Context::create_inmemory_with(
            Arc::new(FixedSys::new(millis)),
            Arc::new(StubPushSender::new()),
        )
    }

    #[tokio::test]
    async fn it_builds_a_schedule_for_the_users_local_today() {
        // 2025-06-02 01:30 UTC is still 2025-06-01 in New York
        let ctx = ctx_at(Utc.ymd(2025, 6, 2).and_hms(1, 30, 0).timestamp_millis());

        let usecase = BuildScheduleUseCase {
            user_id: "user-1".into(),
            settings: settings(true),
        };
        let record = execute(usecase, &ctx).await.unwrap();

        assert_eq!(record.date, "2025-06-01".parse().unwrap());
        assert_eq!(record.times.len(), 3);
        assert_eq!(record.utc_times.len(), 3);
        assert!(record.sent_utc.is_empty());
        for time in &record.times {
            assert!(*time >= "09:00".parse().unwrap());
            assert!(*time < "21:00".parse().unwrap());
        }

        let stored = ctx.repos.schedules.find("user-1").await.unwrap();
        assert_eq!(stored.utc_times, record.utc_times);
        for slot in &record.utc_times {
            assert!(ctx
                .repos
                .buckets
                .members_at(slot)
                .await
                .contains(&"user-1".to_string()));
        }
    }

    #[tokio::test]
    async fn it_removes_the_previous_schedules_bucket_memberships() {
        let ctx = ctx_at(Utc.ymd(2025, 6, 1).and_hms(12, 0, 0).timestamp_millis());

        let first = execute(
            BuildScheduleUseCase {
                user_id: "user-1".into(),
                settings: settings(true),
            },
            &ctx,
        )
        .await
        .unwrap();
        let second = execute(
            BuildScheduleUseCase {
                user_id: "user-1".into(),
                settings: settings(true),
            },
            &ctx,
        )
        .await
        .unwrap();

        for slot in &first.utc_times {
            if !second.utc_times.contains(slot) {
                assert!(ctx.repos.buckets.members_at(slot).await.is_empty());
            }
        }
        for slot in &second.utc_times {
            assert!(ctx
                .repos
                .buckets
                .members_at(slot)
                .await
                .contains(&"user-1".to_string()));
        }
    }

    #[tokio::test]
    async fn it_rejects_disabled_settings() {
        let ctx = ctx_at(0);
        let res = execute(
            BuildScheduleUseCase {
                user_id: "user-1".into(),
                settings: settings(false),
            },
            &ctx,
        )
        .await;
        assert!(matches!(res, Err(UseCaseError::RemindersDisabled)));
    }
}
