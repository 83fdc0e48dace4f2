use chrono::prelude::*;
use jotpush_api::dispatch::send_due_reminders::SendDueRemindersUseCase;
use jotpush_api::refresh::refresh_schedules::RefreshSchedulesUseCase;
use jotpush_api::settings::save_reminder_settings::SaveReminderSettingsUseCase;
use jotpush_api::shared::usecase::execute;
use jotpush_domain::{PushSubscription, ReminderSettings, UtcSlot};
use jotpush_infra::{Context, FixedSys, StubPushSender};
use std::sync::Arc;

fn test_context(start_millis: i64) -> (Context, Arc<StubPushSender>, Arc<FixedSys>) {
    let sys = Arc::new(FixedSys::new(start_millis));
    let push = Arc::new(StubPushSender::new());
    let ctx = Context::create_inmemory_with(sys.clone(), push.clone());
    (ctx, push, sys)
}

fn settings() -> ReminderSettings {
    ReminderSettings::new(
        true,
        3,
        "09:00".parse().unwrap(),
        "21:00".parse().unwrap(),
        "America/New_York".parse().unwrap(),
    )
    .unwrap()
}

fn subscription(endpoint: &str) -> PushSubscription {
    serde_json::from_str(&format!(
        r#"{{"endpoint": "{}", "keys": {{"p256dh": "BKey", "auth": "c2VjcmV0"}}}}"#,
        endpoint
    ))
    .unwrap()
}

#[tokio::test]
async fn saved_settings_lead_to_exactly_one_push_per_slot() {
    let (ctx, push, sys) =
        test_context(Utc.ymd(2025, 6, 1).and_hms(12, 0, 0).timestamp_millis());

    ctx.repos
        .subscriptions
        .save("user-1", &subscription("https://push.example/u1"))
        .await
        .unwrap();

    let record = execute(
        SaveReminderSettingsUseCase {
            user_id: "user-1".into(),
            settings: settings(),
        },
        &ctx,
    )
    .await
    .unwrap()
    .expect("enabled settings must produce a schedule");

    // walk the clock onto the first scheduled minute and dispatch
    let due = record.utc_times[0];
    sys.set(due.to_datetime().timestamp_millis());
    let summary = execute(SendDueRemindersUseCase { slot: due }, &ctx)
        .await
        .unwrap();
    assert_eq!(summary.sent, 1);
    assert_eq!(push.sent_endpoints(), vec!["https://push.example/u1"]);

    // the same minute again delivers nothing
    let summary = execute(SendDueRemindersUseCase { slot: due }, &ctx)
        .await
        .unwrap();
    assert_eq!(summary.sent, 0);
    assert_eq!(push.sent_endpoints().len(), 1);
}

#[tokio::test]
async fn the_hourly_refresh_rolls_schedules_onto_the_new_day() {
    let (ctx, _, sys) = test_context(Utc.ymd(2025, 6, 1).and_hms(12, 0, 0).timestamp_millis());

    let record = execute(
        SaveReminderSettingsUseCase {
            user_id: "user-1".into(),
            settings: settings(),
        },
        &ctx,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(record.date, "2025-06-01".parse().unwrap());

    // a day later the user's local date has rolled over
    sys.advance(24 * 60 * 60 * 1000);
    let summary = execute(RefreshSchedulesUseCase {}, &ctx).await.unwrap();
    assert_eq!(summary.rebuilt, 1);

    let rebuilt = ctx.repos.schedules.find("user-1").await.unwrap();
    assert_eq!(rebuilt.date, "2025-06-02".parse().unwrap());
    assert!(rebuilt.sent_utc.is_empty());

    // yesterday's buckets no longer name the user
    for slot in &record.utc_times {
        assert!(ctx.repos.buckets.members_at(slot).await.is_empty());
    }
    for slot in &rebuilt.utc_times {
        assert!(ctx
            .repos
            .buckets
            .members_at(slot)
            .await
            .contains(&"user-1".to_string()));
    }
}

#[tokio::test]
async fn dispatch_and_refresh_tolerate_a_mid_flight_rebuild() {
    let (ctx, push, sys) =
        test_context(Utc.ymd(2025, 6, 1).and_hms(12, 0, 0).timestamp_millis());
    ctx.repos
        .subscriptions
        .save("user-1", &subscription("https://push.example/u1"))
        .await
        .unwrap();

    let first = execute(
        SaveReminderSettingsUseCase {
            user_id: "user-1".into(),
            settings: settings(),
        },
        &ctx,
    )
    .await
    .unwrap()
    .unwrap();

    // the user saves again, a second record replaces the first
    let second = execute(
        SaveReminderSettingsUseCase {
            user_id: "user-1".into(),
            settings: settings(),
        },
        &ctx,
    )
    .await
    .unwrap()
    .unwrap();

    // a dispatch for a minute only the first schedule named finds the
    // bucket gone or the membership check failing, never a double send
    let mut sent = 0;
    for slot in first
        .utc_times
        .iter()
        .filter(|slot| !second.utc_times.contains(slot))
    {
        sys.set(slot.to_datetime().timestamp_millis());
        let summary = execute(SendDueRemindersUseCase { slot: *slot }, &ctx)
            .await
            .unwrap();
        sent += summary.sent;
    }
    assert_eq!(sent, 0);
    assert!(push.sent_endpoints().is_empty());
}

#[tokio::test]
async fn every_scheduled_slot_has_a_matching_bucket_entry() {
    let (ctx, _, _) = test_context(Utc.ymd(2025, 6, 1).and_hms(12, 0, 0).timestamp_millis());

    for user in &["a", "b", "c"] {
        execute(
            SaveReminderSettingsUseCase {
                user_id: (*user).into(),
                settings: settings(),
            },
            &ctx,
        )
        .await
        .unwrap();
    }

    for user in &["a", "b", "c"] {
        let record = ctx.repos.schedules.find(user).await.unwrap();
        assert_eq!(record.times.len(), 3);
        assert_eq!(record.utc_times.len(), 3);
        for (i, slot) in record.utc_times.iter().enumerate() {
            assert!(ctx
                .repos
                .buckets
                .members_at(slot)
                .await
                .contains(&user.to_string()));
            // utcTimes preserves the order of times
            let expected: UtcSlot = {
                let (date, time) = jotpush_domain::to_utc(
                    record.date,
                    record.times[i],
                    &record.timezone,
                );
                UtcSlot::new(date, time)
            };
            assert_eq!(*slot, expected);
        }
    }
}
