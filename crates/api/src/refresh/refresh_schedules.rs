use crate::schedule::build_schedule::BuildScheduleUseCase;
use crate::schedule::delete_schedule::DeleteScheduleUseCase;
use crate::shared::usecase::{execute, UseCase};
use jotpush_domain::{local_date_in_zone, Day, ReminderSettings};
use jotpush_infra::{Context, ScheduleKey};
use tracing::{info, warn};

/// The refresh engine. Runs hourly over the whole schedule namespace and
/// regenerates records whose local calendar day has rolled over in their
/// own timezone. Also migrates records still stored under the retired
/// `schedule:{date}:{userId}` key shape.
#[derive(Debug)]
pub struct RefreshSchedulesUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    Storage,
}

#[derive(Debug, Default, PartialEq)]
pub struct RefreshSummary {
    pub scanned: usize,
    pub rebuilt: usize,
    pub deleted: usize,
    pub migrated: usize,
}

#[async_trait::async_trait]
impl UseCase for RefreshSchedulesUseCase {
    type Response = RefreshSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "RefreshSchedules";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let mut summary = RefreshSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = ctx
                .repos
                .schedules
                .list_keys(cursor.as_deref())
                .await
                .map_err(|_| UseCaseError::Storage)?;

            for key in &page.keys {
                summary.scanned += 1;
                let parsed = match ScheduleKey::parse(key) {
                    Some(parsed) => parsed,
                    None => {
                        warn!("Unrecognized schedule key {}, skipping", key);
                        continue;
                    }
                };
                // One record's failure never aborts the scan
                if let Err(e) = process_key(&parsed, ctx, &mut summary).await {
                    warn!("Failed to refresh schedule key {}: {:?}", key, e);
                }
            }

            if page.complete {
                break;
            }
            cursor = page.cursor;
            if cursor.is_none() {
                break;
            }
        }

        info!(
            "Refresh: {} scanned, {} rebuilt, {} deleted, {} migrated",
            summary.scanned, summary.rebuilt, summary.deleted, summary.migrated
        );
        Ok(summary)
    }
}

async fn process_key(
    key: &ScheduleKey,
    ctx: &Context,
    summary: &mut RefreshSummary,
) -> anyhow::Result<()> {
    match key {
        ScheduleKey::Current { user_id } => refresh_current(user_id, ctx, summary).await,
        ScheduleKey::Legacy { date, user_id } => {
            migrate_legacy(date, user_id, ctx, summary).await
        }
    }
}

async fn refresh_current(
    user_id: &str,
    ctx: &Context,
    summary: &mut RefreshSummary,
) -> anyhow::Result<()> {
    let record = match ctx.repos.schedules.find(user_id).await {
        Some(record) => record,
        // corrupt or raced away, nothing to refresh
        None => return Ok(()),
    };

    let today = local_date_in_zone(&record.timezone, ctx.sys.get_utc_datetime());
    if record.is_for_local_date(today) {
        return Ok(());
    }

    // The record is self-sufficient when fully populated, the stored
    // settings are only a fallback.
    let settings = match record.recover_settings() {
        Some(settings) => Some(settings),
        None => ctx.repos.settings.find(user_id).await,
    };

    match settings.filter(|s| s.enabled) {
        Some(settings) => {
            rebuild(user_id, settings, ctx).await?;
            summary.rebuilt += 1;
        }
        None => {
            retire(user_id, ctx).await?;
            summary.deleted += 1;
        }
    }
    Ok(())
}

async fn migrate_legacy(
    date: &Day,
    user_id: &str,
    ctx: &Context,
    summary: &mut RefreshSummary,
) -> anyhow::Result<()> {
    let legacy = ctx.repos.schedules.find_legacy(date, user_id).await;

    let settings = match &legacy {
        Some(legacy) => match legacy.recover_settings() {
            Some(settings) => Some(settings),
            None => ctx.repos.settings.find(user_id).await,
        },
        None => ctx.repos.settings.find(user_id).await,
    };

    // Whatever happens next, the old bucket memberships must not keep a
    // retired record alive.
    if let Some(legacy) = &legacy {
        ctx.repos
            .buckets
            .remove_schedule(user_id, &legacy.utc_times)
            .await?;
    }

    match settings.filter(|s| s.enabled) {
        Some(settings) => {
            rebuild(user_id, settings, ctx).await?;
            summary.migrated += 1;
        }
        None => {
            summary.deleted += 1;
        }
    }

    ctx.repos.schedules.delete_legacy(date, user_id).await?;
    Ok(())
}

async fn rebuild(user_id: &str, settings: ReminderSettings, ctx: &Context) -> anyhow::Result<()> {
    execute(
        BuildScheduleUseCase {
            user_id: user_id.into(),
            settings,
        },
        ctx,
    )
    .await
    .map_err(|e| anyhow::anyhow!("schedule rebuild failed: {:?}", e))?;
    Ok(())
}

async fn retire(user_id: &str, ctx: &Context) -> anyhow::Result<()> {
    execute(
        DeleteScheduleUseCase {
            user_id: user_id.into(),
        },
        ctx,
    )
    .await
    .map_err(|e| anyhow::anyhow!("schedule retire failed: {:?}", e))?;
    Ok(())
}
