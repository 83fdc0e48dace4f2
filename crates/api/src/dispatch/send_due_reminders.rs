use crate::shared::usecase::UseCase;
use jotpush_domain::{local_date_in_zone, UtcSlot};
use jotpush_infra::Context;
use tracing::{info, warn};

/// The dispatch engine. Runs once per UTC minute against the bucket for
/// that minute and is idempotent under repeated invocation: a slot already
/// in `sentUtc` is never delivered twice.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {
    pub slot: UtcSlot,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[derive(Debug, Default, PartialEq)]
pub struct DispatchSummary {
    /// Deliveries handed to the push service.
    pub sent: usize,
    /// Members skipped by one of the guards (stale bucket entry, already
    /// sent, retired record, missing subscription).
    pub skipped: usize,
    /// Deliveries or persistence attempts that failed; logged per user.
    pub failed: usize,
}

enum Outcome {
    Sent,
    Skipped(&'static str),
}

#[async_trait::async_trait]
impl UseCase for SendDueRemindersUseCase {
    type Response = DispatchSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let members = ctx.repos.buckets.members_at(&self.slot).await;
        let mut summary = DispatchSummary::default();

        for user_id in &members {
            match process_member(user_id, &self.slot, ctx).await {
                Ok(Outcome::Sent) => summary.sent += 1,
                Ok(Outcome::Skipped(reason)) => {
                    info!(
                        "Skipping reminder for user {} at {}: {}",
                        user_id, self.slot, reason
                    );
                    summary.skipped += 1;
                }
                // One user's failure never aborts the rest of the bucket
                Err(e) => {
                    warn!(
                        "Failed to deliver reminder for user {} at {}: {:?}",
                        user_id, self.slot, e
                    );
                    summary.failed += 1;
                }
            }
        }

        if !members.is_empty() {
            info!(
                "Dispatch at {}: {} sent, {} skipped, {} failed",
                self.slot, summary.sent, summary.skipped, summary.failed
            );
        }
        Ok(summary)
    }
}

async fn process_member(
    user_id: &str,
    slot: &UtcSlot,
    ctx: &Context,
) -> anyhow::Result<Outcome> {
    let mut record = match ctx.repos.schedules.find(user_id).await {
        Some(record) => record,
        None => return Ok(Outcome::Skipped("no schedule record")),
    };

    // Bucket membership can outlive a rebuild that raced this run, the
    // record is the source of truth.
    if !record.contains_slot(slot) {
        return Ok(Outcome::Skipped("slot not in current schedule"));
    }
    if record.is_sent(slot) {
        return Ok(Outcome::Skipped("already sent"));
    }
    // A record the refresh engine should have retired does not fire.
    let today = local_date_in_zone(&record.timezone, ctx.sys.get_utc_datetime());
    if !record.is_for_local_date(today) {
        return Ok(Outcome::Skipped("record is stale"));
    }

    let subscription = match ctx.repos.subscriptions.find(user_id).await {
        Some(subscription) => subscription,
        None => return Ok(Outcome::Skipped("no push subscription")),
    };

    ctx.push.send_wakeup(&subscription).await?;

    record.mark_sent(*slot);
    ctx.repos.schedules.save(&record).await?;
    Ok(Outcome::Sent)
}
