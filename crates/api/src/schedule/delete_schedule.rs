use crate::shared::usecase::UseCase;
use jotpush_infra::Context;

/// Retires a user's schedule: removes the record and every bucket
/// membership it installed. A no-op when no schedule exists.
#[derive(Debug)]
pub struct DeleteScheduleUseCase {
    pub user_id: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    Storage,
}

#[async_trait::async_trait]
impl UseCase for DeleteScheduleUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "DeleteSchedule";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let record = match ctx.repos.schedules.find(&self.user_id).await {
            Some(record) => record,
            None => return Ok(()),
        };

        ctx.repos
            .buckets
            .remove_schedule(&self.user_id, &record.utc_times)
            .await
            .map_err(|_| UseCaseError::Storage)?;
        ctx.repos
            .schedules
            .delete(&self.user_id)
            .await
            .map_err(|_| UseCaseError::Storage)?;

        Ok(())
    }
}
