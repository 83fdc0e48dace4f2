use crate::schedule::build_schedule::{self, BuildScheduleUseCase};
use crate::schedule::delete_schedule::{self, DeleteScheduleUseCase};
use crate::shared::usecase::{execute, UseCase};
use jotpush_domain::{InvalidWindow, ReminderSettings, ScheduleRecord};
use jotpush_infra::Context;

/// Applies a wholesale settings save: persists the settings and either
/// rebuilds today's schedule or, when reminders were switched off, retires
/// the existing one.
#[derive(Debug)]
pub struct SaveReminderSettingsUseCase {
    pub user_id: String,
    pub settings: ReminderSettings,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidWindow(InvalidWindow),
    Storage,
}

impl From<build_schedule::UseCaseError> for UseCaseError {
    fn from(e: build_schedule::UseCaseError) -> Self {
        match e {
            build_schedule::UseCaseError::InvalidWindow(window) => Self::InvalidWindow(window),
            // enabled is checked before delegating
            build_schedule::UseCaseError::RemindersDisabled
            | build_schedule::UseCaseError::Storage => Self::Storage,
        }
    }
}

impl From<delete_schedule::UseCaseError> for UseCaseError {
    fn from(_: delete_schedule::UseCaseError) -> Self {
        Self::Storage
    }
}

#[async_trait::async_trait]
impl UseCase for SaveReminderSettingsUseCase {
    type Response = Option<ScheduleRecord>;

    type Error = UseCaseError;

    const NAME: &'static str = "SaveReminderSettings";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .settings
            .save(&self.user_id, &self.settings)
            .await
            .map_err(|_| UseCaseError::Storage)?;

        if !self.settings.enabled {
            execute(
                DeleteScheduleUseCase {
                    user_id: self.user_id.clone(),
                },
                ctx,
            )
            .await?;
            return Ok(None);
        }

        let record = execute(
            BuildScheduleUseCase {
                user_id: self.user_id.clone(),
                settings: self.settings.clone(),
            },
            ctx,
        )
        .await?;
        Ok(Some(record))
    }
}
