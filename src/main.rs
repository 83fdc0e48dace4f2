mod telemetry;

use jotpush_api::job_schedulers::{start_refresh_schedules_job, start_send_reminders_job};
use jotpush_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("jotpush_server".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();

    start_send_reminders_job(context.clone());
    start_refresh_schedules_job(context);

    tokio::signal::ctrl_c().await
}
