mod date;
mod reminder_times;
mod schedule;
mod settings;
mod subscription;
mod timezone;
mod vapid;

pub use date::{Day, DayTimeError, TimeOfDay};
pub use reminder_times::{generate_random_times, InvalidWindow};
pub use schedule::{LegacyScheduleRecord, ScheduleRecord, UtcSlot};
pub use settings::{ReminderSettings, SettingsError};
pub use subscription::{PushSubscription, SubscriptionKeys};
pub use timezone::{local_date_in_zone, to_utc};
pub use vapid::{
    endpoint_audience, EcdsaSignature, KeyImportStrategy, SigningError, VapidClaims, VapidSigner,
    VAPID_TOKEN_EXPIRY_SECS,
};
