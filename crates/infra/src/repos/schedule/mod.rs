use super::kv::{IKeyValueRepo, KeyListPage};
use jotpush_domain::{Day, LegacyScheduleRecord, ScheduleRecord};
use std::sync::Arc;
use tracing::warn;

const SCHEDULE_PREFIX: &str = "schedule:";

/// A parsed key of the schedule namespace. The legacy shape keyed by
/// `(date, userId)` only survives until the refresh engine has migrated
/// every record to the current per-user key.
///
/// User ids must not contain `:`. The two key shapes share one namespace
/// and are told apart by the first separator, so an id with a date-shaped
/// first segment would read as a legacy key, and any other id with a
/// colon would not be recognized at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleKey {
    Current { user_id: String },
    Legacy { date: Day, user_id: String },
}

impl ScheduleKey {
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(SCHEDULE_PREFIX)?;
        if rest.is_empty() {
            return None;
        }
        match rest.find(':') {
            None => Some(ScheduleKey::Current {
                user_id: rest.into(),
            }),
            Some(split) => {
                let date = rest[..split].parse().ok()?;
                let user_id = &rest[split + 1..];
                if user_id.is_empty() {
                    return None;
                }
                Some(ScheduleKey::Legacy {
                    date,
                    user_id: user_id.into(),
                })
            }
        }
    }
}

fn current_key(user_id: &str) -> String {
    format!("{}{}", SCHEDULE_PREFIX, user_id)
}

fn legacy_key(date: &Day, user_id: &str) -> String {
    format!("{}{}:{}", SCHEDULE_PREFIX, date, user_id)
}

#[async_trait::async_trait]
pub trait IScheduleRepo: Send + Sync {
    async fn find(&self, user_id: &str) -> Option<ScheduleRecord>;
    async fn save(&self, record: &ScheduleRecord) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &str) -> anyhow::Result<()>;
    /// One page of the full schedule namespace, legacy keys included.
    async fn list_keys(&self, cursor: Option<&str>) -> anyhow::Result<KeyListPage>;
    async fn find_legacy(&self, date: &Day, user_id: &str) -> Option<LegacyScheduleRecord>;
    async fn delete_legacy(&self, date: &Day, user_id: &str) -> anyhow::Result<()>;
}

pub struct KVScheduleRepo {
    kv: Arc<dyn IKeyValueRepo>,
}

impl KVScheduleRepo {
    pub fn new(kv: Arc<dyn IKeyValueRepo>) -> Self {
        Self { kv }
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for KVScheduleRepo {
    async fn find(&self, user_id: &str) -> Option<ScheduleRecord> {
        let raw = self.kv.get(&current_key(user_id)).await?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                // Corrupt records are treated as absent, dispatch and
                // refresh must keep running.
                warn!(
                    "Corrupt schedule record for user {}, treating as absent: {}",
                    user_id, e
                );
                None
            }
        }
    }

    async fn save(&self, record: &ScheduleRecord) -> anyhow::Result<()> {
        let raw = serde_json::to_string(record)?;
        self.kv.put(&current_key(&record.user_id), &raw, None).await
    }

    async fn delete(&self, user_id: &str) -> anyhow::Result<()> {
        self.kv.delete(&current_key(user_id)).await
    }

    async fn list_keys(&self, cursor: Option<&str>) -> anyhow::Result<KeyListPage> {
        self.kv.list(SCHEDULE_PREFIX, cursor).await
    }

    async fn find_legacy(&self, date: &Day, user_id: &str) -> Option<LegacyScheduleRecord> {
        let raw = self.kv.get(&legacy_key(date, user_id)).await?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Corrupt legacy schedule record for user {}, treating as absent: {}",
                    user_id, e
                );
                None
            }
        }
    }

    async fn delete_legacy(&self, date: &Day, user_id: &str) -> anyhow::Result<()> {
        self.kv.delete(&legacy_key(date, user_id)).await
    }
}
