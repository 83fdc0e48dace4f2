use super::kv::IKeyValueRepo;
use jotpush_domain::ReminderSettings;
use std::sync::Arc;
use tracing::warn;

fn settings_key(user_id: &str) -> String {
    format!("user:{}:settings", user_id)
}

#[async_trait::async_trait]
pub trait ISettingsRepo: Send + Sync {
    async fn find(&self, user_id: &str) -> Option<ReminderSettings>;
    async fn save(&self, user_id: &str, settings: &ReminderSettings) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &str) -> anyhow::Result<()>;
}

pub struct KVSettingsRepo {
    kv: Arc<dyn IKeyValueRepo>,
}

impl KVSettingsRepo {
    pub fn new(kv: Arc<dyn IKeyValueRepo>) -> Self {
        Self { kv }
    }
}

#[async_trait::async_trait]
impl ISettingsRepo for KVSettingsRepo {
    async fn find(&self, user_id: &str) -> Option<ReminderSettings> {
        let raw = self.kv.get(&settings_key(user_id)).await?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(
                    "Corrupt settings for user {}, treating as absent: {}",
                    user_id, e
                );
                None
            }
        }
    }

    async fn save(&self, user_id: &str, settings: &ReminderSettings) -> anyhow::Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.kv.put(&settings_key(user_id), &raw, None).await
    }

    async fn delete(&self, user_id: &str) -> anyhow::Result<()> {
        self.kv.delete(&settings_key(user_id)).await
    }
}
