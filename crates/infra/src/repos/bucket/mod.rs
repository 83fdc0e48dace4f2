use super::kv::IKeyValueRepo;
use jotpush_domain::UtcSlot;
use std::sync::Arc;
use tracing::warn;

/// Buckets only matter for the day they describe, they expire on their own
/// after this window.
pub const BUCKET_TTL_SECS: u64 = 48 * 60 * 60;

fn bucket_key(slot: &UtcSlot) -> String {
    format!("bucket:{}:{}", slot.date, slot.time)
}

/// The inverted index from a UTC minute to the users due to fire then.
/// Membership is kept in sync with the owning schedule record: rebuilds
/// and deletions remove the user from the previous record's slots.
#[async_trait::async_trait]
pub trait IBucketRepo: Send + Sync {
    async fn add_user(&self, user_id: &str, slot: &UtcSlot) -> anyhow::Result<()>;
    async fn remove_user(&self, user_id: &str, slot: &UtcSlot) -> anyhow::Result<()>;
    async fn members_at(&self, slot: &UtcSlot) -> Vec<String>;

    async fn add_schedule(&self, user_id: &str, slots: &[UtcSlot]) -> anyhow::Result<()> {
        for slot in slots {
            self.add_user(user_id, slot).await?;
        }
        Ok(())
    }

    async fn remove_schedule(&self, user_id: &str, slots: &[UtcSlot]) -> anyhow::Result<()> {
        for slot in slots {
            self.remove_user(user_id, slot).await?;
        }
        Ok(())
    }
}

pub struct KVBucketRepo {
    kv: Arc<dyn IKeyValueRepo>,
}

impl KVBucketRepo {
    pub fn new(kv: Arc<dyn IKeyValueRepo>) -> Self {
        Self { kv }
    }

    async fn members(&self, key: &str) -> Vec<String> {
        let raw = match self.kv.get(key).await {
            Some(raw) => raw,
            None => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(members) => members,
            Err(e) => {
                // A corrupt bucket payload must never take dispatch down
                warn!("Corrupt bucket {}, treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl IBucketRepo for KVBucketRepo {
    async fn add_user(&self, user_id: &str, slot: &UtcSlot) -> anyhow::Result<()> {
        let key = bucket_key(slot);
        let mut members = self.members(&key).await;
        if !members.iter().any(|member| member == user_id) {
            members.push(user_id.into());
        }
        let raw = serde_json::to_string(&members)?;
        self.kv.put(&key, &raw, Some(BUCKET_TTL_SECS)).await
    }

    async fn remove_user(&self, user_id: &str, slot: &UtcSlot) -> anyhow::Result<()> {
        let key = bucket_key(slot);
        let mut members = self.members(&key).await;
        members.retain(|member| member != user_id);
        if members.is_empty() {
            // empty buckets are deleted outright instead of lingering
            return self.kv.delete(&key).await;
        }
        let raw = serde_json::to_string(&members)?;
        self.kv.put(&key, &raw, Some(BUCKET_TTL_SECS)).await
    }

    async fn members_at(&self, slot: &UtcSlot) -> Vec<String> {
        self.members(&bucket_key(slot)).await
    }
}
