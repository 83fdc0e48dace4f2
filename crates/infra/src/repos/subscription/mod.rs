use super::kv::IKeyValueRepo;
use jotpush_domain::PushSubscription;
use std::sync::Arc;
use tracing::warn;

fn subscription_key(user_id: &str) -> String {
    format!("user:{}:subscription", user_id)
}

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    async fn find(&self, user_id: &str) -> Option<PushSubscription>;
    async fn save(&self, user_id: &str, subscription: &PushSubscription) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &str) -> anyhow::Result<()>;
}

pub struct KVSubscriptionRepo {
    kv: Arc<dyn IKeyValueRepo>,
}

impl KVSubscriptionRepo {
    pub fn new(kv: Arc<dyn IKeyValueRepo>) -> Self {
        Self { kv }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for KVSubscriptionRepo {
    async fn find(&self, user_id: &str) -> Option<PushSubscription> {
        let raw = self.kv.get(&subscription_key(user_id)).await?;
        match serde_json::from_str(&raw) {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                warn!(
                    "Corrupt push subscription for user {}, treating as absent: {}",
                    user_id, e
                );
                None
            }
        }
    }

    async fn save(&self, user_id: &str, subscription: &PushSubscription) -> anyhow::Result<()> {
        let raw = serde_json::to_string(subscription)?;
        self.kv.put(&subscription_key(user_id), &raw, None).await
    }

    async fn delete(&self, user_id: &str) -> anyhow::Result<()> {
        self.kv.delete(&subscription_key(user_id)).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repos::kv::InMemoryKeyValueRepo;
    use crate::system::FixedSys;

    #[tokio::test]
    async fn it_round_trips_subscriptions() {
        let kv: Arc<dyn IKeyValueRepo> =
            Arc::new(InMemoryKeyValueRepo::new(Arc::new(FixedSys::new(0))));
        let repo = KVSubscriptionRepo::new(kv.clone());

        let subscription: PushSubscription = serde_json::from_str(
            r#"{"endpoint": "https://push.example/sub-1", "keys": {"p256dh": "k", "auth": "a"}}"#,
        )
        .unwrap();

        repo.save("user-1", &subscription).await.unwrap();
        assert_eq!(repo.find("user-1").await.unwrap(), subscription);

        kv.put("user:user-2:subscription", "][", None).await.unwrap();
        assert!(repo.find("user-2").await.is_none());
    }
}
