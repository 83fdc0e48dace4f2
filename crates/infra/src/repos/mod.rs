mod bucket;
mod kv;
mod schedule;
mod settings;
mod subscription;

use crate::system::ISys;
use std::sync::Arc;

pub use bucket::{IBucketRepo, KVBucketRepo, BUCKET_TTL_SECS};
pub use kv::{IKeyValueRepo, InMemoryKeyValueRepo, KeyListPage};
pub use schedule::{IScheduleRepo, KVScheduleRepo, ScheduleKey};
pub use settings::{ISettingsRepo, KVSettingsRepo};
pub use subscription::{ISubscriptionRepo, KVSubscriptionRepo};

#[derive(Clone)]
pub struct Repos {
    pub key_value: Arc<dyn IKeyValueRepo>,
    pub schedules: Arc<dyn IScheduleRepo>,
    pub buckets: Arc<dyn IBucketRepo>,
    pub settings: Arc<dyn ISettingsRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
}

impl Repos {
    /// Layers the typed repos over whichever key-value backend the
    /// deployment injects.
    pub fn create(kv: Arc<dyn IKeyValueRepo>) -> Self {
        Self {
            key_value: kv.clone(),
            schedules: Arc::new(KVScheduleRepo::new(kv.clone())),
            buckets: Arc::new(KVBucketRepo::new(kv.clone())),
            settings: Arc::new(KVSettingsRepo::new(kv.clone())),
            subscriptions: Arc::new(KVSubscriptionRepo::new(kv)),
        }
    }

    pub fn create_inmemory(sys: Arc<dyn ISys>) -> Self {
        Self::create(Arc::new(InMemoryKeyValueRepo::new(sys)))
    }
}
