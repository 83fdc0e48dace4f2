mod inmemory;

pub use inmemory::InMemoryKeyValueRepo;

/// One page of a prefix listing. `cursor` continues the traversal when
/// `complete` is false.
#[derive(Debug, Clone)]
pub struct KeyListPage {
    pub keys: Vec<String>,
    pub cursor: Option<String>,
    pub complete: bool,
}

/// The opaque key-value store every other repo is layered on. The durable
/// backend lives outside this repository, deployments inject their own
/// implementation of this trait.
#[async_trait::async_trait]
pub trait IKeyValueRepo: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    async fn list(&self, prefix: &str, cursor: Option<&str>) -> anyhow::Result<KeyListPage>;
}
