mod config;
mod repos;
mod services;
mod system;

use jotpush_domain::VapidSigner;
use std::sync::Arc;

pub use config::Config;
pub use repos::{
    IBucketRepo, IKeyValueRepo, IScheduleRepo, ISettingsRepo, ISubscriptionRepo,
    InMemoryKeyValueRepo, KeyListPage, Repos, ScheduleKey, BUCKET_TTL_SECS,
};
pub use services::{IPushSender, PushError, StubPushSender, WebPushSender};
pub use system::{FixedSys, ISys, RealSys};

#[derive(Clone)]
pub struct Context {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushSender>,
}

impl Context {
    /// In-memory storage with a stub push sender. Tests that need to
    /// observe pushes or control time use [`Context::create_inmemory_with`].
    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with(Arc::new(RealSys {}), Arc::new(StubPushSender::new()))
    }

    pub fn create_inmemory_with(sys: Arc<dyn ISys>, push: Arc<dyn IPushSender>) -> Self {
        Self {
            repos: Repos::create_inmemory(sys.clone()),
            config: Config::new(),
            sys,
            push,
        }
    }
}

/// Will setup the infrastructure context given the environment.
///
/// The durable key-value backend is owned by the embedding deployment;
/// this default wiring runs on the in-memory store behind the
/// `IKeyValueRepo` seam.
pub fn setup_context() -> Context {
    let config = Config::new();
    let sys: Arc<dyn ISys> = Arc::new(RealSys {});
    let signer = VapidSigner::from_base64(&config.vapid_private_key)
        .expect("VAPID_PRIVATE_KEY must be a valid P-256 private key");
    let push = Arc::new(WebPushSender::new(
        signer,
        config.vapid_subject.clone(),
        sys.clone(),
    ));

    Context {
        repos: Repos::create_inmemory(sys.clone()),
        config,
        sys,
        push,
    }
}
