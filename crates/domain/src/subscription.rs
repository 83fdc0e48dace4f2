use serde::{Deserialize, Serialize};

/// A browser push subscription as the client serializes it.
///
/// The `keys` pair is stored so the record round-trips untouched, but is
/// never used: deliveries carry no encrypted payload, only a wake signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub keys: Option<SubscriptionKeys>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}
