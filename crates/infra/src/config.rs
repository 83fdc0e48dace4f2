use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base64url-encoded VAPID private key (raw P-256 scalar or PKCS#8
    /// document). Generated fresh when not configured, which keeps the
    /// process bootable but invalidates existing subscriptions on restart.
    pub vapid_private_key: String,
    /// Contact URI placed in the `sub` claim of every token.
    pub vapid_subject: String,
}

impl Config {
    pub fn new() -> Self {
        let vapid_private_key = match std::env::var("VAPID_PRIVATE_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find VAPID_PRIVATE_KEY environment variable. Going to create an ephemeral key.");
                let mut scalar = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut scalar);
                URL_SAFE_NO_PAD.encode(scalar)
            }
        };

        let default_subject = "mailto:reminders@jotpush.app";
        let vapid_subject = match std::env::var("VAPID_SUBJECT") {
            Ok(subject) => subject,
            Err(_) => {
                info!(
                    "Did not find VAPID_SUBJECT environment variable. Falling back to: {}.",
                    default_subject
                );
                default_subject.into()
            }
        };

        Self {
            vapid_private_key,
            vapid_subject,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
