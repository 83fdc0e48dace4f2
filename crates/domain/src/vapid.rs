use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Origin, Url};

/// Tokens are minted fresh per delivery and expire after 12 hours.
pub const VAPID_TOKEN_EXPIRY_SECS: i64 = 12 * 60 * 60;

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("Key import failed: {0}")]
    KeyImport(String),
    #[error("Malformed DER signature: {0}")]
    MalformedDerSignature(String),
    #[error("Failed to encode token segment: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Supported private key encodings, tried in this order by
/// [`VapidSigner::from_base64`]. A miss on the first strategy is a normal
/// branch, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyImportStrategy {
    RawScalar,
    Pkcs8,
}

const IMPORT_ORDER: [KeyImportStrategy; 2] =
    [KeyImportStrategy::RawScalar, KeyImportStrategy::Pkcs8];

#[derive(Debug, Serialize)]
struct TokenHeader {
    alg: &'static str,
    typ: &'static str,
}

impl TokenHeader {
    fn es256() -> Self {
        Self {
            alg: "ES256",
            typ: "JWT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VapidClaims {
    pub aud: String,
    pub exp: i64,
    pub sub: String,
}

impl VapidClaims {
    pub fn new(aud: String, sub: String, now_millis: i64) -> Self {
        Self {
            aud,
            exp: now_millis / 1000 + VAPID_TOKEN_EXPIRY_SECS,
            sub,
        }
    }
}

/// An ECDSA/P-256 signature in one of the two encodings a signing
/// primitive may hand back. The token format mandates the raw fixed-width
/// `r‖s` form, so the DER arm is normalized before use.
#[derive(Debug, Clone, PartialEq)]
pub enum EcdsaSignature {
    Raw([u8; 64]),
    Der(Vec<u8>),
}

impl EcdsaSignature {
    pub fn into_raw(self) -> Result<[u8; 64], SigningError> {
        match self {
            EcdsaSignature::Raw(bytes) => Ok(bytes),
            EcdsaSignature::Der(bytes) => {
                let mut at = 0;
                expect_der_tag(&bytes, &mut at, 0x30)?;
                let seq_len = read_der_length(&bytes, &mut at)?;
                if at + seq_len != bytes.len() {
                    return Err(SigningError::MalformedDerSignature(
                        "SEQUENCE length does not match input".into(),
                    ));
                }
                let r = read_der_integer(&bytes, &mut at)?;
                let s = read_der_integer(&bytes, &mut at)?;

                let mut raw = [0u8; 64];
                raw[..32].copy_from_slice(&r);
                raw[32..].copy_from_slice(&s);
                Ok(raw)
            }
        }
    }
}

fn expect_der_tag(bytes: &[u8], at: &mut usize, tag: u8) -> Result<(), SigningError> {
    match bytes.get(*at) {
        Some(b) if *b == tag => {
            *at += 1;
            Ok(())
        }
        Some(b) => Err(SigningError::MalformedDerSignature(format!(
            "expected tag {:#04x}, found {:#04x}",
            tag, b
        ))),
        None => Err(SigningError::MalformedDerSignature("truncated input".into())),
    }
}

fn read_der_length(bytes: &[u8], at: &mut usize) -> Result<usize, SigningError> {
    let first = *bytes
        .get(*at)
        .ok_or_else(|| SigningError::MalformedDerSignature("truncated input".into()))?;
    *at += 1;
    if first < 0x80 {
        return Ok(first as usize);
    }
    // A P-256 signature never needs more than a one-byte length
    if first == 0x81 {
        let len = *bytes
            .get(*at)
            .ok_or_else(|| SigningError::MalformedDerSignature("truncated input".into()))?;
        *at += 1;
        return Ok(len as usize);
    }
    Err(SigningError::MalformedDerSignature(format!(
        "unsupported length encoding {:#04x}",
        first
    )))
}

/// Reads one DER INTEGER and fits it into exactly 32 bytes: leading zero
/// padding is stripped, shorter values are left-padded.
fn read_der_integer(bytes: &[u8], at: &mut usize) -> Result<[u8; 32], SigningError> {
    expect_der_tag(bytes, at, 0x02)?;
    let len = read_der_length(bytes, at)?;
    let end = *at + len;
    if end > bytes.len() {
        return Err(SigningError::MalformedDerSignature("truncated input".into()));
    }
    let mut content = &bytes[*at..end];
    *at = end;

    while content.len() > 32 && content[0] == 0 {
        content = &content[1..];
    }
    if content.len() > 32 {
        return Err(SigningError::MalformedDerSignature(format!(
            "INTEGER of {} bytes does not fit a P-256 field element",
            content.len()
        )));
    }

    let mut fixed = [0u8; 32];
    fixed[32 - content.len()..].copy_from_slice(content);
    Ok(fixed)
}

/// Signs compact VAPID bearer tokens (`header.payload.signature`, each
/// segment base64url without padding) with ECDSA over P-256 / SHA-256.
#[derive(Debug, Clone)]
pub struct VapidSigner {
    key: SigningKey,
}

impl VapidSigner {
    /// Imports a base64url-encoded private key, trying each
    /// [`KeyImportStrategy`] in order.
    pub fn from_base64(encoded: &str) -> Result<Self, SigningError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| SigningError::KeyImport(format!("invalid base64url: {}", e)))?;

        for strategy in &IMPORT_ORDER {
            if let Ok(key) = Self::import_key(&bytes, *strategy) {
                return Ok(Self { key });
            }
        }
        Err(SigningError::KeyImport(
            "key is neither a raw P-256 scalar nor a PKCS#8 document".into(),
        ))
    }

    fn import_key(bytes: &[u8], strategy: KeyImportStrategy) -> Result<SigningKey, SigningError> {
        match strategy {
            KeyImportStrategy::RawScalar => {
                if bytes.len() != 32 {
                    return Err(SigningError::KeyImport(format!(
                        "raw scalar must be 32 bytes, got {}",
                        bytes.len()
                    )));
                }
                SigningKey::from_slice(bytes)
                    .map_err(|e| SigningError::KeyImport(e.to_string()))
            }
            KeyImportStrategy::Pkcs8 => SigningKey::from_pkcs8_der(bytes)
                .map_err(|e| SigningError::KeyImport(e.to_string())),
        }
    }

    /// The base64url-encoded uncompressed public point, as used in the
    /// `k=` parameter of the authorization header.
    pub fn public_key(&self) -> String {
        let point = VerifyingKey::from(&self.key).to_encoded_point(false);
        URL_SAFE_NO_PAD.encode(point.as_bytes())
    }

    pub fn sign(&self, claims: &VapidClaims) -> Result<String, SigningError> {
        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&TokenHeader::es256())?);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signing_input = format!("{}.{}", header, payload);

        let signature: Signature = self.key.sign(signing_input.as_bytes());
        let mut raw = [0u8; 64];
        raw.copy_from_slice(&signature.to_bytes());
        let raw = EcdsaSignature::Raw(raw).into_raw()?;

        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(&raw)
        ))
    }
}

/// The token audience for a push endpoint: its serialized origin, which
/// keeps a non-default port (`http://localhost:8787`) — push services
/// compare the token `aud` against the full origin, not just scheme and
/// host. `None` when the endpoint is not a hierarchical URL.
pub fn endpoint_audience(endpoint: &str) -> Option<String> {
    let url = Url::parse(endpoint).ok()?;
    match url.origin() {
        Origin::Tuple(..) => Some(url.origin().ascii_serialization()),
        Origin::Opaque(_) => None,
    }
}
