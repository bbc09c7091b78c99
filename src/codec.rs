//! Transport encoding for proofs.
//!
//! A token is the unpadded base64url encoding of a short-keyed JSON object:
//!
//! ```text
//! {"v":1,"m":"<message>","s":"0x<130 hex>","a":"0x<EIP-55 address>","t":"<RFC 3339>"}
//! ```
//!
//! `t` is omitted when the proof carries no timestamp. RFC 3339 only covers
//! four-digit years, so timestamps outside 0001–9999 are written as
//! `[unix_seconds, nanoseconds]` instead. Tokens only contain
//! `[A-Za-z0-9_-]`, so they can sit in a URL path segment, query value or
//! fragment without escaping. Decoding never panics: every token arriving
//! here is treated as attacker controlled.

use bitcoin::base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Address, DecodeError, Proof, SignError, Signature};

/// Payload version written by this encoder.
pub const TOKEN_VERSION: u64 = 1;

/// Upper bound on the JSON bytes of a payload other than the message text.
const ENVELOPE_LEN: usize = 256;

/// Worst-case JSON growth of one message byte (a control byte becomes `\u00XX`).
const MAX_ESCAPE_GROWTH: usize = 6;

/// Size limit shared by the signing and the verifying side.
///
/// The token limit is derived from the message limit, so any message that
/// passes [`CodecConfig::check_message`] encodes to a token that decodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Longest message accepted, in UTF-8 bytes
    pub max_message_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_len: 4 * 1024,
        }
    }
}

impl CodecConfig {
    /// Longest token an in-limit message can encode to.
    pub fn max_token_len(&self) -> usize {
        let json = self
            .max_message_len
            .saturating_mul(MAX_ESCAPE_GROWTH)
            .saturating_add(ENVELOPE_LEN);
        (json.saturating_add(2) / 3).saturating_mul(4)
    }

    /// Rejects a message before any wallet is asked to sign it.
    pub fn check_message(&self, message: &str) -> Result<(), SignError> {
        if message.len() > self.max_message_len {
            tracing::warn!(len = message.len(), max = self.max_message_len, "message too long");
            return Err(SignError::MessageTooLong {
                len: message.len(),
                max: self.max_message_len,
            });
        }
        Ok(())
    }
}

/// A decoded proof plus the non-fatal problems found along the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub proof: Proof,
    pub warnings: Vec<DecodeError>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireTime {
    Rfc3339(String),
    Parts(i64, u32),
}

impl From<DateTime<Utc>> for WireTime {
    fn from(t: DateTime<Utc>) -> Self {
        if (1..=9999).contains(&t.year()) {
            Self::Rfc3339(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        } else {
            Self::Parts(t.timestamp(), t.timestamp_subsec_nanos())
        }
    }
}

#[derive(Serialize)]
struct WireOut<'a> {
    v: u64,
    m: &'a str,
    s: String,
    a: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    t: Option<WireTime>,
}

#[derive(Deserialize)]
struct WireIn {
    v: Option<u64>,
    m: Option<String>,
    s: Option<String>,
    a: Option<String>,
    t: Option<serde_json::Value>,
}

/// Proof codec with explicit limits.
#[derive(Clone, Copy, Debug, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `proof` into a URL-safe token. Deterministic.
    pub fn encode(&self, proof: &Proof) -> String {
        let wire = WireOut {
            v: TOKEN_VERSION,
            m: proof.message(),
            s: proof.signature().to_hex(),
            a: proof.signer().to_checksum(),
            t: proof.signed_at().map(WireTime::from),
        };
        // serializing strings and integers cannot fail
        let json = serde_json::to_vec(&wire).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decodes a token, dropping an unreadable timestamp.
    pub fn decode(&self, token: &str) -> Result<Proof, DecodeError> {
        self.decode_with_warnings(token).map(|decoded| {
            for warning in &decoded.warnings {
                tracing::warn!(%warning, "proof decoded with warnings");
            }
            decoded.proof
        })
    }

    /// Decodes a token and reports non-fatal problems alongside the proof.
    pub fn decode_with_warnings(&self, token: &str) -> Result<Decoded, DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::MissingField("token"));
        }
        let max_token_len = self.config.max_token_len();
        if token.len() > max_token_len {
            return Err(DecodeError::Corrupt(format!(
                "token is {} bytes, limit is {max_token_len}",
                token.len()
            )));
        }

        let json = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| DecodeError::Corrupt(format!("not base64url: {e}")))?;
        let wire: WireIn = serde_json::from_slice(&json)
            .map_err(|e| DecodeError::Corrupt(format!("invalid payload: {e}")))?;

        let version = wire.v.unwrap_or(TOKEN_VERSION);
        if version != TOKEN_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let message = wire.m.ok_or(DecodeError::MissingField("message"))?;
        let signature = wire.s.ok_or(DecodeError::MissingField("signature"))?;
        let signer = wire.a.ok_or(DecodeError::MissingField("signer"))?;

        if message.len() > self.config.max_message_len {
            return Err(DecodeError::Corrupt(format!(
                "message is {} bytes, limit is {}",
                message.len(),
                self.config.max_message_len
            )));
        }

        let signature = Signature::from_hex(&signature)?;
        let signer: Address = signer.parse()?;

        let mut warnings = Vec::new();
        let signed_at = match wire.t {
            None | Some(serde_json::Value::Null) => None,
            Some(raw) => match parse_timestamp(&raw) {
                Ok(t) => Some(t),
                Err(e) => {
                    warnings.push(e);
                    None
                }
            },
        };

        Ok(Decoded {
            proof: Proof::new(message, signature, signer, signed_at),
            warnings,
        })
    }
}

fn parse_timestamp(raw: &serde_json::Value) -> Result<DateTime<Utc>, DecodeError> {
    match raw {
        serde_json::Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DecodeError::MalformedTimestamp(format!("{text:?}: {e}"))),
        serde_json::Value::Array(parts) => {
            let (secs, nanos) = match parts.as_slice() {
                [secs, nanos] => (secs.as_i64(), nanos.as_u64()),
                _ => (None, None),
            };
            secs.zip(nanos.and_then(|n| u32::try_from(n).ok()))
                .and_then(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).single())
                .ok_or_else(|| DecodeError::MalformedTimestamp(format!("out of range: {raw}")))
        }
        _ => Err(DecodeError::MalformedTimestamp(format!(
            "expected string or [seconds, nanos], got {raw}"
        ))),
    }
}

/// Encodes with the default limits.
pub fn encode(proof: &Proof) -> String {
    Codec::default().encode(proof)
}

/// Decodes with the default limits.
pub fn decode(token: &str) -> Result<Proof, DecodeError> {
    Codec::default().decode(token)
}

/// Decodes with the default limits, keeping warnings.
pub fn decode_with_warnings(token: &str) -> Result<Decoded, DecodeError> {
    Codec::default().decode_with_warnings(token)
}
