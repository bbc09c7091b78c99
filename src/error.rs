//! Error types for proof signing, transport decoding and verification.
//!
//! Every failure in this crate is returned as a value. The three families map
//! onto the three places a proof can go wrong: producing it ([`SignError`]),
//! reading it back from a link ([`DecodeError`]) and checking it
//! ([`VerifyFailureReason`]).

use serde::Serialize;
use thiserror::Error;

use crate::Address;

/// Errors raised while producing a proof through a wallet agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// The user declined the signature request in the wallet
    #[error("signature request rejected")]
    Rejected,
    /// No wallet is connected, or the agent is unavailable
    #[error("no wallet connected")]
    NoSigner,
    /// The wallet agent could not be reached or failed mid-request
    #[error("wallet transport failure: {0}")]
    TransportFailure(String),
    /// The wallet returned bytes that are not a recoverable signature
    #[error("wallet returned a malformed signature: {0}")]
    MalformedSignature(String),
    /// The wallet signed with a different account than the connected one
    #[error("wallet signed as {recovered}, expected {expected}")]
    SignerMismatch {
        expected: Address,
        recovered: Address,
    },
    /// The attempt was cancelled or replaced before the wallet answered
    #[error("signing attempt superseded")]
    Superseded,
    /// The message exceeds the limit a shared token can carry
    #[error("message is {len} bytes, limit is {max}")]
    MessageTooLong { len: usize, max: usize },
}

/// Errors raised while decoding a transport token.
///
/// Display strings are meant to be shown behind a generic
/// "this proof link is invalid or corrupted" banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field (or the token itself) is absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    /// The signature is not 65 bytes of hex
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
    /// The signer is not a valid address
    #[error("malformed signer: {0}")]
    MalformedSigner(String),
    /// The timestamp could not be parsed. Never fatal on its own.
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),
    /// The payload was written by an unknown encoder version
    #[error("unsupported proof version {0}")]
    UnsupportedVersion(u64),
    /// The token is not decodable at all
    #[error("corrupt proof token: {0}")]
    Corrupt(String),
}

/// Why a structurally valid proof failed verification.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyFailureReason {
    /// Public-key recovery rejected the signature bytes
    #[error("signature is malformed")]
    SignatureMalformed,
    /// The signature is valid for some key, but not the claimed signer
    #[error("signature does not match claimed signer")]
    SignerMismatch,
}

/// Errors parsing an address from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("expected 40 hex characters, got {0}")]
    InvalidLength(usize),
    #[error("address contains non-hex characters")]
    InvalidHex,
    #[error("mixed-case address fails checksum")]
    BadChecksum,
}

/// Errors parsing a recoverable signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("expected 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("signature contains non-hex characters")]
    InvalidHex,
}

/// Errors building or reading a share link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("invalid base url: {0}")]
    InvalidBase(#[from] url::ParseError),
}

impl From<AddressError> for DecodeError {
    fn from(e: AddressError) -> Self {
        Self::MalformedSigner(e.to_string())
    }
}

impl From<SignatureError> for DecodeError {
    fn from(e: SignatureError) -> Self {
        Self::MalformedSignature(e.to_string())
    }
}

impl From<SignatureError> for SignError {
    fn from(e: SignatureError) -> Self {
        Self::MalformedSignature(e.to_string())
    }
}
