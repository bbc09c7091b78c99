//! Hashing helpers for personal-message signing.

use bitcoin::secp256k1::{All, Secp256k1, VerifyOnly};
use sha3::{Digest, Keccak256};

/// Prefix prepended to every personal message before hashing.
///
/// The full preimage is `PREFIX || decimal(len(message)) || message`, where
/// the length counts UTF-8 bytes, not characters.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Keccak-256 (the pre-standard SHA-3 padding used by Ethereum).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Creates the personal-message digest that wallets sign and verifiers recover from.
pub fn signed_message_hash(message: &[u8]) -> [u8; 32] {
    let mut engine = Keccak256::new();

    engine.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    engine.update(message.len().to_string().as_bytes());
    engine.update(message);

    engine.finalize().into()
}

pub(crate) type SecpCtx = Secp256k1<All>;
/// Recovery only needs the verification tables.
pub(crate) type VerifyCtx = Secp256k1<VerifyOnly>;
