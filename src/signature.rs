//! Recoverable secp256k1 signatures in the 65-byte `r || s || v` layout.

use core::fmt;

use bitcoin::{
    hex::{DisplayHex, FromHex},
    secp256k1::{
        self,
        ecdsa::{RecoverableSignature, RecoveryId},
    },
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SignatureError;

/// A 65-byte recoverable signature as returned by wallets.
///
/// `v` is accepted either as a raw recovery id (`0`/`1`) or with the legacy
/// `27` offset. Signatures produced by this crate always carry the offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 65]);

impl Signature {
    pub const LEN: usize = 65;

    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let arr: [u8; 65] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Parses `0x`-prefixed (or bare) hex in either case.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SignatureError::InvalidHex);
        }
        if digits.len() % 2 != 0 {
            return Err(SignatureError::InvalidHex);
        }

        let bytes = Vec::<u8>::from_hex(digits).map_err(|_| SignatureError::InvalidHex)?;
        Self::from_slice(&bytes)
    }

    /// Lowercase hex with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", self.0.to_lower_hex_string())
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The trailing `v` byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// Normalized recovery id, or `None` if `v` is not one of 0, 1, 27, 28.
    pub fn recovery_id(&self) -> Option<RecoveryId> {
        let id = match self.v() {
            0 | 1 => self.v(),
            27 | 28 => self.v() - 27,
            _ => return None,
        };
        RecoveryId::from_i32(i32::from(id)).ok()
    }

    pub(crate) fn to_recoverable(&self) -> Result<RecoverableSignature, secp256k1::Error> {
        let recovery_id = self
            .recovery_id()
            .ok_or(secp256k1::Error::InvalidRecoveryId)?;
        RecoverableSignature::from_compact(&self.0[..64], recovery_id)
    }

    /// Re-encodes a library signature with the `27` offset on `v`.
    pub fn from_recoverable(signature: &RecoverableSignature) -> Self {
        let (recovery_id, compact) = signature.serialize_compact();

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&compact);
        bytes[64] = 27 + recovery_id.to_i32() as u8;
        Self(bytes)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{}...)", self.0[..8].to_lower_hex_string())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
