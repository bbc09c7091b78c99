//! Account addresses and their EIP-55 checksummed text form.
//!
//! An [`Address`] is the last 20 bytes of the Keccak-256 hash of an
//! uncompressed secp256k1 public key. Equality is byte equality, which is
//! the same as comparing canonical checksummed strings because the checksum
//! is a function of the bytes.

use core::{fmt, str::FromStr};

use bitcoin::{
    hex::{DisplayHex, FromHex},
    secp256k1::PublicKey,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{keccak256, AddressError};

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derives the address controlled by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let uncompressed = public_key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);

        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Renders the canonical `0x`-prefixed EIP-55 form.
    pub fn to_checksum(&self) -> String {
        let lower = self.0.to_lower_hex_string();
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts all-lowercase, all-uppercase, or correctly checksummed input,
    /// with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.len() != 40 {
            return Err(AddressError::InvalidLength(digits.len()));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex);
        }

        let bytes = Vec::<u8>::from_hex(digits).map_err(|_| AddressError::InvalidHex)?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        let address = Self(arr);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(AddressError::BadChecksum);
        }

        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::secp256k1::SecretKey;

    use super::*;
    use crate::SecpCtx;

    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_vectors() {
        for expected in CHECKSUMMED {
            let address = Address::from_str(&expected.to_lowercase()).unwrap();
            assert_eq!(address.to_checksum(), expected);
            assert_eq!(address.to_string(), expected);
        }
    }

    #[test]
    fn test_casing_variants_parse_to_same_address() {
        let canonical = Address::from_str(CHECKSUMMED[0]).unwrap();
        let lower = Address::from_str(&CHECKSUMMED[0].to_lowercase()).unwrap();
        let upper = format!("0x{}", CHECKSUMMED[0][2..].to_uppercase());
        let upper = Address::from_str(&upper).unwrap();
        let bare = Address::from_str(&CHECKSUMMED[0][2..]).unwrap();

        assert_eq!(canonical, lower);
        assert_eq!(canonical, upper);
        assert_eq!(canonical, bare);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // flip the case of the first letter only
        let tampered = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(Address::from_str(tampered), Err(AddressError::BadChecksum));
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(Address::from_str("0x1234"), Err(AddressError::InvalidLength(4)));
        assert_eq!(Address::from_str(""), Err(AddressError::InvalidLength(0)));
        assert_eq!(
            Address::from_str("0xzzAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"),
            Err(AddressError::InvalidHex)
        );
        // multi-byte characters must not slip past the length check
        assert!(Address::from_str("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAé").is_err());
    }

    #[test]
    fn test_address_from_known_key() {
        let secp = SecpCtx::new();
        let secret = SecretKey::from_slice(
            &Vec::<u8>::from_hex("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
                .unwrap(),
        )
        .unwrap();

        let address = Address::from_public_key(&secret.public_key(&secp));
        assert_eq!(address.to_string(), "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23");
    }

    #[test]
    fn test_serde_uses_checksum_string() {
        let address = Address::from_str(CHECKSUMMED[1]).unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", CHECKSUMMED[1]));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
