//! The proof record: a statement, a signature over it, and the claimed signer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{verify, Address, Signature, VerificationResult};

/// A signed statement.
///
/// Proofs are immutable. Holding a `Proof` says nothing about its validity;
/// call [`Proof::verify`] for that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    message: String,
    signature: Signature,
    signer: Address,
    signed_at: Option<DateTime<Utc>>,
}

impl Proof {
    pub fn new(
        message: impl Into<String>,
        signature: Signature,
        signer: Address,
        signed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            message: message.into(),
            signature,
            signer,
            signed_at,
        }
    }

    /// The attested statement, byte for byte as signed.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The claimed signer. Only trustworthy after verification.
    pub fn signer(&self) -> &Address {
        &self.signer
    }

    /// Creation time. Informational, not covered by the signature.
    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        self.signed_at
    }

    pub fn verify(&self) -> VerificationResult {
        verify(self)
    }
}
