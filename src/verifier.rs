//! Offline proof verification.
//!
//! Verification recomputes the personal-message digest, recovers the public
//! key from the signature and compares the derived address with the claimed
//! signer. It needs nothing but the proof itself.

use bitcoin::secp256k1::Message;
use serde::Serialize;

use crate::{
    decode, signed_message_hash, Address, DecodeError, Proof, Signature, VerifyCtx,
    VerifyFailureReason,
};

/// Outcome of verifying a proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    /// The address the signature actually recovers to, when recovery succeeds
    pub recovered_signer: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<VerifyFailureReason>,
}

/// Recovers the address that produced `signature` over `message`.
pub fn recover_signer(
    message: &str,
    signature: &Signature,
) -> Result<Address, VerifyFailureReason> {
    let secp = VerifyCtx::verification_only();

    let recoverable = signature
        .to_recoverable()
        .map_err(|_| VerifyFailureReason::SignatureMalformed)?;
    let digest = Message::from_digest(signed_message_hash(message.as_bytes()));
    let public_key = secp
        .recover_ecdsa(&digest, &recoverable)
        .map_err(|_| VerifyFailureReason::SignatureMalformed)?;

    Ok(Address::from_public_key(&public_key))
}

/// Verifies `proof` against its claimed signer.
pub fn verify(proof: &Proof) -> VerificationResult {
    match recover_signer(proof.message(), proof.signature()) {
        Ok(recovered) if recovered == *proof.signer() => VerificationResult {
            valid: true,
            recovered_signer: Some(recovered),
            reason: None,
        },
        Ok(recovered) => {
            tracing::debug!(claimed = %proof.signer(), %recovered, "proof signer mismatch");
            VerificationResult {
                valid: false,
                recovered_signer: Some(recovered),
                reason: Some(VerifyFailureReason::SignerMismatch),
            }
        }
        Err(reason) => {
            tracing::debug!(signature = ?proof.signature(), "signature recovery failed");
            VerificationResult {
                valid: false,
                recovered_signer: None,
                reason: Some(reason),
            }
        }
    }
}

/// Entry point for the verifying side: decodes a shared token and verifies it.
///
/// An absent token is reported as a missing field, not a panic.
pub fn verify_token(token: Option<&str>) -> Result<VerificationResult, DecodeError> {
    let token = token.ok_or(DecodeError::MissingField("token"))?;
    let proof = decode(token)?;
    Ok(verify(&proof))
}
