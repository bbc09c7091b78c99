//! Proof construction on top of a connected wallet agent.

use chrono::{DateTime, Utc};

use crate::{recover_signer, Address, CodecConfig, Proof, SignError, Signature, WalletAgent};

/// Builds proofs with the account connected to `agent`.
pub struct Signer<'a, W: WalletAgent + ?Sized> {
    agent: &'a W,
    config: CodecConfig,
}

impl<'a, W: WalletAgent + ?Sized> Signer<'a, W> {
    pub fn new(agent: &'a W) -> Self {
        Self::with_config(agent, CodecConfig::default())
    }

    /// Signer whose proofs must fit the limits of `config`.
    pub fn with_config(agent: &'a W, config: CodecConfig) -> Self {
        Self { agent, config }
    }

    /// Asks the wallet to sign `message` and assembles the proof.
    ///
    /// The signer address is captured before the request is issued, so an
    /// account switch while the wallet prompt is open cannot change which
    /// address the proof claims.
    pub async fn sign(&self, message: &str) -> Result<Proof, SignError> {
        self.config.check_message(message)?;

        let signer = self
            .agent
            .connected_address()
            .ok_or_else(|| {
                tracing::warn!("sign requested with no connected wallet");
                SignError::NoSigner
            })?;

        let raw = self
            .agent
            .request_signature(message, &signer)
            .await
            .map_err(|e| {
                tracing::warn!(%signer, error = %e, "wallet declined signature request");
                SignError::from(e)
            })?;

        assemble(message, &raw, signer, Utc::now())
    }
}

/// One-shot form of [`Signer::sign`].
pub async fn sign<W: WalletAgent + ?Sized>(agent: &W, message: &str) -> Result<Proof, SignError> {
    Signer::new(agent).sign(message).await
}

/// Checks what the wallet returned and wraps it into a proof.
///
/// The returned bytes must recover to `signer` over exactly `message`,
/// otherwise the proof would fail verification the moment it is shared.
pub(crate) fn assemble(
    message: &str,
    raw: &[u8],
    signer: Address,
    signed_at: DateTime<Utc>,
) -> Result<Proof, SignError> {
    let signature = Signature::from_slice(raw).map_err(|e| {
        tracing::warn!(%signer, error = %e, "wallet returned malformed signature");
        SignError::from(e)
    })?;

    let recovered = recover_signer(message, &signature)
        .map_err(|e| SignError::MalformedSignature(e.to_string()))?;
    if recovered != signer {
        tracing::warn!(expected = %signer, %recovered, "wallet signed with another account");
        return Err(SignError::SignerMismatch {
            expected: signer,
            recovered,
        });
    }

    tracing::debug!(%signer, len = message.len(), "proof assembled");
    Ok(Proof::new(message, signature, signer, Some(signed_at)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_utils::{Answer, LocalWallet};
    use crate::{Codec, WalletAgent};

    const STATEMENT: &str = "I control this wallet and here is my statement ...";

    #[tokio::test]
    async fn test_sign_produces_verifiable_proof() {
        let wallet = LocalWallet::from_seed(1);
        let before = Utc::now();

        let proof = Signer::new(&wallet).sign(STATEMENT).await.unwrap();

        assert_eq!(proof.message(), STATEMENT);
        assert_eq!(*proof.signer(), wallet.address());
        assert!(proof.signed_at().unwrap() >= before);
        assert!(proof.verify().valid);
    }

    #[tokio::test]
    async fn test_sign_twice_both_verify() {
        let wallet = LocalWallet::from_seed(2);

        let first = sign(&wallet, STATEMENT).await.unwrap();
        let second = sign(&wallet, STATEMENT).await.unwrap();

        assert!(first.verify().valid);
        assert!(second.verify().valid);
    }

    #[tokio::test]
    async fn test_no_signer() {
        let wallet = LocalWallet::from_seed(3).disconnected();
        assert_eq!(sign(&wallet, STATEMENT).await, Err(SignError::NoSigner));
    }

    #[tokio::test]
    async fn test_rejected() {
        let wallet = LocalWallet::from_seed(4).answering(Answer::Reject);
        assert_eq!(sign(&wallet, STATEMENT).await, Err(SignError::Rejected));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let wallet = LocalWallet::from_seed(5).answering(Answer::Fail("socket closed".into()));
        assert_eq!(
            sign(&wallet, STATEMENT).await,
            Err(SignError::TransportFailure("socket closed".into()))
        );
    }

    #[tokio::test]
    async fn test_garbage_signature() {
        let wallet = LocalWallet::from_seed(6).answering(Answer::Garbage(vec![0xde, 0xad]));
        assert!(matches!(
            sign(&wallet, STATEMENT).await,
            Err(SignError::MalformedSignature(_))
        ));
    }

    #[tokio::test]
    async fn test_wallet_signing_as_other_account() {
        let wallet = LocalWallet::from_seed(7).answering(Answer::SignAs(8));
        let expected = wallet.address();
        let recovered = LocalWallet::from_seed(8).address();

        assert_eq!(
            sign(&wallet, STATEMENT).await,
            Err(SignError::SignerMismatch {
                expected,
                recovered
            })
        );
    }

    #[tokio::test]
    async fn test_message_over_limit_never_reaches_wallet() {
        // a wallet that would fail if asked, so only the length check can answer
        let wallet = LocalWallet::from_seed(10).answering(Answer::Fail("asked".into()));
        let config = CodecConfig::default();
        let message = "a".repeat(config.max_message_len + 1);

        assert_eq!(
            Signer::with_config(&wallet, config).sign(&message).await,
            Err(SignError::MessageTooLong {
                len: config.max_message_len + 1,
                max: config.max_message_len,
            })
        );
    }

    #[tokio::test]
    async fn test_signed_proof_at_limit_decodes() {
        let wallet = LocalWallet::from_seed(11);
        let config = CodecConfig::default();
        let codec = Codec::new(config);

        for message in [
            "a".repeat(config.max_message_len),
            "\u{1}".repeat(config.max_message_len),
        ] {
            let proof = Signer::with_config(&wallet, config).sign(&message).await.unwrap();
            assert_eq!(codec.decode(&codec.encode(&proof)).unwrap(), proof);
        }
    }

    #[tokio::test]
    async fn test_sign_through_trait_object() {
        let wallet: Arc<dyn WalletAgent> = Arc::new(LocalWallet::from_seed(9));

        let proof = sign(&wallet, STATEMENT).await.unwrap();
        assert!(proof.verify().valid);
    }
}
