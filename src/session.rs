//! Producer-side signing state.
//!
//! [`SignSession`] is an explicit value owned by whatever drives the signing
//! screen. It holds the message draft, the proof covering it (if any) and at
//! most one outstanding wallet request. Editing the draft discards the proof
//! and supersedes the pending request, so a signature that arrives late can
//! never be attached to text it does not cover.

use chrono::Utc;

use crate::{
    encode, signer::assemble, Address, CodecConfig, Proof, SignError, WalletAgent, WalletError,
};

/// Statement pre-filled in a fresh session.
pub const DEFAULT_MESSAGE: &str = "I control this wallet and here is my statement ...";

/// Handle for one outstanding signing attempt.
#[derive(Debug)]
pub struct SignTicket {
    attempt: u64,
    message: String,
    signer: Address,
}

impl SignTicket {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signer(&self) -> &Address {
        &self.signer
    }
}

#[derive(Debug)]
pub struct SignSession {
    draft: String,
    proof: Option<Proof>,
    pending: Option<u64>,
    attempts: u64,
    config: CodecConfig,
}

impl Default for SignSession {
    fn default() -> Self {
        Self::with_message(DEFAULT_MESSAGE)
    }
}

impl SignSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            draft: message.into(),
            proof: None,
            pending: None,
            attempts: 0,
            config: CodecConfig::default(),
        }
    }

    /// Uses `config` to bound the drafts this session will sign.
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn message(&self) -> &str {
        &self.draft
    }

    /// The proof covering the current draft, if one was produced.
    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// False while the held proof already covers the draft.
    pub fn can_sign(&self) -> bool {
        self.proof
            .as_ref()
            .map_or(true, |proof| proof.message() != self.draft)
    }

    /// Replaces the draft. Any change drops the proof and the pending request.
    pub fn set_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message == self.draft {
            return;
        }
        self.draft = message;
        if self.proof.take().is_some() {
            tracing::debug!("draft edited, proof discarded");
        }
        self.cancel();
    }

    /// Drops the pending request, e.g. on navigation or disconnect.
    pub fn cancel(&mut self) {
        if let Some(attempt) = self.pending.take() {
            tracing::debug!(attempt, "pending signature request cancelled");
        }
    }

    /// Starts a signing attempt for the current draft.
    ///
    /// A new attempt supersedes any earlier one still waiting on the wallet.
    /// A draft over the message limit is refused and leaves any pending
    /// attempt untouched.
    pub fn begin_sign<W: WalletAgent + ?Sized>(
        &mut self,
        agent: &W,
    ) -> Result<SignTicket, SignError> {
        self.config.check_message(&self.draft)?;
        let signer = agent.connected_address().ok_or(SignError::NoSigner)?;

        self.attempts += 1;
        if let Some(previous) = self.pending.replace(self.attempts) {
            tracing::debug!(previous, attempt = self.attempts, "signature request superseded");
        }

        Ok(SignTicket {
            attempt: self.attempts,
            message: self.draft.clone(),
            signer,
        })
    }

    /// Applies the wallet's answer to `ticket`.
    ///
    /// Answers for superseded or cancelled tickets, or for a draft that has
    /// since changed, are discarded with [`SignError::Superseded`].
    pub fn complete(
        &mut self,
        ticket: SignTicket,
        answer: Result<Vec<u8>, WalletError>,
    ) -> Result<&Proof, SignError> {
        if self.pending != Some(ticket.attempt) || ticket.message != self.draft {
            tracing::warn!(attempt = ticket.attempt, "discarding stale wallet answer");
            return Err(SignError::Superseded);
        }
        self.pending = None;

        let raw = answer.map_err(SignError::from)?;
        let proof = assemble(&ticket.message, &raw, ticket.signer, Utc::now())?;
        Ok(&*self.proof.insert(proof))
    }

    /// Signs the current draft and stores the resulting proof.
    ///
    /// Dropping the returned future abandons the request; the session then
    /// still reports it as pending until [`cancel`](Self::cancel) or a new
    /// attempt.
    pub async fn sign<W: WalletAgent + ?Sized>(&mut self, agent: &W) -> Result<&Proof, SignError> {
        let ticket = self.begin_sign(agent)?;
        let answer = agent.request_signature(&ticket.message, &ticket.signer).await;
        self.complete(ticket, answer)
    }

    /// Transport token for the held proof.
    pub fn share_token(&self) -> Option<String> {
        self.proof.as_ref().map(encode)
    }
}
