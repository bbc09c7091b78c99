//! The wallet agent boundary.
//!
//! Private keys live behind this trait and never enter the crate. Any
//! connector (browser extension, hardware device, remote signer) is plugged
//! in by implementing [`WalletAgent`].

use async_trait::async_trait;
use thiserror::Error;

use crate::{Address, SignError};

/// Narrow capability surface consumed by the proof builder.
#[async_trait]
pub trait WalletAgent: Send + Sync {
    /// The currently connected account, if any.
    fn connected_address(&self) -> Option<Address>;

    /// Asks the wallet to personal-sign `message` as `address`.
    ///
    /// Implementations return the raw 65-byte `r || s || v` signature. The
    /// wallet applies the personal-message prefix itself.
    async fn request_signature(
        &self,
        message: &str,
        address: &Address,
    ) -> Result<Vec<u8>, WalletError>;
}

/// Failures reported by a wallet agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("user rejected the request")]
    Rejected,
    #[error("wallet unavailable")]
    Unavailable,
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<WalletError> for SignError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Rejected => Self::Rejected,
            WalletError::Unavailable => Self::NoSigner,
            WalletError::Transport(msg) => Self::TransportFailure(msg),
        }
    }
}

#[async_trait]
impl<T: WalletAgent + ?Sized> WalletAgent for std::sync::Arc<T> {
    fn connected_address(&self) -> Option<Address> {
        (**self).connected_address()
    }

    async fn request_signature(
        &self,
        message: &str,
        address: &Address,
    ) -> Result<Vec<u8>, WalletError> {
        (**self).request_signature(message, address).await
    }
}
