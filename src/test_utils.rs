//! In-memory wallet agent for tests. Holds a real secp256k1 key.

use async_trait::async_trait;
use bitcoin::secp256k1::{Message, SecretKey};

use crate::{
    keccak256, signed_message_hash, Address, SecpCtx, Signature, WalletAgent, WalletError,
};

/// How the wallet answers a signature request.
#[derive(Clone, Debug)]
pub enum Answer {
    Sign,
    Reject,
    Fail(String),
    Garbage(Vec<u8>),
    /// Signs with a different key than the connected one
    SignAs(u8),
}

pub struct LocalWallet {
    secp: SecpCtx,
    secret: SecretKey,
    connected: bool,
    answer: Answer,
}

impl LocalWallet {
    pub fn from_seed(seed: u8) -> Self {
        let secret = SecretKey::from_slice(&keccak256(&[seed])).expect("valid test key");
        Self {
            secp: SecpCtx::new(),
            secret,
            connected: true,
            answer: Answer::Sign,
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    pub fn answering(mut self, answer: Answer) -> Self {
        self.answer = answer;
        self
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.secret.public_key(&self.secp))
    }

    pub fn sign_message(&self, message: &str) -> Signature {
        let digest = Message::from_digest(signed_message_hash(message.as_bytes()));
        Signature::from_recoverable(&self.secp.sign_ecdsa_recoverable(&digest, &self.secret))
    }
}

#[async_trait]
impl WalletAgent for LocalWallet {
    fn connected_address(&self) -> Option<Address> {
        self.connected.then(|| self.address())
    }

    async fn request_signature(
        &self,
        message: &str,
        _address: &Address,
    ) -> Result<Vec<u8>, WalletError> {
        if !self.connected {
            return Err(WalletError::Unavailable);
        }
        match &self.answer {
            Answer::Sign => Ok(self.sign_message(message).as_bytes().to_vec()),
            Answer::Reject => Err(WalletError::Rejected),
            Answer::Fail(reason) => Err(WalletError::Transport(reason.clone())),
            Answer::Garbage(bytes) => Ok(bytes.clone()),
            Answer::SignAs(seed) => {
                let other = LocalWallet::from_seed(*seed);
                Ok(other.sign_message(message).as_bytes().to_vec())
            }
        }
    }
}
