use async_trait::async_trait;
use bitcoin::secp256k1::{All, Message, Secp256k1, SecretKey};
use proof_stamp::{
    keccak256, signed_message_hash, Address, Signature, WalletAgent, WalletError,
};

/// Wallet agent backed by an in-memory key, standing in for a browser wallet.
pub struct KeyWallet {
    secp: Secp256k1<All>,
    secret: SecretKey,
}

impl KeyWallet {
    pub fn from_seed(seed: u64) -> Self {
        let secret =
            SecretKey::from_slice(&keccak256(&seed.to_be_bytes())).expect("valid test key");
        Self {
            secp: Secp256k1::new(),
            secret,
        }
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
impl WalletAgent for KeyWallet {
    fn connected_address(&self) -> Option<Address> {
        Some(self.address())
    }

    async fn request_signature(
        &self,
        message: &str,
        _address: &Address,
    ) -> Result<Vec<u8>, WalletError> {
        Ok(self.sign_message(message).as_bytes().to_vec())
    }
}
