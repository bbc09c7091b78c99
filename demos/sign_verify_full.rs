use async_trait::async_trait;
use bitcoin::{
    hex::FromHex,
    secp256k1::{Message, Secp256k1, SecretKey},
};
use proof_stamp::{
    share_url, signed_message_hash, token_from_url, verify_token, Address, SignSession,
    Signature, WalletAgent, WalletError,
};

const BASE_URL: &str = "https://stamp.example/";
// Throwaway development key. Real deployments sign inside the user's wallet.
const DEV_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

struct DevWallet {
    secret: SecretKey,
}

#[async_trait]
impl WalletAgent for DevWallet {
    fn connected_address(&self) -> Option<Address> {
        Some(Address::from_public_key(
            &self.secret.public_key(&Secp256k1::new()),
        ))
    }

    async fn request_signature(
        &self,
        message: &str,
        _address: &Address,
    ) -> Result<Vec<u8>, WalletError> {
        let digest = Message::from_digest(signed_message_hash(message.as_bytes()));
        let signature = Secp256k1::new().sign_ecdsa_recoverable(&digest, &self.secret);
        Ok(Signature::from_recoverable(&signature).as_bytes().to_vec())
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let secret = SecretKey::from_slice(&Vec::<u8>::from_hex(DEV_KEY)?)?;
    let wallet = DevWallet { secret };

    let mut session = SignSession::new();
    let proof = session.sign(&wallet).await?.clone();
    println!("signed {:?} as {}", proof.message(), proof.signer());

    let link = share_url(BASE_URL, &proof)?;
    println!("share: {link}");

    let token = token_from_url(link.as_str());
    let verify = verify_token(token.as_deref())?;

    assert!(verify.valid);
    println!("verified: {}", verify.valid);

    Ok(())
}
