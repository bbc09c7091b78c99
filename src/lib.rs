//! Portable, offline-verifiable proofs that an account signed a statement.
//!
//! A [`Proof`] is produced by asking a connected [`WalletAgent`] to
//! personal-sign a message, shared as a compact URL-safe token, and checked
//! later by anyone holding only that token.

pub mod address;
pub mod codec;
pub mod error;
pub mod link;
pub mod proof;
pub mod session;
pub mod signature;
pub mod signer;
pub mod utils;
pub mod verifier;
pub mod wallet;

#[cfg(test)]
pub(crate) mod test_utils;

pub use address::*;
pub use codec::*;
pub use error::*;
pub use link::*;
pub use proof::*;
pub use session::*;
pub use signature::*;
pub use signer::*;
pub use utils::*;
pub use verifier::*;
pub use wallet::*;
