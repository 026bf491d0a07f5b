//! Elliptic curve keys on secp256k1.
//!
//! Private and public keys, ECDSA signatures, BRC-42 child derivation and
//! Shamir splitting of private keys.

pub mod derivation;
pub mod private_key;
pub mod public_key;
pub mod shamir;
pub mod signature;

pub use derivation::{InvoiceNumber, SecurityLevel};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
