//! BSV key management primitives.
//!
//! This crate provides the key-handling building blocks of the BSV SDK:
//! - secp256k1 private and public keys with SEC1, hex and WIF encodings
//! - ECDSA signing and verification
//! - BRC-42 child key derivation from an invoice number, with BRC-43 invoice numbers
//! - Shamir threshold splitting of private keys over the secp256k1 field
//! - Portable key-share backups (`x.y.threshold.integrity` strings)
//! - The hash functions and Base58 codecs these depend on

pub mod hash;
pub mod base58;
pub mod ec;
pub mod keyshares;

mod error;
pub use error::PrimitivesError;
