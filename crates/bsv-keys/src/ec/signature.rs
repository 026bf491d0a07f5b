//! ECDSA signatures with RFC6979 nonces, low-S form and DER encoding.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
///
/// Signatures produced by [`Signature::sign`] are always in low-S form
/// (BIP-0062). Parsed signatures keep the S they were given until they are
/// serialized or verified, both of which normalize it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// R and S as k256 holds them; S may be high until normalized.
    inner: ecdsa::Signature,
}

impl Signature {
    /// Build a signature from big-endian R and S.
    ///
    /// # Returns
    /// `InvalidSignature` if either value is zero or not below the curve order.
    pub fn from_scalars(r: [u8; 32], s: [u8; 32]) -> Result<Self, PrimitivesError> {
        let inner = ecdsa::Signature::from_scalars(k256::FieldBytes::from(r), k256::FieldBytes::from(s))
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Parse a strict DER signature: `0x30 len 0x02 rlen r 0x02 slen s`.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(format!("malformed signature: {}", e)))?;
        Ok(Signature { inner })
    }

    /// Serialize in DER with S normalized to the lower half of the order.
    pub fn to_der(&self) -> Vec<u8> {
        self.normalized().to_der().as_bytes().to_vec()
    }

    /// R as 32 big-endian bytes.
    pub fn r(&self) -> [u8; 32] {
        let (r, _) = self.inner.split_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&r);
        out
    }

    /// S as 32 big-endian bytes, exactly as stored.
    pub fn s(&self) -> [u8; 32] {
        let (_, s) = self.inner.split_bytes();
        let mut out = [0u8; 32];
        out.copy_from_slice(&s);
        out
    }

    /// Sign `hash` with RFC6979 deterministic nonces.
    ///
    /// Hashes shorter than 32 bytes are left-padded with zeros, longer ones
    /// truncated to their first 32 bytes.
    pub fn sign(hash: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let digest = normalize_hash(hash);
        let signed: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(&digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature {
            inner: signed.normalize_s().unwrap_or(signed),
        })
    }

    /// Check this signature over `hash` against `pub_key`.
    pub fn verify(&self, hash: &[u8], pub_key: &PublicKey) -> bool {
        let digest = normalize_hash(hash);
        pub_key
            .verifying_key()
            .verify_prehash(&digest, &self.normalized())
            .is_ok()
    }

    fn normalized(&self) -> ecdsa::Signature {
        self.inner.normalize_s().unwrap_or_else(|| self.inner.clone())
    }
}

/// Fit an arbitrary-length hash into a 32-byte scalar input.
fn normalize_hash(hash: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    if hash.len() >= 32 {
        padded.copy_from_slice(&hash[..32]);
    } else {
        padded[32 - hash.len()..].copy_from_slice(hash);
    }
    padded
}
