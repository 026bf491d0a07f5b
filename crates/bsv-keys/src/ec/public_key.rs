//! secp256k1 public key.
//!
//! SEC1 compressed/uncompressed encoding, Hash160 and P2PKH address,
//! signature verification and sender-side BRC-42 child derivation.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use k256::ProjectivePoint;

use crate::base58;
use crate::ec::derivation::brc42_offset;
use crate::ec::private_key::PrivateKey;
use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed public key: prefix byte plus 32-byte X.
const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key: 0x04 plus 32-byte X and Y.
const UNCOMPRESSED_LEN: usize = 65;

/// Mainnet P2PKH address version byte.
const MAINNET_P2PKH_VERSION: u8 = 0x00;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 point, never the identity.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1 compressed (33-byte) or uncompressed (65-byte) key.
    ///
    /// # Returns
    /// `InvalidPublicKey` if the bytes are empty or not a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a hex-encoded SEC1 key.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Compressed SEC1 encoding: 0x02 or 0x03 by Y parity, then X.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Uncompressed SEC1 encoding: 0x04, X, Y.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// RIPEMD160(SHA256(compressed key)).
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Mainnet P2PKH address of the compressed key.
    pub fn to_address(&self) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(MAINNET_P2PKH_VERSION);
        payload.extend_from_slice(&self.hash160());
        base58::check_encode(&payload)
    }

    /// Check `sig` over `hash`; see [`Signature::verify`].
    pub fn verify(&self, hash: &[u8], sig: &Signature) -> bool {
        sig.verify(hash, self)
    }

    /// Derive the BRC-42 child public key for `invoice_number`, as the sender
    /// holding `private_key`.
    ///
    /// Computes `self + o * G` where `o` is the invoice offset under the
    /// shared secret of `private_key` and `self`. The recipient derives the
    /// matching private key with [`PrivateKey::derive_child`].
    pub fn derive_child(
        &self,
        private_key: &PrivateKey,
        invoice_number: &str,
    ) -> Result<PublicKey, PrimitivesError> {
        let shared_secret = self.derive_shared_secret(private_key)?;
        let offset = brc42_offset(&shared_secret, invoice_number)?;
        let child = self.to_projective_point() + ProjectivePoint::GENERATOR * offset;
        Self::from_projective_point(child)
    }

    /// ECDH with `priv_key`; same result as `priv_key.derive_shared_secret(self)`.
    pub fn derive_shared_secret(&self, priv_key: &PrivateKey) -> Result<PublicKey, PrimitivesError> {
        priv_key.derive_shared_secret(self)
    }

    pub(crate) fn from_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    /// Wrap a curve point, rejecting the point at infinity.
    pub(crate) fn from_projective_point(point: ProjectivePoint) -> Result<Self, PrimitivesError> {
        let inner = VerifyingKey::from_affine(point.to_affine())
            .map_err(|_| PrimitivesError::PointNotOnCurve)?;
        Ok(PublicKey { inner })
    }

    pub(crate) fn to_projective_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNCOMPRESSED_OK: &str = "0411db93e1dcdb8a016b49840f8c53bc1eb68a382e97b1482ecad7b148a6909a5cb2e0eaddfb84ccf9744464f82e160bfa9b8b64f9d4c03f999b8643f656b412a3";
    const COMPRESSED_EVEN: &str = "02ce0b14fb842b1ba549fdd675c98075f12e9c510f8ef52bd021a9a1f4809d3b4d";
    const COMPRESSED_ODD: &str = "032689c7c2dab13309fb143e0e8fe396342521887e976690b6b47f5b2a4b7d448e";

    #[test]
    fn test_parse_pub_keys() {
        let cases = [
            ("uncompressed ok", UNCOMPRESSED_OK.to_string(), true),
            (
                "uncompressed x changed",
                UNCOMPRESSED_OK.replacen("0411", "0415", 1),
                false,
            ),
            ("compressed ok (ybit = 0)", COMPRESSED_EVEN.to_string(), true),
            ("compressed ok (ybit = 1)", COMPRESSED_ODD.to_string(), true),
            ("wrong length", "05".to_string(), false),
            ("empty", String::new(), false),
        ];

        for (name, key_hex, is_valid) in cases {
            let result = PublicKey::from_hex(&key_hex);
            assert_eq!(result.is_ok(), is_valid, "{}: {:?}", name, result.err());
        }
    }

    #[test]
    fn test_encodings_round_trip() {
        let even = PublicKey::from_hex(COMPRESSED_EVEN).unwrap();
        assert_eq!(hex::encode(even.to_compressed()), COMPRESSED_EVEN);
        assert_eq!(PublicKey::from_bytes(&even.to_uncompressed()).unwrap(), even);

        let full = PublicKey::from_hex(UNCOMPRESSED_OK).unwrap();
        assert_eq!(hex::encode(full.to_uncompressed()), UNCOMPRESSED_OK);
        assert_eq!(full.to_compressed()[0], 0x02 | (full.to_uncompressed()[64] & 1));
    }

    #[test]
    fn test_equality_and_display() {
        let odd = PublicKey::from_hex(COMPRESSED_ODD).unwrap();
        let even = PublicKey::from_hex(COMPRESSED_EVEN).unwrap();
        assert_eq!(odd, odd.clone());
        assert_ne!(odd, even);
        assert_eq!(format!("{}", even), COMPRESSED_EVEN);
    }

    /// The generator point hashes to the well-known key-1 address.
    #[test]
    fn test_hash160_and_address() {
        let one = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        let pub_key = one.pub_key();
        assert_eq!(
            pub_key.to_hex(),
            "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        );
        assert_eq!(
            hex::encode(pub_key.hash160()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
        assert_eq!(pub_key.to_address(), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    /// BRC-42 sender-side vectors.
    #[test]
    fn test_brc42_public_vectors() {
        let vectors_json = include_str!("testdata/BRC42.public.vectors.json");
        let vectors: Vec<serde_json::Value> = serde_json::from_str(vectors_json).unwrap();
        assert!(!vectors.is_empty());

        for (i, v) in vectors.iter().enumerate() {
            let sender = PrivateKey::from_hex(v["senderPrivateKey"].as_str().unwrap())
                .unwrap_or_else(|e| panic!("vector #{}: parse priv key: {}", i + 1, e));
            let recipient = PublicKey::from_hex(v["recipientPublicKey"].as_str().unwrap())
                .unwrap_or_else(|e| panic!("vector #{}: parse pub key: {}", i + 1, e));
            let invoice_number = v["invoiceNumber"].as_str().unwrap();

            let derived = recipient
                .derive_child(&sender, invoice_number)
                .unwrap_or_else(|e| panic!("vector #{}: derive child: {}", i + 1, e));
            assert_eq!(
                derived.to_hex(),
                v["publicKey"].as_str().unwrap(),
                "BRC42 public vector #{}",
                i + 1
            );
        }
    }

    #[test]
    fn test_derive_child_rejects_empty_invoice() {
        let sender = PrivateKey::new();
        let err = sender.pub_key().derive_child(&sender, "").unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidInvoiceNumber(_)));
    }
}
