//! secp256k1 private key.
//!
//! Wraps a k256 signing key and adds WIF encoding, ECDH, BRC-42 child
//! derivation, and splitting into threshold key shares for backup.

use k256::ecdsa::SigningKey;
use k256::{NonZeroScalar, Scalar};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::base58;
use crate::ec::derivation::brc42_offset;
use crate::ec::public_key::PublicKey;
use crate::ec::shamir::{self, FieldElement, Polynomial};
use crate::ec::signature::Signature;
use crate::keyshares::config::SplitConfig;
use crate::keyshares::{integrity_tag, KeyShares};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// Mainnet WIF prefix byte.
const MAINNET_PREFIX: u8 = 0x80;

/// Suffix marking a WIF key whose public key is used compressed.
const COMPRESS_MAGIC: u8 = 0x01;

/// A secp256k1 private key.
///
/// The scalar lives inside a k256 `SigningKey`, which wipes it on drop.
/// Byte buffers holding copies of the scalar are wrapped in `Zeroizing`.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    /// The k256 signing key holding the non-zero scalar.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key from the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from its 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `InvalidPrivateKey` if the slice is not 32 bytes or the scalar is zero
    /// or not below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a private key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Decode a WIF (Wallet Import Format) string.
    ///
    /// Accepts both the compressed form (payload ends in `0x01`) and the
    /// uncompressed form. The network prefix byte is not checked.
    ///
    /// # Returns
    /// `ChecksumMismatch` on a bad checksum, `InvalidWif` on a bad length or
    /// compression flag.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        let payload = Zeroizing::new(base58::check_decode(wif)?);
        match payload.len() {
            33 => {}
            34 if payload[33] == COMPRESS_MAGIC => {}
            34 => {
                return Err(PrimitivesError::InvalidWif(
                    "malformed private key: invalid compression flag".to_string(),
                ))
            }
            len => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "malformed private key: invalid length {}",
                    len + 4
                )))
            }
        }
        Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN])
    }

    /// Encode as a compressed mainnet WIF string.
    pub fn to_wif(&self) -> String {
        self.to_wif_prefix(MAINNET_PREFIX)
    }

    /// Encode as a compressed WIF string with the given network prefix
    /// (0x80 mainnet, 0xef testnet).
    pub fn to_wif_prefix(&self, prefix: u8) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(PRIVATE_KEY_BYTES_LEN + 2));
        payload.push(prefix);
        payload.extend_from_slice(&*self.to_bytes());
        payload.push(COMPRESS_MAGIC);
        base58::check_encode(&payload)
    }

    /// The 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.inner.to_bytes());
        out
    }

    /// Lowercase hex of the 32-byte big-endian scalar.
    pub fn to_hex(&self) -> String {
        hex::encode(&*self.to_bytes())
    }

    /// The public key `d * G`.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.inner.verifying_key())
    }

    /// Sign a message hash with RFC6979 nonces; see [`Signature::sign`].
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// ECDH: this key's scalar times the other party's public point.
    pub fn derive_shared_secret(&self, pub_key: &PublicKey) -> Result<PublicKey, PrimitivesError> {
        let shared = pub_key.to_projective_point() * self.to_scalar();
        PublicKey::from_projective_point(shared)
    }

    /// Derive the BRC-42 child private key for `invoice_number`, as the
    /// recipient of an invoice from the holder of `pub_key`.
    ///
    /// The child's public key equals `self.pub_key().derive_child(sender, invoice_number)`
    /// computed by the sender.
    ///
    /// # Returns
    /// `InvalidInvoiceNumber` for an empty invoice number.
    pub fn derive_child(
        &self,
        pub_key: &PublicKey,
        invoice_number: &str,
    ) -> Result<PrivateKey, PrimitivesError> {
        let shared_secret = self.derive_shared_secret(pub_key)?;
        let offset = brc42_offset(&shared_secret, invoice_number)?;
        Self::from_scalar(self.to_scalar() + offset)
    }

    /// A random polynomial of degree `threshold - 1` whose value at zero is
    /// this key.
    pub fn to_polynomial(&self, threshold: usize) -> Result<Polynomial, PrimitivesError> {
        Polynomial::from_secret(&self.to_field_element(), threshold)
    }

    /// Split this key into `total_shares` shares, any `threshold` of which
    /// recover it.
    ///
    /// # Returns
    /// `InvalidThreshold` or `InvalidShareCount` for an impossible split.
    pub fn to_key_shares(
        &self,
        threshold: i32,
        total_shares: i32,
    ) -> Result<KeyShares, PrimitivesError> {
        self.to_key_shares_with_rng(threshold, total_shares, &mut OsRng)
    }

    /// [`to_key_shares`](Self::to_key_shares) with a caller-supplied RNG.
    pub fn to_key_shares_with_rng<R: RngCore + CryptoRng + ?Sized>(
        &self,
        threshold: i32,
        total_shares: i32,
        rng: &mut R,
    ) -> Result<KeyShares, PrimitivesError> {
        let config = SplitConfig::new(threshold, total_shares)?;
        let points = shamir::split_secret_with_rng(&self.to_field_element(), &config, rng)?;
        let integrity = integrity_tag(&self.pub_key());

        tracing::debug!(
            threshold = config.threshold(),
            total_shares = config.total_shares(),
            integrity = %integrity,
            "split private key into shares"
        );
        Ok(KeyShares::new(points, config.threshold(), integrity))
    }

    /// Recover a key from its shares.
    ///
    /// The first `shares.threshold` points are interpolated and the result is
    /// checked against `shares.integrity`.
    ///
    /// # Returns
    /// - `InsufficientShares` or `DuplicateShare` for unusable points.
    /// - `InvalidPrivateKey` if the points interpolate to zero or a value not
    ///   below the curve order.
    /// - `IntegrityMismatch` if the recovered key's tag differs, which is what
    ///   mixed, forged or corrupted shares produce.
    pub fn from_key_shares(shares: &KeyShares) -> Result<Self, PrimitivesError> {
        let secret = shamir::reconstruct_secret(&shares.points, shares.threshold)?;
        let key = Self::from_field_element(&secret)?;

        let tag = integrity_tag(&key.pub_key());
        if !tag.eq_ignore_ascii_case(&shares.integrity) {
            tracing::warn!(
                expected = %shares.integrity,
                got = %tag,
                "recovered key does not match share integrity"
            );
            return Err(PrimitivesError::IntegrityMismatch {
                expected: shares.integrity.clone(),
                got: tag,
            });
        }
        Ok(key)
    }

    /// Split this key and render the shares in backup format.
    pub fn to_backup_shares(
        &self,
        threshold: i32,
        total_shares: i32,
    ) -> Result<Vec<String>, PrimitivesError> {
        Ok(self.to_key_shares(threshold, total_shares)?.to_backup_format())
    }

    /// Recover a key from backup-format shares.
    pub fn from_backup_shares<S: AsRef<str>>(shares: &[S]) -> Result<Self, PrimitivesError> {
        Self::from_key_shares(&KeyShares::from_backup_format(shares)?)
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }

    pub(crate) fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }

    fn to_field_element(&self) -> FieldElement {
        FieldElement::from_bytes_be(&*self.to_bytes())
    }

    /// Accept a recovered field element as a key only if it lies in (0, N).
    fn from_field_element(element: &FieldElement) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(element.to_bytes_be());
        let inner = SigningKey::from_slice(&*bytes).map_err(|_| {
            PrimitivesError::InvalidPrivateKey(
                "reconstructed secret is zero or not below the curve order".to_string(),
            )
        })?;
        Ok(PrivateKey { inner })
    }

    fn from_scalar(scalar: Scalar) -> Result<Self, PrimitivesError> {
        let scalar: Option<NonZeroScalar> = NonZeroScalar::new(scalar).into();
        let scalar = scalar.ok_or_else(|| {
            PrimitivesError::InvalidPrivateKey("derived scalar is zero".to_string())
        })?;
        Ok(PrivateKey {
            inner: SigningKey::from(scalar),
        })
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.to_bytes() == *other.to_bytes()
    }
}

impl Eq for PrivateKey {}
