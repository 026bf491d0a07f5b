//! Shamir secret sharing for private key splitting and recovery.
//!
//! Splits a secret into N shares with a threshold of K required for
//! reconstruction, using polynomial interpolation over the secp256k1 field.
//!
//! Reconstruction is exact for any K genuine shares. Fewer than K genuine
//! shares, or any altered share, interpolate a different polynomial and
//! yield an unrelated value with no error: that is how the scheme hides the
//! secret, not a failure mode that can be detected here. Callers that need
//! detection check the result against a known commitment, as
//! `PrivateKey::from_key_shares` does with the integrity tag.

pub mod field;
pub mod polynomial;

use rand::{CryptoRng, RngCore};

pub use field::FieldElement;
pub use polynomial::{PointInFiniteField, Polynomial};

use crate::keyshares::config::SplitConfig;
use crate::PrimitivesError;

/// Split `secret` into shares at x = 1..=total_shares, using the OS RNG.
pub fn split_secret(
    secret: &FieldElement,
    config: &SplitConfig,
) -> Result<Vec<PointInFiniteField>, PrimitivesError> {
    split_secret_with_rng(secret, config, &mut rand::rngs::OsRng)
}

/// Split `secret` into `config.total_shares()` shares, any
/// `config.threshold()` of which recover it.
///
/// # Arguments
/// * `secret` - The value to share; becomes the polynomial's constant term.
/// * `config` - A validated threshold and share count.
/// * `rng` - Source for the random polynomial samples.
///
/// # Returns
/// Shares with distinct X coordinates `1, 2, ..., total_shares`.
/// Fails only if `config` carries a threshold below two.
pub fn split_secret_with_rng<R: RngCore + CryptoRng + ?Sized>(
    secret: &FieldElement,
    config: &SplitConfig,
    rng: &mut R,
) -> Result<Vec<PointInFiniteField>, PrimitivesError> {
    let polynomial = Polynomial::from_secret_with_rng(secret, config.threshold(), rng)?;

    Ok((1..=config.total_shares() as u64)
        .map(|i| {
            let x = FieldElement::from(i);
            let y = polynomial.value_at(&x);
            PointInFiniteField::new(x, y)
        })
        .collect())
}

/// Recover the secret from at least `threshold` shares.
///
/// Uses the first `threshold` shares supplied; order does not matter.
///
/// # Returns
/// The polynomial's value at zero, or `InvalidThreshold`, `InsufficientShares`
/// or `DuplicateShare` when the input cannot define the polynomial.
pub fn reconstruct_secret(
    points: &[PointInFiniteField],
    threshold: usize,
) -> Result<FieldElement, PrimitivesError> {
    let polynomial = Polynomial::new(points.to_vec(), threshold)?;
    tracing::debug!(threshold, supplied = points.len(), "reconstructing secret from shares");
    Ok(polynomial.value_at(&FieldElement::zero()))
}
