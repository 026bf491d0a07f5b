//! Polynomials over the share field, held as sample points.
//!
//! A degree-(t-1) polynomial is stored as `t` points it passes through and
//! evaluated with Lagrange interpolation, so no coefficient above the
//! constant term is ever materialized.

use std::collections::HashSet;

use rand::{CryptoRng, RngCore};

use super::field::FieldElement;
use crate::base58;
use crate::keyshares::config::MIN_THRESHOLD;
use crate::PrimitivesError;

/// A point (x, y) in the share field.
///
/// For a distributed share, `x` is the share index and `y` the polynomial's
/// value there. `x = 0` is reserved for the secret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointInFiniteField {
    pub x: FieldElement,
    pub y: FieldElement,
}

impl PointInFiniteField {
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        PointInFiniteField { x, y }
    }
}

/// A polynomial of degree `threshold - 1`, represented by `threshold` points.
#[derive(Clone, Debug)]
pub struct Polynomial {
    points: Vec<PointInFiniteField>,
    threshold: usize,
}

impl Polynomial {
    /// Build a polynomial through the first `threshold` of `points`.
    ///
    /// All supplied points are checked for distinct X coordinates, not only
    /// the ones used, so a repeated share is reported even when it would have
    /// been ignored.
    ///
    /// # Returns
    /// `InvalidThreshold` if `threshold < 2`, `InsufficientShares` if fewer
    /// than `threshold` points are given, or `DuplicateShare` on a repeated X.
    pub fn new(
        mut points: Vec<PointInFiniteField>,
        threshold: usize,
    ) -> Result<Self, PrimitivesError> {
        if threshold < MIN_THRESHOLD {
            return Err(PrimitivesError::InvalidThreshold(format!(
                "threshold must be at least {}, got {}",
                MIN_THRESHOLD, threshold
            )));
        }
        if points.len() < threshold {
            return Err(PrimitivesError::InsufficientShares {
                threshold,
                got: points.len(),
            });
        }
        ensure_distinct_x(&points)?;
        points.truncate(threshold);
        Ok(Polynomial { points, threshold })
    }

    /// Build a random polynomial whose value at zero is `secret`, using the OS RNG.
    pub fn from_secret(secret: &FieldElement, threshold: usize) -> Result<Self, PrimitivesError> {
        Self::from_secret_with_rng(secret, threshold, &mut rand::rngs::OsRng)
    }

    /// Build a random polynomial whose value at zero is `secret`.
    ///
    /// Point 0 is `(0, secret)`; points `1..threshold` are `(i, r_i)` with
    /// each `r_i` drawn uniformly from the field.
    pub fn from_secret_with_rng<R: RngCore + CryptoRng + ?Sized>(
        secret: &FieldElement,
        threshold: usize,
        rng: &mut R,
    ) -> Result<Self, PrimitivesError> {
        if threshold < MIN_THRESHOLD {
            return Err(PrimitivesError::InvalidThreshold(format!(
                "threshold must be at least {}, got {}",
                MIN_THRESHOLD, threshold
            )));
        }

        let mut points = Vec::with_capacity(threshold);
        points.push(PointInFiniteField::new(FieldElement::zero(), secret.clone()));
        for i in 1..threshold {
            points.push(PointInFiniteField::new(
                FieldElement::from(i as u64),
                FieldElement::random(rng),
            ));
        }
        Ok(Polynomial { points, threshold })
    }

    /// The `threshold` points defining the polynomial.
    pub fn points(&self) -> &[PointInFiniteField] {
        &self.points
    }

    /// Number of points, one more than the degree.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Evaluate the polynomial at `x`.
    ///
    /// y(x) = sum_i y_i * prod_{j != i} (x - x_j) / (x_i - x_j)
    ///
    /// At a stored X this returns the stored Y; at zero it returns the secret.
    pub fn value_at(&self, x: &FieldElement) -> FieldElement {
        let mut y = FieldElement::zero();
        for (i, pi) in self.points.iter().enumerate() {
            let mut numerator = FieldElement::one();
            let mut denominator = FieldElement::one();
            for (j, pj) in self.points.iter().enumerate() {
                if i == j {
                    continue;
                }
                numerator = &numerator * &(x - &pj.x);
                denominator = &denominator * &(&pi.x - &pj.x);
            }
            let basis = &numerator
                * &denominator
                    .invert()
                    .expect("x coordinates are distinct by construction");
            y = &y + &(&pi.y * &basis);
        }
        y
    }
}

/// Fail with `DuplicateShare` if any two points share an X coordinate.
pub(crate) fn ensure_distinct_x(points: &[PointInFiniteField]) -> Result<(), PrimitivesError> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(&point.x) {
            return Err(PrimitivesError::DuplicateShare {
                x: base58::encode_uint(point.x.as_biguint()),
            });
        }
    }
    Ok(())
}
