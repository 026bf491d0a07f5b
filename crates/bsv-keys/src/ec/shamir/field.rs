//! Arithmetic in the prime field that key shares live in.
//!
//! Shares are points over the secp256k1 base field, P = 2^256 - 2^32 - 977.
//! Every private key scalar (0 < d < N < P) is a field element as-is, so the
//! secret survives the trip into the field and back without reduction.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

/// The secp256k1 base field prime P, big-endian.
const FIELD_PRIME_BYTES: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF,
    0xFC, 0x2F,
];

/// Width of a serialized field element.
pub const FIELD_ELEMENT_BYTES: usize = 32;

static FIELD_PRIME: LazyLock<BigUint> = LazyLock::new(|| BigUint::from_bytes_be(&FIELD_PRIME_BYTES));

/// P - 2, the Fermat inversion exponent.
static INVERSION_EXPONENT: LazyLock<BigUint> =
    LazyLock::new(|| &*FIELD_PRIME - BigUint::from(2u32));

/// An integer in [0, P).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// The field modulus P.
    pub fn modulus() -> &'static BigUint {
        &FIELD_PRIME
    }

    /// The additive identity.
    pub fn zero() -> Self {
        FieldElement(BigUint::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        FieldElement(BigUint::one())
    }

    /// Reduce an arbitrary unsigned integer into the field.
    pub fn reduce(value: BigUint) -> Self {
        FieldElement(value % &*FIELD_PRIME)
    }

    /// Accept `value` only if it is already a canonical field element.
    ///
    /// # Returns
    /// `None` when `value >= P`.
    pub fn from_canonical(value: BigUint) -> Option<Self> {
        if value < *FIELD_PRIME {
            Some(FieldElement(value))
        } else {
            None
        }
    }

    /// Interpret big-endian bytes as an integer and reduce it into the field.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self::reduce(BigUint::from_bytes_be(bytes))
    }

    /// Serialize as a fixed-width 32-byte big-endian array.
    pub fn to_bytes_be(&self) -> [u8; FIELD_ELEMENT_BYTES] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; FIELD_ELEMENT_BYTES];
        // to_bytes_be of zero is a single 0x00 byte; the value always fits.
        out[FIELD_ELEMENT_BYTES - raw.len()..].copy_from_slice(&raw);
        out
    }

    /// The value as an integer in [0, P).
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Whether this is the secret's X position.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplicative inverse, computed as `self^(P-2)`.
    ///
    /// # Returns
    /// `None` for zero, which has no inverse.
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(FieldElement(self.0.modpow(&INVERSION_EXPONENT, &FIELD_PRIME)))
    }

    /// Draw a uniformly distributed field element.
    ///
    /// Samples 32 random bytes and rejects values >= P; the rejection
    /// probability per draw is below 2^-224.
    pub fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let mut buf = [0u8; FIELD_ELEMENT_BYTES];
            rng.fill_bytes(&mut buf);
            if let Some(element) = Self::from_canonical(BigUint::from_bytes_be(&buf)) {
                return element;
            }
        }
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        FieldElement(BigUint::from(value))
    }
}

impl Add for &FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: Self) -> FieldElement {
        let sum = &self.0 + &rhs.0;
        if sum >= *FIELD_PRIME {
            FieldElement(sum - &*FIELD_PRIME)
        } else {
            FieldElement(sum)
        }
    }
}

impl Sub for &FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: Self) -> FieldElement {
        if self.0 >= rhs.0 {
            FieldElement(&self.0 - &rhs.0)
        } else {
            FieldElement(&*FIELD_PRIME - &rhs.0 + &self.0)
        }
    }
}

impl Mul for &FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: Self) -> FieldElement {
        FieldElement((&self.0 * &rhs.0) % &*FIELD_PRIME)
    }
}

// Field elements on the secret polynomial are key material; keep them out of logs.
impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldElement(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn p_minus(n: u32) -> FieldElement {
        FieldElement::from_canonical(FieldElement::modulus() - BigUint::from(n)).unwrap()
    }

    #[test]
    fn test_modulus_is_secp256k1_field_prime() {
        assert_eq!(
            hex::encode(FieldElement::modulus().to_bytes_be()),
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f"
        );
    }

    #[test]
    fn test_add_wraps_at_modulus() {
        let a = p_minus(1);
        let b = FieldElement::from(5);
        assert_eq!(&a + &b, FieldElement::from(4));
    }

    #[test]
    fn test_sub_wraps_below_zero() {
        let a = FieldElement::from(3);
        let b = FieldElement::from(5);
        assert_eq!(&a - &b, p_minus(2));
        assert_eq!(&(&a - &b) + &b, a);
    }

    /// (P-1)^2 = 1 mod P.
    #[test]
    fn test_mul_reduces() {
        let minus_one = p_minus(1);
        assert_eq!(&minus_one * &minus_one, FieldElement::one());
    }

    #[test]
    fn test_invert() {
        assert!(FieldElement::zero().invert().is_none());
        assert_eq!(FieldElement::one().invert().unwrap(), FieldElement::one());

        for _ in 0..8 {
            let a = FieldElement::random(&mut OsRng);
            if a.is_zero() {
                continue;
            }
            let inv = a.invert().unwrap();
            assert_eq!(&a * &inv, FieldElement::one());
        }
    }

    #[test]
    fn test_from_canonical_rejects_out_of_range() {
        assert!(FieldElement::from_canonical(FieldElement::modulus().clone()).is_none());
        assert!(FieldElement::from_canonical(p_minus(1).as_biguint().clone()).is_some());
    }

    #[test]
    fn test_reduce_and_bytes() {
        let reduced = FieldElement::reduce(FieldElement::modulus() + BigUint::from(7u32));
        assert_eq!(reduced, FieldElement::from(7));

        let bytes = FieldElement::from(0x0102).to_bytes_be();
        assert_eq!(bytes[..30], [0u8; 30]);
        assert_eq!(bytes[30..], [0x01, 0x02]);
        assert_eq!(FieldElement::zero().to_bytes_be(), [0u8; 32]);
        assert_eq!(FieldElement::from_bytes_be(&bytes), FieldElement::from(0x0102));
    }

    #[test]
    fn test_debug_hides_value() {
        assert_eq!(format!("{:?}", FieldElement::from(42)), "FieldElement(..)");
    }
}
