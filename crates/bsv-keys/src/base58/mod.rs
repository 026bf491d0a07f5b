//! Base58 encoding for keys and key-share backups.
//!
//! Raw and checked (Base58Check) codecs over Bitcoin's alphabet, plus the
//! unsigned-integer form used for the X and Y fields of backup shares.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum in bytes.
const CHECKSUM_LEN: usize = 4;

/// Encode a byte slice using the Bitcoin Base58 alphabet.
///
/// Leading zero bytes become leading `'1'` characters.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a Base58 string into bytes.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or `InvalidBase58` for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `data` followed by the first four bytes of SHA-256d(data).
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string and strip its verified checksum.
///
/// # Returns
/// The payload without checksum, `ChecksumMismatch` if the checksum is wrong,
/// or `InvalidBase58` if the string is not Base58 or too short.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let payload_len = decoded.len() - CHECKSUM_LEN;
    let expected = sha256d(&decoded[..payload_len]);
    if decoded[payload_len..] != expected[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(payload_len);
    Ok(decoded)
}

/// Encode an unsigned integer as Base58 of its minimal big-endian bytes.
///
/// Zero has no bytes and so encodes as the empty string. This is the
/// encoding existing key-share backups use for their X and Y fields.
pub fn encode_uint(value: &BigUint) -> String {
    if value.is_zero() {
        return String::new();
    }
    encode(&value.to_bytes_be())
}

/// Decode a Base58 string produced by [`encode_uint`].
///
/// Leading `'1'` characters are zero bytes and do not change the value.
pub fn decode_uint(s: &str) -> Result<BigUint, PrimitivesError> {
    let bytes = decode(s)?;
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[0]), "1");
        assert_eq!(encode(&[0, 0, 0, 0]), "1111");
        assert_eq!(encode(&[255, 255, 255, 255]), "7YXq9G");
        assert_eq!(
            encode(&hex::decode("0123456789ABCDEF").unwrap()),
            "C3CPq7c8PY"
        );
    }

    #[test]
    fn test_decode_address() {
        let decoded = decode("16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM").unwrap();
        assert_eq!(
            hex::encode_upper(decoded),
            "00010966776006953D5567439E5E39F86A0D273BEED61967F6"
        );
    }

    /// Characters outside the alphabet (0, O, I, l, punctuation) are rejected.
    #[test]
    fn test_decode_rejects_foreign_characters() {
        assert!(decode("1234!@#$%").is_err());
        assert!(decode("0OIl").is_err());
    }

    #[test]
    fn test_check_decode_detects_tampering() {
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);

        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(check_decode(&encoded).is_err());
    }

    #[test]
    fn test_check_decode_too_short() {
        let err = check_decode("2").unwrap_err();
        assert!(matches!(err, PrimitivesError::InvalidBase58(_)));
    }

    #[test]
    fn test_encode_uint_small_values() {
        assert_eq!(encode_uint(&BigUint::zero()), "");
        assert_eq!(encode_uint(&BigUint::from(1u32)), "2");
        assert_eq!(encode_uint(&BigUint::from(57u32)), "z");
        assert_eq!(encode_uint(&BigUint::from(58u32)), "21");
    }

    /// Leading '1's carry zero bytes, which do not change the integer.
    #[test]
    fn test_decode_uint_ignores_leading_zero_bytes() {
        assert_eq!(decode_uint("").unwrap(), BigUint::zero());
        assert_eq!(decode_uint("11").unwrap(), BigUint::zero());
        assert_eq!(decode_uint("1121").unwrap(), BigUint::from(58u32));
    }

    #[test]
    fn test_decode_uint_share_coordinate() {
        let x = decode_uint("45s4vLL2hFvqmxrarvbRT2vZoQYGZGocsmaEksZ64o5M").unwrap();
        assert_eq!(x.to_bytes_be().len(), 32);
        assert_eq!(encode_uint(&x), "45s4vLL2hFvqmxrarvbRT2vZoQYGZGocsmaEksZ64o5M");
    }
}
