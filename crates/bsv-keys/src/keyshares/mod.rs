//! Key share collections and their portable backup format.
//!
//! A backup share is one line of text, `B58(x).B58(y).threshold.integrity`,
//! that a person can write down. Every share from one split carries the same
//! threshold and integrity tag, so shares from different splits are caught
//! before any interpolation happens.

pub mod config;

use std::collections::HashSet;

use num_bigint::BigUint;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::shamir::{FieldElement, PointInFiniteField};
use crate::PrimitivesError;

use self::config::{
    BACKUP_FIELD_COUNT, BACKUP_FIELD_SEPARATOR, INTEGRITY_LEN, MAX_COORDINATE_LEN, MIN_THRESHOLD,
};

/// The shares of one split, with the metadata needed to recombine them.
///
/// The point count is not checked against the threshold here; a collection
/// may hold fewer points than it needs until it is used for recovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyShares {
    /// Share points, one per holder.
    pub points: Vec<PointInFiniteField>,
    /// Points required to recover the key.
    pub threshold: usize,
    /// Integrity tag of the key's public key, see [`integrity_tag`].
    pub integrity: String,
}

impl KeyShares {
    /// Assemble a share collection without validating it.
    pub fn new(points: Vec<PointInFiniteField>, threshold: usize, integrity: String) -> Self {
        KeyShares {
            points,
            threshold,
            integrity,
        }
    }

    /// Render every share as a backup string, in point order.
    pub fn to_backup_format(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|point| {
                format!(
                    "{x}{sep}{y}{sep}{t}{sep}{h}",
                    x = base58::encode_uint(point.x.as_biguint()),
                    y = base58::encode_uint(point.y.as_biguint()),
                    t = self.threshold,
                    h = self.integrity,
                    sep = BACKUP_FIELD_SEPARATOR,
                )
            })
            .collect()
    }

    /// Parse backup strings into a share collection.
    ///
    /// Every string must have four fields with a decodable, in-range value in
    /// each. The threshold and integrity tag of the first share become the
    /// reference that every later share must match.
    ///
    /// # Returns
    /// - `InsufficientShares` if `shares` is empty.
    /// - `MalformedBackupShare` naming the share index on any parse failure.
    /// - `DuplicateShare` if two strings carry the same X coordinate.
    /// - `ShareSetMismatch` if a share's threshold or integrity differs from
    ///   the first share's.
    pub fn from_backup_format<S: AsRef<str>>(shares: &[S]) -> Result<Self, PrimitivesError> {
        if shares.is_empty() {
            return Err(PrimitivesError::InsufficientShares {
                threshold: MIN_THRESHOLD,
                got: 0,
            });
        }

        let mut points = Vec::with_capacity(shares.len());
        let mut seen_x = HashSet::with_capacity(shares.len());
        let mut reference: Option<(usize, String)> = None;

        for (index, share) in shares.iter().enumerate() {
            let parsed = BackupShare::parse(index, share.as_ref())?;

            if !seen_x.insert(parsed.point.x.clone()) {
                return Err(PrimitivesError::DuplicateShare {
                    x: base58::encode_uint(parsed.point.x.as_biguint()),
                });
            }

            match &reference {
                None => reference = Some((parsed.threshold, parsed.integrity.clone())),
                Some((threshold, integrity)) => {
                    if parsed.threshold != *threshold {
                        return Err(PrimitivesError::ShareSetMismatch {
                            share: index,
                            field: "threshold",
                            expected: threshold.to_string(),
                            got: parsed.threshold.to_string(),
                        });
                    }
                    if parsed.integrity != *integrity {
                        return Err(PrimitivesError::ShareSetMismatch {
                            share: index,
                            field: "integrity",
                            expected: integrity.clone(),
                            got: parsed.integrity,
                        });
                    }
                }
            }

            points.push(parsed.point);
        }

        let (threshold, integrity) = reference.unwrap_or_default();
        tracing::debug!(shares = points.len(), threshold, "decoded backup shares");
        Ok(KeyShares {
            points,
            threshold,
            integrity,
        })
    }
}

/// The integrity tag of a key: the first eight hex digits of the Hash160 of
/// its compressed public key.
pub fn integrity_tag(public_key: &PublicKey) -> String {
    let mut tag = hex::encode(public_key.hash160());
    tag.truncate(INTEGRITY_LEN);
    tag
}

/// One decoded backup string. The integrity tag is stored lowercase.
struct BackupShare {
    point: PointInFiniteField,
    threshold: usize,
    integrity: String,
}

impl BackupShare {
    fn parse(index: usize, line: &str) -> Result<Self, PrimitivesError> {
        let malformed = |reason: String| PrimitivesError::MalformedBackupShare {
            share: index,
            reason,
        };

        let fields: Vec<&str> = line.split(BACKUP_FIELD_SEPARATOR).collect();
        if fields.len() != BACKUP_FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} fields, got {}",
                BACKUP_FIELD_COUNT,
                fields.len()
            )));
        }

        // An empty x field decodes to zero, which is the secret's position.
        let x = parse_coordinate(fields[0], "x").map_err(&malformed)?;
        if x.is_zero() {
            return Err(malformed("x must be non-empty and non-zero".to_string()));
        }
        let y = parse_coordinate(fields[1], "y").map_err(&malformed)?;

        let threshold = parse_threshold(fields[2]).map_err(&malformed)?;

        let integrity = fields[3];
        if integrity.len() != INTEGRITY_LEN || !integrity.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed(format!(
                "integrity must be {} hex digits, got {:?}",
                INTEGRITY_LEN, integrity
            )));
        }

        Ok(BackupShare {
            point: PointInFiniteField::new(x, y),
            threshold,
            integrity: integrity.to_ascii_lowercase(),
        })
    }
}

fn parse_coordinate(field: &str, name: &str) -> Result<FieldElement, String> {
    if field.len() > MAX_COORDINATE_LEN {
        return Err(format!(
            "{} is {} characters, at most {} allowed",
            name,
            field.len(),
            MAX_COORDINATE_LEN
        ));
    }
    let value: BigUint = base58::decode_uint(field).map_err(|e| format!("{}: {}", name, e))?;
    FieldElement::from_canonical(value).ok_or_else(|| format!("{} is out of range", name))
}

fn parse_threshold(field: &str) -> Result<usize, String> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("threshold is not a decimal number: {:?}", field));
    }
    let threshold: usize = field
        .parse()
        .map_err(|e| format!("threshold {:?}: {}", field, e))?;
    if threshold < MIN_THRESHOLD {
        return Err(format!(
            "threshold must be at least {}, got {}",
            MIN_THRESHOLD, threshold
        ));
    }
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS_SHARES: [&str; 5] = [
        "45s4vLL2hFvqmxrarvbRT2vZoQYGZGocsmaEksZ64o5M.A7nZrGux15nEsQGNZ1mbfnMKugNnS6SYYEQwfhfbDZG8.3.2f804d43",
        "7aPzkiGZgvU4Jira5PN9Qf9o7FEg6uwy1zcxd17NBhh3.CCt7NH1sPFgceb6phTRkfviim2WvmUycJCQd2BxauxP9.3.2f804d43",
        "9GaS2Tw5sXqqbuigdjwGPwPsQuEFqzqUXo5MAQhdK3es.8MLh2wyE3huyq6hiBXjSkJRucgyKh4jVY6ESq5jNtXRE.3.2f804d43",
        "GBmoNRbsMVsLmEK5A6G28fktUNonZkn9mDrJJ58FXgsf.HDBRkzVUCtZ38ApEu36fvZtDoDSQTv3TWmbnxwwR7kto.3.2f804d43",
        "2gHebXBgPd7daZbsj6w9TPDta3vQzqvbkLtJG596rdN1.E7ZaHyyHNDCwR6qxZvKkPPWWXzFCiKQFentJtvSSH5Bi.3.2f804d43",
    ];

    fn small_shares() -> KeyShares {
        KeyShares::new(
            vec![
                PointInFiniteField::new(FieldElement::from(1), FieldElement::from(57)),
                PointInFiniteField::new(FieldElement::from(2), FieldElement::from(58)),
                PointInFiniteField::new(FieldElement::from(3), FieldElement::zero()),
            ],
            2,
            "0a1b2c3d".to_string(),
        )
    }

    #[test]
    fn test_to_backup_format_layout() {
        let backup = small_shares().to_backup_format();
        assert_eq!(backup, vec!["2.z.2.0a1b2c3d", "3.21.2.0a1b2c3d", "4..2.0a1b2c3d"]);
    }

    #[test]
    fn test_backup_round_trip() {
        let shares = small_shares();
        let decoded = KeyShares::from_backup_format(&shares.to_backup_format()).unwrap();
        assert_eq!(decoded, shares);
    }

    #[test]
    fn test_decode_corpus_shares() {
        let decoded = KeyShares::from_backup_format(&CORPUS_SHARES).unwrap();
        assert_eq!(decoded.points.len(), 5);
        assert_eq!(decoded.threshold, 3);
        assert_eq!(decoded.integrity, "2f804d43");
        assert_eq!(decoded.to_backup_format(), CORPUS_SHARES.to_vec());
    }

    #[test]
    fn test_repeated_share_is_duplicate() {
        let repeated = [CORPUS_SHARES[0], CORPUS_SHARES[1], CORPUS_SHARES[1]];
        match KeyShares::from_backup_format(&repeated).unwrap_err() {
            PrimitivesError::DuplicateShare { x } => {
                assert_eq!(x, "7aPzkiGZgvU4Jira5PN9Qf9o7FEg6uwy1zcxd17NBhh3")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    /// Same X with a different Y is still a duplicate.
    #[test]
    fn test_conflicting_share_is_duplicate() {
        let err = KeyShares::from_backup_format(&["2.z.2.0a1b2c3d", "2.21.2.0a1b2c3d"]).unwrap_err();
        assert!(matches!(err, PrimitivesError::DuplicateShare { .. }));
    }

    #[test]
    fn test_mixed_sets_are_rejected() {
        let err = KeyShares::from_backup_format(&["2.z.2.0a1b2c3d", "3.z.3.0a1b2c3d"]).unwrap_err();
        match err {
            PrimitivesError::ShareSetMismatch {
                share,
                field,
                expected,
                got,
            } => {
                assert_eq!((share, field), (1, "threshold"));
                assert_eq!((expected.as_str(), got.as_str()), ("2", "3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = KeyShares::from_backup_format(&["2.z.2.0a1b2c3d", "3.z.2.ffffffff"]).unwrap_err();
        assert!(matches!(
            err,
            PrimitivesError::ShareSetMismatch { share: 1, field: "integrity", .. }
        ));
    }

    #[test]
    fn test_malformed_shares() {
        let field_prime = base58::encode_uint(FieldElement::modulus());
        let out_of_range = format!("2.{}.2.0a1b2c3d", field_prime);
        let cases = [
            "2.z.2",
            "2.z.2.0a1b2c3d.extra",
            ".z.2.0a1b2c3d",
            "1.z.2.0a1b2c3d",
            "0.z.2.0a1b2c3d",
            "2.z.1.0a1b2c3d",
            "2.z.-3.0a1b2c3d",
            "2.z.two.0a1b2c3d",
            "2.z.2.0a1b2c",
            "2.z.2.0a1b2c3g",
            out_of_range.as_str(),
        ];
        for case in cases {
            let err = KeyShares::from_backup_format(&["3.z.2.0a1b2c3d", case]).unwrap_err();
            assert!(
                matches!(err, PrimitivesError::MalformedBackupShare { share: 1, .. }),
                "{:?} gave {:?}",
                case,
                err
            );
        }
    }

    /// Coordinates longer than any field element are refused before decoding.
    #[test]
    fn test_oversized_coordinate() {
        let long_x = format!("{}.2.2.0a1b2c3d", "z".repeat(200_000));
        let err = KeyShares::from_backup_format(&[long_x]).unwrap_err();
        match err {
            PrimitivesError::MalformedBackupShare { share: 0, reason } => {
                assert!(reason.starts_with("x is 200000 characters"), "{}", reason);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let long_y = format!("2.{}.2.0a1b2c3d", "z".repeat(MAX_COORDINATE_LEN + 1));
        let err = KeyShares::from_backup_format(&["3.z.2.0a1b2c3d".to_string(), long_y]).unwrap_err();
        assert!(matches!(err, PrimitivesError::MalformedBackupShare { share: 1, .. }));

        let widest = base58::encode_uint(&(FieldElement::modulus() - BigUint::from(1u32)));
        assert!(widest.len() <= MAX_COORDINATE_LEN);
        assert!(KeyShares::from_backup_format(&[format!("2.{}.2.0a1b2c3d", widest)]).is_ok());
    }

    #[test]
    fn test_integrity_case_is_normalized() {
        let decoded =
            KeyShares::from_backup_format(&["2.z.2.0A1B2C3D", "3.21.2.0a1b2c3d"]).unwrap();
        assert_eq!(decoded.integrity, "0a1b2c3d");
        assert_eq!(decoded.points.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let none: [&str; 0] = [];
        let err = KeyShares::from_backup_format(&none).unwrap_err();
        assert!(matches!(err, PrimitivesError::InsufficientShares { got: 0, .. }));
    }

    #[test]
    fn test_integrity_tag() {
        let key = crate::ec::PrivateKey::from_hex(
            "2589e5f70b70926c94ecc17ba71665e56a2c7c0255bc417867d9da384dca2977",
        )
        .unwrap();
        assert_eq!(integrity_tag(&key.pub_key()), "2f804d43");
    }
}
