/// Unified error type for all key operations.
///
/// Covers key parsing, signatures, encodings, threshold splitting, backup
/// decoding, and child key derivation.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("point not on curve")]
    PointNotOnCurve,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("invalid share count: {0}")]
    InvalidShareCount(String),

    #[error("insufficient shares for recovery: need {threshold}, got {got}")]
    InsufficientShares { threshold: usize, got: usize },

    #[error("duplicate share detected at x = {x}, each must be unique")]
    DuplicateShare { x: String },

    #[error("share {share} is not from the same split: {field} is {got}, expected {expected}")]
    ShareSetMismatch {
        share: usize,
        field: &'static str,
        expected: String,
        got: String,
    },

    #[error("malformed backup share {share}: {reason}")]
    MalformedBackupShare { share: usize, reason: String },

    #[error("integrity hash mismatch: expected {expected}, got {got}")]
    IntegrityMismatch { expected: String, got: String },

    #[error("invalid invoice number: {0}")]
    InvalidInvoiceNumber(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
