//! Invoice-based child key derivation (BRC-42) and invoice numbers (BRC-43).
//!
//! Both parties to an invoice compute the same ECDH point `S`. The offset
//! `o = HMAC-SHA256(key = S compressed, data = invoice) mod N` is then added
//! to the recipient's private scalar, or `o * G` to the recipient's public
//! point, giving matching child keys without any further exchange.
//!
//! See <https://github.com/bitcoin-sv/BRCs/blob/master/key-derivation/0042.md>.

use std::fmt;
use std::sync::LazyLock;

use k256::elliptic_curve::ops::Reduce;
use k256::{Scalar, U256};
use regex::Regex;

use crate::ec::public_key::PublicKey;
use crate::hash::sha256_hmac;
use crate::PrimitivesError;

/// Security level of a BRC-43 protocol.
pub type SecurityLevel = i32;

/// No user prompts required.
pub const SECURITY_LEVEL_SILENT: SecurityLevel = 0;
/// Approval once per application.
pub const SECURITY_LEVEL_EVERY_APP: SecurityLevel = 1;
/// Approval per application and counterparty.
pub const SECURITY_LEVEL_EVERY_APP_AND_COUNTERPARTY: SecurityLevel = 2;

const MAX_KEY_ID_LEN: usize = 800;
const MIN_PROTOCOL_LEN: usize = 5;
const MAX_PROTOCOL_LEN: usize = 400;
const MAX_LINKAGE_PROTOCOL_LEN: usize = 430;
const LINKAGE_REVELATION_PREFIX: &str = "specific linkage revelation ";

static RE_PROTOCOL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9 ]+$").unwrap());

/// Compute the BRC-42 scalar offset for `invoice_number` under `shared_secret`.
///
/// The shared secret is used as the HMAC key in compressed SEC1 form and the
/// invoice number's UTF-8 bytes as the message. The 32-byte digest is reduced
/// modulo N.
///
/// # Returns
/// `InvalidInvoiceNumber` if the invoice number is empty.
pub(crate) fn brc42_offset(
    shared_secret: &PublicKey,
    invoice_number: &str,
) -> Result<Scalar, PrimitivesError> {
    validate_invoice_number(invoice_number)?;
    tracing::debug!(invoice_len = invoice_number.len(), "deriving BRC-42 offset");

    let digest = sha256_hmac(&shared_secret.to_compressed(), invoice_number.as_bytes());
    Ok(<Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&digest)))
}

/// Check that a raw invoice number can be used for derivation.
///
/// Any non-empty string is accepted; structured BRC-43 numbers are built and
/// checked by [`InvoiceNumber::new`].
pub fn validate_invoice_number(invoice_number: &str) -> Result<(), PrimitivesError> {
    if invoice_number.is_empty() {
        return Err(PrimitivesError::InvalidInvoiceNumber(
            "invoice number must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// A BRC-43 invoice number of the form `"{security_level}-{protocol}-{key_id}"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Build an invoice number from its parts.
    ///
    /// The protocol name is trimmed and lower-cased before validation, so
    /// `" Hello World "` and `"hello world"` name the same protocol.
    ///
    /// # Arguments
    /// * `security_level` - 0, 1 or 2.
    /// * `protocol` - 5 to 400 characters of letters, digits and single
    ///   spaces, not ending in `" protocol"`. Names starting with
    ///   `"specific linkage revelation "` may run to 430.
    /// * `key_id` - 1 to 800 bytes.
    ///
    /// # Returns
    /// The invoice number, or `InvalidInvoiceNumber` naming the broken rule.
    pub fn new(
        security_level: SecurityLevel,
        protocol: &str,
        key_id: &str,
    ) -> Result<Self, PrimitivesError> {
        if !(SECURITY_LEVEL_SILENT..=SECURITY_LEVEL_EVERY_APP_AND_COUNTERPARTY)
            .contains(&security_level)
        {
            return Err(invalid("protocol security level must be 0, 1, or 2"));
        }

        if key_id.is_empty() {
            return Err(invalid("key IDs must be 1 character or more"));
        }
        if key_id.len() > MAX_KEY_ID_LEN {
            return Err(invalid("key IDs must be 800 characters or less"));
        }

        let protocol = protocol.trim().to_lowercase();
        if protocol.len() < MIN_PROTOCOL_LEN {
            return Err(invalid("protocol names must be 5 characters or more"));
        }
        if protocol.starts_with(LINKAGE_REVELATION_PREFIX) {
            if protocol.len() > MAX_LINKAGE_PROTOCOL_LEN {
                return Err(invalid(
                    "specific linkage revelation protocol names must be 430 characters or less",
                ));
            }
        } else if protocol.len() > MAX_PROTOCOL_LEN {
            return Err(invalid("protocol names must be 400 characters or less"));
        }
        if protocol.contains("  ") {
            return Err(invalid(
                "protocol names cannot contain multiple consecutive spaces",
            ));
        }
        if !RE_PROTOCOL_NAME.is_match(&protocol) {
            return Err(invalid(
                "protocol names can only contain letters, numbers and spaces",
            ));
        }
        if protocol.ends_with(" protocol") {
            return Err(invalid(
                "no need to end your protocol name with \" protocol\"",
            ));
        }

        Ok(InvoiceNumber(format!("{}-{}-{}", security_level, protocol, key_id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn invalid(reason: &str) -> PrimitivesError {
    PrimitivesError::InvalidInvoiceNumber(reason.to_string())
}
