//! RSA public key validation for the per-user key directory.

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::error::CoreError;

pub const MIN_RSA_KEY_BITS: usize = 2048;

/// Accept an SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`)
/// PEM of at least [`MIN_RSA_KEY_BITS`]. Returns the trimmed PEM to store.
pub fn validate_rsa_public_pem(raw: &str) -> Result<String, CoreError> {
    let pem = raw.trim();
    let key = RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|_| CoreError::validation("Invalid RSA public key"))?;

    if key.size() * 8 < MIN_RSA_KEY_BITS {
        return Err(CoreError::validation(format!(
            "RSA public key must be at least {MIN_RSA_KEY_BITS} bits"
        )));
    }
    Ok(pem.to_string())
}
