//! GitHub webhook signature verification.
//!
//! GitHub signs the raw request body with the webhook secret and sends the
//! result as `<algorithm>=<hex digest>`. Verification must run on the bytes
//! exactly as received, before any parsing.

use hmac::digest::{InvalidLength, KeyInit};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

use crate::error::RelayError;

/// HMAC digests accepted in a signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl SignatureAlgorithm {
    /// Name as it appears in the signature header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Compute the raw HMAC of `body` keyed with `secret`.
    pub fn digest(self, secret: &[u8], body: &[u8]) -> Result<Vec<u8>, InvalidLength> {
        match self {
            Self::Sha1 => mac_bytes::<Hmac<Sha1>>(secret, body),
            Self::Sha256 => mac_bytes::<Hmac<Sha256>>(secret, body),
            Self::Sha384 => mac_bytes::<Hmac<Sha384>>(secret, body),
            Self::Sha512 => mac_bytes::<Hmac<Sha512>>(secret, body),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(RelayError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mac_bytes<M: Mac + KeyInit>(secret: &[u8], body: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = <M as Mac>::new_from_slice(secret)?;
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// A parsed `<algorithm>=<hex digest>` signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub algorithm: SignatureAlgorithm,
    pub digest: String,
}

impl FromStr for Signature {
    type Err = RelayError;

    fn from_str(header: &str) -> Result<Self, Self::Err> {
        // Without a separator the whole value is taken as the algorithm name
        let (algorithm, digest) = header.split_once('=').unwrap_or((header, ""));

        Ok(Self {
            algorithm: algorithm.trim().parse()?,
            digest: digest.trim().to_string(),
        })
    }
}

/// Verify a GitHub signature header against the raw request body.
///
/// Fails with [`RelayError::UnsupportedAlgorithm`] when the header names an
/// unknown digest and with [`RelayError::SignatureMismatch`] when the
/// supplied digest is not the HMAC of `body` under `secret`.
pub fn verify_signature(secret: &str, body: &[u8], header: &str) -> Result<(), RelayError> {
    let signature: Signature = header.parse()?;

    let Ok(supplied) = hex::decode(&signature.digest) else {
        return Err(RelayError::SignatureMismatch);
    };

    let computed = signature
        .algorithm
        .digest(secret.as_bytes(), body)
        .map_err(|_| RelayError::SignatureMismatch)?;

    // Constant-time comparison to prevent timing attacks
    if computed.as_slice().ct_eq(&supplied).into() {
        Ok(())
    } else {
        Err(RelayError::SignatureMismatch)
    }
}

/// Produce the header value GitHub would send for `body`.
pub fn sign(algorithm: SignatureAlgorithm, secret: &str, body: &[u8]) -> String {
    let digest = algorithm
        .digest(secret.as_bytes(), body)
        .map(hex::encode)
        .unwrap_or_default();
    format!("{algorithm}={digest}")
}
