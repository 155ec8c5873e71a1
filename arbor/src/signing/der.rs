//! DER encoding of plain ECDSA signatures.
//!
//! `0x30 len 0x02 len(r) r 0x02 len(s) s`, integers minimal and unsigned.
//! This is the form transactions and most external tools exchange.

use k256::ecdsa::Signature;

use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};

/// Encode `signature` as DER.
pub fn to_der(signature: &Signature) -> Vec<u8> {
    signature.to_der().as_bytes().to_vec()
}

/// Decode a strict DER signature.
pub fn from_der(bytes: &[u8]) -> Result<Signature> {
    Signature::from_der(bytes).map_err(|_| Error::MalformedEnvelope("invalid DER signature"))
}

/// Sign a 32-byte digest, returning the DER encoding.
pub fn sign(key: &PrivateKey, digest: &[u8; 32]) -> Result<Vec<u8>> {
    Ok(to_der(&key.sign_prehash(digest)?))
}

/// Verify a DER signature over a 32-byte digest.
pub fn verify(public_key: &PublicKey, digest: &[u8; 32], der: &[u8]) -> Result<()> {
    public_key.verify_prehash(digest, &from_der(der)?)
}
