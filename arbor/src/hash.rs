//! Hash primitives used across key derivation, encoding and signing.

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use sha3::Keccak256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Compute SHA-256 hash
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute double SHA-256 hash (Base58Check checksums, signed-message digests)
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash
#[inline]
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compute HASH160 (SHA-256 followed by RIPEMD-160)
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute Keccak-256 hash (Ethereum addresses)
#[inline]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Compute HMAC-SHA512 over the concatenation of `parts`.
///
/// The output holds key material in BIP-32, so callers should move it into a
/// zeroizing container before splitting it.
pub fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 64]> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key).map_err(|_| Error::InvalidLength {
        expected: 64,
        actual: key.len(),
    })?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().into())
}

/// Compute HMAC-SHA256.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<[u8; 32]> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| Error::InvalidLength {
        expected: 32,
        actual: key.len(),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sha256_tests {
        use super::*;

        #[test]
        fn test_sha256_empty() {
            assert_eq!(
                hex::encode(sha256(b"")),
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            );
        }

        #[test]
        fn test_double_sha256_empty() {
            assert_eq!(
                hex::encode(double_sha256(b"")),
                "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
            );
        }
    }

    mod hash160_tests {
        use super::*;

        #[test]
        fn test_ripemd160_empty() {
            assert_eq!(
                hex::encode(ripemd160(b"")),
                "9c1185a5c5e9fc54612808977ee8f548b2258d31"
            );
        }

        #[test]
        fn test_hash160_empty() {
            assert_eq!(
                hex::encode(hash160(b"")),
                "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
            );
        }

        #[test]
        fn test_hash160_hello() {
            assert_eq!(
                hex::encode(hash160(b"hello")),
                "b6a9c8c230722b7c748331a8b450f05566dc7d0f"
            );
        }
    }

    mod keccak_tests {
        use super::*;

        #[test]
        fn test_keccak256_empty() {
            assert_eq!(
                hex::encode(keccak256(b"")),
                "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            );
        }
    }

    mod hmac_tests {
        use super::*;

        // RFC 4231 test case 2
        #[test]
        fn test_hmac_sha512_rfc4231() {
            let out = hmac_sha512(b"Jefe", &[&b"what do ya want "[..], &b"for nothing?"[..]]).unwrap();
            assert_eq!(
                hex::encode(out),
                "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
                 9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
            );
        }

        #[test]
        fn test_hmac_sha256_rfc4231() {
            let out = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
            assert_eq!(
                hex::encode(out),
                "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
            );
        }

        #[test]
        fn test_hmac_sha512_parts_concatenate() {
            let joined = hmac_sha512(b"key", &[&b"abcdef"[..]]).unwrap();
            let split = hmac_sha512(b"key", &[&b"ab"[..], &b""[..], &b"cdef"[..]]).unwrap();
            assert_eq!(joined, split);
        }
    }
}
