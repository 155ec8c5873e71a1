//! secp256k1 key pairs and the Wallet Import Format.

use core::fmt;
use core::str::FromStr;

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, NonZeroScalar, ProjectivePoint, Scalar};
use zeroize::Zeroizing;

use crate::encoding::{base58check_decode, base58check_encode};
use crate::error::{Error, Result};
use crate::hash::{hash160, sha256};
use crate::network::Network;
use crate::secret::Secret32;

/// Interpret 32 big-endian bytes as a scalar, `None` if not below the group order.
pub(crate) fn parse_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
}

/// A secp256k1 private key.
///
/// The scalar lives inside [`SigningKey`], which wipes it on drop.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a fresh key from the given CSPRNG.
    pub fn random<R: rand_core::RngCore + rand_core::CryptoRng>(rng: &mut R) -> Self {
        Self {
            inner: SigningKey::random(rng),
        }
    }

    /// Create from a raw 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let inner = SigningKey::from_slice(bytes).map_err(|_| Error::InvalidPrivateKey)?;
        Ok(Self { inner })
    }

    /// Derive a key from a memorized password: `SHA-256(password || salt)`.
    ///
    /// A single unsalted hash round is trivially brute-forced; this exists
    /// to recover keys made by brainwallet tools, not to create new ones.
    pub fn from_brainwallet(password: &str, salt: &str) -> Result<Self> {
        let mut input = Zeroizing::new(Vec::with_capacity(password.len() + salt.len()));
        input.extend_from_slice(password.as_bytes());
        input.extend_from_slice(salt.as_bytes());
        let digest = Zeroizing::new(sha256(&input));
        Self::from_bytes(&digest[..])
    }

    pub(crate) fn from_scalar(scalar: NonZeroScalar) -> Self {
        Self {
            inner: SigningKey::from(scalar),
        }
    }

    pub(crate) fn scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }

    /// Raw 32-byte scalar in a zeroizing buffer.
    pub fn to_bytes(&self) -> Secret32 {
        Secret32::new(self.inner.to_bytes().into())
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Export as WIF for `network`.
    pub fn to_wif(&self, network: Network, compressed: bool) -> Result<Zeroizing<String>> {
        let version = network
            .params()
            .wif_version
            .ok_or(Error::UnsupportedScriptType {
                script: "wif",
                network: network.name(),
            })?;

        let mut payload = Zeroizing::new([0u8; 33]);
        payload[..32].copy_from_slice(self.to_bytes().as_bytes());
        payload[32] = 0x01;
        let len = if compressed { 33 } else { 32 };

        Ok(Zeroizing::new(base58check_encode(&[version], &payload[..len])))
    }

    /// Import from WIF, returning the key, its network and the compression flag.
    pub fn from_wif(wif: &str) -> Result<(Self, Network, bool)> {
        let data = Zeroizing::new(base58check_decode(wif)?);

        let compressed = match data.len() {
            33 => false,
            34 if data[33] == 0x01 => true,
            34 => return Err(Error::InvalidPrivateKey),
            n => {
                return Err(Error::InvalidLength {
                    expected: 34,
                    actual: n,
                })
            }
        };

        let network = Network::from_wif_version(data[0])?;
        let key = Self::from_bytes(&data[1..33])?;
        Ok((key, network, compressed))
    }

    /// Sign a 32-byte digest, returning a low-S signature and its recovery id.
    pub fn sign_prehash_recoverable(&self, digest: &[u8; 32]) -> Result<(Signature, RecoveryId)> {
        self.inner
            .sign_prehash_recoverable(digest)
            .map_err(|_| Error::SignatureInvalid)
    }

    /// Sign a 32-byte digest without a recovery id.
    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<Signature> {
        PrehashSigner::<Signature>::sign_prehash(&self.inner, digest)
            .map_err(|_| Error::SignatureInvalid)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    /// Parse WIF, or 64 hex characters with an optional `0x` prefix.
    fn from_str(s: &str) -> Result<Self> {
        let hex_str = s.strip_prefix("0x").unwrap_or(s);
        if hex_str.len() == 64 {
            let bytes = Zeroizing::new(hex::decode(hex_str).map_err(|_| Error::InvalidCharacter)?);
            return Self::from_bytes(&bytes);
        }
        Self::from_wif(s).map(|(key, _, _)| key)
    }
}

/// A secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1 encoded point (33 compressed or 65 uncompressed bytes).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 33 && bytes.len() != 65 {
            return Err(Error::InvalidLength {
                expected: 33,
                actual: bytes.len(),
            });
        }
        let inner = VerifyingKey::from_sec1_bytes(bytes).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self { inner })
    }

    /// 33-byte compressed SEC1 encoding.
    pub fn to_compressed(&self) -> [u8; 33] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// 65-byte uncompressed SEC1 encoding.
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// HASH160 of the compressed or uncompressed encoding.
    pub fn hash160(&self, compressed: bool) -> [u8; 20] {
        if compressed {
            hash160(&self.to_compressed())
        } else {
            hash160(&self.to_uncompressed())
        }
    }

    /// `self + tweak·G`; `None` at the point at infinity.
    pub(crate) fn add_tweak(&self, tweak: &Scalar) -> Option<Self> {
        let point = ProjectivePoint::GENERATOR * tweak + ProjectivePoint::from(*self.inner.as_affine());
        VerifyingKey::from_affine(point.to_affine())
            .ok()
            .map(|inner| Self { inner })
    }

    /// Verify a signature over a 32-byte digest.
    pub fn verify_prehash(&self, digest: &[u8; 32], signature: &Signature) -> Result<()> {
        self.inner
            .verify_prehash(digest, signature)
            .map_err(|_| Error::SignatureInvalid)
    }

    /// Recover the signer's key from a digest and a recoverable signature.
    pub fn recover_from_prehash(
        digest: &[u8; 32],
        signature: &Signature,
        recovery_id: RecoveryId,
    ) -> Result<Self> {
        VerifyingKey::recover_from_prehash(digest, signature, recovery_id)
            .map(|inner| Self { inner })
            .map_err(|_| Error::SignatureInvalid)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_compressed()))
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| Error::InvalidCharacter)?;
        Self::from_sec1_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const KEY: [u8; 32] = hex!("0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d");

    #[test]
    fn test_wif_export_compressed() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let wif = key.to_wif(Network::Bitcoin, true).unwrap();
        assert_eq!(
            wif.as_str(),
            "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617"
        );
    }

    #[test]
    fn test_wif_export_uncompressed() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let wif = key.to_wif(Network::Bitcoin, false).unwrap();
        assert_eq!(
            wif.as_str(),
            "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"
        );
    }

    #[test]
    fn test_wif_import() {
        let (key, network, compressed) =
            PrivateKey::from_wif("KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617").unwrap();
        assert_eq!(network, Network::Bitcoin);
        assert!(compressed);
        assert_eq!(key.to_bytes().as_bytes(), &KEY);

        let (_, _, compressed) =
            PrivateKey::from_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ").unwrap();
        assert!(!compressed);
    }

    #[test]
    fn test_wif_roundtrip_other_networks() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        for network in [Network::BitcoinTestnet, Network::Litecoin, Network::Dogecoin] {
            let wif = key.to_wif(network, true).unwrap();
            let (back, net, compressed) = PrivateKey::from_wif(&wif).unwrap();
            assert_eq!(net, network);
            assert!(compressed);
            assert_eq!(back.to_bytes(), key.to_bytes());
        }
    }

    #[test]
    fn test_wif_unsupported_on_ethereum() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        assert!(matches!(
            key.to_wif(Network::Ethereum, true),
            Err(Error::UnsupportedScriptType { .. })
        ));
    }

    #[test]
    fn test_wif_bad_compression_flag() {
        let mut payload = KEY.to_vec();
        payload.push(0x02);
        let wif = base58check_encode(&[0x80], &payload);
        assert_eq!(PrivateKey::from_wif(&wif).unwrap_err(), Error::InvalidPrivateKey);
    }

    #[test]
    fn test_zero_key_rejected() {
        assert_eq!(
            PrivateKey::from_bytes(&[0u8; 32]).unwrap_err(),
            Error::InvalidPrivateKey
        );
    }

    #[test]
    fn test_from_str_hex_and_wif() {
        let a: PrivateKey = "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d"
            .parse()
            .unwrap();
        let b: PrivateKey = "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617"
            .parse()
            .unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_public_key_encodings() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let pk = key.public_key();
        let compressed = pk.to_compressed();
        let uncompressed = pk.to_uncompressed();
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(compressed[1..], uncompressed[1..33]);
        assert_eq!(PublicKey::from_sec1_bytes(&compressed).unwrap(), pk);
        assert_eq!(PublicKey::from_sec1_bytes(&uncompressed).unwrap(), pk);
        assert_eq!(pk.to_string().parse::<PublicKey>().unwrap(), pk);
    }

    #[test]
    fn test_uncompressed_hash160_matches_known_address() {
        // 5HueCGU8... controls 1GAehh7TsJAHuUAeKZcXf5CnwuGuGgyX2S
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let h = key.public_key().hash160(false);
        assert_eq!(
            base58check_encode(&[0x00], &h),
            "1GAehh7TsJAHuUAeKZcXf5CnwuGuGgyX2S"
        );
    }

    #[test]
    fn test_add_tweak_matches_scalar_addition() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let tweak = parse_scalar(&[0x11; 32]).unwrap();
        let via_point = key.public_key().add_tweak(&tweak).unwrap();
        let sum = NonZeroScalar::new(key.scalar() + tweak).unwrap();
        let via_scalar = PrivateKey::from_scalar(sum).public_key();
        assert_eq!(via_point, via_scalar);
    }

    #[test]
    fn test_sign_verify_recover() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        let digest = crate::hash::sha256(b"arbor");
        let (sig, recid) = key.sign_prehash_recoverable(&digest).unwrap();
        key.public_key().verify_prehash(&digest, &sig).unwrap();
        let recovered = PublicKey::recover_from_prehash(&digest, &sig, recid).unwrap();
        assert_eq!(recovered, key.public_key());
    }

    #[test]
    fn test_brainwallet_known_addresses() {
        let key = PrivateKey::from_brainwallet("correct horse battery staple", "").unwrap();
        assert_eq!(
            hex::encode(key.to_bytes().as_bytes()),
            "c4bbcb1fbec99d65bf59d85c8cb62ee2db963f0fe106f483d9afa73bd4e39a8a"
        );
        let pk = key.public_key();
        assert_eq!(
            base58check_encode(&[0x00], &pk.hash160(false)),
            "1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T"
        );
        assert_eq!(
            base58check_encode(&[0x00], &pk.hash160(true)),
            "1C7zdTfnkzmr13HfA2vNm5SJYRK6nEKyq8"
        );
    }

    #[test]
    fn test_brainwallet_salt_is_appended() {
        let salted = PrivateKey::from_brainwallet("correct horse battery staple", "zpywallet").unwrap();
        let joined = PrivateKey::from_brainwallet("correct horse battery staplezpywallet", "").unwrap();
        assert_eq!(salted.to_bytes(), joined.to_bytes());
        assert_eq!(
            base58check_encode(&[0x00], &salted.public_key().hash160(true)),
            "16eCUGESp8XAdykBRFAPL7bCojCZF2QQfx"
        );
    }

    #[cfg(feature = "rand")]
    #[test]
    fn test_random_keys_differ() {
        let a = PrivateKey::random(&mut rand_core::OsRng);
        let b = PrivateKey::random(&mut rand_core::OsRng);
        assert_ne!(a.to_bytes(), b.to_bytes());
        let digest = sha256(b"fresh");
        a.public_key()
            .verify_prehash(&digest, &a.sign_prehash(&digest).unwrap())
            .unwrap();
    }

    #[test]
    fn test_debug_redacts() {
        let key = PrivateKey::from_bytes(&KEY).unwrap();
        assert_eq!(format!("{key:?}"), "PrivateKey([REDACTED])");
    }
}
