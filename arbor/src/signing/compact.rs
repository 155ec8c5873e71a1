//! Recoverable compact signatures over network-prefixed messages.
//!
//! The signed digest is `SHA256d(magic || varint(len) || message)` where
//! `magic` is the network's signed-message prefix. The envelope is base64 of
//! `header || r || s`, with `header = 27 + recid + 4 * compressed`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k256::ecdsa::{RecoveryId, Signature};

use crate::address::{Address, AddressType};
use crate::encoding::write_varint;
use crate::error::{Error, Result};
use crate::hash::double_sha256;
use crate::keys::{PrivateKey, PublicKey};
use crate::network::Network;

/// Lowest valid header byte.
const HEADER_MIN: u8 = 27;
/// Highest header byte accepted on verify. 31..=42 cover the compressed
/// P2PKH, P2SH-P2WPKH and P2WPKH ranges some wallets emit.
const HEADER_MAX: u8 = 42;

/// Digest a message the way [`sign`] and [`verify`] do for `network`.
pub fn message_digest(network: Network, message: &[u8]) -> Result<[u8; 32]> {
    let params = network.params();
    let magic = params.message_magic.ok_or(Error::UnsupportedScriptType {
        script: "signed message",
        network: params.name,
    })?;

    let mut data = Vec::with_capacity(magic.len() + 9 + message.len());
    data.extend_from_slice(magic.as_bytes());
    write_varint(&mut data, message.len() as u64);
    data.extend_from_slice(message);
    Ok(double_sha256(&data))
}

/// A decoded 65-byte compact signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactSignature {
    header: u8,
    signature: Signature,
}

impl CompactSignature {
    /// Assemble from a signature, its recovery id and the key encoding flag.
    pub fn new(signature: Signature, recovery_id: RecoveryId, compressed: bool) -> Self {
        let header = HEADER_MIN + recovery_id.to_byte() + if compressed { 4 } else { 0 };
        Self { header, signature }
    }

    /// Decode a base64 envelope.
    ///
    /// Only the envelope structure is checked here; no curve arithmetic.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| Error::MalformedEnvelope("signature is not valid base64"))?;
        if bytes.len() != 65 {
            return Err(Error::MalformedEnvelope("signature must be 65 bytes"));
        }
        let header = bytes[0];
        if !(HEADER_MIN..=HEADER_MAX).contains(&header) {
            return Err(Error::MalformedEnvelope("header byte out of range"));
        }
        let signature = Signature::from_slice(&bytes[1..]).map_err(|_| Error::SignatureInvalid)?;
        Ok(Self { header, signature })
    }

    /// `header || r || s`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = self.header;
        out[1..].copy_from_slice(&self.signature.to_bytes());
        out
    }

    /// Base64 envelope.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Raw header byte.
    #[inline]
    pub fn header(&self) -> u8 {
        self.header
    }

    /// Whether the signer's key was compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.header >= HEADER_MIN + 4
    }

    /// The recovery id encoded in the header.
    pub fn recovery_id(&self) -> Result<RecoveryId> {
        RecoveryId::from_byte((self.header - HEADER_MIN) & 0x03)
            .ok_or(Error::MalformedEnvelope("invalid recovery id"))
    }

    /// The `(r, s)` pair.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Recover the signing key for `digest`.
    pub fn recover(&self, digest: &[u8; 32]) -> Result<PublicKey> {
        let recovery_id = self.recovery_id()?;
        // High-S signatures are accepted by flipping to the low-S twin.
        let normalized = self.signature.normalize_s();
        let (signature, recovery_id) = match &normalized {
            Some(low) => (
                low,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (&self.signature, recovery_id),
        };
        PublicKey::recover_from_prehash(digest, signature, recovery_id)
    }
}

/// Sign `message` for `network`, returning the base64 envelope.
///
/// `compressed` selects which public key encoding the header advertises and
/// therefore which P2PKH address the signature verifies against.
pub fn sign(key: &PrivateKey, message: &[u8], network: Network, compressed: bool) -> Result<String> {
    let digest = message_digest(network, message)?;
    let (signature, recovery_id) = key.sign_prehash_recoverable(&digest)?;
    Ok(CompactSignature::new(signature, recovery_id, compressed).to_base64())
}

/// Check that `signature` over `message` was made by the key behind `address`.
pub fn verify(message: &[u8], signature: &str, address: &str, network: Network) -> Result<()> {
    let signature = CompactSignature::from_base64(signature)?;
    let claimed = Address::parse(address, network)?;
    let digest = message_digest(network, message)?;

    let public_key = signature.recover(&digest)?;
    let derived = match claimed.address_type() {
        AddressType::P2pkh => Address::from_hash(
            public_key.hash160(signature.is_compressed()),
            network,
            AddressType::P2pkh,
        )?,
        // Segwit programs commit to the compressed key only.
        _ if !signature.is_compressed() => {
            tracing::debug!(claimed = %claimed, "uncompressed signature for a segwit address");
            return Err(Error::AddressMismatch);
        }
        other => Address::from_public_key(&public_key, network, other)?,
    };

    if derived != claimed {
        tracing::debug!(
            claimed = %claimed,
            recovered = %derived,
            "compact signature made by a different key"
        );
        return Err(Error::AddressMismatch);
    }
    Ok(())
}
