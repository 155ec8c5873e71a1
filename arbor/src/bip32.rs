//! BIP-32 hierarchical deterministic key derivation.
//!
//! A single [`ExtendedKey`] type covers both private and public nodes; a
//! public node is simply one whose private half has been dropped with
//! [`ExtendedKey::neuter`].

use core::fmt;
use core::str::FromStr;

use k256::NonZeroScalar;
use zeroize::Zeroizing;

use crate::address::{Address, AddressType};
use crate::encoding::{base58check_decode, base58check_encode};
use crate::error::{Error, Result};
use crate::hash::hmac_sha512;
use crate::keys::{parse_scalar, PrivateKey, PublicKey};
use crate::network::Network;
use crate::path::{ChildIndex, DerivationPath};
use crate::secret::Secret32;

/// HMAC key for master key generation.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Length of a serialized extended key before Base58Check.
const SERIALIZED_LEN: usize = 78;

/// Which half of a node to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyVisibility {
    /// xprv-style output; needs a private node.
    Private,
    /// xpub-style output.
    Public,
}

/// Version-byte family used for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFormat {
    /// xprv/xpub (and the network's equivalents).
    #[default]
    Legacy,
    /// BIP-84 zprv/zpub (vprv/vpub on testnet).
    Segwit,
}

/// A node in the derivation tree.
#[derive(Clone)]
pub struct ExtendedKey {
    private_key: Option<PrivateKey>,
    public_key: PublicKey,
    chain_code: Secret32,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_index: ChildIndex,
    network: Network,
}

/// Split an HMAC-SHA512 output into a zeroizing IL and the chain code IR.
fn split_hmac(output: &[u8; 64]) -> (Zeroizing<[u8; 32]>, Secret32) {
    let mut il = Zeroizing::new([0u8; 32]);
    il.copy_from_slice(&output[..32]);
    let mut ir = Secret32::new([0u8; 32]);
    ir.as_bytes_mut().copy_from_slice(&output[32..]);
    (il, ir)
}

impl ExtendedKey {
    /// Create the master node from a 16 to 64 byte seed.
    ///
    /// Fails with [`Error::InvalidMasterKey`] in the astronomically unlikely
    /// case that the left half of the HMAC output is zero or not below the
    /// curve order; such a seed must be discarded.
    pub fn master(seed: &[u8], network: Network) -> Result<Self> {
        if !(16..=64).contains(&seed.len()) {
            return Err(Error::InvalidLength {
                expected: 64,
                actual: seed.len(),
            });
        }

        let output = Zeroizing::new(hmac_sha512(MASTER_HMAC_KEY, &[seed])?);
        let (il, chain_code) = split_hmac(&output);

        let scalar = parse_scalar(&il)
            .and_then(|s| Option::<NonZeroScalar>::from(NonZeroScalar::new(s)))
            .ok_or(Error::InvalidMasterKey)?;
        let private_key = PrivateKey::from_scalar(scalar);
        let public_key = private_key.public_key();

        tracing::debug!(network = network.name(), "created master key");

        Ok(Self {
            private_key: Some(private_key),
            public_key,
            chain_code,
            depth: 0,
            parent_fingerprint: [0u8; 4],
            child_index: ChildIndex::Normal(0),
            network,
        })
    }

    /// Derive the child at `index`.
    ///
    /// Private nodes derive private children; public nodes derive public
    /// children and reject hardened indices. [`Error::InvalidChildKey`] means
    /// this index yields no valid key and callers should move on to the next
    /// one; it is never retried here.
    pub fn derive_child(&self, index: ChildIndex) -> Result<Self> {
        if self.depth == u8::MAX {
            return Err(Error::DepthOverflow);
        }
        let raw = index.to_u32();

        // ser_P(K) or 0x00 || ser_256(k), then ser_32(i)
        let mut data = Zeroizing::new([0u8; 37]);
        if index.is_hardened() {
            let key = self
                .private_key
                .as_ref()
                .ok_or(Error::HardenedFromPublicKey(raw))?;
            data[1..33].copy_from_slice(key.to_bytes().as_bytes());
        } else {
            data[..33].copy_from_slice(&self.public_key.to_compressed());
        }
        data[33..].copy_from_slice(&raw.to_be_bytes());

        let output = Zeroizing::new(hmac_sha512(self.chain_code.as_bytes(), &[&data[..]])?);
        let (il, chain_code) = split_hmac(&output);
        let tweak = parse_scalar(&il).ok_or(Error::InvalidChildKey { index: raw })?;

        let (private_key, public_key) = match &self.private_key {
            Some(parent) => {
                let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(parent.scalar() + tweak))
                    .ok_or(Error::InvalidChildKey { index: raw })?;
                let key = PrivateKey::from_scalar(scalar);
                let public_key = key.public_key();
                (Some(key), public_key)
            }
            None => {
                let public_key = self
                    .public_key
                    .add_tweak(&tweak)
                    .ok_or(Error::InvalidChildKey { index: raw })?;
                (None, public_key)
            }
        };

        tracing::trace!(
            depth = self.depth + 1,
            index = %index,
            private = private_key.is_some(),
            "derived child key"
        );

        Ok(Self {
            private_key,
            public_key,
            chain_code,
            depth: self.depth + 1,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
            network: self.network,
        })
    }

    /// Walk `path` from this node, neutering the result if the path asks for it.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        let mut node = self.clone();
        for index in path.indices() {
            node = node.derive_child(*index)?;
        }
        if path.is_public() {
            node = node.neuter();
        }
        tracing::debug!(path = %path, "derived path");
        Ok(node)
    }

    /// Parse `path` and walk it from this node.
    pub fn derive(&self, path: &str) -> Result<Self> {
        self.derive_path(&DerivationPath::parse(path)?)
    }

    /// The public projection of this node.
    pub fn neuter(&self) -> Self {
        Self {
            private_key: None,
            ..self.clone()
        }
    }

    /// Whether this node carries a private key.
    #[inline]
    pub fn is_private(&self) -> bool {
        self.private_key.is_some()
    }

    /// The private key, if any.
    #[inline]
    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    /// The public key.
    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The chain code.
    #[inline]
    pub fn chain_code(&self) -> &Secret32 {
        &self.chain_code
    }

    /// Depth in the tree; 0 for the master node.
    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// First four bytes of the parent's identifier.
    #[inline]
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// Index this node was derived at.
    #[inline]
    pub fn child_index(&self) -> ChildIndex {
        self.child_index
    }

    /// Network used for serialization and addresses.
    #[inline]
    pub fn network(&self) -> Network {
        self.network
    }

    /// HASH160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        self.public_key.hash160(true)
    }

    /// First four bytes of [`identifier`](Self::identifier).
    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// Address of this node's public key.
    pub fn address(&self, address_type: AddressType) -> Result<Address> {
        Address::from_public_key(&self.public_key, self.network, address_type)
    }

    /// Serialize as a Base58Check extended key.
    pub fn to_extended_string(
        &self,
        visibility: KeyVisibility,
        format: KeyFormat,
    ) -> Result<Zeroizing<String>> {
        let params = self.network.params();
        let (private_version, public_version) = match format {
            KeyFormat::Legacy => (params.ext_private, params.ext_public),
            KeyFormat::Segwit => match (params.ext_segwit_private, params.ext_segwit_public) {
                (Some(private), Some(public)) => (private, public),
                _ => {
                    return Err(Error::UnsupportedScriptType {
                        script: "p2wpkh",
                        network: params.name,
                    })
                }
            },
        };

        match visibility {
            KeyVisibility::Private => {
                let key = self.private_key.as_ref().ok_or(Error::NotPrivate)?;
                let mut key_data = Zeroizing::new([0u8; 33]);
                key_data[1..].copy_from_slice(key.to_bytes().as_bytes());
                Ok(self.serialize(private_version, &key_data))
            }
            KeyVisibility::Public => {
                Ok(self.serialize(public_version, &self.public_key.to_compressed()))
            }
        }
    }

    /// Legacy private serialization (xprv on Bitcoin).
    pub fn to_xprv(&self) -> Result<Zeroizing<String>> {
        self.to_extended_string(KeyVisibility::Private, KeyFormat::Legacy)
    }

    /// Legacy public serialization (xpub on Bitcoin).
    pub fn to_xpub(&self) -> String {
        let version = self.network.params().ext_public;
        let text = self.serialize(version, &self.public_key.to_compressed());
        String::clone(&text)
    }

    fn serialize(&self, version: u32, key_data: &[u8; 33]) -> Zeroizing<String> {
        let mut buf = Zeroizing::new([0u8; SERIALIZED_LEN]);
        buf[..4].copy_from_slice(&version.to_be_bytes());
        buf[4] = self.depth;
        buf[5..9].copy_from_slice(&self.parent_fingerprint);
        buf[9..13].copy_from_slice(&self.child_index.to_u32().to_be_bytes());
        buf[13..45].copy_from_slice(self.chain_code.as_bytes());
        buf[45..].copy_from_slice(key_data);
        Zeroizing::new(base58check_encode(&buf[..4], &buf[4..]))
    }

    /// Parse a Base58Check extended key.
    ///
    /// With `network` set, the version bytes must be one of that network's;
    /// otherwise the network is inferred from the registry, where shared
    /// versions resolve to the earliest entry.
    pub fn from_extended_str(s: &str, network: Option<Network>) -> Result<Self> {
        let data = Zeroizing::new(base58check_decode(s.trim())?);
        if data.len() != SERIALIZED_LEN {
            return Err(Error::InvalidLength {
                expected: SERIALIZED_LEN,
                actual: data.len(),
            });
        }

        let version = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let (network, private) = match network {
            Some(expected) => match expected.params().classify_ext_version(version) {
                Some(private) => (expected, private),
                None => {
                    let (found, _) = Network::from_ext_version(version)?;
                    return Err(Error::NetworkMismatch {
                        expected: expected.name(),
                        found: found.name(),
                    });
                }
            },
            None => Network::from_ext_version(version)?,
        };

        let depth = data[4];
        let parent_fingerprint = [data[5], data[6], data[7], data[8]];
        let index = u32::from_be_bytes([data[9], data[10], data[11], data[12]]);
        if depth == 0 && parent_fingerprint != [0u8; 4] {
            return Err(Error::InvalidExtendedKey(
                "zero depth with non-zero parent fingerprint",
            ));
        }
        if depth == 0 && index != 0 {
            return Err(Error::InvalidExtendedKey("zero depth with non-zero index"));
        }

        let chain_code = Secret32::from_slice(&data[13..45])?;

        let (private_key, public_key) = if private {
            if data[45] != 0x00 {
                return Err(Error::InvalidExtendedKey("private key data must start with 0x00"));
            }
            let key = PrivateKey::from_bytes(&data[46..])?;
            let public_key = key.public_key();
            (Some(key), public_key)
        } else {
            (None, PublicKey::from_sec1_bytes(&data[45..])?)
        };

        Ok(Self {
            private_key,
            public_key,
            chain_code,
            depth,
            parent_fingerprint,
            child_index: ChildIndex::from(index),
            network,
        })
    }

    /// Rebuild a private parent from its public node and a private child.
    ///
    /// Works for any non-hardened child: `k_par = k_child - IL`. This is why
    /// a non-hardened private child must never be published alongside the
    /// parent's xpub.
    pub fn recover_parent(&self, child: &ExtendedKey) -> Result<Self> {
        let child_key = child.private_key.as_ref().ok_or(Error::NotPrivate)?;
        if child.child_index.is_hardened()
            || child.depth != self.depth.wrapping_add(1)
            || child.parent_fingerprint != self.fingerprint()
        {
            return Err(Error::NotChildOf);
        }
        let raw = child.child_index.to_u32();

        let mut data = [0u8; 37];
        data[..33].copy_from_slice(&self.public_key.to_compressed());
        data[33..].copy_from_slice(&raw.to_be_bytes());
        let output = Zeroizing::new(hmac_sha512(self.chain_code.as_bytes(), &[&data[..]])?);
        let (il, _) = split_hmac(&output);
        let tweak = parse_scalar(&il).ok_or(Error::InvalidChildKey { index: raw })?;

        let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(child_key.scalar() - tweak))
            .ok_or(Error::NotChildOf)?;
        let private_key = PrivateKey::from_scalar(scalar);
        if private_key.public_key() != self.public_key {
            return Err(Error::NotChildOf);
        }

        tracing::debug!(depth = self.depth, "recovered parent private key");

        Ok(Self {
            private_key: Some(private_key),
            ..self.clone()
        })
    }
}

impl PartialEq for ExtendedKey {
    fn eq(&self, other: &Self) -> bool {
        self.network == other.network
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_index == other.child_index
            && self.chain_code == other.chain_code
            && self.public_key == other.public_key
            && self.private_key.as_ref().map(PrivateKey::to_bytes)
                == other.private_key.as_ref().map(PrivateKey::to_bytes)
    }
}

impl Eq for ExtendedKey {}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("network", &self.network)
            .field("depth", &self.depth)
            .field("child_index", &self.child_index)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("public_key", &self.public_key)
            .field("private", &self.is_private())
            .finish()
    }
}

impl FromStr for ExtendedKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extended_str(s, None)
    }
}
