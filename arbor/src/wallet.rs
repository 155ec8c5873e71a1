//! HD wallet built on the derivation tree.
//!
//! A [`Wallet`] owns a root node (normally the master key from a mnemonic,
//! or an account-level xpub for a watch-only wallet) and renders addresses
//! along the BIP-44/49/84 account structure.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use zeroize::Zeroizing;

use crate::address::AddressType;
use crate::bip32::{ExtendedKey, KeyFormat, KeyVisibility};
use crate::error::{Error, Result};
use crate::hash::hmac_sha256;
use crate::mnemonic::Mnemonic;
use crate::network::Network;
use crate::path::{ChildIndex, DerivationPath};

/// A derived address with its keys.
#[derive(Debug, Clone)]
pub struct DerivedAddress {
    /// Derivation path, relative to the wallet root.
    pub path: DerivationPath,
    /// Rendered address.
    pub address: String,
    /// Compressed public key in hex.
    pub public_key_hex: String,
    /// WIF (or 0x-hex on networks without WIF); `None` for watch-only wallets.
    pub private_key: Option<Zeroizing<String>>,
    /// Address type.
    pub address_type: AddressType,
}

const BRAINWALLET_ROUNDS: u32 = 50_000;

/// Most interior public nodes the wallet keeps before the cache is reset.
pub const CACHE_CAPACITY: usize = 1024;

/// An HD wallet rooted at one extended key.
///
/// Interior public nodes derived through [`public_child`](Self::public_child)
/// are memoized, up to [`CACHE_CAPACITY`] entries; the cache never holds
/// private material.
#[derive(Debug)]
pub struct Wallet {
    root: ExtendedKey,
    mnemonic: Option<Mnemonic>,
    has_passphrase: bool,
    cache: RwLock<HashMap<Vec<ChildIndex>, ExtendedKey>>,
}

impl Wallet {
    fn with_root(root: ExtendedKey, mnemonic: Option<Mnemonic>, has_passphrase: bool) -> Self {
        Self {
            root,
            mnemonic,
            has_passphrase,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a wallet with a fresh `word_count`-word mnemonic.
    #[cfg(feature = "rand")]
    pub fn generate(word_count: usize, passphrase: &str, network: Network) -> Result<Self> {
        Self::generate_with(&mut rand_core::OsRng, word_count, passphrase, network)
    }

    /// Generate a wallet drawing entropy from `rng`.
    pub fn generate_with<R: rand_core::RngCore + rand_core::CryptoRng>(
        rng: &mut R,
        word_count: usize,
        passphrase: &str,
        network: Network,
    ) -> Result<Self> {
        let bits = match word_count {
            12 | 15 | 18 | 21 | 24 => word_count / 3 * 32,
            n => return Err(Error::InvalidWordCount(n)),
        };
        let mnemonic = Mnemonic::generate_with(rng, bits)?;
        Self::from_parsed_mnemonic(mnemonic, passphrase, network)
    }

    /// Restore from a mnemonic phrase and optional passphrase.
    pub fn from_mnemonic(phrase: &str, passphrase: &str, network: Network) -> Result<Self> {
        Self::from_parsed_mnemonic(Mnemonic::from_phrase(phrase)?, passphrase, network)
    }

    /// Restore from raw mnemonic entropy.
    pub fn from_entropy(entropy: &[u8], passphrase: &str, network: Network) -> Result<Self> {
        Self::from_parsed_mnemonic(Mnemonic::from_entropy(entropy)?, passphrase, network)
    }

    fn from_parsed_mnemonic(mnemonic: Mnemonic, passphrase: &str, network: Network) -> Result<Self> {
        let seed = mnemonic.to_seed(passphrase);
        let root = ExtendedKey::master(seed.as_bytes(), network)?;
        Ok(Self::with_root(root, Some(mnemonic), !passphrase.is_empty()))
    }

    /// Build from a raw BIP-32 seed.
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self> {
        Ok(Self::with_root(ExtendedKey::master(seed, network)?, None, false))
    }

    /// Build from a memorized password.
    ///
    /// The seed is 50,000 rounds of HMAC-SHA256 keyed by the password,
    /// starting from 32 zero bytes. Low-entropy passwords are guessable.
    pub fn from_brainwallet(password: &str, network: Network) -> Result<Self> {
        let mut seed = Zeroizing::new([0u8; 32]);
        for _ in 0..BRAINWALLET_ROUNDS {
            *seed = hmac_sha256(password.as_bytes(), &seed[..])?;
        }
        tracing::debug!(rounds = BRAINWALLET_ROUNDS, "stretched brainwallet password");
        Self::from_seed(&seed[..], network)
    }

    /// Build from a serialized extended key.
    ///
    /// An xpub gives a watch-only wallet. Keys below the master level are
    /// treated as account nodes, see [`receive_address`](Self::receive_address).
    pub fn from_extended_str(s: &str, network: Option<Network>) -> Result<Self> {
        Ok(Self::with_root(ExtendedKey::from_extended_str(s, network)?, None, false))
    }

    /// The mnemonic phrase, if the wallet was built from one.
    pub fn mnemonic(&self) -> Option<Zeroizing<String>> {
        self.mnemonic.as_ref().map(Mnemonic::phrase)
    }

    /// Whether a non-empty passphrase was mixed into the seed.
    #[inline]
    pub fn has_passphrase(&self) -> bool {
        self.has_passphrase
    }

    /// The root node.
    #[inline]
    pub fn root(&self) -> &ExtendedKey {
        &self.root
    }

    /// The wallet's network.
    #[inline]
    pub fn network(&self) -> Network {
        self.root.network()
    }

    /// Whether the wallet holds no private keys.
    #[inline]
    pub fn is_watch_only(&self) -> bool {
        !self.root.is_private()
    }

    /// Derive the node at `path` text.
    pub fn derive(&self, path: &str) -> Result<ExtendedKey> {
        self.root.derive(path)
    }

    /// Derive the node at `path`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedKey> {
        self.root.derive_path(path)
    }

    /// The public node at `path`, memoized.
    ///
    /// Interior nodes (accounts, chains) are cached, so a run of sibling
    /// addresses costs one point addition each. Leaves are not cached.
    pub fn public_child(&self, path: &DerivationPath) -> Result<ExtendedKey> {
        let indices = path.indices();
        if usize::from(self.root.depth()) + indices.len() > usize::from(u8::MAX) {
            return Err(Error::DepthOverflow);
        }

        // Public derivation can only resume below the last hardened step.
        let floor = if path.has_hardened() {
            indices.iter().rposition(ChildIndex::is_hardened).map_or(0, |i| i + 1)
        } else {
            0
        };

        let cached = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            (floor..=indices.len())
                .rev()
                .find_map(|len| cache.get(&indices[..len]).map(|node| (len, node.clone())))
        };
        let (mut len, mut node) = match cached {
            Some(hit) => hit,
            None => {
                let base = DerivationPath::new(indices[..floor].to_vec());
                let node = self.root.derive_path(&base)?.neuter();
                if floor < indices.len() {
                    self.remember(&indices[..floor], &node);
                }
                (floor, node)
            }
        };

        while len < indices.len() {
            node = node.derive_child(indices[len])?;
            len += 1;
            if len < indices.len() {
                self.remember(&indices[..len], &node);
            }
        }
        Ok(node)
    }

    fn remember(&self, indices: &[ChildIndex], node: &ExtendedKey) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() >= CACHE_CAPACITY && !cache.contains_key(indices) {
            tracing::debug!(entries = cache.len(), "public node cache full, clearing");
            cache.clear();
        }
        tracing::trace!(depth = indices.len(), "caching public node");
        cache.insert(indices.to_vec(), node.clone());
    }

    /// Address and keys at an arbitrary path.
    pub fn address_at(&self, path: &DerivationPath, address_type: AddressType) -> Result<DerivedAddress> {
        let node = if self.root.is_private() && !path.is_public() {
            self.root.derive_path(path)?
        } else {
            self.public_child(path)?
        };

        let address = node.address(address_type)?;
        let private_key = match node.private_key() {
            Some(key) if node.network().params().wif_version.is_some() => {
                Some(key.to_wif(node.network(), true)?)
            }
            Some(key) => {
                let digits = Zeroizing::new(hex::encode(key.to_bytes().as_bytes()));
                Some(Zeroizing::new(format!("0x{}", digits.as_str())))
            }
            None => None,
        };

        Ok(DerivedAddress {
            path: path.clone(),
            address: address.to_string(),
            public_key_hex: node.public_key().to_string(),
            private_key,
            address_type,
        })
    }

    /// Path to an address in the standard account layout.
    ///
    /// From a master root this is `m/purpose'/coin'/account'/change/index`
    /// with the purpose taken from `address_type`. From a deeper root (an
    /// imported account xpub) only `change/index` is appended and `account`
    /// is ignored.
    pub fn receive_path(
        &self,
        address_type: AddressType,
        account: u32,
        change: bool,
        index: u32,
    ) -> Result<DerivationPath> {
        let change = u32::from(change);
        if self.root.depth() == 0 {
            DerivationPath::for_purpose(
                address_type.purpose(),
                self.network().coin_type(),
                account,
                change,
                index,
            )
        } else {
            DerivationPath::master().normal_child(change)?.normal_child(index)
        }
    }

    /// Address at `index` on the receive (or change) chain of `account`.
    pub fn receive_address(
        &self,
        address_type: AddressType,
        account: u32,
        change: bool,
        index: u32,
    ) -> Result<DerivedAddress> {
        let path = self.receive_path(address_type, account, change, index)?;
        self.address_at(&path, address_type)
    }

    /// `count` consecutive addresses starting at `start`.
    pub fn derive_many(
        &self,
        address_type: AddressType,
        account: u32,
        change: bool,
        start: u32,
        count: u32,
    ) -> Result<Vec<DerivedAddress>> {
        let end = start
            .checked_add(count)
            .filter(|end| *end <= ChildIndex::HARDENED_OFFSET)
            .ok_or_else(|| {
                Error::InvalidDerivationPath(format!("address range {start}+{count} out of bounds"))
            })?;
        (start..end)
            .map(|index| self.receive_address(address_type, account, change, index))
            .collect()
    }

    /// Extended public key of `account`, in the version family matching
    /// `address_type` (zpub for P2WPKH where the network has one).
    pub fn account_xpub(&self, account: u32, address_type: AddressType) -> Result<String> {
        let path = DerivationPath::account(address_type.purpose(), self.network().coin_type(), account)?;
        let node = self.root.derive_path(&path)?;
        let format = if address_type == AddressType::P2wpkh && self.network().supports_segwit() {
            KeyFormat::Segwit
        } else {
            KeyFormat::Legacy
        };
        let text = node.to_extended_string(KeyVisibility::Public, format)?;
        Ok(String::clone(&text))
    }
}
