//! Network parameter registry.
//!
//! One immutable [`NetworkParams`] record per supported network, stored in a
//! `static` table and looked up through the closed [`Network`] enum. Adding a
//! network means adding a variant and a table row; nothing branches on names.

use core::fmt;
use core::str::FromStr;

use crate::address::AddressType;
use crate::error::{Error, Result};

/// Elliptic curve a network's keys live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// secp256k1, used by every network in the registry.
    Secp256k1,
}

/// Supported networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Bitcoin mainnet.
    #[default]
    Bitcoin,
    /// Bitcoin testnet.
    BitcoinTestnet,
    /// Litecoin mainnet.
    Litecoin,
    /// Dogecoin mainnet.
    Dogecoin,
    /// Dash mainnet.
    Dash,
    /// BlockCypher test chain.
    BlockCypherTestnet,
    /// Ethereum mainnet.
    Ethereum,
}

/// Constant parameters of one network.
#[derive(Debug, PartialEq, Eq)]
pub struct NetworkParams {
    /// Network this record describes.
    pub network: Network,
    /// Human-readable name.
    pub name: &'static str,
    /// Short identifier used on the command line and in [`Network::from_str`].
    pub id: &'static str,
    /// Ticker symbol.
    pub ticker: &'static str,
    /// Curve the keys live on.
    pub curve: Curve,
    /// SLIP-44 coin type used in BIP-44 style paths.
    pub coin_type: u32,
    /// P2PKH address version byte.
    pub p2pkh_version: Option<u8>,
    /// P2SH address version byte.
    pub p2sh_version: Option<u8>,
    /// WIF private key version byte.
    pub wif_version: Option<u8>,
    /// Extended private key version (xprv family).
    pub ext_private: u32,
    /// Extended public key version (xpub family).
    pub ext_public: u32,
    /// Native segwit extended private key version (zprv family).
    pub ext_segwit_private: Option<u32>,
    /// Native segwit extended public key version (zpub family).
    pub ext_segwit_public: Option<u32>,
    /// Bech32 human-readable part for native segwit addresses.
    pub bech32_hrp: Option<&'static str>,
    /// Address types this network supports; the first is the default.
    pub address_types: &'static [AddressType],
    /// Default account path for legacy derivation.
    pub bip32_path: &'static str,
    /// Default account path for native segwit derivation.
    pub segwit_path: Option<&'static str>,
    /// Signed-message prefix, including its own length byte.
    pub message_magic: Option<&'static str>,
}

const BITCOIN_MAGIC: &str = "\x18Bitcoin Signed Message:\n";

static REGISTRY: [NetworkParams; 7] = [
    NetworkParams {
        network: Network::Bitcoin,
        name: "Bitcoin",
        id: "btc",
        ticker: "BTC",
        curve: Curve::Secp256k1,
        coin_type: 0,
        p2pkh_version: Some(0x00),
        p2sh_version: Some(0x05),
        wif_version: Some(0x80),
        ext_private: 0x0488ADE4,
        ext_public: 0x0488B21E,
        ext_segwit_private: Some(0x04B2430C),
        ext_segwit_public: Some(0x04B24746),
        bech32_hrp: Some("bc"),
        address_types: &[AddressType::P2wpkh, AddressType::P2shP2wpkh, AddressType::P2pkh],
        bip32_path: "m/44'/0'/0'",
        segwit_path: Some("m/84'/0'/0'"),
        message_magic: Some(BITCOIN_MAGIC),
    },
    NetworkParams {
        network: Network::BitcoinTestnet,
        name: "Bitcoin Testnet",
        id: "btctest",
        ticker: "tBTC",
        curve: Curve::Secp256k1,
        coin_type: 1,
        p2pkh_version: Some(0x6F),
        p2sh_version: Some(0xC4),
        wif_version: Some(0xEF),
        ext_private: 0x04358394,
        ext_public: 0x043587CF,
        ext_segwit_private: Some(0x045F18BC),
        ext_segwit_public: Some(0x045F1CF6),
        bech32_hrp: Some("tb"),
        address_types: &[AddressType::P2wpkh, AddressType::P2shP2wpkh, AddressType::P2pkh],
        bip32_path: "m/44'/1'/0'",
        segwit_path: Some("m/84'/1'/0'"),
        message_magic: Some(BITCOIN_MAGIC),
    },
    NetworkParams {
        network: Network::Litecoin,
        name: "Litecoin",
        id: "ltc",
        ticker: "LTC",
        curve: Curve::Secp256k1,
        coin_type: 2,
        p2pkh_version: Some(0x30),
        p2sh_version: Some(0x32),
        wif_version: Some(0xB0),
        ext_private: 0x019D9CFE,
        ext_public: 0x019DA462,
        ext_segwit_private: Some(0x04B2430C),
        ext_segwit_public: Some(0x04B24746),
        bech32_hrp: Some("ltc"),
        address_types: &[AddressType::P2wpkh, AddressType::P2shP2wpkh, AddressType::P2pkh],
        bip32_path: "m/44'/2'/0'",
        segwit_path: Some("m/84'/2'/0'"),
        message_magic: Some("\x19Litecoin Signed Message:\n"),
    },
    NetworkParams {
        network: Network::Dogecoin,
        name: "Dogecoin",
        id: "doge",
        ticker: "DOGE",
        curve: Curve::Secp256k1,
        coin_type: 3,
        p2pkh_version: Some(0x1E),
        p2sh_version: Some(0x16),
        wif_version: Some(0x9E),
        ext_private: 0x02FAC398,
        ext_public: 0x02FACAFD,
        ext_segwit_private: None,
        ext_segwit_public: None,
        bech32_hrp: None,
        address_types: &[AddressType::P2pkh],
        bip32_path: "m/44'/3'/0'",
        segwit_path: None,
        message_magic: Some("\x19Dogecoin Signed Message:\n"),
    },
    NetworkParams {
        network: Network::Dash,
        name: "Dash",
        id: "dash",
        ticker: "DASH",
        curve: Curve::Secp256k1,
        coin_type: 5,
        p2pkh_version: Some(0x4C),
        p2sh_version: Some(0x10),
        wif_version: Some(0xCC),
        ext_private: 0x02FE52F8,
        ext_public: 0x02FE52CC,
        ext_segwit_private: None,
        ext_segwit_public: None,
        bech32_hrp: None,
        address_types: &[AddressType::P2pkh],
        bip32_path: "m/44'/5'/0'",
        segwit_path: None,
        message_magic: Some("\x19DarkCoin Signed Message:\n"),
    },
    NetworkParams {
        network: Network::BlockCypherTestnet,
        name: "BlockCypher Testnet",
        id: "bcy",
        ticker: "BCY",
        curve: Curve::Secp256k1,
        coin_type: 1,
        p2pkh_version: Some(0x1B),
        p2sh_version: Some(0x1F),
        wif_version: Some(0x49),
        ext_private: 0x02D40FC3,
        ext_public: 0x02D413FF,
        ext_segwit_private: None,
        ext_segwit_public: None,
        bech32_hrp: None,
        address_types: &[AddressType::P2pkh],
        bip32_path: "m/44'/1'/0'",
        segwit_path: None,
        message_magic: Some(BITCOIN_MAGIC),
    },
    NetworkParams {
        network: Network::Ethereum,
        name: "Ethereum",
        id: "eth",
        ticker: "ETH",
        curve: Curve::Secp256k1,
        coin_type: 60,
        p2pkh_version: None,
        p2sh_version: None,
        wif_version: None,
        ext_private: 0x0488ADE4,
        ext_public: 0x0488B21E,
        ext_segwit_private: None,
        ext_segwit_public: None,
        bech32_hrp: None,
        address_types: &[AddressType::Eip55],
        bip32_path: "m/44'/60'/0'",
        segwit_path: None,
        message_magic: None,
    },
];

impl Network {
    /// Every registered network, in registry order.
    pub const ALL: [Network; 7] = [
        Self::Bitcoin,
        Self::BitcoinTestnet,
        Self::Litecoin,
        Self::Dogecoin,
        Self::Dash,
        Self::BlockCypherTestnet,
        Self::Ethereum,
    ];

    /// Look up this network's parameters.
    #[inline]
    pub fn params(self) -> &'static NetworkParams {
        &REGISTRY[self as usize]
    }

    /// Human-readable name.
    #[inline]
    pub fn name(self) -> &'static str {
        self.params().name
    }

    /// SLIP-44 coin type.
    #[inline]
    pub fn coin_type(self) -> u32 {
        self.params().coin_type
    }

    /// Whether native segwit addresses and zpub/zprv keys are available.
    #[inline]
    pub fn supports_segwit(self) -> bool {
        self.params().bech32_hrp.is_some()
    }

    /// Find the network and visibility an extended-key version belongs to.
    ///
    /// Several networks share version bytes (Ethereum reuses xpub/xprv,
    /// Litecoin reuses zpub/zprv); the earliest registry entry wins, so
    /// shared versions resolve to Bitcoin. Pass an explicit network to
    /// [`ExtendedKey::from_extended_str`](crate::ExtendedKey::from_extended_str)
    /// to decode them for another network.
    pub fn from_ext_version(version: u32) -> Result<(Self, bool)> {
        REGISTRY
            .iter()
            .find_map(|p| p.classify_ext_version(version).map(|private| (p.network, private)))
            .ok_or(Error::UnknownVersion(version))
    }

    /// Find the network a WIF version byte belongs to. First match wins.
    pub fn from_wif_version(version: u8) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|p| p.wif_version == Some(version))
            .map(|p| p.network)
            .ok_or(Error::UnknownVersion(u32::from(version)))
    }
}

impl NetworkParams {
    /// `Some(true)` for a private version, `Some(false)` for a public one,
    /// `None` if the version is not this network's.
    pub fn classify_ext_version(&self, version: u32) -> Option<bool> {
        if version == self.ext_private || self.ext_segwit_private == Some(version) {
            Some(true)
        } else if version == self.ext_public || self.ext_segwit_public == Some(version) {
            Some(false)
        } else {
            None
        }
    }

    /// Whether `address_type` is supported.
    #[inline]
    pub fn supports(&self, address_type: AddressType) -> bool {
        self.address_types.contains(&address_type)
    }

    /// The network's default address type.
    #[inline]
    pub fn default_address_type(&self) -> AddressType {
        self.address_types[0]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        let alias = match needle.as_str() {
            "bitcoin" | "mainnet" => "btc",
            "testnet" | "tbtc" => "btctest",
            "litecoin" => "ltc",
            "dogecoin" => "doge",
            "blockcypher" => "bcy",
            "ethereum" => "eth",
            other => other,
        };
        REGISTRY
            .iter()
            .find(|p| p.id == alias)
            .map(|p| p.network)
            .ok_or_else(|| Error::UnknownNetwork(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_rows_match_variants() {
        for network in Network::ALL {
            assert_eq!(network.params().network, network);
        }
    }

    #[test]
    fn test_every_network_has_an_address_type() {
        for network in Network::ALL {
            let params = network.params();
            assert!(!params.address_types.is_empty(), "{network}");
            assert_eq!(params.curve, Curve::Secp256k1);
        }
    }

    #[test]
    fn test_segwit_support_is_consistent() {
        for network in Network::ALL {
            let p = network.params();
            let segwit_types = p.supports(AddressType::P2wpkh);
            assert_eq!(segwit_types, p.bech32_hrp.is_some(), "{network}");
            assert_eq!(segwit_types, p.ext_segwit_public.is_some(), "{network}");
            assert_eq!(segwit_types, p.segwit_path.is_some(), "{network}");
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("btc".parse::<Network>().unwrap(), Network::Bitcoin);
        assert_eq!("BTCTEST".parse::<Network>().unwrap(), Network::BitcoinTestnet);
        assert_eq!("litecoin".parse::<Network>().unwrap(), Network::Litecoin);
        assert_eq!("eth".parse::<Network>().unwrap(), Network::Ethereum);
        assert_eq!(
            "solana".parse::<Network>(),
            Err(Error::UnknownNetwork("solana".into()))
        );
    }

    #[test]
    fn test_from_ext_version_prefers_first_entry() {
        assert_eq!(
            Network::from_ext_version(0x0488B21E).unwrap(),
            (Network::Bitcoin, false)
        );
        assert_eq!(
            Network::from_ext_version(0x04B2430C).unwrap(),
            (Network::Bitcoin, true)
        );
        assert_eq!(
            Network::from_ext_version(0x019DA462).unwrap(),
            (Network::Litecoin, false)
        );
        assert_eq!(
            Network::from_ext_version(0xdeadbeef),
            Err(Error::UnknownVersion(0xdeadbeef))
        );
    }

    #[test]
    fn test_from_wif_version() {
        assert_eq!(Network::from_wif_version(0x80).unwrap(), Network::Bitcoin);
        assert_eq!(Network::from_wif_version(0xEF).unwrap(), Network::BitcoinTestnet);
        assert!(Network::from_wif_version(0x01).is_err());
    }

    #[test]
    fn test_magic_length_prefix() {
        for network in Network::ALL {
            if let Some(magic) = network.params().message_magic {
                let bytes = magic.as_bytes();
                assert_eq!(bytes[0] as usize, bytes.len() - 1, "{network}");
            }
        }
    }
}
