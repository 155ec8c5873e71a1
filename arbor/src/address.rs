//! Address rendering and parsing.
//!
//! Every address type here commits to a 20-byte hash, so an [`Address`] is
//! that hash plus the network and type needed to render it.

use core::fmt;
use core::str::FromStr;

use crate::encoding::{base58check_decode, base58check_encode, bech32_decode, bech32_encode, eip55_checksum};
use crate::error::{Error, Result};
use crate::hash::{hash160, keccak256};
use crate::keys::PublicKey;
use crate::network::Network;

/// Address script type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType {
    /// Pay to Public Key Hash (Legacy) - starts with 1 or m/n on Bitcoin
    P2pkh,
    /// Pay to Script Hash wrapping P2WPKH - starts with 3 or 2 on Bitcoin
    P2shP2wpkh,
    /// Pay to Witness Public Key Hash (Native SegWit) - bc1q / tb1q
    #[default]
    P2wpkh,
    /// Ethereum account with EIP-55 checksum casing
    Eip55,
}

impl AddressType {
    /// All address types.
    pub const ALL: [AddressType; 4] = [Self::P2pkh, Self::P2shP2wpkh, Self::P2wpkh, Self::Eip55];

    /// BIP purpose level used for this type's account paths.
    #[inline]
    pub const fn purpose(self) -> u32 {
        match self {
            Self::P2pkh | Self::Eip55 => 44,
            Self::P2shP2wpkh => 49,
            Self::P2wpkh => 84,
        }
    }

    /// Short identifier, as accepted by [`FromStr`].
    #[inline]
    pub const fn id(self) -> &'static str {
        match self {
            Self::P2pkh => "p2pkh",
            Self::P2shP2wpkh => "p2sh-p2wpkh",
            Self::P2wpkh => "p2wpkh",
            Self::Eip55 => "eip55",
        }
    }

    /// Descriptive name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P2pkh => "P2PKH (Legacy)",
            Self::P2shP2wpkh => "P2SH-P2WPKH (SegWit)",
            Self::P2wpkh => "P2WPKH (Native SegWit)",
            Self::Eip55 => "EIP-55 (Ethereum)",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AddressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "p2pkh" | "legacy" => Ok(Self::P2pkh),
            "p2sh" | "p2sh-p2wpkh" | "segwit" | "nested-segwit" => Ok(Self::P2shP2wpkh),
            "p2wpkh" | "native-segwit" | "bech32" => Ok(Self::P2wpkh),
            "eip55" | "eth" | "ethereum" => Ok(Self::Eip55),
            _ => Err(Error::UnknownAddressType(s.to_owned())),
        }
    }
}

/// A rendered address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    address_type: AddressType,
    hash: [u8; 20],
    text: String,
}

impl Address {
    /// Derive the address of `public_key` (compressed form).
    pub fn from_public_key(
        public_key: &PublicKey,
        network: Network,
        address_type: AddressType,
    ) -> Result<Self> {
        let hash = match address_type {
            AddressType::P2pkh | AddressType::P2wpkh => public_key.hash160(true),
            AddressType::P2shP2wpkh => {
                // redeem script: OP_0 PUSH20 <hash160(pubkey)>
                let mut redeem = [0u8; 22];
                redeem[0] = 0x00;
                redeem[1] = 0x14;
                redeem[2..].copy_from_slice(&public_key.hash160(true));
                hash160(&redeem)
            }
            AddressType::Eip55 => {
                let uncompressed = public_key.to_uncompressed();
                let digest = keccak256(&uncompressed[1..]);
                let mut account = [0u8; 20];
                account.copy_from_slice(&digest[12..]);
                account
            }
        };
        Self::from_hash(hash, network, address_type)
    }

    /// Render a raw 20-byte commitment.
    ///
    /// `hash` is the public-key hash for P2PKH and P2WPKH, the script hash
    /// for P2SH-P2WPKH and the account bytes for EIP-55.
    pub fn from_hash(hash: [u8; 20], network: Network, address_type: AddressType) -> Result<Self> {
        let params = network.params();
        let unsupported = Error::UnsupportedScriptType {
            script: address_type.id(),
            network: params.name,
        };
        if !params.supports(address_type) {
            return Err(unsupported);
        }

        let text = match address_type {
            AddressType::P2pkh => {
                let version = params.p2pkh_version.ok_or(unsupported)?;
                base58check_encode(&[version], &hash)
            }
            AddressType::P2shP2wpkh => {
                let version = params.p2sh_version.ok_or(unsupported)?;
                base58check_encode(&[version], &hash)
            }
            AddressType::P2wpkh => {
                let hrp = params.bech32_hrp.ok_or(unsupported)?;
                bech32_encode(hrp, 0, &hash)?
            }
            AddressType::Eip55 => eip55_checksum(&hash),
        };

        Ok(Self {
            network,
            address_type,
            hash,
            text,
        })
    }

    /// Parse an address of any type `network` supports.
    ///
    /// The result is re-rendered canonically, so uppercase bech32 comes back
    /// lowercase and EIP-55 addresses come back checksummed. Mixed-case hex
    /// is only accepted with correct checksum casing. Any Base58 address
    /// with the P2SH version is reported as P2SH-P2WPKH, the only P2SH type
    /// this crate renders.
    pub fn parse(s: &str, network: Network) -> Result<Self> {
        let s = s.trim();
        let params = network.params();

        if params.supports(AddressType::Eip55) {
            return Self::parse_hex(s, network);
        }

        if let Some(hrp) = params.bech32_hrp {
            let lower = s.to_ascii_lowercase();
            if lower.starts_with(hrp) && lower.as_bytes().get(hrp.len()) == Some(&b'1') {
                let (found_hrp, version, program) = bech32_decode(s)?;
                if found_hrp != hrp || version != 0 || program.len() != 20 {
                    return Err(Error::InvalidAddress(s.to_owned()));
                }
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&program);
                return Self::from_hash(hash, network, AddressType::P2wpkh);
            }
        }

        let data = base58check_decode(s)?;
        if data.len() != 21 {
            return Err(Error::InvalidAddress(s.to_owned()));
        }
        let address_type = if params.p2pkh_version == Some(data[0]) {
            AddressType::P2pkh
        } else if params.p2sh_version == Some(data[0]) {
            AddressType::P2shP2wpkh
        } else {
            return Err(Error::InvalidAddress(s.to_owned()));
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);
        Self::from_hash(hash, network, address_type)
    }

    fn parse_hex(s: &str, network: Network) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(Error::InvalidLength {
                expected: 40,
                actual: digits.len(),
            });
        }
        let bytes = hex::decode(digits).map_err(|_| Error::InvalidCharacter)?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes);

        let address = Self::from_hash(hash, network, AddressType::Eip55)?;
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        if has_upper && has_lower && address.text[2..] != *digits {
            return Err(Error::InvalidChecksum);
        }
        Ok(address)
    }

    /// Network the address belongs to.
    #[inline]
    pub fn network(&self) -> Network {
        self.network
    }

    /// Address type.
    #[inline]
    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// The 20-byte commitment.
    #[inline]
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// Rendered text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip32::ExtendedKey;
    use crate::keys::PrivateKey;
    use crate::mnemonic::mnemonic_to_seed;
    use hex_literal::hex;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    fn key_at(path: &str, network: Network) -> PublicKey {
        let seed = mnemonic_to_seed(ABANDON, "");
        let root = ExtendedKey::master(seed.as_bytes(), network).unwrap();
        *root.derive(path).unwrap().public_key()
    }

    mod rendering {
        use super::*;

        #[test]
        fn test_bitcoin_reference_addresses() {
            let cases = [
                ("m/44'/0'/0'/0/0", AddressType::P2pkh, "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA"),
                ("m/44'/0'/0'/0/1", AddressType::P2pkh, "1Ak8PffB2meyfYnbXZR9EGfLfFZVpzJvQP"),
                ("m/49'/0'/0'/0/0", AddressType::P2shP2wpkh, "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf"),
                ("m/84'/0'/0'/0/0", AddressType::P2wpkh, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"),
            ];
            for (path, ty, expected) in cases {
                let pk = key_at(path, Network::Bitcoin);
                let addr = Address::from_public_key(&pk, Network::Bitcoin, ty).unwrap();
                assert_eq!(addr.as_str(), expected, "{path}");
                assert_eq!(addr.address_type(), ty);
            }
        }

        #[test]
        fn test_other_networks() {
            let cases = [
                (Network::BitcoinTestnet, "m/44'/1'/0'/0/0", AddressType::P2pkh, "mkpZhYtJu2r87Js3pDiWJDmPte2NRZ8bJV"),
                (Network::BitcoinTestnet, "m/84'/1'/0'/0/0", AddressType::P2wpkh, "tb1q6rz28mcfaxtmd6v789l9rrlrusdprr9pqcpvkl"),
                (Network::Litecoin, "m/44'/2'/0'/0/0", AddressType::P2pkh, "LUWPbpM43E2p7ZSh8cyTBEkvpHmr3cB8Ez"),
                (Network::Litecoin, "m/84'/2'/0'/0/0", AddressType::P2wpkh, "ltc1qjmxnz78nmc8nq77wuxh25n2es7rzm5c2rkk4wh"),
                (Network::Dogecoin, "m/44'/3'/0'/0/0", AddressType::P2pkh, "DBus3bamQjgJULBJtYXpEzDWQRwF5iwxgC"),
            ];
            for (network, path, ty, expected) in cases {
                let pk = key_at(path, network);
                let addr = Address::from_public_key(&pk, network, ty).unwrap();
                assert_eq!(addr.as_str(), expected, "{network} {path}");
            }
        }

        #[test]
        fn test_ethereum_address() {
            let pk = key_at("m/44'/60'/0'/0/0", Network::Ethereum);
            let addr = Address::from_public_key(&pk, Network::Ethereum, AddressType::Eip55).unwrap();
            assert_eq!(addr.as_str(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        }

        #[test]
        fn test_uncompressed_p2pkh() {
            let key = PrivateKey::from_bytes(&hex!(
                "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d"
            ))
            .unwrap();
            let hash = key.public_key().hash160(false);
            let addr = Address::from_hash(hash, Network::Bitcoin, AddressType::P2pkh).unwrap();
            assert_eq!(addr.as_str(), "1GAehh7TsJAHuUAeKZcXf5CnwuGuGgyX2S");
        }

        #[test]
        fn test_unsupported_type() {
            let pk = key_at("m/44'/3'/0'/0/0", Network::Dogecoin);
            assert_eq!(
                Address::from_public_key(&pk, Network::Dogecoin, AddressType::P2wpkh).unwrap_err(),
                Error::UnsupportedScriptType {
                    script: "p2wpkh",
                    network: "Dogecoin"
                }
            );
            assert!(matches!(
                Address::from_public_key(&pk, Network::Bitcoin, AddressType::Eip55),
                Err(Error::UnsupportedScriptType { .. })
            ));
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn test_parse_each_type() {
            let cases = [
                ("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA", AddressType::P2pkh),
                ("37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf", AddressType::P2shP2wpkh),
                ("bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu", AddressType::P2wpkh),
            ];
            for (text, ty) in cases {
                let addr = Address::parse(text, Network::Bitcoin).unwrap();
                assert_eq!(addr.address_type(), ty);
                assert_eq!(addr.to_string(), text);
            }
        }

        #[test]
        fn test_parse_uppercase_bech32() {
            let addr = Address::parse("BC1QCR8TE4KR609GCAWUTMRZA0J4XV80JY8Z306FYU", Network::Bitcoin).unwrap();
            assert_eq!(addr.as_str(), "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
        }

        #[test]
        fn test_parse_wrong_network() {
            assert!(matches!(
                Address::parse("mkpZhYtJu2r87Js3pDiWJDmPte2NRZ8bJV", Network::Bitcoin),
                Err(Error::InvalidAddress(_))
            ));
            assert!(Address::parse("tb1q6rz28mcfaxtmd6v789l9rrlrusdprr9pqcpvkl", Network::Bitcoin).is_err());
        }

        #[test]
        fn test_parse_taproot_rejected() {
            let v1 = bech32_encode("bc", 1, &[0x42; 32]).unwrap();
            assert_eq!(
                Address::parse(&v1, Network::Bitcoin).unwrap_err(),
                Error::InvalidAddress(v1.clone())
            );
        }

        #[test]
        fn test_parse_corrupted() {
            assert_eq!(
                Address::parse("1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabB", Network::Bitcoin).unwrap_err(),
                Error::ChecksumMismatch
            );
        }

        #[test]
        fn test_parse_ethereum_casing() {
            let lower = Address::parse("0x9858effd232b4033e47d90003d41ec34ecaeda94", Network::Ethereum).unwrap();
            assert_eq!(lower.as_str(), "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
            assert_eq!(
                Address::parse("0x9858EFFD232B4033E47d90003D41EC34EcaEda94", Network::Ethereum).unwrap_err(),
                Error::InvalidChecksum
            );
        }
    }

    #[test]
    fn test_address_type_from_str() {
        assert_eq!("legacy".parse::<AddressType>().unwrap(), AddressType::P2pkh);
        assert_eq!("P2SH".parse::<AddressType>().unwrap(), AddressType::P2shP2wpkh);
        assert_eq!("bech32".parse::<AddressType>().unwrap(), AddressType::P2wpkh);
        assert!(matches!(
            "p2tr".parse::<AddressType>(),
            Err(Error::UnknownAddressType(_))
        ));
        for ty in AddressType::ALL {
            assert_eq!(ty.id().parse::<AddressType>().unwrap(), ty);
        }
    }
}
