//! CLI command definitions and handlers.

mod derive;
mod mnemonic;
pub mod networks;
mod sign;

use arbor::{AddressType, Network, Wallet};
use clap::{Args, Parser, Subcommand, ValueEnum};

pub use derive::{AddressesCommand, DeriveCommand};
pub use mnemonic::MnemonicCommand;
pub use sign::{ArmorSignCommand, ArmorVerifyCommand, SignCommand, VerifyCommand};

/// Arbor - hierarchical deterministic wallet tool.
#[derive(Parser)]
#[command(name = "arbor")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Network to operate on (btc, btctest, ltc, doge, dash, bcy, eth).
    #[arg(short, long, global = true, env = "ARBOR_NETWORK", default_value = "btc")]
    pub network: Network,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate, check and stretch BIP-39 mnemonics.
    #[command(name = "mnemonic", alias = "mn")]
    Mnemonic(MnemonicCommand),

    /// Derive the node at a path and print its keys.
    Derive(DeriveCommand),

    /// List a range of receive or change addresses.
    #[command(alias = "addrs")]
    Addresses(AddressesCommand),

    /// Sign a message with a recoverable compact signature.
    Sign(SignCommand),

    /// Verify a compact signature against an address.
    Verify(VerifyCommand),

    /// Sign a message into an armored envelope.
    ArmorSign(ArmorSignCommand),

    /// Verify an armored envelope against a public key.
    ArmorVerify(ArmorVerifyCommand),

    /// List the supported networks.
    Networks,
}

/// Where the wallet's root key comes from.
#[derive(Args)]
pub struct WalletSource {
    /// BIP39 mnemonic phrase.
    #[arg(short, long, env = "ARBOR_MNEMONIC", hide_env_values = true)]
    mnemonic: Option<String>,

    /// Extended key (xprv/xpub/zpub...) to use as the root instead.
    #[arg(short = 'x', long, conflicts_with = "mnemonic")]
    xkey: Option<String>,

    /// BIP39 passphrase (if used when creating).
    #[arg(short, long, env = "ARBOR_PASSPHRASE", hide_env_values = true, default_value = "")]
    passphrase: String,
}

impl WalletSource {
    /// Open the wallet on `network`.
    pub fn open(&self, network: Network) -> Result<Wallet, Box<dyn std::error::Error>> {
        match (&self.xkey, &self.mnemonic) {
            (Some(xkey), _) => Ok(Wallet::from_extended_str(xkey, Some(network))?),
            (None, Some(phrase)) => Ok(Wallet::from_mnemonic(phrase, &self.passphrase, network)?),
            (None, None) => Err("either --mnemonic or --xkey is required".into()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CliAddressType {
    /// Legacy P2PKH (starts with 1 on Bitcoin)
    Legacy,
    /// `SegWit` P2SH-P2WPKH (starts with 3 on Bitcoin)
    Segwit,
    /// Native `SegWit` P2WPKH (starts with bc1q on Bitcoin)
    NativeSegwit,
    /// Ethereum hex address with EIP-55 checksum
    Eip55,
}

impl From<CliAddressType> for AddressType {
    fn from(val: CliAddressType) -> Self {
        match val {
            CliAddressType::Legacy => Self::P2pkh,
            CliAddressType::Segwit => Self::P2shP2wpkh,
            CliAddressType::NativeSegwit => Self::P2wpkh,
            CliAddressType::Eip55 => Self::Eip55,
        }
    }
}

/// The requested address type, or the network's default.
pub fn resolve_address_type(requested: Option<CliAddressType>, network: Network) -> AddressType {
    requested.map_or_else(|| network.params().default_address_type(), AddressType::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_network_after_subcommand() {
        let cli = Cli::try_parse_from(["arbor", "networks", "--network", "ltc"]).unwrap();
        assert_eq!(cli.network, Network::Litecoin);
        assert!(matches!(cli.command, Commands::Networks));
    }

    #[test]
    fn test_mnemonic_conflicts_with_xkey() {
        let parsed = Cli::try_parse_from([
            "arbor", "derive", "--mnemonic", "abandon", "--xkey", "xpub", "m/0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_default_address_type() {
        assert_eq!(resolve_address_type(None, Network::Bitcoin), AddressType::P2wpkh);
        assert_eq!(resolve_address_type(None, Network::Dogecoin), AddressType::P2pkh);
        assert_eq!(resolve_address_type(None, Network::Ethereum), AddressType::Eip55);
        assert_eq!(
            resolve_address_type(Some(CliAddressType::Segwit), Network::Bitcoin),
            AddressType::P2shP2wpkh
        );
    }
}
