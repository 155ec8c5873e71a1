//! Derivation CLI commands.

use arbor::{DerivationPath, DerivedAddress, ExtendedKey, KeyFormat, KeyVisibility, Network};
use clap::Args;
use colored::Colorize;

use super::{resolve_address_type, CliAddressType, WalletSource};

/// Derive a single node.
#[derive(Args)]
pub struct DeriveCommand {
    #[command(flatten)]
    source: WalletSource,

    /// Derivation path, e.g. m/84'/0'/0'/0/0 (relative to the root key).
    #[arg(default_value = "m")]
    path: String,

    /// Address type to render for the node.
    #[arg(short, long, value_enum)]
    address_type: Option<CliAddressType>,

    /// Serialize extended keys with segwit versions (zpub/zprv).
    #[arg(long)]
    segwit: bool,

    /// Also print the private key and xprv.
    #[arg(long)]
    show_private: bool,
}

impl DeriveCommand {
    /// Execute the derive command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        let wallet = self.source.open(network)?;
        let path = DerivationPath::parse(&self.path)?;
        let address_type = resolve_address_type(self.address_type, network);
        let format = if self.segwit {
            KeyFormat::Segwit
        } else {
            KeyFormat::Legacy
        };

        let node = wallet.derive_path(&path)?;
        let derived = wallet.address_at(&path, address_type)?;
        tracing::debug!(path = %path, depth = node.depth(), "derived node");
        print_node(&node, &derived, format, self.show_private)
    }
}

/// List a range of addresses.
#[derive(Args)]
pub struct AddressesCommand {
    #[command(flatten)]
    source: WalletSource,

    /// Address type to generate.
    #[arg(short, long, value_enum)]
    address_type: Option<CliAddressType>,

    /// Account number.
    #[arg(long, default_value = "0")]
    account: u32,

    /// List the change chain instead of the receive chain.
    #[arg(long)]
    change: bool,

    /// First address index.
    #[arg(short, long, default_value = "0")]
    start: u32,

    /// Number of addresses to derive.
    #[arg(short, long, default_value = "5")]
    count: u32,

    /// Also print private keys.
    #[arg(long)]
    show_private: bool,
}

impl AddressesCommand {
    /// Execute the addresses command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        let wallet = self.source.open(network)?;
        let address_type = resolve_address_type(self.address_type, network);
        let addresses = wallet.derive_many(
            address_type,
            self.account,
            self.change,
            self.start,
            self.count,
        )?;

        let account_key = if wallet.root().depth() == 0 {
            Some(wallet.account_xpub(self.account, address_type)?)
        } else {
            None
        };
        print_addresses(network, address_type.name(), account_key.as_deref(), &addresses, self.show_private);
        Ok(())
    }
}

#[rustfmt::skip]
fn print_node(
    node: &ExtendedKey,
    derived: &DerivedAddress,
    format: KeyFormat,
    show_private: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let public = node.to_extended_string(KeyVisibility::Public, format)?;

    println!();
    println!("      {}      {}", "Network".cyan().bold(), node.network());
    println!("      {}         {}", "Path".cyan().bold(), derived.path.to_string().dimmed());
    println!("      {}        {}", "Depth".cyan().bold(), node.depth());
    println!("      {}  {}", "Fingerprint".cyan().bold(), hex::encode(node.fingerprint()));
    println!("      {}      {}", "Address".cyan().bold(), derived.address.green());
    println!("      {}   {}", "Public Key".cyan().bold(), derived.public_key_hex.dimmed());
    println!("      {}  {}", "Extended Pub".cyan().bold(), public.as_str());
    if show_private {
        if let Some(key) = &derived.private_key {
            println!("      {}  {}", "Private Key".cyan().bold(), key.as_str());
        }
        if node.is_private() {
            let private = node.to_extended_string(KeyVisibility::Private, format)?;
            println!("      {} {}", "Extended Priv".cyan().bold(), private.as_str());
        }
    }
    println!();
    Ok(())
}

#[rustfmt::skip]
fn print_addresses(
    network: Network,
    type_name: &str,
    account_key: Option<&str>,
    addresses: &[DerivedAddress],
    show_private: bool,
) {
    println!();
    println!("      {}      {}", "Network".cyan().bold(), network);
    println!("      {} {}", "Address Type".cyan().bold(), type_name);
    if let Some(key) = account_key {
        println!("      {}  {}", "Account Key".cyan().bold(), key.dimmed());
    }
    println!();

    for addr in addresses {
        println!("      {}         {}", "Path".cyan().bold(), addr.path.to_string().dimmed());
        println!("      {}      {}", "Address".cyan().bold(), addr.address.green());
        if show_private {
            if let Some(key) = &addr.private_key {
                println!("      {}  {}", "Private Key".cyan().bold(), key.as_str());
            }
        }
        println!();
    }
}
