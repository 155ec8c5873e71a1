//! Message signing CLI commands.

use std::io::Read;

use arbor::signing::{armor, compact};
use arbor::{Address, AddressType, DerivationPath, Network, PrivateKey, PublicKey, Wallet};
use clap::Args;
use colored::Colorize;

use super::{resolve_address_type, CliAddressType, WalletSource};

/// Read the message from the argument, or from stdin when absent.
fn read_message(message: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match message {
        Some(message) => Ok(message),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Signing key at `path`, or at the first receive address when no path is given.
fn signing_node(
    wallet: &Wallet,
    path: Option<&str>,
    address_type: AddressType,
) -> Result<(DerivationPath, PrivateKey), Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => DerivationPath::parse(path)?,
        None => wallet.receive_path(address_type, 0, false, 0)?,
    };
    let node = wallet.derive_path(&path)?;
    let key = node
        .private_key()
        .cloned()
        .ok_or("watch-only wallets cannot sign")?;
    Ok((path, key))
}

/// Sign a message with a recoverable compact signature.
#[derive(Args)]
pub struct SignCommand {
    #[command(flatten)]
    source: WalletSource,

    /// Message to sign (read from stdin if omitted).
    message: Option<String>,

    /// Path of the signing key (defaults to the first receive address).
    #[arg(long)]
    path: Option<String>,

    /// Address type the signature is made for.
    #[arg(short, long, value_enum)]
    address_type: Option<CliAddressType>,

    /// Advertise the uncompressed public key (legacy P2PKH only).
    #[arg(long)]
    uncompressed: bool,
}

impl SignCommand {
    /// Execute the sign command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        let wallet = self.source.open(network)?;
        let address_type = resolve_address_type(self.address_type, network);
        if self.uncompressed && address_type != AddressType::P2pkh {
            return Err("--uncompressed only applies to legacy addresses".into());
        }

        let (path, key) = signing_node(&wallet, self.path.as_deref(), address_type)?;
        let public_key = key.public_key();
        let address = if self.uncompressed {
            Address::from_hash(public_key.hash160(false), network, AddressType::P2pkh)?
        } else {
            Address::from_public_key(&public_key, network, address_type)?
        };

        let message = read_message(self.message)?;
        let signature = compact::sign(&key, message.as_bytes(), network, !self.uncompressed)?;
        print_signature(&path, address.as_str(), &signature);
        Ok(())
    }
}

/// Verify a compact signature.
#[derive(Args)]
pub struct VerifyCommand {
    /// Message that was signed (read from stdin if omitted).
    message: Option<String>,

    /// Base64 compact signature.
    #[arg(short, long)]
    signature: String,

    /// Address the signature claims to come from.
    #[arg(short, long)]
    address: String,
}

impl VerifyCommand {
    /// Execute the verify command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        let message = read_message(self.message)?;
        compact::verify(message.as_bytes(), &self.signature, &self.address, network)?;
        print_valid(&self.address);
        Ok(())
    }
}

/// Produce an armored signature.
#[derive(Args)]
pub struct ArmorSignCommand {
    #[command(flatten)]
    source: WalletSource,

    /// Sign with this WIF private key instead of a wallet.
    #[arg(short, long, env = "ARBOR_WIF", hide_env_values = true, conflicts_with_all = ["mnemonic", "xkey"])]
    key: Option<String>,

    /// Message to sign (read from stdin if omitted).
    message: Option<String>,

    /// Path of the signing key (defaults to the first receive address).
    #[arg(long)]
    path: Option<String>,

    /// Print only the signature block.
    #[arg(short, long)]
    detached: bool,
}

impl ArmorSignCommand {
    /// Execute the armor-sign command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        let key = match &self.key {
            Some(wif) => PrivateKey::from_wif(wif)?.0,
            None => {
                let wallet = self.source.open(network)?;
                let address_type = network.params().default_address_type();
                signing_node(&wallet, self.path.as_deref(), address_type)?.1
            }
        };

        let message = read_message(self.message)?;
        let armored = if self.detached {
            armor::sign_detached(&key, &message)?
        } else {
            armor::sign(&key, &message)?
        };

        eprintln!("{} {}", "Public Key".cyan().bold(), hex::encode(key.public_key().to_compressed()));
        print!("{armored}");
        Ok(())
    }
}

/// Verify an armored signature.
#[derive(Args)]
pub struct ArmorVerifyCommand {
    /// File holding the envelope or signature block (stdin if omitted).
    file: Option<String>,

    /// Signer's public key in hex (compressed or uncompressed).
    #[arg(short = 'k', long)]
    public_key: String,

    /// Message for a detached signature block.
    #[arg(short, long)]
    message: Option<String>,
}

impl ArmorVerifyCommand {
    /// Execute the armor-verify command.
    pub fn execute(self) -> Result<(), Box<dyn std::error::Error>> {
        let public_key = PublicKey::from_sec1_bytes(&hex::decode(self.public_key.trim())?)?;
        let armored = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => read_message(None)?,
        };

        let message = match self.message {
            Some(message) => {
                armor::verify_detached(&message, &armored, &public_key)?;
                message
            }
            None => armor::verify(&armored, &public_key)?,
        };
        print_armor_valid(&message);
        Ok(())
    }
}

#[rustfmt::skip]
fn print_signature(path: &DerivationPath, address: &str, signature: &str) {
    println!();
    println!("      {}         {}", "Path".cyan().bold(), path.to_string().dimmed());
    println!("      {}      {}", "Address".cyan().bold(), address);
    println!("      {}    {}", "Signature".cyan().bold(), signature.green());
    println!();
}

#[rustfmt::skip]
fn print_valid(address: &str) {
    println!();
    println!("      {}       {}", "Status".cyan().bold(), "valid".green());
    println!("      {}      {}", "Address".cyan().bold(), address);
    println!();
}

#[rustfmt::skip]
fn print_armor_valid(message: &str) {
    println!();
    println!("      {}       {}", "Status".cyan().bold(), "valid".green());
    println!("      {}      {}", "Message".cyan().bold(), message.dimmed());
    println!();
}
