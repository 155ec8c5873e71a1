//! Mnemonic CLI commands.

use arbor::{generate_mnemonic, mnemonic_to_seed, Error, Mnemonic, Network, Wallet};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::{resolve_address_type, CliAddressType};

/// Mnemonic operations.
#[derive(Args)]
pub struct MnemonicCommand {
    #[command(subcommand)]
    command: MnemonicSubcommand,
}

#[derive(Subcommand)]
enum MnemonicSubcommand {
    /// Generate a new mnemonic and show the first receive address.
    New {
        /// Number of mnemonic words (12, 15, 18, 21, or 24).
        #[arg(short, long, default_value = "12")]
        words: usize,

        /// BIP39 passphrase (optional extra security).
        #[arg(short, long, default_value = "")]
        passphrase: String,

        /// Address type of the preview address.
        #[arg(short, long, value_enum)]
        address_type: Option<CliAddressType>,
    },

    /// Stretch a mnemonic and passphrase into the 64-byte BIP39 seed.
    ///
    /// The phrase is not validated; any text yields a seed.
    Seed {
        /// BIP39 mnemonic phrase.
        #[arg(short, long, env = "ARBOR_MNEMONIC", hide_env_values = true)]
        mnemonic: String,

        /// BIP39 passphrase.
        #[arg(short, long, env = "ARBOR_PASSPHRASE", hide_env_values = true, default_value = "")]
        passphrase: String,
    },

    /// Check a mnemonic's words and checksum.
    Check {
        /// BIP39 mnemonic phrase.
        #[arg(short, long, env = "ARBOR_MNEMONIC", hide_env_values = true)]
        mnemonic: String,
    },
}

impl MnemonicCommand {
    /// Execute the mnemonic command.
    pub fn execute(self, network: Network) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            MnemonicSubcommand::New {
                words,
                passphrase,
                address_type,
            } => {
                let mnemonic = generate_mnemonic(entropy_bits(words)?)?;
                let wallet = Wallet::from_mnemonic(&mnemonic.phrase(), &passphrase, network)?;
                let address_type = resolve_address_type(address_type, network);
                let preview = wallet.receive_address(address_type, 0, false, 0)?;
                print_new_mnemonic(&mnemonic, &wallet, &preview.path.to_string(), &preview.address);
            }
            MnemonicSubcommand::Seed {
                mnemonic,
                passphrase,
            } => {
                let seed = mnemonic_to_seed(&mnemonic, &passphrase);
                print_seed(&hex::encode(seed.as_bytes()), !passphrase.is_empty());
            }
            MnemonicSubcommand::Check { mnemonic } => {
                let parsed = Mnemonic::from_phrase(&mnemonic)?;
                print_check(&parsed);
            }
        }
        Ok(())
    }
}

/// Entropy size for a BIP39 word count.
fn entropy_bits(words: usize) -> Result<usize, Error> {
    match words {
        12 | 15 | 18 | 21 | 24 => Ok(words / 3 * 32),
        n => Err(Error::InvalidWordCount(n)),
    }
}

#[rustfmt::skip]
fn print_new_mnemonic(mnemonic: &Mnemonic, wallet: &Wallet, path: &str, address: &str) {
    println!();
    println!("      {}      {}", "Network".cyan().bold(), wallet.network());
    println!("      {}        {} words", "Words".cyan().bold(), mnemonic.word_count());
    println!("      {}     {}", "Mnemonic".cyan().bold(), mnemonic.phrase().as_str());
    if wallet.has_passphrase() {
        println!("      {}   {}", "Passphrase".cyan().bold(), "(set)".dimmed());
    }
    println!("      {}         {}", "Path".cyan().bold(), path.dimmed());
    println!("      {}      {}", "Address".cyan().bold(), address.green());
    println!();
}

#[rustfmt::skip]
fn print_seed(seed_hex: &str, has_passphrase: bool) {
    println!();
    if has_passphrase {
        println!("      {}   {}", "Passphrase".cyan().bold(), "(set)".dimmed());
    }
    println!("      {}         {}", "Seed".cyan().bold(), seed_hex.green());
    println!();
}

#[rustfmt::skip]
fn print_check(mnemonic: &Mnemonic) {
    println!();
    println!("      {}       {}", "Status".cyan().bold(), "valid".green());
    println!("      {}        {} words", "Words".cyan().bold(), mnemonic.word_count());
    println!("      {}      {} bits", "Entropy".cyan().bold(), mnemonic.entropy_bits());
    println!();
}
