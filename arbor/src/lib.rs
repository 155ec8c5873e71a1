//! # Arbor - Hierarchical Deterministic Wallet Engine
//!
//! Derives an unbounded tree of secp256k1 key pairs from a single seed and
//! renders them into the key and address encodings of several networks.
//!
//! ## Features
//!
//! - **BIP-39**: mnemonic generation, validation and seed stretching
//! - **BIP-32**: private and public child derivation, xprv/xpub (and zprv/zpub)
//! - **Addresses**: P2PKH, P2SH-P2WPKH, P2WPKH and EIP-55 hex
//! - **Message signing**: recoverable compact signatures, armored detached signatures and DER
//! - **Brainwallets**: keys and wallets recovered from a memorized password
//! - **Secure by design**: secrets are zeroized on drop and compared in constant time
//!
//! ## Usage
//!
//! ```
//! use arbor::{AddressType, Network, Wallet};
//!
//! let phrase = "abandon abandon abandon abandon abandon abandon \
//!               abandon abandon abandon abandon abandon about";
//! let wallet = Wallet::from_mnemonic(phrase, "", Network::Bitcoin).unwrap();
//! let addr = wallet.receive_address(AddressType::P2wpkh, 0, false, 0).unwrap();
//! assert_eq!(addr.address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown,
    clippy::missing_const_for_fn,
    clippy::use_self,
    clippy::uninlined_format_args,
    clippy::return_self_not_must_use,
    clippy::cast_possible_truncation,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::many_single_char_names,
    clippy::redundant_closure_for_method_calls,
    clippy::option_if_let_else,
    clippy::needless_pass_by_value,
    clippy::items_after_statements,
    clippy::unreadable_literal,
    clippy::missing_fields_in_debug
)]
#![forbid(unsafe_code)]

pub mod address;
pub mod bip32;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod network;
pub mod path;
pub mod secret;
pub mod signing;
pub mod wallet;

pub use address::{Address, AddressType};
pub use bip32::{ExtendedKey, KeyFormat, KeyVisibility};
pub use error::{Error, Result};
pub use keys::{PrivateKey, PublicKey};
#[cfg(feature = "rand")]
pub use mnemonic::generate_mnemonic;
pub use mnemonic::{mnemonic_to_seed, validate_mnemonic, Mnemonic};
pub use network::{Network, NetworkParams};
pub use path::{ChildIndex, DerivationPath};
pub use secret::{Secret32, Secret64, SecretBytes};
pub use wallet::{DerivedAddress, Wallet};

// Re-export rand_core so callers can pass their own CSPRNG with matching trait versions
pub use rand_core;
