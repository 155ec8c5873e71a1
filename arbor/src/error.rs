//! Error types for wallet engine operations.

use thiserror::Error;

/// Errors that can occur anywhere in the wallet engine.
///
/// Every operation reports failure through this one enum so callers can
/// branch on a single taxonomy. [`Error::InvalidChildKey`] is the only
/// variant with a recovery policy: skip to the next index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    // Mnemonic / seed
    /// Entropy size is not one of 128, 160, 192, 224 or 256 bits.
    #[error("invalid entropy length {0} bits, must be 128, 160, 192, 224 or 256")]
    InvalidEntropyLength(usize),
    /// Mnemonic word count is not one of 12, 15, 18, 21 or 24.
    #[error("invalid word count {0}, must be 12, 15, 18, 21, or 24")]
    InvalidWordCount(usize),
    /// A mnemonic word is not in the wordlist.
    #[error("unknown mnemonic word \"{0}\"")]
    UnknownWord(String),
    /// Checksum does not match (mnemonic checksum bits or Base58Check checksum).
    #[error("checksum mismatch")]
    ChecksumMismatch,

    // Derivation
    /// Master key material from the seed is zero or not below the curve order.
    #[error("seed produced an invalid master key")]
    InvalidMasterKey,
    /// Hardened derivation was requested from a public-only node.
    #[error("cannot derive hardened child {0} from a public key")]
    HardenedFromPublicKey(u32),
    /// The child at this index is invalid; callers should move to the next index.
    #[error("derived child key at index {index} is invalid, use the next index")]
    InvalidChildKey {
        /// Raw (possibly hardened) index that failed.
        index: u32,
    },
    /// The parent is already at depth 255.
    #[error("maximum derivation depth of 255 exceeded")]
    DepthOverflow,
    /// Malformed derivation path text.
    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),
    /// The private child does not belong to the given public parent.
    #[error("key is not a non-hardened child of the given parent")]
    NotChildOf,
    /// Extended key bytes are structurally inconsistent.
    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(&'static str),
    /// A private-key operation was requested on a public-only node.
    #[error("operation requires a private key")]
    NotPrivate,

    // Keys
    /// Private key scalar is zero or out of range.
    #[error("invalid private key")]
    InvalidPrivateKey,
    /// Public key bytes do not encode a curve point.
    #[error("invalid public key")]
    InvalidPublicKey,

    // Encoding
    /// Byte length does not match what the format requires.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// Input contains a character outside the encoding's alphabet.
    #[error("invalid character in encoded string")]
    InvalidCharacter,
    /// Bech32 string mixes upper and lower case.
    #[error("bech32 string mixes upper and lower case")]
    MixedCase,
    /// Bech32 checksum (or checksum variant for the witness version) is wrong.
    #[error("invalid bech32 checksum")]
    InvalidChecksum,
    /// Witness version is above 16 or does not fit the program.
    #[error("invalid witness version {0}")]
    InvalidWitnessVersion(u8),
    /// The string is not a valid address for the network.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Address type name is not recognized.
    #[error("unknown address type: {0}")]
    UnknownAddressType(String),

    // Network registry
    /// Network identifier is not in the registry.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
    /// Version bytes are not registered for any network.
    #[error("unknown version bytes {0:#010x}")]
    UnknownVersion(u32),
    /// Decoded data belongs to a different network than requested.
    #[error("expected {expected} data, found {found}")]
    NetworkMismatch {
        /// Requested network name.
        expected: &'static str,
        /// Network the data encodes.
        found: &'static str,
    },
    /// Address or key format is not supported on this network.
    #[error("{script} is not supported on {network}")]
    UnsupportedScriptType {
        /// Requested script or key format.
        script: &'static str,
        /// Network name.
        network: &'static str,
    },

    // Signing
    /// Signature envelope is structurally invalid.
    #[error("malformed signature envelope: {0}")]
    MalformedEnvelope(&'static str),
    /// Signature does not verify.
    #[error("signature verification failed")]
    SignatureInvalid,
    /// Signature verifies but for a different address.
    #[error("signature was made by a different address")]
    AddressMismatch,
}

/// A convenient Result type alias for wallet engine operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<bs58::decode::Error> for Error {
    // Vec-backed decoding can only fail on the alphabet.
    fn from(_: bs58::decode::Error) -> Self {
        Self::InvalidCharacter
    }
}
