//! Message signing.
//!
//! Two independent schemes share the same secp256k1 keys and are not
//! interchangeable:
//!
//! - [`compact`]: the Bitcoin-style recoverable signature. The verifier needs
//!   only the claimed address; the public key is recovered from the
//!   signature.
//! - [`armor`]: a cleartext envelope carrying a plain ECDSA signature. The
//!   verifier must already hold the signer's public key.
//!
//! [`der`] converts plain signatures to and from DER.

pub mod armor;
pub mod compact;
pub mod der;

pub use armor::SignedMessage;
pub use compact::CompactSignature;
