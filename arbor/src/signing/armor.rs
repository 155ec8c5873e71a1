//! Armored cleartext signatures.
//!
//! The envelope follows the layout of OpenPGP cleartext signatures:
//!
//! ```text
//! -----BEGIN SIGNED MESSAGE-----
//! Hash: SHA256
//!
//! <message, lines starting with '-' escaped as "- -">
//! -----BEGIN SIGNATURE-----
//! <base64 of the 64-byte r || s>
//! -----END SIGNATURE-----
//! ```
//!
//! The signed digest is SHA-256 over the canonical text: trailing spaces and
//! tabs are stripped from every line and lines are joined with CRLF. There is
//! no length prefix and no network magic. Carriage returns at line ends are
//! transport detail: the envelope carries LF line endings, so a message
//! signed as `"a\r\nb\r"` verifies and comes back as `"a\nb"`. The
//! signature is plain ECDSA, so the verifier must supply the signer's public
//! key.

use core::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use k256::ecdsa::Signature;

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::keys::{PrivateKey, PublicKey};

const BEGIN_MESSAGE: &str = "-----BEGIN SIGNED MESSAGE-----";
const BEGIN_SIGNATURE: &str = "-----BEGIN SIGNATURE-----";
const END_SIGNATURE: &str = "-----END SIGNATURE-----";
const HASH_HEADER: &str = "Hash";
const HASH_NAME: &str = "SHA256";
const LINE_WIDTH: usize = 64;

/// Canonical form of `message` for hashing.
/// `message` with a trailing CR removed from every line.
fn lf_text(message: &str) -> String {
    message
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn canonical_text(message: &str) -> String {
    message
        .split('\n')
        .map(|line| line.trim_end_matches([' ', '\t', '\r']))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Digest signed by [`sign`] and checked by [`verify`].
pub fn digest(message: &str) -> [u8; 32] {
    sha256(canonical_text(message).as_bytes())
}

/// A message together with its detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    message: String,
    signature: Signature,
}

impl SignedMessage {
    /// Sign `message`. Line endings are stored as LF.
    pub fn sign(key: &PrivateKey, message: &str) -> Result<Self> {
        let signature = key.sign_prehash(&digest(message))?;
        Ok(Self {
            message: lf_text(message),
            signature,
        })
    }

    /// Parse a full envelope without verifying it.
    pub fn parse(envelope: &str) -> Result<Self> {
        let mut lines = envelope.lines().skip_while(|line| line.trim().is_empty());

        if lines.next().map(str::trim_end) != Some(BEGIN_MESSAGE) {
            return Err(Error::MalformedEnvelope("missing message header"));
        }

        // Armor headers run up to the first blank line.
        loop {
            let line = lines
                .next()
                .ok_or(Error::MalformedEnvelope("unterminated armor headers"))?;
            if line.trim().is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or(Error::MalformedEnvelope("invalid armor header"))?;
            if name.trim() == HASH_HEADER && !value.trim().eq_ignore_ascii_case(HASH_NAME) {
                return Err(Error::MalformedEnvelope("unsupported hash algorithm"));
            }
        }

        let mut body = Vec::new();
        loop {
            let line = lines
                .next()
                .ok_or(Error::MalformedEnvelope("missing signature header"))?;
            if line.trim_end() == BEGIN_SIGNATURE {
                break;
            }
            if line.trim_end() == END_SIGNATURE || line.trim_end() == BEGIN_MESSAGE {
                return Err(Error::MalformedEnvelope("delimiters out of order"));
            }
            body.push(line.strip_prefix("- ").unwrap_or(line));
        }

        let signature = read_signature_block(&mut lines)?;
        Ok(Self {
            message: body.join("\n"),
            signature,
        })
    }

    /// The signed text, with LF line endings.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The ECDSA signature.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Check the signature against `public_key`.
    pub fn verify(&self, public_key: &PublicKey) -> Result<()> {
        public_key
            .verify_prehash(&digest(&self.message), &self.signature)
            .map_err(|e| {
                tracing::debug!("armored signature rejected");
                e
            })
    }

    /// Render just the signature block.
    pub fn signature_block(&self) -> String {
        let encoded = STANDARD.encode(self.signature.to_bytes());
        let mut out = String::with_capacity(encoded.len() + 64);
        out.push_str(BEGIN_SIGNATURE);
        out.push('\n');
        let mut rest = encoded.as_str();
        while !rest.is_empty() {
            let (line, tail) = rest.split_at(rest.len().min(LINE_WIDTH));
            out.push_str(line);
            out.push('\n');
            rest = tail;
        }
        out.push_str(END_SIGNATURE);
        out.push('\n');
        out
    }
}

impl fmt::Display for SignedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BEGIN_MESSAGE}")?;
        writeln!(f, "{HASH_HEADER}: {HASH_NAME}")?;
        writeln!(f)?;
        for line in self.message.split('\n') {
            if line.starts_with('-') {
                f.write_str("- ")?;
            }
            writeln!(f, "{line}")?;
        }
        f.write_str(&self.signature_block())
    }
}

/// Read a signature block body and its closing delimiter.
fn read_signature_block<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<Signature> {
    let mut encoded = String::new();
    loop {
        let line = lines
            .next()
            .ok_or(Error::MalformedEnvelope("missing signature footer"))?;
        let line = line.trim();
        if line == END_SIGNATURE {
            break;
        }
        if line.starts_with("-----") {
            return Err(Error::MalformedEnvelope("delimiters out of order"));
        }
        encoded.push_str(line);
    }

    let bytes = STANDARD
        .decode(&encoded)
        .map_err(|_| Error::MalformedEnvelope("signature is not valid base64"))?;
    if bytes.len() != 64 {
        return Err(Error::MalformedEnvelope("signature must be 64 bytes"));
    }
    Signature::from_slice(&bytes).map_err(|_| Error::SignatureInvalid)
}

/// Sign `message` and wrap it in an armored envelope.
pub fn sign(key: &PrivateKey, message: &str) -> Result<String> {
    Ok(SignedMessage::sign(key, message)?.to_string())
}

/// Sign `message`, returning only the signature block.
pub fn sign_detached(key: &PrivateKey, message: &str) -> Result<String> {
    Ok(SignedMessage::sign(key, message)?.signature_block())
}

/// Verify an envelope against `public_key`, returning the authenticated message.
pub fn verify(envelope: &str, public_key: &PublicKey) -> Result<String> {
    let signed = SignedMessage::parse(envelope)?;
    signed.verify(public_key)?;
    Ok(signed.message)
}

/// Verify a signature block over a message supplied out of band.
///
/// `armored` may be a bare signature block or a full envelope; in the latter
/// case any embedded message is ignored in favour of `message`.
pub fn verify_detached(message: &str, armored: &str, public_key: &PublicKey) -> Result<()> {
    let mut lines = armored
        .lines()
        .skip_while(|line| line.trim_end() != BEGIN_SIGNATURE);
    if lines.next().is_none() {
        return Err(Error::MalformedEnvelope("missing signature header"));
    }
    let signature = read_signature_block(&mut lines)?;
    public_key.verify_prehash(&digest(message), &signature)
}
