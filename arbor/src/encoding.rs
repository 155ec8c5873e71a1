//! Text and binary encodings for keys and addresses.
//!
//! Everything here is a pure function over bytes: Base58Check for legacy
//! addresses, WIF and extended keys, Bech32/Bech32m for segwit addresses,
//! the Bitcoin compact-size varint, and EIP-55 checksum casing.

use bech32::primitives::decode::UncheckedHrpstring;
use bech32::{Bech32, Bech32m, Fe32, Hrp};

use crate::error::{Error, Result};
use crate::hash::{double_sha256, keccak256};

/// Bech32 data-part alphabet.
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Highest witness version a segwit program may carry.
pub const MAX_WITNESS_VERSION: u8 = 16;

/// Encode `version ‖ payload ‖ checksum` as Base58.
///
/// The checksum is the first four bytes of double SHA-256 over
/// `version ‖ payload`.
pub fn base58check_encode(version: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(version.len() + payload.len() + 4);
    data.extend_from_slice(version);
    data.extend_from_slice(payload);

    let checksum = double_sha256(&data);
    data.extend_from_slice(&checksum[..4]);

    bs58::encode(data).into_string()
}

/// Decode a Base58Check string, returning `version ‖ payload` with the
/// checksum stripped.
pub fn base58check_decode(encoded: &str) -> Result<Vec<u8>> {
    let mut data = bs58::decode(encoded).into_vec()?;

    if data.len() < 5 {
        return Err(Error::InvalidLength {
            expected: 5,
            actual: data.len(),
        });
    }

    let split = data.len() - 4;
    let computed = double_sha256(&data[..split]);
    if data[split..] != computed[..4] {
        return Err(Error::ChecksumMismatch);
    }

    data.truncate(split);
    Ok(data)
}

/// Encode a segwit program.
///
/// Witness version 0 uses the Bech32 checksum, versions 1 through 16 use Bech32m.
pub fn bech32_encode(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String> {
    if witness_version > MAX_WITNESS_VERSION {
        return Err(Error::InvalidWitnessVersion(witness_version));
    }
    let hrp = Hrp::parse(hrp).map_err(|_| Error::InvalidCharacter)?;
    let version =
        Fe32::try_from(witness_version).map_err(|_| Error::InvalidWitnessVersion(witness_version))?;

    bech32::segwit::encode(hrp, version, program)
        .map_err(|_| Error::InvalidWitnessVersion(witness_version))
}

/// Decode a segwit address into `(hrp, witness_version, program)`.
///
/// Errors are reported in a fixed order: [`Error::MixedCase`], then
/// [`Error::InvalidCharacter`], then [`Error::InvalidWitnessVersion`] for a
/// version above 16, then [`Error::InvalidChecksum`] (which includes using
/// the Bech32 checksum where Bech32m is required and vice versa). A valid
/// checksum over a program whose length does not fit the version yields
/// [`Error::InvalidWitnessVersion`]. The returned hrp is lowercase.
pub fn bech32_decode(encoded: &str) -> Result<(String, u8, Vec<u8>)> {
    let has_lower = encoded.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = encoded.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(Error::MixedCase);
    }

    let lower = encoded.to_ascii_lowercase();
    let Some(sep) = lower.rfind('1') else {
        return Err(Error::InvalidCharacter);
    };
    let data = &lower[sep + 1..];
    if data.len() < 7 {
        // version symbol plus six checksum symbols at minimum
        return Err(Error::InvalidChecksum);
    }

    let mut symbols = Vec::with_capacity(data.len());
    for c in data.chars() {
        match BECH32_CHARSET.find(c) {
            Some(v) => symbols.push(v as u8),
            None => return Err(Error::InvalidCharacter),
        }
    }

    let version = symbols[0];
    if version > MAX_WITNESS_VERSION {
        return Err(Error::InvalidWitnessVersion(version));
    }

    let unchecked = UncheckedHrpstring::new(encoded).map_err(|_| Error::InvalidCharacter)?;
    let checksum_ok = if version == 0 {
        unchecked.has_valid_checksum::<Bech32>()
    } else {
        unchecked.has_valid_checksum::<Bech32m>()
    };
    if !checksum_ok {
        return Err(Error::InvalidChecksum);
    }

    let (hrp, witness_version, program) =
        bech32::segwit::decode(encoded).map_err(|_| Error::InvalidWitnessVersion(version))?;

    Ok((
        hrp.to_string().to_ascii_lowercase(),
        witness_version.to_u8(),
        program,
    ))
}

/// Append the Bitcoin compact-size encoding of `n` to `out`.
pub fn write_varint(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Render a 20-byte account as `0x`-prefixed hex with EIP-55 checksum casing.
pub fn eip55_checksum(address: &[u8; 20]) -> String {
    let hex_addr = hex::encode(address);
    let hash = keccak256(hex_addr.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (i, c) in hex_addr.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}
