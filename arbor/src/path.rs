//! BIP-32 derivation paths.
//!
//! Paths are parsed once into a [`DerivationPath`] and malformed text is
//! rejected here, before any key is touched. Accepted forms:
//!
//! - `m/44'/0'/0'/0/0` (absolute, private result)
//! - `M/44'/0'/0'/0/0` or `m/44'/0'/0'/0/0.pub` (public result)
//! - `0/5` (relative to the node it is applied to)
//!
//! Hardened components may be marked with `'`, `h`, `H` or `p`.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// A child index in a derivation path.
///
/// Hardened indices are stored without the 2^31 offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildIndex {
    /// Normal (non-hardened) index: 0 to 2^31 - 1
    Normal(u32),
    /// Hardened index: displayed as n', stored as n
    Hardened(u32),
}

impl ChildIndex {
    /// The offset for hardened indices (2^31).
    pub const HARDENED_OFFSET: u32 = 0x8000_0000;

    /// Create a normal (non-hardened) child index.
    pub fn normal(index: u32) -> Result<Self> {
        if index >= Self::HARDENED_OFFSET {
            Err(Error::InvalidDerivationPath(format!("index {index} out of range")))
        } else {
            Ok(Self::Normal(index))
        }
    }

    /// Create a hardened child index.
    pub fn hardened(index: u32) -> Result<Self> {
        if index >= Self::HARDENED_OFFSET {
            Err(Error::InvalidDerivationPath(format!("index {index}' out of range")))
        } else {
            Ok(Self::Hardened(index))
        }
    }

    /// Check if this is a hardened index.
    pub const fn is_hardened(&self) -> bool {
        matches!(self, Self::Hardened(_))
    }

    /// The index without the hardened flag.
    pub const fn index(&self) -> u32 {
        match self {
            Self::Normal(i) | Self::Hardened(i) => *i,
        }
    }

    /// The raw 32-bit value used in derivation and serialization.
    pub const fn to_u32(&self) -> u32 {
        match self {
            Self::Normal(i) => *i,
            Self::Hardened(i) => *i | Self::HARDENED_OFFSET,
        }
    }
}

impl From<u32> for ChildIndex {
    fn from(value: u32) -> Self {
        if value >= Self::HARDENED_OFFSET {
            Self::Hardened(value & !Self::HARDENED_OFFSET)
        } else {
            Self::Normal(value)
        }
    }
}

impl From<ChildIndex> for u32 {
    fn from(index: ChildIndex) -> Self {
        index.to_u32()
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(i) => write!(f, "{}", i),
            Self::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

impl FromStr for ChildIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H', 'p']) {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        // u32::from_str would also accept a leading '+'
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDerivationPath(format!(
                "invalid component \"{s}\""
            )));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidDerivationPath(format!("index \"{s}\" out of range")))?;

        if hardened {
            Self::hardened(index)
        } else {
            Self::normal(index)
        }
    }
}

/// A parsed derivation path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<ChildIndex>,
    public: bool,
}

impl DerivationPath {
    /// The empty path (the node itself).
    pub fn master() -> Self {
        Self::default()
    }

    /// Build a path from child indices.
    pub fn new(indices: Vec<ChildIndex>) -> Self {
        Self {
            indices,
            public: false,
        }
    }

    /// Parse path text.
    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.trim();
        let (body, pub_suffix) = match trimmed.strip_suffix(".pub") {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        let (rest, public) = match body.as_bytes().first() {
            Some(b'm') => (&body[1..], pub_suffix),
            Some(b'M') => (&body[1..], true),
            Some(_) => {
                // relative paths start straight with a component
                let mut owned = String::with_capacity(body.len() + 1);
                owned.push('/');
                owned.push_str(body);
                return Self::parse_components(&owned, pub_suffix, path);
            }
            None => {
                return Err(Error::InvalidDerivationPath("empty path".into()));
            }
        };

        Self::parse_components(rest, public, path)
    }

    fn parse_components(rest: &str, public: bool, original: &str) -> Result<Self> {
        if rest.is_empty() {
            return Ok(Self {
                indices: Vec::new(),
                public,
            });
        }
        let Some(rest) = rest.strip_prefix('/') else {
            return Err(Error::InvalidDerivationPath(format!(
                "expected '/' after root in \"{original}\""
            )));
        };

        let indices = rest
            .split('/')
            .map(|component| {
                if component.is_empty() {
                    Err(Error::InvalidDerivationPath(format!(
                        "empty component in \"{original}\""
                    )))
                } else {
                    component.parse::<ChildIndex>()
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { indices, public })
    }

    /// Standard five-level path `m/purpose'/coin'/account'/change/index`.
    pub fn for_purpose(
        purpose: u32,
        coin_type: u32,
        account: u32,
        change: u32,
        address_index: u32,
    ) -> Result<Self> {
        Self::account(purpose, coin_type, account)?
            .normal_child(change)?
            .normal_child(address_index)
    }

    /// Account-level path `m/purpose'/coin'/account'`.
    pub fn account(purpose: u32, coin_type: u32, account: u32) -> Result<Self> {
        Ok(Self::new(vec![
            ChildIndex::hardened(purpose)?,
            ChildIndex::hardened(coin_type)?,
            ChildIndex::hardened(account)?,
        ]))
    }

    /// BIP-44 path: m/44'/coin_type'/account'/change/address_index
    pub fn bip44(coin_type: u32, account: u32, change: u32, address_index: u32) -> Result<Self> {
        Self::for_purpose(44, coin_type, account, change, address_index)
    }

    /// BIP-49 path: m/49'/coin_type'/account'/change/address_index
    pub fn bip49(coin_type: u32, account: u32, change: u32, address_index: u32) -> Result<Self> {
        Self::for_purpose(49, coin_type, account, change, address_index)
    }

    /// BIP-84 path: m/84'/coin_type'/account'/change/address_index
    pub fn bip84(coin_type: u32, account: u32, change: u32, address_index: u32) -> Result<Self> {
        Self::for_purpose(84, coin_type, account, change, address_index)
    }

    /// The child indices, root first.
    pub fn indices(&self) -> &[ChildIndex] {
        &self.indices
    }

    /// Number of levels.
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Whether the path is empty.
    pub fn is_master(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether any component is hardened.
    pub fn has_hardened(&self) -> bool {
        self.indices.iter().any(ChildIndex::is_hardened)
    }

    /// Whether the caller asked for a public-only result.
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Same path, flagged for a public-only result.
    pub fn to_public(&self) -> Self {
        Self {
            indices: self.indices.clone(),
            public: true,
        }
    }

    /// Append a child index.
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            indices,
            public: self.public,
        }
    }

    /// Append a normal child index.
    pub fn normal_child(&self, index: u32) -> Result<Self> {
        Ok(self.child(ChildIndex::normal(index)?))
    }

    /// Append a hardened child index.
    pub fn hardened_child(&self, index: u32) -> Result<Self> {
        Ok(self.child(ChildIndex::hardened(index)?))
    }

    /// The path one level up, if any.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.indices.split_last()?;
        Some(Self {
            indices: rest.to_vec(),
            public: self.public,
        })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.public { "M" } else { "m" })?;
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Vec<ChildIndex>> for DerivationPath {
    fn from(indices: Vec<ChildIndex>) -> Self {
        Self::new(indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_index_hardened() {
        let index = ChildIndex::hardened(44).unwrap();
        assert!(index.is_hardened());
        assert_eq!(index.index(), 44);
        assert_eq!(index.to_u32(), 44 | 0x80000000);
        assert_eq!(index.to_string(), "44'");
    }

    #[test]
    fn test_child_index_from_u32() {
        assert_eq!(ChildIndex::from(44), ChildIndex::Normal(44));
        assert_eq!(ChildIndex::from(0x80000000), ChildIndex::Hardened(0));
        assert_eq!(ChildIndex::from(0x80000000 + 44), ChildIndex::Hardened(44));
    }

    #[test]
    fn test_child_index_range() {
        assert!(ChildIndex::normal(0x7fff_ffff).is_ok());
        assert!(ChildIndex::normal(0x8000_0000).is_err());
        assert!("2147483648".parse::<ChildIndex>().is_err());
        assert!("2147483647'".parse::<ChildIndex>().is_ok());
    }

    #[test]
    fn test_child_index_markers() {
        for text in ["7'", "7h", "7H", "7p"] {
            assert_eq!(text.parse::<ChildIndex>().unwrap(), ChildIndex::Hardened(7));
        }
        assert_eq!("7".parse::<ChildIndex>().unwrap(), ChildIndex::Normal(7));
    }

    #[test]
    fn test_child_index_rejects_junk() {
        for text in ["", "'", "+1", "-1", "1''", "x", "1 ", "0x10"] {
            assert!(text.parse::<ChildIndex>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_parse_absolute() {
        let path: DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        assert_eq!(
            path.indices(),
            &[
                ChildIndex::Hardened(44),
                ChildIndex::Hardened(60),
                ChildIndex::Hardened(0),
                ChildIndex::Normal(0),
                ChildIndex::Normal(0),
            ]
        );
        assert!(!path.is_public());
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/0");
    }

    #[test]
    fn test_parse_public_forms() {
        let upper: DerivationPath = "M/0/1".parse().unwrap();
        let suffix: DerivationPath = "m/0/1.pub".parse().unwrap();
        assert!(upper.is_public());
        assert_eq!(upper, suffix);
        assert_eq!(upper.to_string(), "M/0/1");
        assert!("M".parse::<DerivationPath>().unwrap().is_public());
    }

    #[test]
    fn test_hardened_and_public_flags() {
        let path: DerivationPath = "m/44'/0'/0'/0/3".parse().unwrap();
        assert!(path.has_hardened());
        assert!(!"m/0/3".parse::<DerivationPath>().unwrap().has_hardened());
        assert!(!DerivationPath::master().has_hardened());

        let public = path.to_public();
        assert!(public.is_public());
        assert!(!path.is_public());
        assert_eq!(public.indices(), path.indices());
        assert_eq!(public.to_string(), "M/44'/0'/0'/0/3");
    }

    #[test]
    fn test_parse_relative() {
        let path: DerivationPath = "0/5h".parse().unwrap();
        assert_eq!(path.indices(), &[ChildIndex::Normal(0), ChildIndex::Hardened(5)]);
    }

    #[test]
    fn test_parse_master() {
        let path: DerivationPath = "m".parse().unwrap();
        assert!(path.is_master());
        assert_eq!(path.to_string(), "m");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "m/", "m//0", "m/0/", "/0", "m0", "mm/0", "m/0'/x", "m/1/-2", "n/0"] {
            assert!(text.parse::<DerivationPath>().is_err(), "{text:?}");
        }
    }

    #[test]
    fn test_standard_constructors() {
        assert_eq!(
            DerivationPath::bip44(0, 0, 0, 0).unwrap().to_string(),
            "m/44'/0'/0'/0/0"
        );
        assert_eq!(
            DerivationPath::bip49(0, 1, 1, 7).unwrap().to_string(),
            "m/49'/0'/1'/1/7"
        );
        assert_eq!(
            DerivationPath::bip84(1, 0, 0, 3).unwrap().to_string(),
            "m/84'/1'/0'/0/3"
        );
        assert_eq!(
            DerivationPath::account(44, 60, 2).unwrap().to_string(),
            "m/44'/60'/2'"
        );
    }

    #[test]
    fn test_child_and_parent() {
        let path = DerivationPath::master().hardened_child(44).unwrap();
        assert_eq!(path.to_string(), "m/44'");
        assert_eq!(path.parent().unwrap(), DerivationPath::master());
        assert!(DerivationPath::master().parent().is_none());
    }
}
