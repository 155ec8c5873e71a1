//! Fixed-size secret buffers.
//!
//! Seeds, chain codes and raw scalars pass through [`SecretBytes`], which
//! wipes its contents on drop and only compares in constant time.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// A fixed-size secret with automatic zeroization.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretBytes<const N: usize>([u8; N]);

impl<const N: usize> SecretBytes<N> {
    /// Wrap a byte array.
    #[inline]
    pub const fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Copy out of a slice of exactly `N` bytes.
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() != N {
            return Err(crate::Error::InvalidLength {
                expected: N,
                actual: bytes.len(),
            });
        }
        let mut out = Self([0u8; N]);
        out.0.copy_from_slice(bytes);
        Ok(out)
    }

    /// Borrow the inner bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }
}

impl<const N: usize> AsRef<[u8]> for SecretBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> core::fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretBytes<{}>[REDACTED]", N)
    }
}

impl<const N: usize> ConstantTimeEq for SecretBytes<N> {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.0.ct_eq(&other.0)
    }
}

impl<const N: usize> PartialEq for SecretBytes<N> {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl<const N: usize> Eq for SecretBytes<N> {}

/// 32-byte secret (chain code, private scalar)
pub type Secret32 = SecretBytes<32>;

/// 64-byte secret (BIP-39 seed, HMAC-SHA512 output)
pub type Secret64 = SecretBytes<64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = Secret32::new([0xab; 32]);
        let shown = format!("{secret:?}");
        assert_eq!(shown, "SecretBytes<32>[REDACTED]");
        assert!(!shown.contains("ab"));
    }

    #[test]
    fn test_constant_time_equality() {
        let a = Secret32::new([1; 32]);
        let b = Secret32::new([1; 32]);
        let mut c = [1; 32];
        c[31] = 2;
        assert_eq!(a, b);
        assert_ne!(a, Secret32::new(c));
    }

    #[test]
    fn test_from_slice_length_checked() {
        assert!(Secret32::from_slice(&[0u8; 32]).is_ok());
        assert_eq!(
            Secret32::from_slice(&[0u8; 31]),
            Err(crate::Error::InvalidLength {
                expected: 32,
                actual: 31
            })
        );
    }

    #[test]
    fn test_zeroize_clears_bytes() {
        let mut secret = Secret64::new([7; 64]);
        secret.zeroize();
        assert_eq!(secret.as_bytes(), &[0u8; 64]);
    }
}
