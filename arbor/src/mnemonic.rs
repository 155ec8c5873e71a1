//! BIP-39 mnemonic phrases and seed stretching.
//!
//! The 2048-word English list comes from the `bip39` crate; encoding,
//! checksum verification and PBKDF2 stretching are done here so that
//! validation can look at every word and compare the checksum in constant
//! time before reporting a verdict.

use core::fmt;

use bip39::Language;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use subtle::ConstantTimeEq;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::hash::sha256;
use crate::secret::Secret64;

/// Number of PBKDF2 rounds for seed derivation.
const PBKDF2_ROUNDS: u32 = 2048;

/// Bits encoded by one word.
const BITS_PER_WORD: usize = 11;

fn wordlist() -> &'static [&'static str; 2048] {
    Language::English.word_list()
}

fn entropy_bytes_for_words(word_count: usize) -> Result<usize> {
    match word_count {
        12 | 15 | 18 | 21 | 24 => Ok(word_count * BITS_PER_WORD * 32 / 33 / 8),
        n => Err(Error::InvalidWordCount(n)),
    }
}

fn check_entropy_bits(bits: usize) -> Result<()> {
    match bits {
        128 | 160 | 192 | 224 | 256 => Ok(()),
        n => Err(Error::InvalidEntropyLength(n)),
    }
}

/// Checksum bits for `entropy`, right-aligned in a byte.
fn checksum(entropy: &[u8]) -> u8 {
    let cs_bits = entropy.len() / 4;
    sha256(entropy)[0] >> (8 - cs_bits)
}

/// A checksum-valid BIP-39 mnemonic.
///
/// Holds only the entropy; words are rendered on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    entropy: Zeroizing<Vec<u8>>,
}

impl Mnemonic {
    /// Generate a mnemonic with `entropy_bits` bits of entropy from `rng`.
    pub fn generate_with<R: rand_core::RngCore + rand_core::CryptoRng>(
        rng: &mut R,
        entropy_bits: usize,
    ) -> Result<Self> {
        check_entropy_bits(entropy_bits)?;
        let mut entropy = Zeroizing::new(vec![0u8; entropy_bits / 8]);
        rng.fill_bytes(&mut entropy);
        tracing::debug!(entropy_bits, "generated mnemonic entropy");
        Ok(Self { entropy })
    }

    /// Wrap raw entropy (16, 20, 24, 28 or 32 bytes).
    pub fn from_entropy(entropy: &[u8]) -> Result<Self> {
        check_entropy_bits(entropy.len() * 8)?;
        Ok(Self {
            entropy: Zeroizing::new(entropy.to_vec()),
        })
    }

    /// Parse and validate a phrase.
    ///
    /// Words may be separated by any whitespace. Every word is looked up
    /// before the verdict is reached; an unknown word is reported ahead of a
    /// checksum mismatch.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let normalized: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let entropy_len = entropy_bytes_for_words(words.len())?;

        let list = wordlist();
        let mut unknown: Option<&str> = None;
        let mut bits = Zeroizing::new(vec![0u8; (words.len() * BITS_PER_WORD + 7) / 8]);

        for (i, word) in words.iter().enumerate() {
            let index = match list.binary_search(word) {
                Ok(index) => index,
                Err(_) => {
                    unknown.get_or_insert(*word);
                    0
                }
            };
            for bit in 0..BITS_PER_WORD {
                if (index >> (BITS_PER_WORD - 1 - bit)) & 1 == 1 {
                    let pos = i * BITS_PER_WORD + bit;
                    bits[pos / 8] |= 0x80 >> (pos % 8);
                }
            }
        }

        let entropy = Zeroizing::new(bits[..entropy_len].to_vec());
        let cs_bits = entropy_len / 4;
        let stored = bits[entropy_len] >> (8 - cs_bits);
        let checksum_ok = stored.ct_eq(&checksum(&entropy));

        if let Some(word) = unknown {
            tracing::debug!("mnemonic rejected: unknown word");
            return Err(Error::UnknownWord(word.to_owned()));
        }
        if !bool::from(checksum_ok) {
            tracing::debug!("mnemonic rejected: checksum mismatch");
            return Err(Error::ChecksumMismatch);
        }

        Ok(Self { entropy })
    }

    /// The words, in order.
    pub fn words(&self) -> Vec<&'static str> {
        let list = wordlist();
        let word_count = self.entropy.len() * 3 / 4;

        let mut data = Zeroizing::new(self.entropy.to_vec());
        data.push(checksum(&self.entropy) << (8 - self.entropy.len() / 4));

        (0..word_count)
            .map(|i| {
                let mut index = 0usize;
                for bit in 0..BITS_PER_WORD {
                    let pos = i * BITS_PER_WORD + bit;
                    let set = (data[pos / 8] >> (7 - pos % 8)) & 1;
                    index = (index << 1) | usize::from(set);
                }
                list[index]
            })
            .collect()
    }

    /// The phrase with single spaces between words.
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.words().join(" "))
    }

    /// The raw entropy.
    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// Entropy size in bits.
    pub fn entropy_bits(&self) -> usize {
        self.entropy.len() * 8
    }

    /// Number of words.
    pub fn word_count(&self) -> usize {
        self.entropy.len() * 3 / 4
    }

    /// Stretch into a 64-byte seed.
    pub fn to_seed(&self, passphrase: &str) -> Secret64 {
        mnemonic_to_seed(&self.phrase(), passphrase)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words, [REDACTED])", self.word_count())
    }
}

impl core::str::FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_phrase(s)
    }
}

/// Generate a new mnemonic from the operating system's CSPRNG.
#[cfg(feature = "rand")]
pub fn generate_mnemonic(entropy_bits: usize) -> Result<Mnemonic> {
    Mnemonic::generate_with(&mut rand_core::OsRng, entropy_bits)
}

/// Check a phrase's word count, words and checksum.
pub fn validate_mnemonic(phrase: &str) -> Result<()> {
    Mnemonic::from_phrase(phrase).map(|_| ())
}

/// Stretch a phrase and passphrase into a 64-byte seed.
///
/// Both are NFKD-normalized; the phrase's whitespace is collapsed to single
/// spaces. The phrase is not validated, so any text yields a seed.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Secret64 {
    let normalized: Zeroizing<String> = Zeroizing::new(phrase.nfkd().collect());
    let joined = Zeroizing::new(normalized.split_whitespace().collect::<Vec<_>>().join(" "));
    let salt = Zeroizing::new(format!("mnemonic{}", passphrase.nfkd().collect::<String>()));

    let mut seed = Secret64::new([0u8; 64]);
    pbkdf2_hmac::<Sha512>(
        joined.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ROUNDS,
        seed.as_bytes_mut(),
    );
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon \
                           abandon abandon abandon abandon abandon about";

    #[test]
    fn test_zero_entropy_phrase() {
        let m = Mnemonic::from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(m.phrase().as_str(), ABANDON);
        assert_eq!(m.word_count(), 12);
    }

    #[test]
    fn test_reference_phrases() {
        let cases: &[(&[u8], &str)] = &[
            (
                &[0x7f; 16],
                "legal winner thank year wave sausage worth useful legal winner thank yellow",
            ),
            (
                &[0x80; 16],
                "letter advice cage absurd amount doctor acoustic avoid letter advice cage above",
            ),
            (&[0xff; 16], "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong"),
        ];
        for (entropy, phrase) in cases {
            let m = Mnemonic::from_entropy(entropy).unwrap();
            assert_eq!(m.phrase().as_str(), *phrase);
            let parsed = Mnemonic::from_phrase(phrase).unwrap();
            assert_eq!(parsed.entropy(), *entropy);
        }
    }

    #[test]
    fn test_24_word_phrase() {
        let m = Mnemonic::from_entropy(&[0u8; 32]).unwrap();
        let words = m.words();
        assert_eq!(words.len(), 24);
        assert_eq!(words[23], "art");
        assert!(words[..23].iter().all(|w| *w == "abandon"));
    }

    #[test]
    fn test_seed_with_passphrase() {
        let seed = mnemonic_to_seed(ABANDON, "TREZOR");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
             1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
        );
    }

    #[test]
    fn test_seed_without_passphrase() {
        let seed = Mnemonic::from_phrase(ABANDON).unwrap().to_seed("");
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn test_seed_whitespace_insensitive() {
        let spaced = ABANDON.replace(' ', "  \t");
        assert_eq!(mnemonic_to_seed(&spaced, "x"), mnemonic_to_seed(ABANDON, "x"));
    }

    #[test]
    fn test_checksum_mismatch() {
        let bad = ABANDON.replace("about", "abandon");
        assert_eq!(validate_mnemonic(&bad), Err(Error::ChecksumMismatch));
    }

    #[test]
    fn test_every_checksum_bit_flip_fails() {
        // the last word carries the 4 checksum bits of a 12-word phrase
        let m = Mnemonic::from_entropy(&[0x5a; 16]).unwrap();
        let words = m.words();
        let list = wordlist();
        let last = list.binary_search(&words[11]).unwrap();
        for bit in 0..4 {
            let mut tampered = words.clone();
            tampered[11] = list[last ^ (1 << bit)];
            assert_eq!(
                validate_mnemonic(&tampered.join(" ")),
                Err(Error::ChecksumMismatch),
                "bit {bit}"
            );
        }
    }

    #[test]
    fn test_unknown_word_reported_first() {
        let bad = ABANDON.replacen("abandon", "abandonn", 1).replace("about", "abandon");
        assert_eq!(
            validate_mnemonic(&bad),
            Err(Error::UnknownWord("abandonn".into()))
        );
    }

    #[test]
    fn test_invalid_word_count() {
        assert_eq!(
            validate_mnemonic("abandon abandon abandon"),
            Err(Error::InvalidWordCount(3))
        );
    }

    #[test]
    fn test_invalid_entropy_length() {
        assert_eq!(
            Mnemonic::from_entropy(&[0u8; 15]).unwrap_err(),
            Error::InvalidEntropyLength(120)
        );
    }

    #[cfg(feature = "rand")]
    #[test]
    fn test_generate_roundtrip() {
        for bits in [128, 160, 192, 224, 256] {
            let m = generate_mnemonic(bits).unwrap();
            assert_eq!(m.entropy_bits(), bits);
            assert_eq!(m.word_count(), bits * 3 / 32);
            let parsed = Mnemonic::from_phrase(&m.phrase()).unwrap();
            assert_eq!(parsed.phrase(), m.phrase());
        }
        assert!(matches!(
            generate_mnemonic(100),
            Err(Error::InvalidEntropyLength(100))
        ));
    }

    #[test]
    fn test_debug_redacts_words() {
        let m = Mnemonic::from_phrase(ABANDON).unwrap();
        let shown = format!("{m:?}");
        assert!(!shown.contains("abandon"));
    }
}
