//! Recovery phrases: entropy packed 11 bits per word into a locale's table.
//!
//! Two lengths are supported:
//! - 12 words ↔ 17 bytes. 136 bits go in, 132 come out as words and the
//!   trailing 4 bits are dropped; decoding restores them as zero.
//! - 24 words ↔ 33 bytes, an exact fit.

use std::fmt;

use thiserror::Error;

use crate::wordlist::{Locale, WordListError, WordLists};

/// Low-bit masks for accumulator widths 0..=10
const MASKS: [u32; 11] = [0, 1, 3, 7, 15, 31, 63, 127, 255, 511, 1023];

/// Bits encoded by one word
const BITS_PER_WORD: u32 = 11;

/// Supported phrase lengths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhraseLength {
    /// 12 words, 17 bytes of entropy
    Twelve,
    /// 24 words, 33 bytes of entropy
    TwentyFour,
}

impl PhraseLength {
    /// Number of words
    #[must_use]
    pub const fn word_count(self) -> usize {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
        }
    }

    /// Number of entropy bytes
    #[must_use]
    pub const fn entropy_length(self) -> usize {
        match self {
            Self::Twelve => 17,
            Self::TwentyFour => 33,
        }
    }

    /// Length for a word count
    #[must_use]
    pub const fn from_word_count(count: usize) -> Option<Self> {
        match count {
            12 => Some(Self::Twelve),
            24 => Some(Self::TwentyFour),
            _ => None,
        }
    }

    /// Length for an entropy size
    #[must_use]
    pub const fn from_entropy_length(len: usize) -> Option<Self> {
        match len {
            17 => Some(Self::Twelve),
            33 => Some(Self::TwentyFour),
            _ => None,
        }
    }
}

/// Mnemonic codec errors
#[derive(Debug, Error)]
pub enum MnemonicError {
    /// Entropy is neither 17 nor 33 bytes
    #[error("invalid entropy length {0}, expected 17 or 33 bytes")]
    InvalidEntropyLength(usize),
    /// Wrong word count, unknown word or bad reconstructed length
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    /// Phrase is in no supported language, or mixes languages
    #[error("unsupported locale: {0}")]
    UnsupportedLocale(String),
    /// Word table unavailable
    #[error(transparent)]
    WordList(#[from] WordListError),
}

/// Result type for mnemonic operations
pub type MnemonicResult<T> = Result<T, MnemonicError>;

/// An ordered, validated list of words from a single locale
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RecoveryPhrase {
    words: Vec<String>,
    locale: Locale,
}

impl RecoveryPhrase {
    /// Validate `words` against the known tables.
    ///
    /// # Errors
    /// See [`words_to_entropy`]
    pub fn from_words<S: AsRef<str>>(wordlists: &WordLists, words: &[S]) -> MnemonicResult<Self> {
        let (_, locale) = words_to_entropy(wordlists, words)?;
        Ok(Self {
            words: words.iter().map(|w| w.as_ref().to_string()).collect(),
            locale,
        })
    }

    /// Parse a phrase whose words are separated by single spaces.
    ///
    /// No trimming or case folding is applied.
    ///
    /// # Errors
    /// See [`words_to_entropy`]
    pub fn parse(wordlists: &WordLists, phrase: &str) -> MnemonicResult<Self> {
        let words: Vec<&str> = phrase.split(' ').collect();
        Self::from_words(wordlists, &words)
    }

    /// The words in order
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Locale every word belongs to
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Phrase length
    #[must_use]
    pub fn length(&self) -> PhraseLength {
        if self.words.len() == PhraseLength::TwentyFour.word_count() {
            PhraseLength::TwentyFour
        } else {
            PhraseLength::Twelve
        }
    }

    /// Decode back to entropy
    ///
    /// # Errors
    /// Returns error only if a word table cannot be loaded
    pub fn to_entropy(&self, wordlists: &WordLists) -> MnemonicResult<Vec<u8>> {
        words_to_entropy(wordlists, &self.words).map(|(entropy, _)| entropy)
    }
}

impl fmt::Display for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words.join(" "))
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase({} words, {})", self.words.len(), self.locale)
    }
}

/// Render 17 or 33 bytes of entropy as 12 or 24 words of `locale`.
///
/// # Errors
/// Returns `InvalidEntropyLength` for any other size
pub fn entropy_to_words(
    wordlists: &WordLists,
    entropy: &[u8],
    locale: Locale,
) -> MnemonicResult<RecoveryPhrase> {
    let length = PhraseLength::from_entropy_length(entropy.len())
        .ok_or(MnemonicError::InvalidEntropyLength(entropy.len()))?;
    let table = wordlists.words(locale)?;

    let mut words = Vec::with_capacity(length.word_count());
    let mut accumulator: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in entropy {
        accumulator = (accumulator << 8) | u32::from(byte);
        bits += 8;
        while bits >= BITS_PER_WORD {
            bits -= BITS_PER_WORD;
            let index = accumulator >> bits;
            accumulator &= MASKS[bits as usize];
            // index < 2048 because accumulator held at most 18 bits
            let word = u16::try_from(index)
                .ok()
                .and_then(|i| table.word(i))
                .ok_or_else(|| MnemonicError::InvalidMnemonic(format!("index {index} out of range")))?;
            words.push(word.to_string());
        }
    }

    debug_assert_eq!(words.len(), length.word_count());
    Ok(RecoveryPhrase { words, locale })
}

/// Recover entropy and locale from 12 or 24 words.
///
/// The locale is detected from the first word and every other word must be
/// in the same table. For 12 words the 17th byte carries the 4 leftover
/// bits in its high nibble and zero in its low nibble.
///
/// # Errors
/// - `InvalidMnemonic` for a wrong word count or a word in no table
/// - `UnsupportedLocale` if the first word is unknown or locales are mixed
pub fn words_to_entropy<S: AsRef<str>>(
    wordlists: &WordLists,
    words: &[S],
) -> MnemonicResult<(Vec<u8>, Locale)> {
    let length = PhraseLength::from_word_count(words.len()).ok_or_else(|| {
        MnemonicError::InvalidMnemonic(format!("expected 12 or 24 words, got {}", words.len()))
    })?;

    let first = words[0].as_ref();
    let locale = wordlists
        .detect_locale(first)?
        .ok_or_else(|| MnemonicError::UnsupportedLocale(format!("unrecognised word {first:?}")))?;
    let table = wordlists.words(locale)?;

    let mut entropy = Vec::with_capacity(length.entropy_length());
    let mut remainder: u32 = 0;
    let mut bits: u32 = 0;
    for (position, word) in words.iter().enumerate() {
        let word = word.as_ref();
        let index = match table.index_of(word) {
            Some(index) => index,
            None => return Err(unknown_word(wordlists, locale, position, word)?),
        };
        remainder = (remainder << BITS_PER_WORD) | u32::from(index);
        bits += BITS_PER_WORD;
        while bits >= 8 {
            bits -= 8;
            // masked to one byte
            #[allow(clippy::cast_possible_truncation)]
            entropy.push(((remainder >> bits) & 0xFF) as u8);
        }
        remainder &= MASKS[bits as usize];
    }

    if length == PhraseLength::Twelve {
        // 4 bits left over, restored into the high nibble
        #[allow(clippy::cast_possible_truncation)]
        entropy.push((remainder << 4) as u8);
    }

    if entropy.len() != length.entropy_length() {
        return Err(MnemonicError::InvalidMnemonic(format!(
            "decoded {} bytes, expected {}",
            entropy.len(),
            length.entropy_length()
        )));
    }
    Ok((entropy, locale))
}

fn unknown_word(
    wordlists: &WordLists,
    locale: Locale,
    position: usize,
    word: &str,
) -> MnemonicResult<MnemonicError> {
    Ok(match wordlists.detect_locale(word)? {
        Some(other) => MnemonicError::UnsupportedLocale(format!(
            "word {position} {word:?} is {other}, phrase is {locale}"
        )),
        None => MnemonicError::InvalidMnemonic(format!("unknown word {word:?} at position {position}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::decode_hex;
    use proptest::prelude::*;

    const DURING: &str =
        "during kingdom crew atom practice brisk weird document eager artwork ride then";
    const DEPEND: &str =
        "depend crime cricket castle fun purse announce nephew profit cloth trim deliver";
    const ZHUAN: &str = "專 青 辦 增 孔 咱 裡 耕 窮 節 撲 易";
    const ACCIDENT: &str = "accident syrup inquiry you clutch liquid fame upset joke glow best school repeat birth library combine access camera organ trial crazy jeans lizard science";

    fn phrase_words(phrase: &str) -> Vec<&str> {
        phrase.split(' ').collect()
    }

    #[test]
    fn test_known_twelve_word_vectors() {
        let lists = WordLists::default();
        let entropy = decode_hex("442f54cd072a9638be4a0344e1a6e5f010").unwrap();
        let phrase = entropy_to_words(&lists, &entropy, Locale::English).unwrap();
        assert_eq!(phrase.to_string(), DURING);

        let entropy = decode_hex("3ae670cd91c5e15d0254a2abc57ba29d00").unwrap();
        let phrase = entropy_to_words(&lists, &entropy, Locale::English).unwrap();
        assert_eq!(phrase.to_string(), DEPEND);

        let phrase = entropy_to_words(&lists, &entropy, Locale::TraditionalChinese).unwrap();
        assert_eq!(phrase.to_string(), ZHUAN);
        assert_eq!(phrase.locale(), Locale::TraditionalChinese);
    }

    #[test]
    fn test_known_twenty_four_word_vector() {
        let lists = WordLists::default();
        let mut entropy = vec![0x01];
        entropy.extend(
            decode_hex("7b95d37f92c904949f79784c7855606b6a2d60416f01441671f4132cef60b607").unwrap(),
        );
        let phrase = entropy_to_words(&lists, &entropy, Locale::English).unwrap();
        assert_eq!(phrase.to_string(), ACCIDENT);
        assert_eq!(phrase.length(), PhraseLength::TwentyFour);

        let (decoded, locale) = words_to_entropy(&lists, &phrase_words(ACCIDENT)).unwrap();
        assert_eq!(decoded, entropy);
        assert_eq!(locale, Locale::English);
    }

    #[test]
    fn test_decode_known_phrases() {
        let lists = WordLists::default();
        let (entropy, locale) = words_to_entropy(&lists, &phrase_words(DURING)).unwrap();
        assert_eq!(hex::encode(entropy), "442f54cd072a9638be4a0344e1a6e5f010");
        assert_eq!(locale, Locale::English);

        let (entropy, locale) = words_to_entropy(&lists, &phrase_words(ZHUAN)).unwrap();
        assert_eq!(hex::encode(entropy), "3ae670cd91c5e15d0254a2abc57ba29d00");
        assert_eq!(locale, Locale::TraditionalChinese);
    }

    #[test]
    fn test_low_nibble_is_dropped() {
        let lists = WordLists::default();
        let entropy = decode_hex("442f54cd072a9638be4a0344e1a6e5f01f").unwrap();
        let phrase = entropy_to_words(&lists, &entropy, Locale::English).unwrap();
        assert_eq!(phrase.to_string(), DURING);
        let decoded = phrase.to_entropy(&lists).unwrap();
        assert_eq!(decoded[16], 0x10);
    }

    #[test]
    fn test_invalid_entropy_lengths() {
        let lists = WordLists::default();
        for hex_str in [
            "442f54cd072a9638be4a0344e1a6e5f01b30",
            "3ae670cd91c5e15d0254a2abc57ba290",
            "",
        ] {
            let entropy = decode_hex(hex_str).unwrap();
            let err = entropy_to_words(&lists, &entropy, Locale::English).unwrap_err();
            assert!(matches!(err, MnemonicError::InvalidEntropyLength(n) if n == entropy.len()));
        }
    }

    #[test]
    fn test_wrong_word_count() {
        let lists = WordLists::default();
        let mut words = phrase_words(DURING);
        words.pop();
        assert!(matches!(
            words_to_entropy(&lists, &words),
            Err(MnemonicError::InvalidMnemonic(_))
        ));
        assert!(matches!(
            RecoveryPhrase::parse(&lists, ""),
            Err(MnemonicError::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_unknown_words() {
        let lists = WordLists::default();
        let err = RecoveryPhrase::parse(
            &lists,
            "during kingdom crew atom practice brisk weird document eager artwork rider then",
        )
        .unwrap_err();
        assert!(matches!(err, MnemonicError::InvalidMnemonic(_)));

        let err = RecoveryPhrase::parse(
            &lists,
            "Quiero ir a casa porque extraño a mis padres y mis amigos",
        )
        .unwrap_err();
        assert!(matches!(err, MnemonicError::UnsupportedLocale(_)));
    }

    #[test]
    fn test_mixed_locales_rejected() {
        let lists = WordLists::default();
        let mut words = phrase_words(DURING);
        words[11] = "易";
        let err = words_to_entropy(&lists, &words).unwrap_err();
        assert!(matches!(err, MnemonicError::UnsupportedLocale(_)));

        let mut words = phrase_words(ZHUAN);
        words[3] = "atom";
        let err = words_to_entropy(&lists, &words).unwrap_err();
        assert!(matches!(err, MnemonicError::UnsupportedLocale(_)));
    }

    #[test]
    fn test_simplified_characters_rejected() {
        let lists = WordLists::default();
        let err = RecoveryPhrase::parse(&lists, "专 青 办 增 孔 咱 里 耕 穷 か 扑 易").unwrap_err();
        assert!(matches!(
            err,
            MnemonicError::UnsupportedLocale(_) | MnemonicError::InvalidMnemonic(_)
        ));
    }

    #[test]
    fn test_lookup_is_case_and_space_sensitive() {
        let lists = WordLists::default();
        assert!(RecoveryPhrase::parse(&lists, &DURING.to_uppercase()).is_err());
        assert!(RecoveryPhrase::parse(&lists, &format!("{DURING} ")).is_err());
        assert!(RecoveryPhrase::parse(&lists, &DURING.replace(' ', "  ")).is_err());
        assert!(RecoveryPhrase::parse(&lists, DURING).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn twelve_word_roundtrip(bytes in prop::array::uniform17(any::<u8>()), chinese in any::<bool>()) {
            let lists = WordLists::default();
            let locale = if chinese { Locale::TraditionalChinese } else { Locale::English };
            let phrase = entropy_to_words(&lists, &bytes, locale).unwrap();
            prop_assert_eq!(phrase.words().len(), 12);
            let table = lists.words(locale).unwrap();
            prop_assert!(phrase.words().iter().all(|w| table.contains(w)));

            let (decoded, detected) = words_to_entropy(&lists, phrase.words()).unwrap();
            let mut expected = bytes.to_vec();
            expected[16] &= 0xF0;
            prop_assert_eq!(decoded, expected);
            prop_assert_eq!(detected, locale);
        }

        #[test]
        fn twenty_four_word_roundtrip(bytes in prop::collection::vec(any::<u8>(), 33)) {
            let lists = WordLists::default();
            let phrase = entropy_to_words(&lists, &bytes, Locale::English).unwrap();
            prop_assert_eq!(phrase.words().len(), 24);
            prop_assert_eq!(phrase.to_entropy(&lists).unwrap(), bytes);
        }
    }
}
