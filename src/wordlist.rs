//! Recovery-phrase word tables.
//!
//! Each supported locale has one ordered table of exactly 2048 unique words.
//! Tables are loaded lazily, once per [`WordLists`] provider, and shared
//! read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Number of words in every table (11 bits per word)
pub const WORD_COUNT: usize = 2048;

/// Supported phrase languages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English
    English,
    /// Traditional Chinese
    TraditionalChinese,
}

impl Locale {
    /// All locales, in detection order
    pub const ALL: [Self; 2] = [Self::English, Self::TraditionalChinese];

    /// File name of the locale's table inside a wordlist directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::English => "bip39_eng.txt",
            Self::TraditionalChinese => "bip39_cn.txt",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::English => 0,
            Self::TraditionalChinese => 1,
        }
    }

    fn embedded(self) -> &'static [&'static str; WORD_COUNT] {
        match self {
            Self::English => bip39::Language::English.word_list(),
            Self::TraditionalChinese => bip39::Language::TraditionalChinese.word_list(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => f.write_str("english"),
            Self::TraditionalChinese => f.write_str("traditional_chinese"),
        }
    }
}

impl FromStr for Locale {
    type Err = WordListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "eng" | "english" => Ok(Self::English),
            "zh-tw" | "zh_tw" | "cn" | "traditional_chinese" | "chinese" => {
                Ok(Self::TraditionalChinese)
            }
            other => Err(WordListError::UnknownLocale(other.to_string())),
        }
    }
}

/// Wordlist errors
#[derive(Debug, Error)]
pub enum WordListError {
    /// Backing resource missing, unreadable or malformed
    #[error("cannot load {locale} wordlist from {source_name}: {reason}")]
    ResourceLoad {
        /// Locale being loaded
        locale: Locale,
        /// Where the table was read from
        source_name: String,
        /// What went wrong
        reason: String,
    },
    /// Unrecognised locale name
    #[error("unknown locale: {0}")]
    UnknownLocale(String),
}

/// One locale's ordered table of 2048 words
pub struct WordList {
    locale: Locale,
    words: Vec<String>,
    index: HashMap<String, u16>,
}

impl WordList {
    /// Build a table from words in index order.
    ///
    /// # Errors
    /// Returns `ResourceLoad` unless there are exactly 2048 unique words
    pub fn from_words<I, S>(locale: Locale, source_name: &str, words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fail = |reason: String| WordListError::ResourceLoad {
            locale,
            source_name: source_name.to_string(),
            reason,
        };

        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.len() != WORD_COUNT {
            return Err(fail(format!(
                "expected {WORD_COUNT} words, found {}",
                words.len()
            )));
        }

        let mut index = HashMap::with_capacity(WORD_COUNT);
        for (i, word) in words.iter().enumerate() {
            if word.is_empty() {
                return Err(fail(format!("empty entry at line {}", i + 1)));
            }
            let position = u16::try_from(i).map_err(|_| fail("table too large".to_string()))?;
            if index.insert(word.clone(), position).is_some() {
                return Err(fail(format!("duplicate word {word:?} at line {}", i + 1)));
            }
        }

        Ok(Self {
            locale,
            words,
            index,
        })
    }

    /// Read a table from a text file with one word per line.
    ///
    /// A single trailing newline is accepted; `\r\n` endings are stripped.
    ///
    /// # Errors
    /// Returns `ResourceLoad` if the file is missing or not an exact table
    pub fn from_file(locale: Locale, path: &Path) -> Result<Self, WordListError> {
        let source_name = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| WordListError::ResourceLoad {
            locale,
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        let contents = contents.strip_suffix('\n').unwrap_or(&contents);
        let lines = contents
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line));
        Self::from_words(locale, &source_name, lines)
    }

    /// The table compiled into the binary
    ///
    /// # Errors
    /// Never fails for the bundled tables; validation is shared with file loads
    pub fn embedded(locale: Locale) -> Result<Self, WordListError> {
        Self::from_words(locale, "embedded", locale.embedded().iter().copied())
    }

    /// Locale of this table
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether `word` is in the table (exact match)
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Position of `word` in the table (exact match)
    #[must_use]
    pub fn index_of(&self, word: &str) -> Option<u16> {
        self.index.get(word).copied()
    }

    /// Word at `index`
    #[must_use]
    pub fn word(&self, index: u16) -> Option<&str> {
        self.words.get(usize::from(index)).map(String::as_str)
    }

    /// All words in index order
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl fmt::Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("locale", &self.locale)
            .field("len", &self.words.len())
            .finish()
    }
}

/// Where a provider reads its tables from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordSource {
    /// Tables bundled with the `bip39` crate
    Embedded,
    /// A directory containing [`Locale::file_name`] files
    Directory(PathBuf),
}

#[derive(Default)]
struct Slot {
    table: OnceLock<Arc<WordList>>,
    load_lock: Mutex<()>,
}

/// Lazily-initialised cache of word tables, one load per locale.
pub struct WordLists {
    source: WordSource,
    slots: [Slot; 2],
    loads: AtomicUsize,
}

impl Default for WordLists {
    fn default() -> Self {
        Self::new(WordSource::Embedded)
    }
}

impl WordLists {
    /// Create an empty cache reading from `source`
    #[must_use]
    pub fn new(source: WordSource) -> Self {
        Self {
            source,
            slots: [Slot::default(), Slot::default()],
            loads: AtomicUsize::new(0),
        }
    }

    /// Cache reading `bip39_eng.txt` / `bip39_cn.txt` from `dir`
    #[must_use]
    pub fn from_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self::new(WordSource::Directory(dir.into()))
    }

    /// Configured source
    #[must_use]
    pub const fn source(&self) -> &WordSource {
        &self.source
    }

    /// The table for `locale`, loading it on first use.
    ///
    /// # Errors
    /// Returns `ResourceLoad` if the table cannot be loaded; a failed load is
    /// not cached and the next call tries again.
    pub fn words(&self, locale: Locale) -> Result<Arc<WordList>, WordListError> {
        let slot = &self.slots[locale.slot()];
        if let Some(table) = slot.table.get() {
            return Ok(Arc::clone(table));
        }

        let _guard = slot.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.table.get() {
            return Ok(Arc::clone(table));
        }

        let loaded = match &self.source {
            WordSource::Embedded => WordList::embedded(locale),
            WordSource::Directory(dir) => WordList::from_file(locale, &dir.join(locale.file_name())),
        };
        let table = match loaded {
            Ok(table) => Arc::new(table),
            Err(e) => {
                warn!(%locale, error = %e, "Failed to load wordlist");
                return Err(e);
            }
        };
        self.loads.fetch_add(1, Ordering::Relaxed);
        debug!(%locale, source = ?self.source, "Loaded wordlist");

        Ok(Arc::clone(slot.table.get_or_init(|| table)))
    }

    /// Whether `locale` has been loaded already
    #[must_use]
    pub fn is_loaded(&self, locale: Locale) -> bool {
        self.slots[locale.slot()].table.get().is_some()
    }

    /// Number of successful table loads performed by this provider
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    /// First locale (in [`Locale::ALL`] order) whose table contains `word`
    ///
    /// # Errors
    /// Returns `ResourceLoad` if a table needed for the check cannot be loaded
    pub fn detect_locale(&self, word: &str) -> Result<Option<Locale>, WordListError> {
        for locale in Locale::ALL {
            if self.words(locale)?.contains(word) {
                return Ok(Some(locale));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for WordLists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordLists")
            .field("source", &self.source)
            .field("english", &self.is_loaded(Locale::English))
            .field("traditional_chinese", &self.is_loaded(Locale::TraditionalChinese))
            .finish()
    }
}
