//! Standard-dictionary lookups.

use crate::error::Result;
use std::collections::HashSet;
use tracing::warn;

/// Neutral score when the dictionary cannot answer.
pub const UNCERTAIN_SCORE: f64 = 0.5;

/// A source of standard-dictionary entries.
///
/// Implementations wrap an external service; they should apply their own
/// timeouts and report failures as `ExternalService` errors.
pub trait DictionaryLookup: Send + Sync {
    /// Number of exact entries for `word`.
    fn match_count(&self, word: &str) -> Result<usize>;

    /// Whether `word` is a standard word.
    fn is_standard(&self, word: &str) -> Result<bool> {
        Ok(self.match_count(word)? > 0)
    }
}

/// In-memory word list.
#[derive(Debug, Clone, Default)]
pub struct StaticDictionary {
    words: HashSet<String>,
}

impl StaticDictionary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl DictionaryLookup for StaticDictionary {
    fn match_count(&self, word: &str) -> Result<usize> {
        Ok(usize::from(self.words.contains(word)))
    }
}

/// 1 when the word is absent from the dictionary, 0 when present and 0.5
/// when there is no dictionary or the lookup fails.
pub fn dictionary_score(lookup: Option<&dyn DictionaryLookup>, word: &str) -> f64 {
    let Some(lookup) = lookup else {
        return UNCERTAIN_SCORE;
    };
    match lookup.match_count(word) {
        Ok(0) => 1.0,
        Ok(_) => 0.0,
        Err(e) => {
            warn!(word, error = %e, "dictionary lookup failed; using neutral score");
            UNCERTAIN_SCORE
        }
    }
}
