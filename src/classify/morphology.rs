//! Word-shape signals typical of Korean internet slang.

use regex::Regex;
use std::sync::LazyLock;

/// Only Hangul compatibility consonants (initial-sound abbreviations like ㅋㅋ).
static CONSONANT_ONLY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[ㄱ-ㅎ]+$").ok());

/// Runs of three or more compatibility jamo.
static JAMO_RUN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[ㄱ-ㅎㅏ-ㅣ]{3,}").ok());

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const FINAL_COUNT: u32 = 28;
/// Final-consonant index of ㅇ in the syllable encoding.
const FINAL_IEUNG: u32 = 21;

/// Points awarded per signal before normalization.
const CONSONANT_ONLY_POINTS: f64 = 2.0;
const REPEATED_JAMO_POINTS: f64 = 1.0;
const IEUNG_FINAL_POINTS: f64 = 0.5;
const SHORT_WORD_POINTS: f64 = 0.5;
const NORMALIZER: f64 = 3.0;

fn matches(pattern: &LazyLock<Option<Regex>>, word: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(word))
}

/// The word is made up only of compatibility consonants.
pub fn is_consonant_only(word: &str) -> bool {
    matches(&CONSONANT_ONLY, word)
}

/// Some compatibility jamo repeats at least three times in a row.
pub fn has_repeated_jamo(word: &str) -> bool {
    let Some(re) = JAMO_RUN.as_ref() else {
        return false;
    };
    re.find_iter(word).any(|m| {
        let chars: Vec<char> = m.as_str().chars().collect();
        chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
    })
}

/// The last character is a Hangul syllable ending in ㅇ (e.g. 킹받능).
pub fn ends_with_ieung_final(word: &str) -> bool {
    let Some(last) = word.chars().last() else {
        return false;
    };
    let code = last as u32;
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code)
        && (code - SYLLABLE_BASE) % FINAL_COUNT == FINAL_IEUNG
}

/// Additive word-shape score normalized to `[0, 1]`.
pub fn morphology_score(word: &str) -> f64 {
    let mut points = 0.0;
    if is_consonant_only(word) {
        points += CONSONANT_ONLY_POINTS;
    }
    if has_repeated_jamo(word) {
        points += REPEATED_JAMO_POINTS;
    }
    if ends_with_ieung_final(word) {
        points += IEUNG_FINAL_POINTS;
    }
    if (2..=4).contains(&word.chars().count()) {
        points += SHORT_WORD_POINTS;
    }
    (points / NORMALIZER).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn consonant_only_words() {
        assert!(is_consonant_only("ㅋㅋㅋ"));
        assert!(is_consonant_only("ㅇㅈ"));
        assert!(!is_consonant_only("ㅋㅋ웃"));
        assert!(!is_consonant_only(""));
    }

    #[test]
    fn repeated_jamo_needs_three_identical() {
        assert!(has_repeated_jamo("ㅋㅋㅋ"));
        assert!(has_repeated_jamo("아ㅠㅠㅠ"));
        assert!(!has_repeated_jamo("ㅋㅋ"));
        assert!(!has_repeated_jamo("ㄱㄴㄷ"));
        assert!(!has_repeated_jamo("하하하"));
    }

    #[test]
    fn ieung_final_syllable() {
        assert!(ends_with_ieung_final("킹받능"));
        assert!(ends_with_ieung_final("갓생"));
        assert!(!ends_with_ieung_final("킹받네"));
        assert!(!ends_with_ieung_final("ㅇ"));
        assert!(!ends_with_ieung_final(""));
    }

    #[test]
    fn consonant_run_saturates() {
        // 2 + 1 + 0.5 = 3.5 points, capped
        assert_relative_eq!(morphology_score("ㅋㅋㅋ"), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn distinct_consonants_without_run() {
        // 2 + 0.5 = 2.5 points
        assert_relative_eq!(morphology_score("ㄱㄴㄷ"), 2.5 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn ordinary_words() {
        assert_relative_eq!(morphology_score("갓생"), 1.0 / 3.0, epsilon = 1e-10);
        assert_relative_eq!(morphology_score("사랑합니다요"), 0.0, epsilon = 1e-10);
        assert_relative_eq!(morphology_score(""), 0.0, epsilon = 1e-10);
    }
}
