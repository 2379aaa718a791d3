//! Languages and content modes

use serde::{Deserialize, Serialize};

/// Puzzle language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    #[default]
    Romanian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Romanian];

    /// Key used in content files and mode labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Romanian => "romanian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "romanian" | "ro" => Some(Language::Romanian),
            _ => None,
        }
    }

    /// Letters used for filler cells, in alphabet order
    pub fn alphabet(&self) -> &'static [char] {
        const ENGLISH: [char; 26] = [
            'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q',
            'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
        ];
        const ROMANIAN: [char; 30] = [
            'A', 'Ă', 'Â', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'Î', 'J', 'K', 'L', 'M', 'N',
            'O', 'P', 'R', 'S', 'Ș', 'T', 'Ț', 'U', 'V', 'W', 'X', 'Y', 'Z',
        ];
        match self {
            Language::English => &ENGLISH,
            Language::Romanian => &ROMANIAN,
        }
    }

    /// Whether an uppercase char can appear inside a word of this language.
    ///
    /// Both languages accept the plain A-Z range; Romanian adds its five
    /// diacritic letters.
    pub fn is_word_letter(&self, c: char) -> bool {
        if c.is_ascii_uppercase() {
            return true;
        }
        match self {
            Language::English => false,
            Language::Romanian => matches!(c, 'Ă' | 'Â' | 'Î' | 'Ș' | 'Ț'),
        }
    }

    /// Whether every char of an uppercase word belongs to this language
    pub fn is_word(&self, word: &str) -> bool {
        !word.is_empty() && word.chars().all(|c| self.is_word_letter(c))
    }
}

/// Where a level's words come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Mode {
    /// Random words from the language dictionary
    Standard,
    /// Words extracted from one chapter of the verse corpus
    #[default]
    Scripture,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "Standard",
            Mode::Scripture => "Scripture",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "dictionary" => Some(Mode::Standard),
            "scripture" | "bible" => Some(Mode::Scripture),
            _ => None,
        }
    }

    /// Label stored in level records, e.g. `Scripture (english)`
    pub fn label(&self, language: Language) -> String {
        format!("{} ({})", self.as_str(), language.as_str())
    }

    pub fn toggled(&self) -> Self {
        match self {
            Mode::Standard => Mode::Scripture,
            Mode::Scripture => Mode::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_sizes() {
        assert_eq!(Language::English.alphabet().len(), 26);
        assert_eq!(Language::Romanian.alphabet().len(), 30);
    }

    #[test]
    fn test_alphabet_letters_are_word_letters() {
        for lang in Language::ALL {
            assert!(lang.alphabet().iter().all(|&c| lang.is_word_letter(c)));
        }
    }

    #[test]
    fn test_romanian_diacritics() {
        assert!(Language::Romanian.is_word("ÎNCEPUT"));
        assert!(Language::Romanian.is_word("ȘI"));
        assert!(!Language::English.is_word("ȘI"));
        assert!(!Language::English.is_word("DON'T"));
        assert!(!Language::English.is_word(""));
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(Mode::Scripture.label(Language::English), "Scripture (english)");
        assert_eq!(Mode::Standard.label(Language::Romanian), "Standard (romanian)");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Language::from_str("EN"), Some(Language::English));
        assert_eq!(Language::from_str("klingon"), None);
        assert_eq!(Mode::from_str("bible"), Some(Mode::Scripture));
        assert_eq!(Mode::Standard.toggled(), Mode::Scripture);
    }
}
