//! Word → definition dictionary for Standard mode

use std::collections::BTreeMap;

use super::ContentError;
use crate::lang::Language;

/// Uppercase words with their definitions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dictionary {
    entries: BTreeMap<String, String>,
}

impl Dictionary {
    /// Parse a `{ "WORD": "definition" }` document.
    ///
    /// Keys are uppercased; entries with letters outside the language are
    /// dropped since they could never be spelled on the grid.
    pub fn from_json(json: &str, lang: Language) -> Result<Self, ContentError> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| ContentError::Json {
                source_name: match lang {
                    Language::English => "english dictionary",
                    Language::Romanian => "romanian dictionary",
                },
                message: e.to_string(),
            })?;
        let total = raw.len();
        let dict = Self::from_entries(raw, lang);
        if dict.len() < total {
            log::warn!(
                "Dropped {} {} dictionary entries with unsupported letters",
                total - dict.len(),
                lang.as_str()
            );
        }
        log::info!("Loaded {} {} dictionary words", dict.len(), lang.as_str());
        Ok(dict)
    }

    pub fn from_entries<I, K, V>(entries: I, lang: Language) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dict = Self::default();
        for (word, definition) in entries {
            let word = word.as_ref().trim().to_uppercase();
            if lang.is_word(&word) {
                dict.entries.entry(word).or_insert_with(|| definition.into());
            }
        }
        dict
    }

    pub fn definition(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    /// Words short enough for a grid of `max_len`
    pub fn words_up_to(&self, max_len: usize) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|w| w.chars().count() <= max_len)
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self, pretty: bool) -> String {
        let out = if pretty {
            serde_json::to_string_pretty(&self.entries)
        } else {
            serde_json::to_string(&self.entries)
        };
        out.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uppercases_and_filters() {
        let json = r#"{ "grace": "Unmerited favour", "HOPE": "Expectation", "don't": "x" }"#;
        let dict = Dictionary::from_json(json, Language::English).unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.definition("GRACE"), Some("Unmerited favour"));
        assert_eq!(dict.definition("DON'T"), None);
    }

    #[test]
    fn test_romanian_letters_are_kept() {
        let json = r#"{ "ÎNGER": "Ființă cerească", "ȘARPE": "Reptilă" }"#;
        let dict = Dictionary::from_json(json, Language::Romanian).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(Dictionary::from_json(json, Language::English).unwrap().is_empty());
    }

    #[test]
    fn test_words_up_to_counts_letters_not_bytes() {
        let dict = Dictionary::from_entries([("ȘARPE", "a"), ("ÎNGERUL", "b")], Language::Romanian);
        assert_eq!(dict.words_up_to(5), vec!["ȘARPE"]);
        assert_eq!(dict.words_up_to(7).len(), 2);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Dictionary::from_json("[]", Language::English),
            Err(ContentError::Json { .. })
        ));
    }
}
