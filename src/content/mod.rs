//! Read-only game content
//!
//! Three documents are loaded once at startup: the verse corpus and one
//! dictionary per language. Any of them failing to parse is fatal; the game
//! does not start without all three.

pub mod corpus;
pub mod dictionary;
pub mod import;

use std::collections::BTreeMap;

use thiserror::Error;

pub use corpus::{Bible, Book, Chapter, Corpus, Verse};
pub use dictionary::Dictionary;

use crate::lang::Language;

/// File names served next to the game (and read by the native front end)
pub const CORPUS_FILE: &str = "bible_data.json";
pub const ENGLISH_DICTIONARY_FILE: &str = "english_dictionary.json";
pub const ROMANIAN_DICTIONARY_FILE: &str = "romanian_dictionary.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid JSON in {source_name}: {message}")]
    Json {
        source_name: &'static str,
        message: String,
    },
    #[error("unexpected content layout: {0}")]
    Format(String),
}

/// Everything the word source selector reads
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub corpus: Corpus,
    dictionaries: BTreeMap<Language, Dictionary>,
}

impl Content {
    pub fn new(corpus: Corpus, english: Dictionary, romanian: Dictionary) -> Self {
        let mut dictionaries = BTreeMap::new();
        dictionaries.insert(Language::English, english);
        dictionaries.insert(Language::Romanian, romanian);
        Self {
            corpus,
            dictionaries,
        }
    }

    /// Parse the three startup documents
    pub fn from_json(corpus: &str, english: &str, romanian: &str) -> Result<Self, ContentError> {
        Ok(Self::new(
            Corpus::from_json(corpus)?,
            Dictionary::from_json(english, Language::English)?,
            Dictionary::from_json(romanian, Language::Romanian)?,
        ))
    }

    /// Read the startup documents from a directory (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_dir(dir: &std::path::Path) -> Result<Self, ContentError> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| ContentError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };
        let content = Self::from_json(
            &read(CORPUS_FILE)?,
            &read(ENGLISH_DICTIONARY_FILE)?,
            &read(ROMANIAN_DICTIONARY_FILE)?,
        )?;
        log::info!("All 3 content files loaded from {}", dir.display());
        Ok(content)
    }

    pub fn dictionary(&self, lang: Language) -> Option<&Dictionary> {
        self.dictionaries.get(&lang)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small hand-written content shared by unit tests

    use super::*;

    pub const CORPUS: &str = r#"{
        "english": {
            "Genesis": {
                "1": {
                    "1": "In the beginning God created the heaven and the earth.",
                    "2": "And the earth was without form, and void; and darkness was upon the face of the deep. And the Spirit of God moved upon the face of the waters.",
                    "3": "And God said, Let there be light: and there was light.",
                    "4": "And God saw the light, that it was good: and God divided the light from the darkness."
                },
                "2": {
                    "1": "Thus the heavens and the earth were finished, and all the host of them.",
                    "2": "And on the seventh day God ended his work which he had made; and he rested on the seventh day from all his work which he had made.",
                    "3": "And God blessed the seventh day, and sanctified it: because that in it he had rested from all his work which God created and made."
                }
            },
            "Ruth": {
                "1": {
                    "16": "And Ruth said, Intreat me not to leave thee, or to return from following after thee: for whither thou goest, I will go; and where thou lodgest, I will lodge: thy people shall be my people, and thy God my God."
                }
            }
        },
        "romanian": {
            "Geneza": {
                "1": {
                    "1": "La început, Dumnezeu a făcut cerurile și pământul.",
                    "2": "Pământul era pustiu și gol; peste fața adâncului de ape era întuneric, și Duhul lui Dumnezeu Se mișca pe deasupra apelor.",
                    "3": "Dumnezeu a zis: „Să fie lumină!” Și a fost lumină.",
                    "4": "Dumnezeu a văzut că lumina era bună; și Dumnezeu a despărțit lumina de întuneric."
                }
            }
        }
    }"#;

    pub const ENGLISH: &str = r#"{
        "CAT": "A small domesticated carnivorous mammal",
        "APPLE": "The fruit of the apple tree",
        "BREAD": "A food made of flour and water",
        "CHAIR": "A seat for one person",
        "DREAM": "Images experienced during sleep",
        "EAGLE": "A large bird of prey",
        "FLAME": "The glowing gas of a fire",
        "GRAPE": "A small round fruit growing in bunches",
        "HORSE": "A large hoofed mammal",
        "IVORY": "The hard white material of tusks",
        "JEWEL": "A precious stone",
        "KNIGHT": "A mounted soldier",
        "LANTERN": "A portable case protecting a light",
        "MOUNTAIN": "A large natural elevation",
        "NOTEBOOK": "A book of blank pages",
        "ORCHARD": "A piece of land planted with fruit trees",
        "PILGRIM": "A person who journeys to a sacred place"
    }"#;

    pub const ROMANIAN: &str = r#"{
        "ÎNGER": "Ființă cerească",
        "ȘARPE": "Reptilă fără picioare",
        "PĂMÂNT": "Planeta pe care trăim",
        "LUMINĂ": "Radiație vizibilă",
        "CASĂ": "Clădire de locuit",
        "MASĂ": "Mobilă cu blat",
        "PÂINE": "Aliment din făină",
        "APĂ": "Lichid incolor",
        "FOC": "Ardere cu flacără",
        "STEA": "Corp ceresc luminos",
        "MUNTE": "Formă de relief înaltă"
    }"#;

    pub fn content() -> Content {
        Content::from_json(CORPUS, ENGLISH, ROMANIAN).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_content_loads() {
        let content = fixtures::content();
        assert!(content.corpus.bible(Language::English).is_some());
        assert!(content.corpus.bible(Language::Romanian).is_some());
        assert_eq!(content.dictionary(Language::English).unwrap().len(), 17);
        assert_eq!(content.dictionary(Language::Romanian).unwrap().len(), 11);
    }

    #[test]
    fn test_any_bad_source_is_fatal() {
        let err = Content::from_json(fixtures::CORPUS, "{", fixtures::ROMANIAN).unwrap_err();
        assert!(matches!(
            err,
            ContentError::Json {
                source_name: "english dictionary",
                ..
            }
        ));
    }
}
