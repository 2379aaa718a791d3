//! Nested verse corpus: language → book → chapter → verse → text
//!
//! Books keep the order of the source document. Chapters and verses are
//! ordered numerically so "first occurrence" rules follow reading order.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::ContentError;
use crate::lang::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub number: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: String,
    pub verses: Vec<Verse>,
}

impl Chapter {
    pub fn verse(&self, number: &str) -> Option<&Verse> {
        self.verses.iter().find(|v| v.number == number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    pub chapters: Vec<Chapter>,
}

impl Book {
    pub fn chapter(&self, number: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }
}

/// All scripture text for one language
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bible {
    books: Vec<Book>,
}

impl Bible {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, name: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.name == name)
    }

    pub fn chapter(&self, book: &str, chapter: &str) -> Option<&Chapter> {
        self.book(book)?.chapter(chapter)
    }

    pub fn verse_text(&self, book: &str, chapter: &str, verse: &str) -> Option<&str> {
        self.chapter(book, chapter)?
            .verse(verse)
            .map(|v| v.text.as_str())
    }

    /// Every (book, chapter) pair in reading order
    pub fn chapter_refs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.books.iter().flat_map(|b| {
            b.chapters
                .iter()
                .map(move |c| (b.name.as_str(), c.number.as_str()))
        })
    }

    pub fn chapter_count(&self) -> usize {
        self.books.iter().map(|b| b.chapters.len()).sum()
    }

    pub fn verse_count(&self) -> usize {
        self.books
            .iter()
            .flat_map(|b| &b.chapters)
            .map(|c| c.verses.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chapter_count() == 0
    }

    /// Add a book, or merge it chapter by chapter into the existing one.
    ///
    /// A chapter with the same number replaces the old one; other chapters
    /// stay. An existing book keeps its position.
    pub fn merge_book(&mut self, book: Book) {
        let Some(existing) = self.books.iter_mut().find(|b| b.name == book.name) else {
            self.books.push(book);
            return;
        };
        for chapter in book.chapters {
            match existing.chapters.iter_mut().find(|c| c.number == chapter.number) {
                Some(old) => *old = chapter,
                None => existing.chapters.push(chapter),
            }
        }
        existing.chapters.sort_by_key(|c| numeric_key(&c.number));
    }

    fn from_value(lang: Language, value: &Value) -> Result<Self, ContentError> {
        let books = as_object(value, lang.as_str())?
            .iter()
            .map(|(name, chapters)| -> Result<Book, ContentError> {
                let path = format!("{}/{}", lang.as_str(), name);
                let mut chapters = as_object(chapters, &path)?
                    .iter()
                    .map(|(number, verses)| -> Result<Chapter, ContentError> {
                        let path = format!("{path}/{number}");
                        let mut verses = as_object(verses, &path)?
                            .iter()
                            .map(|(n, text)| match text {
                                Value::String(s) => Ok(Verse {
                                    number: n.clone(),
                                    text: s.clone(),
                                }),
                                _ => Err(ContentError::Format(format!(
                                    "{path}/{n}: verse text is not a string"
                                ))),
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        verses.sort_by_key(|v| numeric_key(&v.number));
                        Ok(Chapter {
                            number: number.clone(),
                            verses,
                        })
                    })
                    .collect::<Result<Vec<_>, ContentError>>()?;
                chapters.sort_by_key(|c| numeric_key(&c.number));
                Ok(Book {
                    name: name.clone(),
                    chapters,
                })
            })
            .collect::<Result<Vec<_>, ContentError>>()?;
        Ok(Self { books })
    }

    fn to_value(&self) -> Value {
        let books: Map<String, Value> = self
            .books
            .iter()
            .map(|b| {
                let chapters: Map<String, Value> = b
                    .chapters
                    .iter()
                    .map(|c| {
                        let verses: Map<String, Value> = c
                            .verses
                            .iter()
                            .map(|v| (v.number.clone(), Value::String(v.text.clone())))
                            .collect();
                        (c.number.clone(), Value::Object(verses))
                    })
                    .collect();
                (b.name.clone(), Value::Object(chapters))
            })
            .collect();
        Value::Object(books)
    }
}

/// Scripture text for every language present in the source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Corpus {
    bibles: BTreeMap<Language, Bible>,
}

impl Corpus {
    /// Parse the nested JSON document.
    ///
    /// Unknown language keys are skipped with a warning; any structural
    /// problem is an error.
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let root: Value = serde_json::from_str(json).map_err(|e| ContentError::Json {
            source_name: "corpus",
            message: e.to_string(),
        })?;
        let mut bibles = BTreeMap::new();
        for (key, value) in as_object(&root, "corpus")? {
            let Some(lang) = Language::from_str(key) else {
                log::warn!("Skipping unknown corpus language '{}'", key);
                continue;
            };
            let bible = Bible::from_value(lang, value)?;
            log::info!(
                "Loaded {} scripture: {} books, {} chapters, {} verses",
                lang.as_str(),
                bible.books().len(),
                bible.chapter_count(),
                bible.verse_count()
            );
            bibles.insert(lang, bible);
        }
        Ok(Self { bibles })
    }

    /// Scripture for a language, if it has at least one chapter
    pub fn bible(&self, lang: Language) -> Option<&Bible> {
        self.bibles.get(&lang).filter(|b| !b.is_empty())
    }
}

/// Merge imported books into a corpus document in place.
///
/// Only the `lang` entry is rewritten. Every other top-level key, including
/// languages the game does not know, is left untouched and keeps its position.
pub fn merge_books(
    document: &mut Value,
    lang: Language,
    books: Vec<Book>,
) -> Result<(), ContentError> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| ContentError::Format("corpus: expected an object".into()))?;
    let mut bible = match root.get(lang.as_str()) {
        Some(existing) => Bible::from_value(lang, existing)?,
        None => Bible::default(),
    };
    for book in books {
        bible.merge_book(book);
    }
    root.insert(lang.as_str().to_string(), bible.to_value());
    Ok(())
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ContentError> {
    value
        .as_object()
        .ok_or_else(|| ContentError::Format(format!("{path}: expected an object")))
}

/// Numeric keys sort by value; anything else sorts after, by text
fn numeric_key(key: &str) -> (u32, String) {
    match key.trim().parse::<u32>() {
        Ok(n) => (n, String::new()),
        Err(_) => (u32::MAX, key.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "english": {
            "Genesis": {
                "2": { "1": "Thus the heavens and the earth were finished" },
                "1": {
                    "10": "And God called the dry land Earth",
                    "2": "And the earth was without form, and void",
                    "1": "In the beginning God created the heaven and the earth"
                }
            },
            "Exodus": { "1": { "1": "Now these are the names" } }
        },
        "klingon": { "Qo'noS": {} }
    }"#;

    #[test]
    fn test_parse_orders_chapters_and_verses_numerically() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        let bible = corpus.bible(Language::English).unwrap();
        let genesis = bible.book("Genesis").unwrap();
        let chapters: Vec<_> = genesis.chapters.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(chapters, ["1", "2"]);
        let verses: Vec<_> = genesis.chapters[0].verses.iter().map(|v| v.number.as_str()).collect();
        assert_eq!(verses, ["1", "2", "10"]);
    }

    #[test]
    fn test_books_keep_document_order() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        let bible = corpus.bible(Language::English).unwrap();
        let names: Vec<_> = bible.books().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Genesis", "Exodus"]);
        assert_eq!(bible.chapter_refs().count(), 3);
    }

    #[test]
    fn test_missing_language_has_no_bible() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        assert!(corpus.bible(Language::Romanian).is_none());
    }

    #[test]
    fn test_verse_lookup() {
        let corpus = Corpus::from_json(SAMPLE).unwrap();
        let bible = corpus.bible(Language::English).unwrap();
        assert_eq!(
            bible.verse_text("Exodus", "1", "1"),
            Some("Now these are the names")
        );
        assert_eq!(bible.verse_text("Exodus", "2", "1"), None);
    }

    #[test]
    fn test_malformed_corpus_is_an_error() {
        assert!(matches!(Corpus::from_json("[1, 2]"), Err(ContentError::Format(_))));
        assert!(matches!(Corpus::from_json("{ not json"), Err(ContentError::Json { .. })));
        let bad_verse = r#"{ "english": { "Ruth": { "1": { "1": 42 } } } }"#;
        assert!(matches!(Corpus::from_json(bad_verse), Err(ContentError::Format(_))));
    }

    fn book(name: &str, chapters: &[(&str, &str)]) -> Book {
        Book {
            name: name.to_string(),
            chapters: chapters
                .iter()
                .map(|(number, text)| Chapter {
                    number: number.to_string(),
                    verses: vec![Verse {
                        number: "1".into(),
                        text: text.to_string(),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_merge_book_keeps_other_chapters() {
        let mut bible = Bible::new(vec![book("Genesis", &[("1", "old one"), ("2", "old two")])]);
        bible.merge_book(book("Genesis", &[("3", "three")]));
        let genesis = bible.book("Genesis").unwrap();
        let chapters: Vec<_> = genesis.chapters.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(chapters, ["1", "2", "3"]);
    }

    #[test]
    fn test_merge_book_replaces_same_chapter_and_sorts() {
        let mut bible = Bible::new(vec![
            book("Genesis", &[("2", "old two"), ("10", "ten")]),
            book("Exodus", &[("1", "names")]),
        ]);
        bible.merge_book(book("Genesis", &[("2", "new two"), ("1", "one")]));
        bible.merge_book(book("Ruth", &[("1", "whither")]));

        let names: Vec<_> = bible.books().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Genesis", "Exodus", "Ruth"]);
        let genesis = bible.book("Genesis").unwrap();
        let chapters: Vec<_> = genesis.chapters.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(chapters, ["1", "2", "10"]);
        assert_eq!(bible.verse_text("Genesis", "2", "1"), Some("new two"));
    }

    #[test]
    fn test_merge_books_keeps_unknown_languages() {
        let mut document: Value = serde_json::from_str(
            r#"{
                "spanish": { "Génesis": { "1": { "1": "En el principio" } } },
                "english": { "Genesis": { "1": { "1": "In the beginning" } } },
                "romanian": { "Geneza": { "1": { "1": "La început" } } }
            }"#,
        )
        .unwrap();
        let import = vec![book("Genesis", &[("2", "finished")])];
        merge_books(&mut document, Language::English, import).unwrap();

        let keys: Vec<_> = document.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["spanish", "english", "romanian"]);
        assert_eq!(document["spanish"]["Génesis"]["1"]["1"], "En el principio");
        assert_eq!(document["romanian"]["Geneza"]["1"]["1"], "La început");
        assert_eq!(document["english"]["Genesis"]["1"]["1"], "In the beginning");
        assert_eq!(document["english"]["Genesis"]["2"]["1"], "finished");
    }

    #[test]
    fn test_merge_books_adds_missing_language() {
        let mut document = Value::Object(Map::new());
        let import = vec![book("Rut", &[("1", "Rut a zis")])];
        merge_books(&mut document, Language::Romanian, import).unwrap();
        let corpus = Corpus::from_json(&document.to_string()).unwrap();
        assert_eq!(
            corpus.bible(Language::Romanian).unwrap().verse_text("Rut", "1", "1"),
            Some("Rut a zis")
        );

        let mut not_a_corpus = Value::Array(vec![]);
        assert!(merge_books(&mut not_a_corpus, Language::English, vec![]).is_err());
    }
}
