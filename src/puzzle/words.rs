//! Choosing the ten target words for a level
//!
//! Standard mode draws from the language dictionary. Scripture mode walks a
//! shuffled playlist of chapters and extracts words from one chapter's verses,
//! remembering which verse each word came from.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MIN_SCRIPTURE_WORD_LEN, WORDS_PER_LEVEL};
use crate::content::{Bible, Dictionary};
use crate::lang::Language;

/// Where a scripture word was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub book: String,
    pub chapter: String,
    pub verse: String,
}

impl Provenance {
    /// Human readable reference, e.g. `Genesis 1:3`
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// The words picked for one level
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordSet {
    pub words: Vec<String>,
    /// Empty outside Scripture mode
    pub provenance: BTreeMap<String, Provenance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("only {found} usable words, {needed} needed")]
    InsufficientWords { found: usize, needed: usize },
    #[error("no scripture available for {}", .language.as_str())]
    NoScripture { language: Language },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    pub book: String,
    pub chapter: String,
}

/// Shuffled round-robin over every chapter of one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ChapterPlaylist {
    chapters: Vec<ChapterRef>,
}

impl ChapterPlaylist {
    /// Rebuild on level 1 or when empty; otherwise keep the current order
    pub fn ensure<R: Rng + ?Sized>(&mut self, bible: &Bible, level: u32, rng: &mut R) {
        if level != 1 && !self.chapters.is_empty() {
            return;
        }
        self.chapters = bible
            .chapter_refs()
            .map(|(book, chapter)| ChapterRef {
                book: book.to_string(),
                chapter: chapter.to_string(),
            })
            .collect();
        self.chapters.shuffle(rng);
        log::debug!("Chapter playlist rebuilt with {} chapters", self.chapters.len());
    }

    pub fn chapter_for_level(&self, level: u32) -> Option<&ChapterRef> {
        if self.chapters.is_empty() {
            return None;
        }
        let idx = (level.max(1) as usize - 1) % self.chapters.len();
        self.chapters.get(idx)
    }

    pub fn clear(&mut self) {
        self.chapters.clear();
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// Pick ten dictionary words that fit the grid
pub fn select_standard<R: Rng + ?Sized>(
    dict: &Dictionary,
    grid_size: usize,
    rng: &mut R,
) -> Result<WordSet, SelectionError> {
    let mut candidates = dict.words_up_to(grid_size);
    if candidates.len() < WORDS_PER_LEVEL {
        return Err(SelectionError::InsufficientWords {
            found: candidates.len(),
            needed: WORDS_PER_LEVEL,
        });
    }
    candidates.shuffle(rng);
    Ok(WordSet {
        words: candidates
            .into_iter()
            .take(WORDS_PER_LEVEL)
            .map(str::to_string)
            .collect(),
        provenance: BTreeMap::new(),
    })
}

/// Pick ten words from the playlist chapter for `level`
pub fn select_scripture<R: Rng + ?Sized>(
    bible: Option<&Bible>,
    playlist: &mut ChapterPlaylist,
    level: u32,
    language: Language,
    grid_size: usize,
    rng: &mut R,
) -> Result<WordSet, SelectionError> {
    let bible = bible.ok_or(SelectionError::NoScripture { language })?;
    playlist.ensure(bible, level, rng);
    let chapter_ref = playlist
        .chapter_for_level(level)
        .ok_or(SelectionError::NoScripture { language })?;
    let chapter = bible
        .chapter(&chapter_ref.book, &chapter_ref.chapter)
        .ok_or(SelectionError::NoScripture { language })?;

    let mut seen = HashSet::new();
    let mut candidates: Vec<(String, Provenance)> = Vec::new();
    for verse in &chapter.verses {
        for word in tokenize(&verse.text, language) {
            let len = word.chars().count();
            if len < MIN_SCRIPTURE_WORD_LEN || len > grid_size || !seen.insert(word.clone()) {
                continue;
            }
            candidates.push((
                word,
                Provenance {
                    book: chapter_ref.book.clone(),
                    chapter: chapter_ref.chapter.clone(),
                    verse: verse.number.clone(),
                },
            ));
        }
    }

    if candidates.len() < WORDS_PER_LEVEL {
        log::warn!(
            "{} {} has only {} usable words",
            chapter_ref.book,
            chapter_ref.chapter,
            candidates.len()
        );
        return Err(SelectionError::InsufficientWords {
            found: candidates.len(),
            needed: WORDS_PER_LEVEL,
        });
    }

    candidates.shuffle(rng);
    candidates.truncate(WORDS_PER_LEVEL);
    let words = candidates.iter().map(|(w, _)| w.clone()).collect();
    Ok(WordSet {
        words,
        provenance: candidates.into_iter().collect(),
    })
}

/// Split text into uppercase runs of the language's letters
pub fn tokenize(text: &str, language: Language) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars().flat_map(char::to_uppercase).map(fold_cedilla) {
        if language.is_word_letter(c) {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Map cedilla Ş/Ţ (common in older Romanian texts) to the comma-below letters
pub fn fold_cedilla(c: char) -> char {
    match c {
        'Ş' => 'Ș',
        'ş' => 'ș',
        'Ţ' => 'Ț',
        'ţ' => 'ț',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_tokenize_english() {
        let words = tokenize("And God said, Let there be light:", Language::English);
        assert_eq!(words, ["AND", "GOD", "SAID", "LET", "THERE", "BE", "LIGHT"]);
    }

    #[test]
    fn test_tokenize_romanian_diacritics() {
        let words = tokenize("„Să fie lumină!” Şi Duhul se mişca", Language::Romanian);
        assert_eq!(words, ["SĂ", "FIE", "LUMINĂ", "ȘI", "DUHUL", "SE", "MIȘCA"]);
        // English splits on the same letters
        assert_eq!(tokenize("lumină", Language::English), ["LUMIN"]);
    }

    #[test]
    fn test_standard_selection_takes_ten_fitting_words() {
        let content = fixtures::content();
        let dict = content.dictionary(Language::English).unwrap();
        let mut rng = Pcg32::seed_from_u64(4);
        let set = select_standard(dict, 13, &mut rng).unwrap();
        assert_eq!(set.words.len(), WORDS_PER_LEVEL);
        assert!(set.provenance.is_empty());
        let unique: HashSet<_> = set.words.iter().collect();
        assert_eq!(unique.len(), WORDS_PER_LEVEL);
    }

    #[test]
    fn test_standard_selection_insufficient_words() {
        let dict = Dictionary::from_entries(
            [
                ("CAT", "a"),
                ("DOG", "b"),
                ("BIRD", "c"),
                ("FISH", "d"),
                ("HORSE", "e"),
                ("SHEEP", "f"),
                ("GOAT", "g"),
                ("ELEPHANT", "h"),
                ("GIRAFFE", "i"),
                ("BUFFALO", "j"),
            ],
            Language::English,
        );
        let mut rng = Pcg32::seed_from_u64(5);
        let err = select_standard(&dict, 5, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SelectionError::InsufficientWords {
                found: 7,
                needed: 10
            }
        );
    }

    #[test]
    fn test_scripture_selection_records_provenance() {
        let content = fixtures::content();
        let bible = content.corpus.bible(Language::English);
        let mut playlist = ChapterPlaylist::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let set =
            select_scripture(bible, &mut playlist, 1, Language::English, 13, &mut rng).unwrap();
        assert_eq!(playlist.len(), 3);
        assert_eq!(set.words.len(), WORDS_PER_LEVEL);
        let bible = bible.unwrap();
        for word in &set.words {
            let p = &set.provenance[word];
            let text = bible.verse_text(&p.book, &p.chapter, &p.verse).unwrap();
            assert!(tokenize(text, Language::English).contains(word));
            assert!(word.chars().count() >= MIN_SCRIPTURE_WORD_LEN);
        }
    }

    #[test]
    fn test_first_occurrence_provenance_wins() {
        use crate::content::{Book, Chapter, Verse};

        let verse = |n: &str, text: &str| Verse {
            number: n.to_string(),
            text: text.to_string(),
        };
        let bible = Bible::new(vec![Book {
            name: "Psalms".to_string(),
            chapters: vec![Chapter {
                number: "23".to_string(),
                verses: vec![
                    verse("1", "Lord shepherd shall want maketh green pastures"),
                    verse("2", "leadeth still waters restoreth soul"),
                    verse("3", "Lord shepherd paths righteousness"),
                ],
            }],
        }]);
        let mut playlist = ChapterPlaylist::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let set = select_scripture(Some(&bible), &mut playlist, 1, Language::English, 13, &mut rng)
            .unwrap();
        // 14 distinct usable words, 10 chosen
        for word in &set.words {
            let verse = &set.provenance[word].verse;
            match word.as_str() {
                "LORD" | "SHEPHERD" => assert_eq!(verse, "1"),
                "PATHS" | "RIGHTEOUSNESS" => assert_eq!(verse, "3"),
                _ => {}
            }
        }
        if let Some(p) = set.provenance.get("LORD") {
            assert_eq!(p.reference(), "Psalms 23:1");
        }
    }

    #[test]
    fn test_playlist_round_robin() {
        let content = fixtures::content();
        let bible = content.corpus.bible(Language::English).unwrap();
        let mut playlist = ChapterPlaylist::default();
        let mut rng = Pcg32::seed_from_u64(8);
        playlist.ensure(bible, 1, &mut rng);
        let first = playlist.chapter_for_level(1).cloned();
        assert_eq!(playlist.chapter_for_level(4).cloned(), first);

        // Later levels keep the order
        let before = playlist.clone();
        playlist.ensure(bible, 2, &mut rng);
        assert_eq!(playlist, before);

        playlist.clear();
        assert!(playlist.chapter_for_level(1).is_none());
    }

    #[test]
    fn test_small_grid_chapter_is_insufficient() {
        let content = fixtures::content();
        let bible = content.corpus.bible(Language::English);
        let mut playlist = ChapterPlaylist::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let err =
            select_scripture(bible, &mut playlist, 1, Language::English, 4, &mut rng).unwrap_err();
        assert!(matches!(err, SelectionError::InsufficientWords { .. }));
    }

    #[test]
    fn test_missing_scripture() {
        let mut playlist = ChapterPlaylist::default();
        let mut rng = Pcg32::seed_from_u64(10);
        let err =
            select_scripture(None, &mut playlist, 1, Language::Romanian, 13, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SelectionError::NoScripture {
                language: Language::Romanian
            }
        );
    }
}
