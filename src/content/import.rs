//! Offline tools that produce the content documents
//!
//! - Plain-text scripture → nested corpus books
//! - Unnumbered NIV text → numbered text with a per-book verse summary
//! - Raw dictionary dumps (JSON map or Wiktionary JSONL) → game dictionary

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::corpus::{Book, Chapter, Verse};
use super::dictionary::Dictionary;
use crate::lang::Language;

static CHAPTER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:Chapter|Capitolul)\s+(\d+)\s*$").expect("valid regex"));
static VERSE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+(.*)$").expect("valid regex"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HEADWORD_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-ZĂÂÎȘȚ,\s]+,").expect("valid regex"));
static SOURCE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s+Din\s+").expect("valid regex"));
static PAREN_ASIDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.+?\)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("line {line}: '{text}' appears before any book name")]
    ChapterBeforeBook { line: usize, text: String },
    #[error("no words matched the filters (length {min}-{max})")]
    NoWords { min: usize, max: usize },
    #[error("invalid dictionary source: {0}")]
    Source(String),
}

/// Counts and warnings from a scripture import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub warnings: Vec<String>,
}

#[derive(Default)]
struct ScriptureParser {
    books: Vec<Book>,
    book: Option<String>,
    chapter: Option<String>,
    /// Open verse number and its lines (text, source line number)
    verse: Option<(String, Vec<(String, usize)>)>,
    report: ImportReport,
}

impl ScriptureParser {
    fn finish_verse(&mut self) {
        let Some((number, lines)) = self.verse.take() else {
            return;
        };
        let (Some(book), Some(chapter)) = (self.book.clone(), self.chapter.clone()) else {
            return;
        };
        if lines.is_empty() {
            return;
        }
        let text = lines
            .iter()
            .map(|(l, _)| l.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        if let Some(ch) = self.chapter_mut(&book, &chapter) {
            match ch.verses.iter_mut().find(|v| v.number == number) {
                Some(v) => v.text = text,
                None => ch.verses.push(Verse { number, text }),
            }
        }
    }

    fn chapter_mut(&mut self, book: &str, chapter: &str) -> Option<&mut Chapter> {
        self.books
            .iter_mut()
            .find(|b| b.name == book)?
            .chapters
            .iter_mut()
            .find(|c| c.number == chapter)
    }

    fn start_chapter(&mut self, book: &str, number: &str) {
        let idx = match self.books.iter().position(|b| b.name == book) {
            Some(i) => i,
            None => {
                self.books.push(Book {
                    name: book.to_string(),
                    chapters: Vec::new(),
                });
                self.books.len() - 1
            }
        };
        let chapters = &mut self.books[idx].chapters;
        match chapters.iter_mut().find(|c| c.number == number) {
            Some(c) => c.verses.clear(),
            None => chapters.push(Chapter {
                number: number.to_string(),
                verses: Vec::new(),
            }),
        }
    }
}

/// Parse plain scripture text into books.
///
/// `Chapter N` / `Capitolul N` opens a chapter, and the non-blank line just
/// before chapter 1 names the book. `N text` opens verse N; other lines
/// continue the open verse.
pub fn parse_scripture_text(text: &str) -> Result<(Vec<Book>, ImportReport), ImportError> {
    let mut p = ScriptureParser::default();
    // The two most recent non-blank lines, current one last
    let mut recent: Vec<(String, usize)> = Vec::with_capacity(2);

    // Skip a UTF-8 byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for (idx, raw) in text.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        recent.push((line.to_string(), line_num));
        if recent.len() > 2 {
            recent.remove(0);
        }

        if let Some(caps) = CHAPTER_LINE.captures(line) {
            let number = caps[1].to_string();
            if number.parse::<u32>() == Ok(1) {
                match recent.len().checked_sub(2).map(|i| recent[i].clone()) {
                    Some((name, name_line)) => {
                        // The heading was read as a continuation of the last verse
                        if let Some((_, lines)) = p.verse.as_mut() {
                            if lines.len() > 1 && lines.last().map(|l| l.1) == Some(name_line) {
                                lines.pop();
                            }
                        }
                        if p.book.as_deref() != Some(name.as_str()) {
                            p.finish_verse();
                            log::info!("Found book '{}' (line {})", name, name_line);
                            p.book = Some(name);
                            p.report.books += 1;
                        }
                    }
                    None => p.report.warnings.push(format!(
                        "line {line_num}: chapter 1 without a preceding book name"
                    )),
                }
            }
            p.finish_verse();
            let Some(book) = p.book.clone() else {
                return Err(ImportError::ChapterBeforeBook {
                    line: line_num,
                    text: line.to_string(),
                });
            };
            p.start_chapter(&book, &number);
            p.chapter = Some(number);
            p.report.chapters += 1;
            continue;
        }

        if let Some(caps) = VERSE_LINE.captures(line) {
            p.finish_verse();
            if p.book.is_none() || p.chapter.is_none() {
                p.report.warnings.push(format!(
                    "line {line_num}: verse without book/chapter context skipped"
                ));
                continue;
            }
            p.verse = Some((caps[1].to_string(), vec![(caps[2].to_string(), line_num)]));
            p.report.verses += 1;
            continue;
        }

        if let Some((_, lines)) = p.verse.as_mut() {
            lines.push((line.to_string(), line_num));
            continue;
        }

        p.report
            .warnings
            .push(format!("line {line_num}: unrecognized line '{line}'"));
    }
    p.finish_verse();

    log::info!(
        "Scripture import: {} books, {} chapters, {} verses, {} warnings",
        p.report.books,
        p.report.chapters,
        p.report.verses,
        p.report.warnings.len()
    );
    Ok((p.books, p.report))
}

/// Canonical book order with the expected verse total and verses per chapter.
///
/// Isaiah and Ezekiel totals are the published ones, which do not equal the
/// sum of the chapter counts.
const NIV_VERSE_COUNTS: &[(&str, usize, &[usize])] = &[
    (
        "GENESIS",
        1533,
        &[
            31, 25, 24, 26, 32, 22, 24, 22, 29, 32, 32, 20, 18, 24, 21, 16, 27, 33, 38, 18, 34, 24,
            20, 67, 34, 35, 46, 22, 35, 43, 55, 32, 20, 31, 29, 43, 36, 30, 23, 23, 57, 38, 34, 34,
            28, 34, 31, 22, 33, 26,
        ],
    ),
    (
        "EXODUS",
        1213,
        &[
            22, 25, 22, 31, 23, 30, 25, 32, 35, 29, 10, 51, 22, 31, 27, 36, 16, 27, 25, 26, 36, 31,
            33, 18, 40, 37, 21, 43, 46, 38, 18, 35, 23, 35, 35, 38, 29, 31, 43, 38,
        ],
    ),
    (
        "LEVITICUS",
        859,
        &[
            17, 16, 17, 35, 19, 30, 38, 36, 24, 20, 47, 8, 59, 57, 33, 34, 16, 30, 37, 27, 24, 33,
            44, 23, 55, 46, 34,
        ],
    ),
    (
        "NUMBERS",
        1288,
        &[
            54, 34, 51, 49, 31, 27, 89, 26, 23, 36, 35, 16, 33, 45, 41, 50, 13, 32, 22, 29, 35, 41,
            30, 25, 18, 65, 23, 31, 40, 16, 54, 42, 56, 29, 34, 13,
        ],
    ),
    (
        "DEUTERONOMY",
        959,
        &[
            46, 37, 29, 49, 33, 25, 26, 20, 29, 22, 32, 32, 18, 29, 23, 22, 20, 22, 21, 20, 23, 30,
            25, 22, 19, 19, 26, 68, 29, 20, 30, 52, 29, 12,
        ],
    ),
    (
        "JOSHUA",
        658,
        &[
            18, 24, 17, 24, 15, 27, 26, 35, 27, 43, 23, 24, 33, 15, 63, 10, 18, 28, 51, 9, 45, 34,
            16, 33,
        ],
    ),
    (
        "JUDGES",
        618,
        &[
            36, 23, 31, 24, 31, 40, 25, 35, 57, 18, 40, 15, 25, 20, 20, 31, 13, 31, 30, 48, 25,
        ],
    ),
    ("RUTH", 85, &[22, 23, 18, 22]),
    (
        "1 SAMUEL",
        810,
        &[
            28, 36, 21, 22, 12, 21, 17, 22, 27, 27, 15, 25, 23, 52, 35, 23, 58, 30, 24, 42, 15, 23,
            29, 22, 44, 25, 12, 25, 11, 31, 13,
        ],
    ),
    (
        "2 SAMUEL",
        695,
        &[
            27, 32, 39, 12, 25, 23, 29, 18, 13, 19, 27, 31, 39, 33, 37, 23, 29, 33, 43, 26, 22, 51,
            39, 25,
        ],
    ),
    (
        "1 KINGS",
        816,
        &[
            53, 46, 28, 34, 18, 38, 51, 66, 28, 29, 43, 33, 34, 31, 34, 34, 24, 46, 21, 43, 29, 53,
        ],
    ),
    (
        "2 KINGS",
        719,
        &[
            18, 25, 27, 44, 27, 33, 20, 29, 37, 36, 21, 21, 25, 29, 38, 20, 41, 37, 37, 21, 26, 20,
            37, 20, 30,
        ],
    ),
    (
        "1 CHRONICLES",
        942,
        &[
            54, 55, 24, 43, 26, 81, 40, 40, 44, 14, 47, 40, 14, 17, 29, 43, 27, 17, 19, 8, 30, 19,
            32, 31, 31, 32, 34, 21, 30,
        ],
    ),
    (
        "2 CHRONICLES",
        822,
        &[
            17, 18, 17, 22, 14, 42, 22, 18, 31, 19, 23, 16, 22, 15, 19, 14, 19, 34, 11, 37, 20, 12,
            21, 27, 28, 23, 9, 27, 36, 27, 21, 33, 25, 33, 27, 23,
        ],
    ),
    ("EZRA", 280, &[11, 70, 13, 24, 17, 22, 28, 36, 15, 44]),
    ("NEHEMIAH", 406, &[11, 20, 32, 23, 19, 19, 73, 18, 38, 39, 36, 47, 31]),
    ("ESTHER", 167, &[22, 23, 15, 17, 14, 14, 10, 17, 32, 3]),
    (
        "JOB",
        1070,
        &[
            22, 13, 26, 21, 27, 30, 21, 22, 35, 22, 20, 25, 28, 22, 35, 22, 16, 21, 29, 29, 34, 30,
            17, 25, 6, 14, 23, 28, 25, 31, 40, 22, 33, 37, 16, 33, 24, 41, 30, 24, 34, 17,
        ],
    ),
    (
        "PSALMS",
        2461,
        &[
            6, 12, 8, 8, 12, 10, 17, 9, 20, 18, 7, 8, 6, 7, 5, 11, 15, 50, 14, 9, 13, 31, 6, 10, 22,
            12, 14, 9, 11, 12, 24, 11, 22, 22, 28, 12, 40, 22, 13, 17, 13, 11, 5, 26, 17, 11, 9, 14,
            20, 23, 19, 9, 6, 7, 23, 13, 11, 11, 17, 12, 8, 12, 11, 10, 13, 20, 7, 35, 36, 5, 24,
            20, 28, 23, 10, 12, 20, 72, 13, 19, 16, 8, 18, 12, 13, 17, 7, 18, 52, 17, 16, 15, 5, 23,
            11, 13, 12, 9, 9, 5, 8, 28, 22, 35, 45, 48, 43, 13, 31, 7, 10, 10, 9, 8, 18, 19, 2, 29,
            176, 7, 8, 9, 4, 8, 5, 6, 5, 6, 8, 8, 3, 18, 3, 3, 21, 26, 9, 8, 24, 13, 10, 7, 12, 15,
            21, 10, 20, 14, 9, 6,
        ],
    ),
    (
        "PROVERBS",
        915,
        &[
            33, 22, 35, 27, 23, 35, 27, 36, 18, 32, 31, 28, 25, 35, 33, 33, 28, 24, 29, 30, 31, 29,
            35, 34, 28, 28, 27, 28, 27, 33, 31,
        ],
    ),
    ("ECCLESIASTES", 222, &[18, 26, 22, 16, 20, 12, 29, 17, 18, 20, 10, 14]),
    ("SONG OF SONGS", 117, &[17, 17, 11, 16, 16, 13, 13, 14]),
    (
        "ISAIAH",
        1292,
        &[
            31, 22, 26, 6, 30, 13, 25, 22, 21, 34, 16, 6, 22, 32, 9, 14, 14, 7, 25, 6, 17, 25, 18,
            23, 12, 21, 13, 29, 24, 33, 9, 20, 24, 17, 10, 22, 38, 22, 8, 31, 29, 25, 28, 28, 25,
            13, 15, 22, 26, 11, 23, 12, 12, 17, 13, 12, 21, 14, 21, 22, 11, 12, 19, 12, 25, 24,
        ],
    ),
    (
        "JEREMIAH",
        1364,
        &[
            19, 37, 25, 31, 31, 30, 34, 22, 26, 25, 23, 17, 27, 22, 21, 21, 27, 23, 15, 18, 14, 30,
            40, 10, 38, 24, 22, 17, 32, 24, 40, 44, 26, 22, 19, 32, 21, 28, 18, 16, 18, 22, 13, 30,
            5, 28, 7, 47, 39, 46, 64, 34,
        ],
    ),
    ("LAMENTATIONS", 154, &[22, 22, 66, 22, 22]),
    (
        "EZEKIEL",
        1273,
        &[
            28, 10, 27, 17, 17, 14, 27, 18, 11, 22, 25, 28, 23, 23, 8, 63, 24, 32, 14, 49, 32, 31,
            49, 27, 17, 21, 36, 26, 21, 26, 18, 32, 33, 31, 15, 38, 28, 23, 29, 49, 26, 20, 27, 31,
            17, 24, 23, 35,
        ],
    ),
    ("DANIEL", 357, &[21, 49, 30, 37, 31, 28, 28, 27, 27, 21, 45, 13]),
    ("HOSEA", 197, &[11, 23, 5, 19, 15, 11, 16, 14, 17, 15, 12, 14, 16, 9]),
    ("JOEL", 73, &[20, 32, 21]),
    ("AMOS", 146, &[15, 16, 15, 13, 27, 14, 17, 14, 15]),
    ("OBADIAH", 21, &[21]),
    ("JONAH", 48, &[17, 10, 10, 11]),
    ("MICAH", 105, &[16, 13, 12, 13, 15, 16, 20]),
    ("NAHUM", 47, &[15, 13, 19]),
    ("HABAKKUK", 56, &[17, 20, 19]),
    ("ZEPHANIAH", 53, &[18, 15, 20]),
    ("HAGGAI", 38, &[15, 23]),
    ("ZECHARIAH", 211, &[21, 13, 10, 14, 11, 15, 14, 23, 17, 12, 17, 14, 9, 21]),
    ("MALACHI", 55, &[14, 17, 18, 6]),
    (
        "MATTHEW",
        1071,
        &[
            25, 23, 17, 25, 48, 34, 29, 34, 38, 42, 30, 50, 58, 36, 39, 28, 27, 35, 30, 34, 46, 46,
            39, 51, 46, 75, 66, 20,
        ],
    ),
    ("MARK", 678, &[45, 28, 35, 41, 43, 56, 37, 38, 50, 52, 33, 44, 37, 72, 47, 20]),
    (
        "LUKE",
        1151,
        &[
            80, 52, 38, 44, 39, 49, 50, 56, 62, 42, 54, 59, 35, 35, 32, 31, 37, 43, 48, 47, 38, 71,
            56, 53,
        ],
    ),
    (
        "JOHN",
        879,
        &[
            51, 25, 36, 54, 47, 71, 53, 59, 41, 42, 57, 50, 38, 31, 27, 33, 26, 40, 42, 31, 25,
        ],
    ),
    (
        "ACTS",
        1007,
        &[
            26, 47, 26, 37, 42, 15, 60, 40, 43, 48, 30, 25, 52, 28, 41, 40, 34, 28, 41, 38, 40, 30,
            35, 27, 27, 32, 44, 31,
        ],
    ),
    ("ROMANS", 433, &[32, 29, 31, 25, 21, 23, 25, 39, 33, 21, 36, 21, 14, 23, 33, 27]),
    ("1 CORINTHIANS", 437, &[31, 16, 23, 21, 13, 20, 40, 13, 27, 33, 34, 31, 13, 40, 58, 24]),
    ("2 CORINTHIANS", 257, &[24, 17, 18, 18, 21, 18, 16, 24, 15, 18, 33, 21, 14]),
    ("GALATIANS", 149, &[24, 21, 29, 31, 26, 18]),
    ("EPHESIANS", 155, &[23, 22, 21, 32, 33, 24]),
    ("PHILIPPIANS", 104, &[30, 30, 21, 23]),
    ("COLOSSIANS", 95, &[29, 23, 25, 18]),
    ("1 THESSALONIANS", 89, &[10, 20, 13, 18, 28]),
    ("2 THESSALONIANS", 47, &[12, 17, 18]),
    ("1 TIMOTHY", 113, &[20, 15, 16, 16, 25, 21]),
    ("2 TIMOTHY", 83, &[18, 26, 17, 22]),
    ("TITUS", 46, &[16, 15, 15]),
    ("PHILEMON", 25, &[25]),
    ("HEBREWS", 303, &[14, 18, 19, 16, 14, 20, 28, 13, 28, 39, 40, 29, 25]),
    ("JAMES", 108, &[27, 26, 18, 17, 20]),
    ("1 PETER", 105, &[25, 25, 22, 19, 14]),
    ("2 PETER", 61, &[21, 22, 18]),
    ("1 JOHN", 105, &[10, 29, 24, 21, 21]),
    ("2 JOHN", 13, &[13]),
    ("3 JOHN", 14, &[14]),
    ("JUDE", 25, &[25]),
    (
        "REVELATION",
        404,
        &[
            20, 29, 22, 11, 14, 17, 17, 13, 21, 11, 19, 17, 18, 20, 8, 21, 18, 24, 21, 15, 27, 21,
        ],
    ),
];

/// Where numbering stands inside the current book
struct NivProgress {
    name: &'static str,
    total: usize,
    chapters: &'static [usize],
    chapter: usize,
    verse: usize,
    found: usize,
}

impl NivProgress {
    fn summary(&self) -> String {
        if self.found == self.total {
            format!("{} - Good", self.name)
        } else {
            format!(
                "{} overall expected {} verses but found {} verses.",
                self.name, self.total, self.found
            )
        }
    }
}

/// Number one-verse-per-line NIV text from the canonical verse counts.
///
/// A line naming a book (any case) opens that book at chapter 1. Every other
/// non-blank line is the next verse, and a chapter rolls over once its count
/// is used up. Verses past the last chapter keep counting under it. Lines
/// before the first book name are dropped.
///
/// Returns the numbered text, which [`parse_scripture_text`] reads back, and
/// one summary line per book: books found in input order, then the missing
/// ones in canonical order.
pub fn format_niv_text(text: &str) -> (String, Vec<String>) {
    let mut output = Vec::new();
    let mut summary = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<NivProgress> = None;

    for line in text.trim().lines() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }
        let upper = line.to_uppercase();
        if let Some(&(name, total, chapters)) = NIV_VERSE_COUNTS.iter().find(|(n, _, _)| *n == upper) {
            if let Some(done) = current.take() {
                summary.push(done.summary());
                seen.insert(done.name);
            }
            output.push(format!("\n{name}\n"));
            output.push("Chapter 1".to_string());
            current = Some(NivProgress {
                name,
                total,
                chapters,
                chapter: 1,
                verse: 1,
                found: 0,
            });
            continue;
        }
        let Some(book) = current.as_mut() else {
            continue;
        };
        if book.chapter <= book.chapters.len() && book.verse > book.chapters[book.chapter - 1] {
            book.chapter += 1;
            book.verse = 1;
            if book.chapter <= book.chapters.len() {
                output.push(format!("\nChapter {}", book.chapter));
            }
        }
        output.push(format!("{} {}", book.verse, line));
        book.verse += 1;
        book.found += 1;
    }
    if let Some(done) = current {
        summary.push(done.summary());
        seen.insert(done.name);
    }
    for (name, _, _) in NIV_VERSE_COUNTS {
        if !seen.contains(name) {
            summary.push(format!("{name} - Missing"));
        }
    }

    log::info!(
        "NIV format: {} of {} books present",
        seen.len(),
        NIV_VERSE_COUNTS.len()
    );
    (output.join("\n").trim().to_string(), summary)
}

/// Raw dictionary input formats
#[derive(Debug, Clone, Copy)]
pub enum DictionarySource<'a> {
    /// `{ "word": "<html definition>" }`
    Json(&'a str),
    /// One Wiktionary entry per line
    WiktionaryJsonl(&'a str),
}

#[derive(Debug, Clone)]
pub struct DictionaryOptions {
    pub language: Language,
    pub min_len: usize,
    pub max_len: usize,
    /// Share of filtered words to drop at random (0-100)
    pub reduction_percent: f64,
    /// Lowercase words never to include
    pub exclusions: HashSet<String>,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            language: Language::English,
            min_len: 4,
            max_len: 9,
            reduction_percent: 80.0,
            exclusions: HashSet::new(),
        }
    }
}

impl DictionaryOptions {
    /// Parse an exclusion list, one word per line
    pub fn with_exclusions(mut self, text: &str) -> Self {
        self.exclusions = text
            .lines()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        self
    }

    fn accepts(&self, word: &str, seen: &HashSet<String>) -> bool {
        let len = word.chars().count();
        (self.min_len..=self.max_len).contains(&len)
            && self.language.is_word(word)
            && !self.exclusions.contains(&word.to_lowercase())
            && !seen.contains(word)
    }
}

#[derive(Deserialize)]
struct WiktionaryEntry {
    #[serde(default)]
    word: String,
    #[serde(default)]
    lang_code: String,
    #[serde(default)]
    senses: Vec<WiktionarySense>,
}

#[derive(Deserialize)]
struct WiktionarySense {
    #[serde(default)]
    glosses: Vec<String>,
}

/// Filter a raw dictionary dump and randomly reduce it
pub fn build_dictionary<R: Rng + ?Sized>(
    source: DictionarySource<'_>,
    opts: &DictionaryOptions,
    rng: &mut R,
) -> Result<Dictionary, ImportError> {
    let mut seen = HashSet::new();
    let mut entries: Vec<(String, String)> = Vec::new();

    match source {
        DictionarySource::Json(text) => {
            let raw: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(text).map_err(|e| ImportError::Source(e.to_string()))?;
            for (word_raw, def_raw) in raw {
                let word = word_raw.to_uppercase();
                if !opts.accepts(&word, &seen) {
                    continue;
                }
                let Some(def_raw) = def_raw.as_str() else {
                    continue;
                };
                let definition = clean_html_definition(def_raw);
                if !definition.is_empty() {
                    seen.insert(word.clone());
                    entries.push((word, definition));
                }
            }
        }
        DictionarySource::WiktionaryJsonl(text) => {
            for (i, line) in text.lines().enumerate() {
                if i > 0 && i % 200_000 == 0 {
                    log::info!("...scanned {} lines", i);
                }
                let Ok(entry) = serde_json::from_str::<WiktionaryEntry>(line) else {
                    continue;
                };
                if entry.lang_code != "en" {
                    continue;
                }
                let word = entry.word.to_uppercase();
                if !opts.accepts(&word, &seen) {
                    continue;
                }
                let Some(gloss) = entry.senses.first().and_then(|s| s.glosses.first()) else {
                    continue;
                };
                let stripped = PAREN_ASIDE.replace_all(gloss, "");
                let definition =
                    capitalize(&stripped.split_whitespace().collect::<Vec<_>>().join(" "));
                if !definition.is_empty() {
                    seen.insert(word.clone());
                    entries.push((word, definition));
                }
            }
        }
    }

    if entries.is_empty() {
        return Err(ImportError::NoWords {
            min: opts.min_len,
            max: opts.max_len,
        });
    }
    log::info!("{} words matched the filters", entries.len());

    entries.shuffle(rng);
    let keep = 1.0 - opts.reduction_percent.clamp(0.0, 100.0) / 100.0;
    let keep_count = (entries.len() as f64 * keep).floor() as usize;
    entries.truncate(keep_count);
    log::info!("Final dictionary size: {} words", entries.len());

    Ok(Dictionary::from_entries(entries, opts.language))
}

/// Strip markup and source notes from a raw dictionary definition
pub fn clean_html_definition(raw: &str) -> String {
    let text = HTML_TAG.replace_all(raw, "");
    let text = HEADWORD_PREFIX.replace(&text, "");
    let text = SOURCE_SUFFIX.split(&text).next().unwrap_or_default();
    capitalize(text.trim())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SCRIPTURE: &str = "\u{feff}Genesis\n\
        Chapter 1\n\
        1 In the beginning God created\n\
        the heaven and the earth.\n\
        2 And the earth was without form.\n\
        \n\
        Chapter 2\n\
        1 Thus the heavens were finished.\n\
        Exodus\n\
        Chapter 1\n\
        1 Now these are the names\n";

    fn niv_lines(book: &str, verses: usize) -> String {
        let mut text = format!("{book}\n");
        for n in 1..=verses {
            text.push_str(&format!("verse text {n}\n"));
        }
        text
    }

    #[test]
    fn test_niv_chapter_rollover() {
        // Ruth 1 has 22 verses, so the 23rd line opens chapter 2
        let (formatted, summary) = format_niv_text(&niv_lines("Ruth", 23));
        let lines: Vec<_> = formatted.lines().collect();
        assert_eq!(lines[0], "RUTH");
        let ch2 = lines.iter().position(|l| *l == "Chapter 2").unwrap();
        assert_eq!(lines[ch2 - 2], "22 verse text 22");
        assert_eq!(lines[ch2 + 1], "1 verse text 23");
        assert_eq!(summary[0], "RUTH overall expected 85 verses but found 23 verses.");

        let (books, _) = parse_scripture_text(&formatted).unwrap();
        assert_eq!(books[0].name, "RUTH");
        assert_eq!(books[0].chapter("2").unwrap().verse("1").unwrap().text, "verse text 23");
    }

    #[test]
    fn test_niv_extra_verses_stay_in_last_chapter() {
        let (formatted, summary) = format_niv_text(&niv_lines("jude", 26));
        assert!(!formatted.contains("Chapter 2"));
        assert!(formatted.ends_with("1 verse text 26"));
        assert_eq!(summary[0], "JUDE overall expected 25 verses but found 26 verses.");
    }

    #[test]
    fn test_niv_summary_reports_good_and_missing_books() {
        let text = format!(
            "{}stray line before any book\n{}\n{}",
            '\u{feff}',
            niv_lines("Obadiah", 21),
            niv_lines("2 John", 12)
        );
        let (formatted, summary) = format_niv_text(&text);
        assert!(!formatted.contains("stray"));
        assert_eq!(summary.len(), NIV_VERSE_COUNTS.len());
        assert_eq!(summary[0], "OBADIAH - Good");
        assert_eq!(summary[1], "2 JOHN overall expected 13 verses but found 12 verses.");
        assert_eq!(summary[2], "GENESIS - Missing");
        assert_eq!(summary.last().unwrap(), "REVELATION - Missing");
        assert!(!summary.contains(&"OBADIAH - Missing".to_string()));
    }

    #[test]
    fn test_parse_books_chapters_and_multiline_verses() {
        let (books, report) = parse_scripture_text(SCRIPTURE).unwrap();
        assert_eq!(report.books, 2);
        assert_eq!(report.chapters, 3);
        assert_eq!(report.verses, 4);

        assert_eq!(books[0].name, "Genesis");
        let ch1 = books[0].chapter("1").unwrap();
        assert_eq!(
            ch1.verse("1").unwrap().text,
            "In the beginning God created the heaven and the earth."
        );
        assert_eq!(books[1].name, "Exodus");
    }

    #[test]
    fn test_book_heading_is_not_appended_to_last_verse() {
        let (books, _) = parse_scripture_text(SCRIPTURE).unwrap();
        let last = books[0].chapter("2").unwrap().verse("1").unwrap();
        assert_eq!(last.text, "Thus the heavens were finished.");
    }

    #[test]
    fn test_romanian_chapter_heading() {
        let text = "Geneza\nCapitolul 1\n1 La început Dumnezeu a făcut cerurile\n";
        let (books, report) = parse_scripture_text(text).unwrap();
        assert_eq!(report.chapters, 1);
        assert_eq!(books[0].name, "Geneza");
    }

    #[test]
    fn test_chapter_before_book_aborts() {
        let err = parse_scripture_text("Chapter 2\n1 text\n").unwrap_err();
        assert!(matches!(err, ImportError::ChapterBeforeBook { line: 1, .. }));
    }

    #[test]
    fn test_orphan_verses_and_noise_are_warnings() {
        let (_, report) = parse_scripture_text("1 orphan verse\nnoise\n").unwrap();
        assert_eq!(report.verses, 0);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_clean_html_definition() {
        let raw = "<b>CASĂ,</b> clădire destinată locuirii - Din lat. casa";
        assert_eq!(clean_html_definition(raw), "Clădire destinată locuirii");
    }

    #[test]
    fn test_build_from_json_filters_and_reduces() {
        let json = r#"{
            "casă": "<i>locuință</i>",
            "apă": "lichid",
            "lumină": "radiație",
            "pâine": "aliment",
            "zzzz": "exclus",
            "munte": ""
        }"#;
        let opts = DictionaryOptions {
            language: Language::Romanian,
            min_len: 4,
            max_len: 9,
            reduction_percent: 0.0,
            ..Default::default()
        }
        .with_exclusions("ZZZZ\n");
        let mut rng = Pcg32::seed_from_u64(1);
        let dict = build_dictionary(DictionarySource::Json(json), &opts, &mut rng).unwrap();
        // APĂ too short, ZZZZ excluded, MUNTE has no definition
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.definition("CASĂ"), Some("Locuință"));

        let half = DictionaryOptions {
            reduction_percent: 50.0,
            ..opts
        };
        let dict = build_dictionary(DictionarySource::Json(json), &half, &mut rng).unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_build_from_wiktionary() {
        let jsonl = [
            r#"{"word": "lantern", "lang_code": "en", "senses": [{"glosses": ["a case (usually portable) for a light"]}]}"#,
            r#"{"word": "laterne", "lang_code": "de", "senses": [{"glosses": ["lantern"]}]}"#,
            r#"{"word": "lantern", "lang_code": "en", "senses": [{"glosses": ["duplicate"]}]}"#,
            r#"not json"#,
            r#"{"word": "x-ray", "lang_code": "en", "senses": [{"glosses": ["radiation"]}]}"#,
        ]
        .join("\n");
        let opts = DictionaryOptions {
            reduction_percent: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(2);
        let dict =
            build_dictionary(DictionarySource::WiktionaryJsonl(&jsonl), &opts, &mut rng).unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.definition("LANTERN"), Some("A case for a light"));
    }

    #[test]
    fn test_no_words_is_an_error() {
        let opts = DictionaryOptions::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let err = build_dictionary(DictionarySource::Json("{}"), &opts, &mut rng).unwrap_err();
        assert_eq!(err, ImportError::NoWords { min: 4, max: 9 });
    }
}
