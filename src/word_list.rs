use std::collections::{BTreeSet, HashMap};
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use log::debug;
use smallvec::SmallVec;

use crate::error::Result;
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// An identifier for a given letter, based on its index in the WordList's `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the WordList's `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in glyphs, which is what slot lengths are compared against.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The vocabulary available to the solver. Words are upper-cased, de-duplicated and sorted, so a
/// given set of input words always produces the same `WordId`s.
pub struct WordList {
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &format!("({} entries)", self.words.len()))
            .finish()
    }
}

impl WordList {
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let normalized: BTreeSet<String> = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_uppercase())
            .filter(|word| !word.is_empty())
            .collect();

        let mut glyphs: SmallVec<[char; MAX_GLYPH_COUNT]> = SmallVec::new();
        let mut glyph_ids_by_char: HashMap<char, GlyphId> = HashMap::new();

        let words: Vec<Word> = normalized
            .into_iter()
            .map(|string| {
                let word_glyphs = string
                    .chars()
                    .map(|c| {
                        *glyph_ids_by_char.entry(c).or_insert_with(|| {
                            glyphs.push(c);
                            glyphs.len() - 1
                        })
                    })
                    .collect();

                Word { string, glyphs: word_glyphs }
            })
            .collect();

        debug!("loaded {} words over {} glyphs", words.len(), glyphs.len());

        WordList { glyphs, words }
    }

    /// Parse a dictionary with one word per line. Scored lines like `word,50` or `word;50` are
    /// accepted and the score is dropped.
    pub fn from_dict_str(contents: &str) -> WordList {
        WordList::new(
            contents
                .lines()
                .filter_map(|line| line.split(|c: char| c == ',' || c == ';').next()),
        )
    }

    pub fn from_dict_file<P: AsRef<Path>>(path: P) -> Result<WordList> {
        Ok(WordList::from_dict_str(&fs::read_to_string(path)?))
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, using the same case policy as construction.
    pub fn find(&self, string: &str) -> Option<WordId> {
        let key = string.trim().to_uppercase();
        self.words
            .binary_search_by(|word| word.string.as_str().cmp(key.as_str()))
            .ok()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
