//! Turns message bodies into word tokens for vocabulary counting.
//!
//! The stages run in a fixed order and each one sees the previous output:
//! URLs out, emoji to names, ASCII punctuation stripped (no space inserted, so
//! neighbours can fuse), word-boundary split, stopwords, numbers, one-letter
//! tokens. Case is left untouched.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::ports::StopwordSource;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("Invalid URL regex"));

/// English stopword list as shipped with the common NLP corpora.
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't",
    "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't", "mustn",
    "mustn't", "needn", "needn't", "shan", "shan't", "shouldn", "shouldn't", "wasn", "wasn't",
    "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

pub struct Tokenizer {
    stopwords: HashSet<String>,
}

impl Tokenizer {
    /// Builds a tokenizer from the English list plus `extra` stopwords.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stopwords: HashSet<String> =
            ENGLISH_STOPWORDS.iter().map(|w| (*w).to_string()).collect();
        stopwords.extend(
            extra
                .into_iter()
                .map(Into::into)
                .map(|w: String| w.trim().to_string())
                .filter(|w| !w.is_empty()),
        );
        Self { stopwords }
    }

    /// Loads the transliterated stopwords; a missing resource is fatal.
    pub fn from_source(source: &dyn StopwordSource) -> Result<Self> {
        let extra = source.load_stopwords()?;
        debug!("Loaded {} extra stopwords", extra.len());
        Ok(Self::new(extra))
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text = remove_urls(text);
        let text = demojize(&text);
        let text = remove_punctuation(&text);
        split_words(&text)
            .into_iter()
            .filter(|word| !self.is_stopword(word))
            .filter(|word| !is_numeric(word))
            .filter(|word| word.chars().count() != 1)
            .collect()
    }
}

pub fn remove_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

/// Replaces each emoji with its name in `:snake_case:` form.
pub fn demojize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        match lookup_emoji(grapheme) {
            Some(emoji) => {
                out.push(':');
                out.push_str(&emoji.name().replace(' ', "_"));
                out.push(':');
            }
            None => out.push_str(grapheme),
        }
    }
    out
}

fn lookup_emoji(grapheme: &str) -> Option<&'static emojis::Emoji> {
    if grapheme.is_ascii() {
        return None;
    }
    emojis::get(grapheme).or_else(|| emojis::get(&grapheme.replace('\u{fe0f}', "")))
}

pub fn remove_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

pub fn split_words(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_string).collect()
}

/// Word-boundary token count of a raw body, punctuation tokens included.
pub fn count_words(text: &str) -> usize {
    text.split_word_bounds()
        .filter(|segment| !segment.trim().is_empty())
        .count()
}

fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_numeric)
}
