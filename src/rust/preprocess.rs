//! Text cleanup applied before classification.
//!
//! Mirrors the cleanup the training data went through: user handles are
//! dropped and common English stopwords are removed.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "both", "bottom", "but", "by", "ca", "call", "can",
    "cannot", "could", "did", "do", "does", "doing", "done", "down", "due", "during", "each",
    "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "fifteen", "fifty",
    "first", "five", "for", "former", "formerly", "forty", "four", "from", "front", "full",
    "further", "get", "give", "go", "had", "has", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "if", "in", "indeed", "into", "is", "it", "its",
    "itself", "just", "keep", "last", "latter", "latterly", "least", "less", "made", "make",
    "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover", "most", "mostly",
    "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
    "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not", "nothing",
    "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or",
    "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part",
    "per", "perhaps", "please", "put", "quite", "rather", "re", "really", "regarding", "same",
    "say", "see", "seem", "seemed", "seeming", "seems", "serious", "several", "she", "should",
    "show", "side", "since", "six", "sixty", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "take", "ten", "than", "that",
    "the", "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "third", "this", "those", "though",
    "three", "through", "throughout", "thru", "thus", "to", "together", "too", "top",
    "toward", "towards", "twelve", "twenty", "two", "under", "unless", "until", "up", "upon",
    "us", "used", "using", "various", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby",
    "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

lazy_static! {
    static ref USER_HANDLE: Regex =
        Regex::new(r"@\S+").expect("user handle pattern is a valid regex");
    static ref STOP_WORDS: HashSet<&'static str> = ENGLISH_STOP_WORDS.iter().copied().collect();
}

/// Returns true if `word` is an English stopword, ignoring case.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

/// Configurable text cleanup. Both steps are enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    strip_handles: bool,
    remove_stopwords: bool,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            strip_handles: true,
            remove_stopwords: true,
        }
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_handles(mut self, enabled: bool) -> Self {
        self.strip_handles = enabled;
        self
    }

    pub fn with_remove_stopwords(mut self, enabled: bool) -> Self {
        self.remove_stopwords = enabled;
        self
    }

    /// Applies the enabled steps in order: handles first, then stopwords.
    pub fn process(&self, text: &str) -> String {
        let mut cleaned = if self.strip_handles {
            strip_user_handles(text)
        } else {
            text.to_string()
        };
        if self.remove_stopwords {
            cleaned = remove_stop_words(&cleaned);
        }
        log::debug!("Preprocessed {:?} -> {:?}", text, cleaned);
        cleaned
    }
}

/// Removes every `@` followed by a run of non-whitespace characters.
pub fn strip_user_handles(text: &str) -> String {
    USER_HANDLE.replace_all(text, "").into_owned()
}

/// Drops stopwords from whitespace-separated tokens and rejoins survivors with single spaces.
pub fn remove_stop_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !is_stop_word(word))
        .collect::<Vec<_>>()
        .join(" ")
}
