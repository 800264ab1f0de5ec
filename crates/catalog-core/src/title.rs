//! Human titles from machine issue identifiers
//!
//! `all-new_all-different_avengers_2015_9` becomes
//! `All-New, All-Different Avengers (2015) #9`. The grammar is
//! `<series> <year> <designator>` once underscores are spaces; anything
//! that does not fit is title-cased as a whole, so formatting never fails.
//!
//! Canonical spellings of franchise names and connectives live in a
//! [`CasingTable`] rather than in the algorithm. Entries may span several
//! words; the longest match at each position wins.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

const BUILTIN_CASINGS: &[(&str, &str)] = &[
    ("all-new all-different", "All-New, All-Different"),
    ("all-new", "All-New"),
    ("all-different", "All-Different"),
    ("x-men", "X-Men"),
    ("x-force", "X-Force"),
    ("x-factor", "X-Factor"),
    ("spider-man", "Spider-Man"),
    ("spider-woman", "Spider-Woman"),
    ("spider-gwen", "Spider-Gwen"),
    ("iron-man", "Iron-Man"),
    ("ant-man", "Ant-Man"),
    ("she-hulk", "She-Hulk"),
    ("ms", "Ms."),
    ("dr", "Dr."),
    ("guardians of the galaxy", "Guardians of the Galaxy"),
    ("fantastic four", "Fantastic Four"),
    ("avengers standoff", "Avengers Standoff"),
    ("assault on pleasant hill", "Assault on Pleasant Hill"),
    ("omega", "Omega"),
];

/// Case-insensitive lookup of canonical spellings
#[derive(Debug, Clone, Default)]
pub struct CasingTable {
    entries: HashMap<String, String>,
    max_words: usize,
}

impl CasingTable {
    /// The table shipped with the engine
    pub fn builtin() -> Self {
        let mut table = Self::default();
        for (phrase, canonical) in BUILTIN_CASINGS {
            table.insert(phrase, canonical);
        }
        table
    }

    /// Add or replace an entry; the key is matched case-insensitively
    pub fn insert(&mut self, phrase: &str, canonical: &str) {
        let key = normalize_key(phrase);
        if key.is_empty() {
            return;
        }
        self.max_words = self.max_words.max(key.split(' ').count());
        self.entries.insert(key, canonical.to_string());
    }

    /// Builtin table extended with configured entries
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (phrase, canonical) in overrides {
            self.insert(phrase, canonical);
        }
        self
    }

    /// Longest entry starting at `tokens[0]`, with the number of tokens it covers
    fn longest_match(&self, tokens: &[&str]) -> Option<(&str, usize)> {
        let longest = self.max_words.min(tokens.len());
        (1..=longest).rev().find_map(|n| {
            let key = tokens[..n]
                .iter()
                .map(|t| t.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            self.entries.get(&key).map(|canonical| (canonical.as_str(), n))
        })
    }
}

fn normalize_key(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats identifiers into display titles
#[derive(Debug, Clone)]
pub struct TitleFormatter {
    casings: CasingTable,
}

impl Default for TitleFormatter {
    fn default() -> Self {
        Self::new(CasingTable::builtin())
    }
}

impl TitleFormatter {
    pub fn new(casings: CasingTable) -> Self {
        Self { casings }
    }

    /// Turn an identifier into a human title. Total: unknown shapes are
    /// title-cased verbatim.
    pub fn format(&self, id: &str) -> String {
        let spaced = id.replace('_', " ");
        let tokens: Vec<&str> = spaced.split_whitespace().collect();

        match split_on_year(&tokens) {
            Some(year_at) => {
                let series = self.title_case(&tokens[..year_at]);
                let designator = self.format_designator(&tokens[year_at + 1..]);
                format!("{} ({}) {}", series, tokens[year_at], designator)
            }
            None => self.title_case(&tokens),
        }
    }

    /// `9` -> `#9`, `0.1` -> `#0.1`, `annual 1` -> `Annual #1`, anything else `#<raw>`
    fn format_designator(&self, tokens: &[&str]) -> String {
        let raw = tokens.join(" ");
        if raw.contains('.') || is_numeric(&raw) {
            return format!("#{}", raw);
        }
        match tokens.split_last() {
            Some((last, words)) if !words.is_empty() && is_numeric(last) => {
                format!("{} #{}", self.title_case(words), last)
            }
            _ => format!("#{}", raw),
        }
    }

    fn title_case(&self, tokens: &[&str]) -> String {
        let mut words = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            match self.casings.longest_match(&tokens[i..]) {
                Some((canonical, covered)) => {
                    words.push(canonical.to_string());
                    i += covered;
                }
                None => {
                    words.push(capitalize(tokens[i]));
                    i += 1;
                }
            }
        }
        words.join(" ")
    }
}

/// Format with the builtin casing table
pub fn format_title(id: &str) -> String {
    static DEFAULT: OnceLock<TitleFormatter> = OnceLock::new();
    DEFAULT.get_or_init(TitleFormatter::default).format(id)
}

/// Index of the last four-digit token that leaves a non-empty series
/// before it and a non-empty designator after it.
fn split_on_year(tokens: &[&str]) -> Option<usize> {
    if tokens.len() < 3 {
        return None;
    }
    (1..tokens.len() - 1).rev().find(|&i| is_year(tokens[i]))
}

fn is_year(token: &str) -> bool {
    token.len() == 4 && is_numeric(token)
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Uppercase the first character, lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
