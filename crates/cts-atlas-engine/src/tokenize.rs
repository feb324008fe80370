//! Splitting leaf text into word, punctuation and whitespace tokens.
//!
//! Every token carries two positions:
//!
//! - `occurrence`: how many times its text has been seen so far, counting
//!   occurrences inside longer tokens too (`a` in `and`). Search highlighters
//!   use this to tell repeated words apart.
//! - `offset`: a running count of characters over words and punctuation,
//!   including the token itself. Whitespace does not advance it.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Word,
    Punctuation,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextToken {
    pub text: String,
    pub class: TokenClass,
    pub occurrence: usize,
    pub offset: usize,
}

/// Which token classes to keep in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub words: bool,
    pub punctuation: bool,
    pub whitespace: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            words: true,
            punctuation: true,
            whitespace: true,
        }
    }
}

impl TokenizeOptions {
    pub fn without_whitespace() -> Self {
        Self {
            whitespace: false,
            ..Self::default()
        }
    }

    fn keeps(&self, class: TokenClass) -> bool {
        match class {
            TokenClass::Word => self.words,
            TokenClass::Punctuation => self.punctuation,
            TokenClass::Whitespace => self.whitespace,
        }
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| {
        Regex::new(r"(?P<word>\w[-\w]*)|(?P<punct>\p{P}+)|(?P<space>[\p{Z}\s]+)")
            .expect("Invalid token regex")
    })
}

pub fn tokenize(text: &str, options: TokenizeOptions) -> Vec<TextToken> {
    let mut tokens = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut offset = 0;

    for captures in token_regex().captures_iter(text) {
        let (class, matched) = if let Some(m) = captures.name("word") {
            (TokenClass::Word, m.as_str())
        } else if let Some(m) = captures.name("punct") {
            (TokenClass::Punctuation, m.as_str())
        } else if let Some(m) = captures.name("space") {
            (TokenClass::Whitespace, m.as_str())
        } else {
            continue;
        };

        let chars: Vec<char> = matched.chars().collect();
        if class != TokenClass::Whitespace {
            offset += chars.len();
        }
        if !options.keeps(class) {
            continue;
        }

        for start in 0..chars.len() {
            for end in start + 1..=chars.len() {
                let substring: String = chars[start..end].iter().collect();
                *seen.entry(substring).or_default() += 1;
            }
        }

        tokens.push(TextToken {
            text: matched.to_string(),
            class,
            occurrence: seen.get(matched).copied().unwrap_or_default(),
            offset,
        });
    }

    tokens
}
