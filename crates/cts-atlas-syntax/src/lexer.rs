//! # Lexer - Tokenizing URNs and Passage References
//!
//! Both grammars in this crate share one flat token stream produced by
//! [Logos]. The delimiters that carry structure get their own kinds:
//!
//! - `:` → [`TokenKind::Colon`] (URN components)
//! - `.` → [`TokenKind::Dot`] (work-component parts, citation ranks)
//! - `-` → [`TokenKind::Dash`] (reference ranges)
//!
//! Everything else is grouped into [`TokenKind::Text`] runs, except
//! whitespace which the parsers reject.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte of the input lands in exactly one token, so a URN can be
//! reassembled from its tokens. The URN parser relies on this: a work
//! identifier such as `perseus-grc2` lexes as `Text Dash Text` and is
//! glued back together from the token slices.
//!
//! ```
//! use cts_atlas_syntax::lexer::lex;
//!
//! let input = "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `:` between URN components
    #[token(":")]
    Colon,

    /// `.` between work parts and citation ranks
    #[token(".")]
    Dot,

    /// `-` between the two ends of a range
    #[token("-")]
    Dash,

    /// Any run of spaces, tabs or line endings
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Identifier characters: everything that is not a delimiter
    #[regex(r"[^:.\- \t\r\n]+")]
    Text,
}

impl TokenKind {
    /// Human-facing name used in parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Dash => "'-'",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Text => "text",
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    lex_with_spans(input)
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

/// Lex and return tokens along with their byte spans.
pub fn lex_with_spans(input: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        // Text covers every non-delimiter character, so an error slice can
        // only be something Logos could not decode; keep it as text.
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push((Token { kind, text }, span));
    }

    tokens
}
