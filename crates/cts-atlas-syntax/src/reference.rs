//! # Passage References
//!
//! The passage segment of a CTS URN, and the `reference` argument callers
//! send on their own, follow a small grammar:
//!
//! ```text
//! reference := ε | part ( '-' part )?
//! part      := TEXT ( '.' TEXT )*
//! ```
//!
//! An empty reference addresses the whole text. A `part` names a node at the
//! citation rank given by its number of segments, so against a book/line
//! scheme `2` is a book and `2.480` is a line. Both ends of a range are
//! parsed independently, which is what makes mixed forms like `1.5-7` legal
//! here; what they mean is decided by the resolver.
//!
//! This grammar is the wire contract with existing callers, so the parser is
//! strict: no whitespace, no empty segments, at most one `-`.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

use crate::lexer::{Token, TokenKind, lex_with_spans};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("unexpected {found} at offset {offset} in reference \"{reference}\"")]
    UnexpectedToken {
        reference: String,
        found: &'static str,
        offset: usize,
    },

    #[error("reference \"{reference}\" ends unexpectedly")]
    UnexpectedEnd { reference: String },
}

/// One end of a reference: a dot-path such as `1.2.a.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct RefPart {
    segments: Vec<String>,
}

impl RefPart {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The citation rank this part addresses (1-based).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The last segment, e.g. `3` for `1.2.a.3`.
    pub fn lowest_citable_part(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The prefix of this part at `depth`, if it is that deep.
    pub fn truncate(&self, depth: usize) -> Option<RefPart> {
        (depth > 0 && depth <= self.depth()).then(|| RefPart {
            segments: self.segments[..depth].to_vec(),
        })
    }
}

impl fmt::Display for RefPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<RefPart> for String {
    fn from(part: RefPart) -> Self {
        part.to_string()
    }
}

/// A parsed passage reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// The empty reference: every citable node of the text.
    Whole,
    Single(RefPart),
    Range { start: RefPart, end: RefPart },
}

impl Reference {
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let tokens = lex_with_spans(input);
        Parser::new(input, &tokens).reference()
    }

    pub fn start(&self) -> Option<&RefPart> {
        match self {
            Reference::Whole => None,
            Reference::Single(part) => Some(part),
            Reference::Range { start, .. } => Some(start),
        }
    }

    /// The closing end; for a single reference this is the start again.
    pub fn end(&self) -> Option<&RefPart> {
        match self {
            Reference::Whole => None,
            Reference::Single(part) => Some(part),
            Reference::Range { end, .. } => Some(end),
        }
    }

    /// The deepest rank named by either end.
    pub fn depth(&self) -> usize {
        self.start()
            .into_iter()
            .chain(self.end())
            .map(RefPart::depth)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Whole => Ok(()),
            Reference::Single(part) => write!(f, "{part}"),
            Reference::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Cursor over the token stream of a single reference.
struct Parser<'t, 'input> {
    input: &'input str,
    tokens: &'t [(Token<'input>, Range<usize>)],
    pos: usize,
}

impl<'t, 'input> Parser<'t, 'input> {
    fn new(input: &'input str, tokens: &'t [(Token<'input>, Range<usize>)]) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn reference(mut self) -> Result<Reference, ReferenceError> {
        if self.at_end() {
            return Ok(Reference::Whole);
        }

        let start = self.part()?;
        let reference = if self.eat(TokenKind::Dash) {
            let end = self.part()?;
            Reference::Range { start, end }
        } else {
            Reference::Single(start)
        };

        if !self.at_end() {
            return Err(self.unexpected());
        }
        Ok(reference)
    }

    fn part(&mut self) -> Result<RefPart, ReferenceError> {
        let mut segments = vec![self.segment()?];
        while self.eat(TokenKind::Dot) {
            segments.push(self.segment()?);
        }
        Ok(RefPart { segments })
    }

    fn segment(&mut self) -> Result<String, ReferenceError> {
        match self.current() {
            Some(TokenKind::Text) => {
                let (token, _) = &self.tokens[self.pos];
                self.pos += 1;
                Ok(token.text.to_string())
            }
            Some(_) => Err(self.unexpected()),
            None => Err(ReferenceError::UnexpectedEnd {
                reference: self.input.to_string(),
            }),
        }
    }

    fn current(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|(token, _)| token.kind)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self) -> ReferenceError {
        match self.tokens.get(self.pos) {
            Some((token, span)) => ReferenceError::UnexpectedToken {
                reference: self.input.to_string(),
                found: token.kind.describe(),
                offset: span.start,
            },
            None => ReferenceError::UnexpectedEnd {
                reference: self.input.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn part(s: &str) -> RefPart {
        RefPart::new(s.split('.'))
    }

    #[test]
    fn empty_reference_is_whole() {
        assert_eq!(Reference::parse("").unwrap(), Reference::Whole);
    }

    #[rstest]
    #[case("1", Reference::Single(part("1")))]
    #[case("1.1", Reference::Single(part("1.1")))]
    #[case("1.2.a.3", Reference::Single(part("1.2.a.3")))]
    #[case("1-2", Reference::Range { start: part("1"), end: part("2") })]
    #[case("1.1-1.7", Reference::Range { start: part("1.1"), end: part("1.7") })]
    #[case("2.480-2.493", Reference::Range { start: part("2.480"), end: part("2.493") })]
    #[case("1.5-7", Reference::Range { start: part("1.5"), end: part("7") })]
    #[case("12r.1-12v.3", Reference::Range { start: part("12r.1"), end: part("12v.3") })]
    fn parses_grammar_branches(#[case] input: &str, #[case] expected: Reference) {
        let parsed = Reference::parse(input).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), input);
    }

    #[rstest]
    #[case("1.", "reference \"1.\" ends unexpectedly")]
    #[case("1-", "reference \"1-\" ends unexpectedly")]
    #[case("-1", "unexpected '-' at offset 0 in reference \"-1\"")]
    #[case("1..2", "unexpected '.' at offset 2 in reference \"1..2\"")]
    #[case("1-2-3", "unexpected '-' at offset 3 in reference \"1-2-3\"")]
    #[case("1 - 2", "unexpected whitespace at offset 1 in reference \"1 - 2\"")]
    #[case("1:2", "unexpected ':' at offset 1 in reference \"1:2\"")]
    fn rejects_invalid(#[case] input: &str, #[case] message: &str) {
        let err = Reference::parse(input).unwrap_err();
        assert_eq!(err.to_string(), message);
    }

    #[test]
    fn start_and_end_of_single_are_the_same() {
        let reference = Reference::parse("2.480").unwrap();
        assert_eq!(reference.start(), reference.end());
        assert_eq!(reference.depth(), 2);
    }

    #[test]
    fn depth_is_deepest_end() {
        assert_eq!(Reference::parse("1.5-7").unwrap().depth(), 2);
        assert_eq!(Reference::parse("").unwrap().depth(), 0);
    }

    #[test]
    fn ref_part_helpers() {
        let p = part("1.2.a.3");
        assert_eq!(p.lowest_citable_part(), "3");
        assert_eq!(p.truncate(2), Some(part("1.2")));
        assert_eq!(p.truncate(0), None);
        assert_eq!(p.truncate(5), None);
    }
}
