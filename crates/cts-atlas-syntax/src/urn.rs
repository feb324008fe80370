//! # CTS URNs
//!
//! A CTS URN has four or five `:`-delimited segments:
//!
//! ```text
//! urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7
//! ─┬─ ─┬─ ───┬──── ────────────┬────────────── ───┬───
//!  nid  protocol  namespace   work component    passage
//! ```
//!
//! The work component holds one to four `.`-delimited parts: textgroup,
//! work, version and exemplar, always in that order. The passage segment
//! is optional, and an *empty* passage (`...perseus-grc2:`) is not the same
//! thing as a *missing* one (`...perseus-grc2`): the former addresses the
//! whole work, the latter is only a bare identifier. [`Urn`] keeps that
//! distinction so that formatting a parsed URN gives back the input.
//!
//! Truncation via [`Urn::up_to`] always re-appends the trailing `:`, since a
//! CTS work component must be separated from its (possibly null) passage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lexer::{Token, TokenKind, lex};

/// Maximum number of `.`-delimited parts in a work component.
const MAX_WORK_PARTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrnError {
    #[error("malformed URN \"{urn}\": {reason}")]
    Malformed { urn: String, reason: String },

    #[error("URN \"{urn}\" has no {component} component")]
    MissingComponent {
        urn: String,
        component: &'static str,
    },
}

/// The levels a URN can be truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrnComponent {
    Namespace,
    Textgroup,
    Work,
    Version,
    Exemplar,
    /// Everything except the passage segment.
    NoPassage,
}

impl UrnComponent {
    pub fn as_str(self) -> &'static str {
        match self {
            UrnComponent::Namespace => "namespace",
            UrnComponent::Textgroup => "textgroup",
            UrnComponent::Work => "work",
            UrnComponent::Version => "version",
            UrnComponent::Exemplar => "exemplar",
            UrnComponent::NoPassage => "no_passage",
        }
    }

    /// Number of work-component parts this level needs, if it is one.
    fn work_depth(self) -> Option<usize> {
        match self {
            UrnComponent::Textgroup => Some(1),
            UrnComponent::Work => Some(2),
            UrnComponent::Version => Some(3),
            UrnComponent::Exemplar => Some(4),
            UrnComponent::Namespace | UrnComponent::NoPassage => None,
        }
    }
}

impl fmt::Display for UrnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed CTS URN.
///
/// Immutable; build a new one with [`Urn::with_passage`] to address a
/// different passage of the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    nid: String,
    protocol: String,
    namespace: String,
    work_parts: Vec<String>,
    passage: Option<String>,
}

impl Urn {
    pub fn parse(input: &str) -> Result<Self, UrnError> {
        let input = input.trim();
        let malformed = |reason: String| UrnError::Malformed {
            urn: input.to_string(),
            reason,
        };

        let tokens = lex(input);
        if tokens.iter().any(|t| t.kind == TokenKind::Whitespace) {
            return Err(malformed("contains whitespace".to_string()));
        }

        let segments: Vec<&[Token<'_>]> = tokens
            .split(|t| t.kind == TokenKind::Colon)
            .collect();
        if segments.len() < 4 {
            return Err(malformed(format!(
                "expected at least 4 ':'-delimited segments, found {}",
                segments.len()
            )));
        }
        if segments.len() > 5 {
            return Err(malformed(format!(
                "expected at most 5 ':'-delimited segments, found {}",
                segments.len()
            )));
        }

        let mut heads = Vec::with_capacity(3);
        for (name, segment) in ["nid", "protocol", "namespace"].iter().zip(&segments) {
            let text = concat(segment);
            if text.is_empty() {
                return Err(malformed(format!("empty {name} segment")));
            }
            heads.push(text);
        }

        let work_parts: Vec<String> = segments[3]
            .split(|t| t.kind == TokenKind::Dot)
            .map(concat)
            .collect();
        if work_parts.iter().any(String::is_empty) {
            return Err(malformed("empty part in work component".to_string()));
        }
        if work_parts.len() > MAX_WORK_PARTS {
            return Err(malformed(format!(
                "work component has {} parts, expected 1 to {MAX_WORK_PARTS}",
                work_parts.len()
            )));
        }

        let passage = segments.get(4).map(|segment| concat(segment));
        let mut heads = heads.into_iter();

        Ok(Self {
            nid: heads.next().unwrap_or_default(),
            protocol: heads.next().unwrap_or_default(),
            namespace: heads.next().unwrap_or_default(),
            work_parts,
            passage,
        })
    }

    pub fn nid(&self) -> &str {
        &self.nid
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn textgroup(&self) -> Option<&str> {
        self.work_part(0)
    }

    pub fn work(&self) -> Option<&str> {
        self.work_part(1)
    }

    pub fn version(&self) -> Option<&str> {
        self.work_part(2)
    }

    pub fn exemplar(&self) -> Option<&str> {
        self.work_part(3)
    }

    /// The raw passage segment: `None` when the URN has no trailing passage
    /// segment at all, `Some("")` when it addresses the whole work.
    pub fn passage(&self) -> Option<&str> {
        self.passage.as_deref()
    }

    /// True when the passage segment is present and non-empty.
    pub fn has_passage(&self) -> bool {
        self.passage.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn has_exemplar(&self) -> bool {
        self.work_parts.len() == MAX_WORK_PARTS
    }

    /// The `.`-joined work component, e.g. `tlg0012.tlg001.perseus-grc2`.
    pub fn work_component(&self) -> String {
        self.work_parts.join(".")
    }

    /// The passage split into its citation ranks.
    pub fn passage_nodes(&self) -> Vec<&str> {
        match self.passage.as_deref() {
            Some(p) if !p.is_empty() => p.split('.').collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a single component by level.
    pub fn component(&self, component: UrnComponent) -> Option<&str> {
        match component {
            UrnComponent::Namespace => Some(self.namespace.as_str()),
            UrnComponent::NoPassage => None,
            other => other
                .work_depth()
                .and_then(|depth| self.work_part(depth - 1)),
        }
    }

    /// Truncate the URN after `component`.
    ///
    /// Every level but [`UrnComponent::NoPassage`] gets the trailing `:`
    /// that separates a work component from a null passage.
    pub fn up_to(&self, component: UrnComponent) -> Result<String, UrnError> {
        let base = match component {
            UrnComponent::NoPassage => return Ok(self.without_passage()),
            UrnComponent::Namespace => self.namespace_prefix(),
            level => {
                let depth = level.work_depth().unwrap_or(MAX_WORK_PARTS);
                if self.work_parts.len() < depth {
                    return Err(UrnError::MissingComponent {
                        urn: self.to_string(),
                        component: level.as_str(),
                    });
                }
                format!(
                    "{}:{}",
                    self.namespace_prefix(),
                    self.work_parts[..depth].join(".")
                )
            }
        };
        Ok(format!("{base}:"))
    }

    /// The same text addressed at a different passage.
    pub fn with_passage(&self, passage: impl Into<String>) -> Self {
        Self {
            passage: Some(passage.into()),
            ..self.clone()
        }
    }

    fn work_part(&self, index: usize) -> Option<&str> {
        self.work_parts.get(index).map(String::as_str)
    }

    fn namespace_prefix(&self) -> String {
        format!("{}:{}:{}", self.nid, self.protocol, self.namespace)
    }

    fn without_passage(&self) -> String {
        format!("{}:{}", self.namespace_prefix(), self.work_component())
    }
}

fn concat(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.without_passage())?;
        if let Some(passage) = &self.passage {
            write!(f, ":{passage}")?;
        }
        Ok(())
    }
}

impl FromStr for Urn {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Urn {
    type Error = UrnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.to_string()
    }
}
