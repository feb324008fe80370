//! # cts-atlas-syntax
//!
//! Grammars for addressing classical texts with [CTS URNs]:
//!
//! - [`urn`] parses `urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7`
//!   into a typed [`Urn`] that can be truncated to any level of the
//!   textgroup → work → version → exemplar hierarchy and formatted back
//!   without loss.
//! - [`reference`] parses the passage part (`1`, `1.1`, `1.1-1.7`, `1.5-7`)
//!   into a [`Reference`].
//!
//! [CTS URNs]: https://cite-architecture.github.io/ctsurn_spec/
//!
//! ## Architecture Overview
//!
//! ```text
//! Source Text → Lexer → Tokens → { Urn::parse | Reference::parse }
//!               (Logos)
//! ```
//!
//! Both parsers work on the same lossless token stream from [`lexer`], so a
//! delimiter means the same thing everywhere and every byte of the input is
//! accounted for.
//!
//! ## Quick Start
//!
//! ```
//! use cts_atlas_syntax::{Reference, Urn, UrnComponent};
//!
//! let urn = Urn::parse("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7").unwrap();
//! assert_eq!(
//!     urn.up_to(UrnComponent::Work).unwrap(),
//!     "urn:cts:greekLit:tlg0012.tlg001:"
//! );
//!
//! let reference = Reference::parse(urn.passage().unwrap()).unwrap();
//! assert_eq!(reference.start().unwrap().to_string(), "1.1");
//! assert_eq!(reference.end().unwrap().to_string(), "1.7");
//! ```

pub mod lexer;
pub mod reference;
pub mod urn;

pub use reference::{RefPart, Reference, ReferenceError};
pub use urn::{Urn, UrnComponent, UrnError};
