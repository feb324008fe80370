//! # cts-atlas-engine
//!
//! Builds a tree of text nodes from CTS-addressed version texts and answers
//! passage queries against it.
//!
//! ## Architecture Overview
//!
//! ```text
//! data dir ──► Library ──► import ──► NodeStore ──► Resolver ──► ResolvedPassage
//!              (library)   (import,    (store)       (resolve)
//!                           destructure)
//! ```
//!
//! - [`library`] finds textgroups, works and versions in a data directory.
//! - [`destructure`] turns one passage URN into the chain of nodes it needs.
//! - [`import`] walks a version's lines and creates those nodes once each,
//!   numbering every kind in document order.
//! - [`store`] defines the [`NodeStore`](store::NodeStore) contract and the
//!   in-memory [`ArenaStore`](store::ArenaStore).
//! - [`resolve`] maps a reference such as `1.1-1.7` onto the ordered leaves
//!   of a version, with ancestors and previous/next windows.
//! - [`tokenize`] splits leaf text into positioned tokens.

pub mod destructure;
pub mod import;
pub mod io;
pub mod library;
pub mod models;
pub mod resolve;
pub mod store;
pub mod tokenize;

#[cfg(test)]
pub mod tests;

pub use destructure::{DestructureError, Destructurer, NodeDescriptor, destructure};
pub use import::{
    ImportError, ImportMemo, ImportSummary, LibrarySummary, VersionImporter, import,
    import_library, import_version,
};
pub use library::{Library, LibraryError, VersionEntry};
pub use models::{CitationScheme, Metadata, NewNode, NodeId, NodeKind, TextNode, VersionMetadata};
pub use resolve::{ErrorKind, Passage, ResolveError, ResolvedPassage, Resolver};
pub use store::{ArenaStore, NodeStore, StoreError, format_tree};
pub use tokenize::{TextToken, TokenClass, TokenizeOptions, tokenize};
