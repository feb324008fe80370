//! # Importing version texts into the node tree
//!
//! A version's text is a sequence of lines of the form
//!
//! ```text
//! Il.1.7 Ἀτρεΐδης τε ἄναξ ἀνδρῶν καὶ δῖος Ἀχιλλεύς.
//! ```
//!
//! The first whitespace-delimited token is a reference whose leading segment
//! is an abbreviation of the work and whose remainder is the passage (`1.7`).
//! Each line is destructured into node descriptors (see [`crate::destructure`])
//! which are walked top-down, creating every node the first time its URN is
//! seen and reusing it afterwards.
//!
//! ## Indices
//!
//! Each [`VersionImporter`] keeps one counter per node kind. A new node takes
//! the next value of its kind's counter as its `idx`, so the books of a
//! version are numbered `0..b` and its lines `0..l` in document order. Each
//! kind only occurs at one depth, which makes the counter equivalent to a
//! per-(parent rank, kind) sequence.
//!
//! ## The memo
//!
//! [`ImportMemo`] maps URNs to created nodes. It is owned by the caller and
//! passed in, so one memo can span every version of a library run (sharing
//! the namespace, textgroup and work nodes between versions) while two
//! unrelated runs never see each other's entries.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use cts_atlas_syntax::{Urn, UrnComponent, UrnError};
use thiserror::Error;

use crate::destructure::{DestructureError, Destructurer, NodeDescriptor};
use crate::io::IoError;
use crate::library::{Library, LibraryError, VersionEntry};
use crate::models::{CITATION_SCHEME, CitationScheme, Metadata, NodeId, NodeKind, TextNode};
use crate::store::{NodeStore, StoreError};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source text not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("line {line_number} is not a reference followed by text: {line:?}")]
    MalformedLine { line_number: usize, line: String },

    #[error("line {line_number}: {source}")]
    Destructure {
        line_number: usize,
        #[source]
        source: DestructureError,
    },

    #[error("citation scheme of {urn} repeats the rank \"{rank}\"")]
    DuplicateRank { urn: String, rank: String },

    #[error(transparent)]
    Urn(#[from] UrnError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(IoError),
}

impl ImportError {
    /// True when the citation scheme and the passage depth disagree.
    pub fn is_scheme_mismatch(&self) -> bool {
        matches!(
            self,
            ImportError::Destructure {
                source: DestructureError::SchemeMismatch { .. },
                ..
            }
        )
    }
}

impl From<IoError> for ImportError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::NotFound(path) => ImportError::MissingSource(path),
            other => ImportError::Io(other),
        }
    }
}

impl From<LibraryError> for ImportError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::MissingSource(path) => ImportError::MissingSource(path),
            LibraryError::Io(io) => io.into(),
            LibraryError::InvalidUrn { source, .. } => ImportError::Urn(source),
        }
    }
}

/// URN → node map shared by the imports of one run.
#[derive(Debug, Default)]
pub struct ImportMemo {
    nodes: HashMap<String, NodeId>,
}

impl ImportMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, urn: &str) -> Option<NodeId> {
        self.nodes.get(urn).copied()
    }

    pub fn insert(&mut self, urn: String, id: NodeId) {
        self.nodes.insert(urn, id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Outcome of importing one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub version_urn: String,
    /// The version (or exemplar) node, absent when the text had no lines.
    pub root: Option<NodeId>,
    pub lines: usize,
    /// Nodes this import created, including shared ancestors it was first to see.
    pub created: usize,
    pub descendant_count: usize,
}

/// Split a line into its reference token and its text.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    let (reference, text) = line.trim().split_once(char::is_whitespace)?;
    Some((reference, text.trim_start()))
}

/// The passage of a line reference: everything after the work abbreviation.
fn passage_of(reference: &str) -> Option<&str> {
    reference
        .split_once('.')
        .map(|(_, passage)| passage)
        .filter(|passage| !passage.is_empty())
}

/// Imports the lines of a single version.
#[derive(Debug)]
pub struct VersionImporter {
    urn: Urn,
    root_urn: String,
    destructurer: Destructurer,
    idx: BTreeMap<NodeKind, usize>,
    lines: usize,
    created: usize,
}

impl VersionImporter {
    /// `version_urn` names a version or exemplar, with or without its
    /// trailing `:`. The scheme is written into `metadata` under
    /// `citation_scheme` so the version node carries it.
    pub fn new(
        version_urn: &str,
        scheme: CitationScheme,
        mut metadata: Metadata,
    ) -> Result<Self, ImportError> {
        let urn = Urn::parse(version_urn)?;
        let level = if urn.has_exemplar() {
            UrnComponent::Exemplar
        } else {
            UrnComponent::Version
        };
        let root_urn = urn.up_to(level)?;
        let urn = Urn::parse(&root_urn)?;
        if let Some(rank) = scheme.duplicate_rank() {
            return Err(ImportError::DuplicateRank {
                urn: root_urn,
                rank: rank.to_string(),
            });
        }

        metadata.insert(CITATION_SCHEME.to_string(), scheme.to_value());

        Ok(Self {
            urn,
            root_urn,
            destructurer: Destructurer::new(scheme).with_metadata(metadata),
            idx: BTreeMap::new(),
            lines: 0,
            created: 0,
        })
    }

    fn next_idx(&mut self, kind: &NodeKind) -> usize {
        let counter = self.idx.entry(kind.clone()).or_default();
        let idx = *counter;
        *counter += 1;
        idx
    }

    /// Destructure one line without touching any store. Blank lines yield
    /// `None`. `line_number` is 1-based and only used in errors.
    fn prepare_line(
        &self,
        line_number: usize,
        line: &str,
    ) -> Result<Option<Vec<NodeDescriptor>>, ImportError> {
        if line.trim().is_empty() {
            log::warn!("{}: skipping blank line {line_number}", self.root_urn);
            return Ok(None);
        }

        let malformed = || ImportError::MalformedLine {
            line_number,
            line: line.to_string(),
        };
        let (reference, text) = split_line(line).ok_or_else(malformed)?;
        let passage = passage_of(reference).ok_or_else(malformed)?;

        let node_urn = self.urn.with_passage(passage);
        self.destructurer
            .destructure(&node_urn, text)
            .map(Some)
            .map_err(|source| ImportError::Destructure {
                line_number,
                source,
            })
    }

    /// Create the nodes of one destructured line that do not exist yet.
    fn apply<S: NodeStore>(
        &mut self,
        store: &mut S,
        memo: &mut ImportMemo,
        descriptors: Vec<NodeDescriptor>,
    ) -> Result<(), ImportError> {
        let mut parent: Option<NodeId> = None;
        for descriptor in descriptors {
            let id = match memo.get(&descriptor.urn) {
                Some(id) => id,
                None => {
                    let urn = descriptor.urn.clone();
                    let id = match store.get_by_urn(&urn).map(TextNode::id) {
                        Some(existing) => existing,
                        None => {
                            let idx = self.next_idx(&descriptor.kind);
                            let fields = descriptor.into_new_node(idx);
                            let id = match parent {
                                Some(parent) => store.add_child(parent, fields)?,
                                None => store.create_root(fields)?,
                            };
                            self.created += 1;
                            id
                        }
                    };
                    memo.insert(urn, id);
                    id
                }
            };
            parent = Some(id);
        }

        self.lines += 1;
        Ok(())
    }

    /// Import one line. `line_number` is 1-based and only used in errors.
    pub fn import_line<S: NodeStore>(
        &mut self,
        store: &mut S,
        memo: &mut ImportMemo,
        line_number: usize,
        line: &str,
    ) -> Result<(), ImportError> {
        match self.prepare_line(line_number, line)? {
            Some(descriptors) => self.apply(store, memo, descriptors),
            None => Ok(()),
        }
    }

    /// Import every line, or nothing: all lines are destructured before the
    /// first node is created, so an error leaves `store` and `memo` as they
    /// were.
    pub fn import_lines<S, I, L>(
        mut self,
        store: &mut S,
        memo: &mut ImportMemo,
        lines: I,
    ) -> Result<ImportSummary, ImportError>
    where
        S: NodeStore,
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut prepared = Vec::new();
        for (i, line) in lines.into_iter().enumerate() {
            if let Some(descriptors) = self.prepare_line(i + 1, line.as_ref())? {
                prepared.push(descriptors);
            }
        }

        for descriptors in prepared {
            self.apply(store, memo, descriptors)?;
        }
        Ok(self.finish(store))
    }

    pub fn finish<S: NodeStore>(self, store: &S) -> ImportSummary {
        let root = store.get_by_urn(&self.root_urn).map(TextNode::id);
        let descendant_count = root.map_or(0, |root| store.descendant_count(root));

        log::info!("{}: {} nodes.", self.root_urn, descendant_count + 1);
        for (kind, count) in &self.idx {
            log::debug!("{}: created {count} {kind} nodes", self.root_urn);
        }

        ImportSummary {
            version_urn: self.root_urn,
            root,
            lines: self.lines,
            created: self.created,
            descendant_count,
        }
    }
}

/// Import the lines of one version into `store`. Nothing is created unless
/// every line imports.
pub fn import<S, I, L>(
    store: &mut S,
    memo: &mut ImportMemo,
    version_urn: &str,
    scheme: CitationScheme,
    metadata: Metadata,
    lines: I,
) -> Result<ImportSummary, ImportError>
where
    S: NodeStore,
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    VersionImporter::new(version_urn, scheme, metadata)?.import_lines(store, memo, lines)
}

/// Import a library version, reading its text from the data directory.
pub fn import_version<S: NodeStore>(
    store: &mut S,
    memo: &mut ImportMemo,
    library: &Library,
    entry: &VersionEntry,
) -> Result<ImportSummary, ImportError> {
    let text = library.read_source(entry)?;
    import(
        store,
        memo,
        &entry.urn,
        entry.citation_scheme.clone(),
        entry.metadata(),
        text.lines(),
    )
}

/// Outcome of importing a whole library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarySummary {
    pub versions: Vec<ImportSummary>,
    pub total_nodes: usize,
}

/// Import every version of `library` into a fresh store.
///
/// All source files are checked before anything is created, and the store
/// is only handed back once every version imported, so a failure leaves no
/// partially built tree behind.
pub fn import_library<S: NodeStore + Default>(
    library: &Library,
) -> Result<(S, LibrarySummary), ImportError> {
    for entry in library.versions() {
        let path = library.source_path(entry);
        if !path.is_file() {
            return Err(ImportError::MissingSource(path));
        }
    }

    let mut store = S::default();
    let mut memo = ImportMemo::new();
    let mut versions = Vec::new();
    for entry in library.versions() {
        versions.push(import_version(&mut store, &mut memo, library, entry)?);
    }

    let total_nodes = store.len();
    log::info!("{total_nodes} total nodes on the tree.");
    Ok((store, LibrarySummary { versions, total_nodes }))
}
