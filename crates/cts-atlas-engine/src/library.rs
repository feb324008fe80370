//! # Library data
//!
//! A library lives in a data directory of nested folders, each holding a
//! `metadata.json` that describes either a textgroup or a work:
//!
//! ```text
//! data/
//! └── tlg0012/
//!     ├── metadata.json                       {"node_kind": "textgroup", ...}
//!     └── tlg001/
//!         ├── metadata.json                   {"node_kind": "work", "versions": [...]}
//!         └── tlg0012.tlg001.perseus-grc2.txt
//! ```
//!
//! Each version listed by a work has its text beside the work's metadata,
//! named after the work component of the version URN. [`Library::resolve`]
//! walks the directory once and fails if any listed text is missing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cts_atlas_syntax::{Urn, UrnComponent, UrnError};
use relative_path::RelativePathBuf;
use serde::Deserialize;
use thiserror::Error;

use crate::io::{self, IoError};
use crate::models::{CitationScheme, Metadata, VersionMetadata};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("invalid URN in {}: {source}", path.display())]
    InvalidUrn {
        path: PathBuf,
        #[source]
        source: UrnError,
    },

    #[error("source text not found: {}", .0.display())]
    MissingSource(PathBuf),
}

/// A string in a given language, e.g. `{"lang": "eng", "value": "Iliad"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LangValue {
    pub lang: String,
    pub value: String,
}

/// The value for `lang`, else the first value given.
pub fn first_value_for_language<'a>(values: &'a [LangValue], lang: &str) -> Option<&'a str> {
    values
        .iter()
        .find(|v| v.lang == lang)
        .or_else(|| values.first())
        .map(|v| v.value.as_str())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextGroupRecord {
    pub urn: String,
    #[serde(default)]
    pub name: Vec<LangValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkRecord {
    pub urn: String,
    #[serde(default)]
    pub group_urn: Option<String>,
    #[serde(default)]
    pub title: Vec<LangValue>,
    #[serde(default)]
    pub versions: Vec<VersionRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VersionRecord {
    pub urn: String,
    pub citation_scheme: CitationScheme,
    #[serde(default)]
    pub first_passage_urn: Option<String>,
    #[serde(default)]
    pub default_toc_urn: Option<String>,
    #[serde(default)]
    pub label: Vec<LangValue>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "node_kind", rename_all = "lowercase")]
enum MetadataRecord {
    Textgroup(TextGroupRecord),
    Work(WorkRecord),
}

/// A version ready for import.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionEntry {
    pub urn: String,
    pub citation_scheme: CitationScheme,
    pub work_urn: String,
    pub work_title: Option<String>,
    pub first_passage_urn: Option<String>,
    pub default_toc_urn: Option<String>,
    /// Location of the text, relative to the data directory.
    pub content_path: RelativePathBuf,
}

impl VersionEntry {
    /// The metadata blob stored on the version node.
    pub fn metadata(&self) -> Metadata {
        VersionMetadata {
            citation_scheme: self.citation_scheme.clone(),
            work_title: self.work_title.clone(),
            first_passage_urn: self.first_passage_urn.clone(),
            default_toc_urn: self.default_toc_urn.clone(),
        }
        .into_map()
    }
}

/// Every textgroup, work and version found in a data directory.
#[derive(Debug, Clone, Default)]
pub struct Library {
    root: PathBuf,
    text_groups: BTreeMap<String, TextGroupRecord>,
    works: BTreeMap<String, WorkRecord>,
    versions: Vec<VersionEntry>,
}

impl Library {
    pub fn resolve(data_dir: &Path) -> Result<Self, LibraryError> {
        let mut library = Library {
            root: data_dir.to_path_buf(),
            ..Default::default()
        };

        for metadata_path in io::scan_metadata_files(data_dir)? {
            match io::read_metadata::<MetadataRecord>(&metadata_path)? {
                MetadataRecord::Textgroup(group) => {
                    library.text_groups.insert(group.urn.clone(), group);
                }
                MetadataRecord::Work(work) => {
                    library.populate_versions(&metadata_path, &work)?;
                    library.works.insert(work.urn.clone(), work);
                }
            }
        }

        log::debug!(
            "resolved {} textgroups, {} works, {} versions under {}",
            library.text_groups.len(),
            library.works.len(),
            library.versions.len(),
            data_dir.display()
        );
        Ok(library)
    }

    fn populate_versions(
        &mut self,
        metadata_path: &Path,
        work: &WorkRecord,
    ) -> Result<(), LibraryError> {
        let dir = metadata_path.parent().unwrap_or(&self.root);
        let work_title = first_value_for_language(&work.title, "eng").map(str::to_string);

        for version in &work.versions {
            let invalid = |source| LibraryError::InvalidUrn {
                path: metadata_path.to_path_buf(),
                source,
            };
            let urn = Urn::parse(&version.urn).map_err(invalid)?;
            let work_urn = urn.up_to(UrnComponent::Work).map_err(invalid)?;

            let version_path = dir.join(format!("{}.txt", urn.work_component()));
            if !version_path.is_file() {
                return Err(LibraryError::MissingSource(version_path));
            }
            let content_path = version_path
                .strip_prefix(&self.root)
                .ok()
                .and_then(|relative| RelativePathBuf::from_path(relative).ok())
                .ok_or_else(|| {
                    IoError::InvalidDataDir(format!(
                        "{} is outside {}",
                        version_path.display(),
                        self.root.display()
                    ))
                })?;

            self.versions.push(VersionEntry {
                urn: version.urn.clone(),
                citation_scheme: version.citation_scheme.clone(),
                work_urn,
                work_title: work_title.clone(),
                first_passage_urn: version.first_passage_urn.clone(),
                default_toc_urn: version.default_toc_urn.clone(),
                content_path,
            });
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn text_groups(&self) -> impl Iterator<Item = &TextGroupRecord> {
        self.text_groups.values()
    }

    pub fn works(&self) -> impl Iterator<Item = &WorkRecord> {
        self.works.values()
    }

    /// Versions in discovery order.
    pub fn versions(&self) -> impl Iterator<Item = &VersionEntry> {
        self.versions.iter()
    }

    /// Look up a version by URN, with or without the trailing `:`.
    pub fn version(&self, urn: &str) -> Option<&VersionEntry> {
        let wanted = urn.trim_end_matches(':');
        self.versions
            .iter()
            .find(|v| v.urn.trim_end_matches(':') == wanted)
    }

    pub fn source_path(&self, entry: &VersionEntry) -> PathBuf {
        entry.content_path.to_path(&self.root)
    }

    pub fn read_source(&self, entry: &VersionEntry) -> Result<String, IoError> {
        io::read_file(&entry.content_path, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{ILIAD_LINES, create_test_data_dir, create_test_file};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const TEXTGROUP: &str = r#"{
        "node_kind": "textgroup",
        "urn": "urn:cts:greekLit:tlg0012:",
        "name": [{"lang": "eng", "value": "Homer"}]
    }"#;

    const WORK: &str = r#"{
        "node_kind": "work",
        "urn": "urn:cts:greekLit:tlg0012.tlg001:",
        "group_urn": "urn:cts:greekLit:tlg0012:",
        "title": [{"lang": "grc", "value": "Ἰλιάς"}, {"lang": "eng", "value": "Iliad"}],
        "versions": [{
            "urn": "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:",
            "citation_scheme": ["book", "line"],
            "first_passage_urn": "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7",
            "label": [{"lang": "eng", "value": "Iliad (Greek)"}]
        }]
    }"#;

    fn write_library(with_text: bool) -> TempDir {
        let data_dir = create_test_data_dir();
        create_test_file(&data_dir, "tlg0012/metadata.json", TEXTGROUP);
        create_test_file(&data_dir, "tlg0012/tlg001/metadata.json", WORK);
        if with_text {
            create_test_file(
                &data_dir,
                "tlg0012/tlg001/tlg0012.tlg001.perseus-grc2.txt",
                &ILIAD_LINES.join("\n"),
            );
        }
        data_dir
    }

    #[test]
    fn resolves_groups_works_and_versions() {
        let data_dir = write_library(true);
        let library = Library::resolve(data_dir.path()).unwrap();

        assert_eq!(library.text_groups().count(), 1);
        assert_eq!(library.works().count(), 1);

        let version = library
            .version("urn:cts:greekLit:tlg0012.tlg001.perseus-grc2")
            .unwrap();
        assert_eq!(version.work_urn, "urn:cts:greekLit:tlg0012.tlg001:");
        assert_eq!(version.work_title.as_deref(), Some("Iliad"));
        assert_eq!(version.citation_scheme, CitationScheme::new(["book", "line"]));
        assert_eq!(
            version.content_path,
            RelativePathBuf::from("tlg0012/tlg001/tlg0012.tlg001.perseus-grc2.txt")
        );
        assert_eq!(
            library.read_source(version).unwrap().lines().count(),
            ILIAD_LINES.len()
        );
    }

    #[test]
    fn version_metadata_blob() {
        let data_dir = write_library(true);
        let library = Library::resolve(data_dir.path()).unwrap();
        let metadata = library.versions().next().unwrap().metadata();

        assert_eq!(metadata["work_title"], "Iliad");
        assert_eq!(
            metadata["first_passage_urn"],
            "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:1.1-1.7"
        );
        assert!(metadata["default_toc_urn"].is_null());
        assert_eq!(
            CitationScheme::from_metadata(&metadata),
            Some(CitationScheme::new(["book", "line"]))
        );
    }

    #[test]
    fn missing_text_is_fatal() {
        let data_dir = write_library(false);
        let err = Library::resolve(data_dir.path()).unwrap_err();
        match err {
            LibraryError::MissingSource(path) => {
                assert!(path.ends_with("tlg0012/tlg001/tlg0012.tlg001.perseus-grc2.txt"));
            }
            other => panic!("expected MissingSource, got {other:?}"),
        }
    }

    #[test]
    fn unknown_node_kind_is_rejected() {
        let data_dir = create_test_data_dir();
        create_test_file(
            &data_dir,
            "x/metadata.json",
            r#"{"node_kind": "version", "urn": "urn:cts:greekLit:x.y.z:"}"#,
        );
        let err = Library::resolve(data_dir.path()).unwrap_err();
        assert!(matches!(err, LibraryError::Io(IoError::Json { .. })));
    }

    #[test]
    fn invalid_version_urn_is_rejected() {
        let data_dir = create_test_data_dir();
        create_test_file(
            &data_dir,
            "x/metadata.json",
            r#"{
                "node_kind": "work",
                "urn": "w",
                "versions": [{"urn": "nope", "citation_scheme": ["line"]}]
            }"#,
        );
        let err = Library::resolve(data_dir.path()).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidUrn { .. }));
    }

    #[test]
    fn language_fallback() {
        let values = vec![
            LangValue { lang: "grc".into(), value: "Ἰλιάς".into() },
            LangValue { lang: "eng".into(), value: "Iliad".into() },
        ];
        assert_eq!(first_value_for_language(&values, "eng"), Some("Iliad"));
        assert_eq!(first_value_for_language(&values, "lat"), Some("Ἰλιάς"));
        assert_eq!(first_value_for_language(&[], "eng"), None);
    }
}
