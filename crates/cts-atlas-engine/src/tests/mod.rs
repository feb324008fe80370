use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::import::{ImportMemo, import};
use crate::models::{CitationScheme, Metadata, NodeId, VersionMetadata};
use crate::store::{ArenaStore, NodeStore};

pub const ILIAD_VERSION: &str = "urn:cts:greekLit:tlg0012.tlg001.perseus-grc2:";

/// Iliad 1.1-1.7 and 2.1-2.3 in the line format of a version text file.
pub const ILIAD_LINES: &[&str] = &[
    "Il.1.1 μῆνιν ἄειδε θεὰ Πηληϊάδεω Ἀχιλῆος",
    "Il.1.2 οὐλομένην, ἣ μυρί᾽ Ἀχαιοῖς ἄλγε᾽ ἔθηκε,",
    "Il.1.3 πολλὰς δ᾽ ἰφθίμους ψυχὰς Ἄϊδι προΐαψεν",
    "Il.1.4 ἡρώων, αὐτοὺς δὲ ἑλώρια τεῦχε κύνεσσιν",
    "Il.1.5 οἰωνοῖσί τε πᾶσι, Διὸς δ᾽ ἐτελείετο βουλή,",
    "Il.1.6 ἐξ οὗ δὴ τὰ πρῶτα διαστήτην ἐρίσαντε",
    "Il.1.7 Ἀτρεΐδης τε ἄναξ ἀνδρῶν καὶ δῖος Ἀχιλλεύς.",
    "Il.2.1 ἄλλοι μέν ῥα θεοί τε καὶ ἀνέρες ἱπποκορυσταὶ",
    "Il.2.2 εὗδον παννύχιοι, Δία δ᾽ οὐκ ἔχε νήδυμος ὕπνος,",
    "Il.2.3 ἀλλ᾽ ὅ γε μερμήριζε κατὰ φρένα ὡς Ἀχιλῆα",
];

/// Create a temporary data directory for testing
pub fn create_test_data_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file, making any parent directories
pub fn create_test_file(data_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = data_dir.path().join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

pub fn iliad_metadata() -> Metadata {
    let mut metadata = VersionMetadata::new(CitationScheme::new(["book", "line"]));
    metadata.work_title = Some("Iliad".to_string());
    metadata.first_passage_urn = Some(format!("{ILIAD_VERSION}1.1-1.7"));
    metadata.into_map()
}

/// An arena holding the fixture Iliad, and the handle of its version node.
pub fn imported_iliad() -> (ArenaStore, NodeId) {
    let mut store = ArenaStore::new();
    let mut memo = ImportMemo::new();
    let summary = import(
        &mut store,
        &mut memo,
        ILIAD_VERSION,
        CitationScheme::new(["book", "line"]),
        iliad_metadata(),
        ILIAD_LINES.iter().copied(),
    )
    .unwrap();
    let root = summary.root.unwrap();
    assert!(store.get(root).is_some());
    (store, root)
}
