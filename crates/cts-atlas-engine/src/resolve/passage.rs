use std::ops::Range;

use serde::Serialize;

use crate::models::TextNode;
use crate::store::NodeStore;

/// A contiguous run of citable nodes, named by its first and last node.
#[derive(Debug, Clone, Copy)]
pub struct Passage<'a> {
    pub start: &'a TextNode,
    pub end: Option<&'a TextNode>,
}

impl<'a> Passage<'a> {
    pub fn new(start: &'a TextNode, end: Option<&'a TextNode>) -> Self {
        Self { start, end }
    }

    /// The passage spanning an ordered slice of leaves.
    pub fn from_leaves(leaves: &[&'a TextNode]) -> Option<Self> {
        let start = *leaves.first()?;
        let end = leaves.last().copied().filter(|end| end.id() != start.id());
        Some(Self::new(start, end))
    }

    /// `<root_urn><start>` or `<root_urn><start>-<end>`.
    pub fn urn(&self, root_urn: &str) -> String {
        let start = self.start.reference().unwrap_or_default();
        match self.end.and_then(TextNode::reference) {
            Some(end) if end != start => format!("{root_urn}{start}-{end}"),
            _ => format!("{root_urn}{start}"),
        }
    }

    /// Render as e.g. `Book 1 Line 1 to Line 7` or `Book 1 Line 7 to Book 2 Line 3`.
    ///
    /// Every rank of the start is named; the end only repeats the ranks whose
    /// reference differs from the start's.
    pub fn human_readable_reference<S: NodeStore + ?Sized>(&self, store: &'a S) -> String {
        let start_chain = ranked_chain(store, self.start);
        let end_chain = match self.end {
            Some(end) => ranked_chain(store, end),
            None => start_chain.clone(),
        };

        let mut start_pieces = Vec::new();
        let mut end_pieces = Vec::new();
        for (start, end) in start_chain.iter().zip(&end_chain) {
            start_pieces.push(human_readable_part(start));
            if start.reference() != end.reference() {
                end_pieces.push(human_readable_part(end));
            }
        }

        let start_fragment = start_pieces.join(" ");
        if end_pieces.is_empty() {
            start_fragment
        } else {
            format!("{start_fragment} to {}", end_pieces.join(" "))
        }
    }
}

/// Citation-rank ancestors of `node`, outermost first, followed by `node`.
fn ranked_chain<'a, S: NodeStore + ?Sized>(
    store: &'a S,
    node: &'a TextNode,
) -> Vec<&'a TextNode> {
    let mut chain: Vec<&TextNode> = store
        .ancestors(node.id())
        .into_iter()
        .filter(|ancestor| ancestor.rank().is_some())
        .collect();
    chain.push(node);
    chain
}

fn human_readable_part(node: &TextNode) -> String {
    format!(
        "{} {}",
        title_case(node.kind().as_str()),
        node.lowest_citable_part().unwrap_or_default()
    )
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// One citable node of a resolved passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassageLeaf {
    pub kind: String,
    pub urn: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub idx: usize,
    pub text: String,
}

impl From<&TextNode> for PassageLeaf {
    fn from(node: &TextNode) -> Self {
        Self {
            kind: node.kind().to_string(),
            urn: node.urn().to_string(),
            reference: node.reference().unwrap_or_default().to_string(),
            idx: node.idx(),
            text: node.text_content().unwrap_or_default().to_string(),
        }
    }
}

/// A citation-rank node above the first leaf, e.g. its book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ancestor {
    pub kind: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub urn: String,
}

impl From<&TextNode> for Ancestor {
    fn from(node: &TextNode) -> Self {
        Self {
            kind: node.kind().to_string(),
            reference: node.reference().unwrap_or_default().to_string(),
            urn: node.urn().to_string(),
        }
    }
}

/// A navigation window: a half-open idx range over the leaves of the same
/// text, and the passage URN covering it when it is not empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub range: Range<usize>,
    pub urn: Option<String>,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// The window of `range.len()` leaves just before `range`, cut short at 0.
pub fn previous_window(range: &Range<usize>) -> Range<usize> {
    if range.is_empty() || range.start == 0 {
        return 0..0;
    }
    range.start.saturating_sub(range.len())..range.start
}

/// The window of `range.len()` leaves just after `range`, cut short at
/// `total`. Never wraps back to the start of the text.
pub fn next_window(range: &Range<usize>, total: usize) -> Range<usize> {
    if range.is_empty() || range.end >= total {
        return total..total;
    }
    range.end..(range.end + range.len()).min(total)
}

/// A resolved passage reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPassage {
    /// The version or exemplar URN the reference was resolved against.
    pub version_urn: String,
    pub reference: String,
    /// The passage URN naming exactly these leaves.
    pub urn: String,
    pub human_readable: String,
    /// Half-open idx range of the leaves.
    pub range: Range<usize>,
    pub leaves: Vec<PassageLeaf>,
    pub ancestors: Vec<Ancestor>,
    pub previous: Window,
    pub next: Window,
}

impl ResolvedPassage {
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn refs(&self) -> Vec<&str> {
        self.leaves.iter().map(|leaf| leaf.reference.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{ILIAD_VERSION, imported_iliad};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("book", "Book")]
    #[case("line", "Line")]
    #[case("LINE", "Line")]
    #[case("sub-section", "Sub-Section")]
    #[case("folio2r", "Folio2R")]
    #[case("", "")]
    fn title_cases_each_word(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[rstest]
    #[case(0..3, 0..0)]
    #[case(3..6, 0..3)]
    #[case(2..6, 0..2)]
    #[case(4..4, 0..0)]
    fn previous_windows(#[case] range: Range<usize>, #[case] expected: Range<usize>) {
        assert_eq!(previous_window(&range), expected);
    }

    #[rstest]
    #[case(0..3, 10, 3..6)]
    #[case(5..8, 10, 8..10)]
    #[case(7..10, 10, 10..10)]
    #[case(0..10, 10, 10..10)]
    fn next_windows(
        #[case] range: Range<usize>,
        #[case] total: usize,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(next_window(&range, total), expected);
    }

    fn leaf<'s>(store: &'s crate::store::ArenaStore, reference: &str) -> &'s TextNode {
        store.get_by_urn(&format!("{ILIAD_VERSION}{reference}")).unwrap()
    }

    #[rstest]
    #[case("1.1", None, "Book 1 Line 1")]
    #[case("1.1", Some("1.1"), "Book 1 Line 1")]
    #[case("1.1", Some("1.7"), "Book 1 Line 1 to Line 7")]
    #[case("1.7", Some("2.3"), "Book 1 Line 7 to Book 2 Line 3")]
    #[case("1.3", Some("2.3"), "Book 1 Line 3 to Book 2 Line 3")]
    fn human_readable(#[case] start: &str, #[case] end: Option<&str>, #[case] expected: &str) {
        let (store, _) = imported_iliad();
        let passage = Passage::new(leaf(&store, start), end.map(|e| leaf(&store, e)));
        assert_eq!(passage.human_readable_reference(&store), expected);
    }

    #[test]
    fn passage_urns() {
        let (store, _) = imported_iliad();
        let single = Passage::from_leaves(&[leaf(&store, "1.4")]).unwrap();
        assert_eq!(single.urn(ILIAD_VERSION), format!("{ILIAD_VERSION}1.4"));

        let range = Passage::from_leaves(&[leaf(&store, "1.4"), leaf(&store, "1.5")]).unwrap();
        assert_eq!(range.urn(ILIAD_VERSION), format!("{ILIAD_VERSION}1.4-1.5"));

        assert!(Passage::from_leaves(&[]).is_none());
    }
}
