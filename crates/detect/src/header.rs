//! Header hierarchy reconstruction.
//!
//! Multi-row headers encode a category tree through blank cells: a label in
//! an upper row spans every column up to the next label in that row, and the
//! labels underneath it are its children.
//!
//! ```text
//!        | Gender |        | Total
//!        | Male   | Female |
//! ```
//!
//! becomes `Gender > Male`, `Gender > Female`, `Total > Total`.

use crate::block::Block;
use crate::error::{DetectError, Result};
use serde::Serialize;
use std::ops::Range;
use xtab_grid::Grid;

/// Index of a node inside its [`HeaderTree`].
pub type NodeId = usize;

/// One header label and the grid columns it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderNode {
    pub label: String,
    /// Header row index within the block (0 = top header row).
    pub level: usize,
    /// Grid columns covered by this node.
    pub span: Range<usize>,
    pub parent: Option<NodeId>,
    /// Children in column order.
    pub children: Vec<NodeId>,
    /// True when the label was synthesized rather than read from a cell.
    pub synthetic: bool,
}

impl HeaderNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed header forest of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderTree {
    nodes: Vec<HeaderNode>,
    roots: Vec<NodeId>,
    depth: usize,
}

impl HeaderTree {
    /// Create an empty tree for a header of `depth` rows.
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            depth,
        }
    }

    /// Add a node and attach it to `parent` (or to the roots).
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        level: usize,
        span: Range<usize>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(HeaderNode {
            label: label.into(),
            level,
            span,
            parent,
            children: Vec::new(),
            synthetic: false,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    fn add_synthetic(
        &mut self,
        label: String,
        level: usize,
        span: Range<usize>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.add_node(label, level, span, parent);
        self.nodes[id].synthetic = true;
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&HeaderNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[HeaderNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of header rows the tree was built from.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf nodes in column order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Labels from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|i| self.nodes.get(i)) {
            path.push(node.label.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// One label path per leaf, in column order.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        self.leaves().into_iter().map(|id| self.path(id)).collect()
    }

    /// Check the structural invariants of the tree.
    ///
    /// Every parent span must equal the union of its children's spans, with
    /// children contiguous and non-overlapping; leaves sit on the last header
    /// row and are one column wide; roots are contiguous.
    pub fn validate(&self, block: &str) -> Result<()> {
        self.check_contiguous(block, "<root>", None, &self.roots)?;

        for node in &self.nodes {
            if node.is_leaf() {
                if node.span.len() != 1 || node.level + 1 != self.depth {
                    return Err(self.mismatch(block, node, &[]));
                }
            } else {
                self.check_contiguous(block, &node.label, Some(node), &node.children)?;
            }
        }
        Ok(())
    }

    fn check_contiguous(
        &self,
        block: &str,
        label: &str,
        owner: Option<&HeaderNode>,
        children: &[NodeId],
    ) -> Result<()> {
        let spans: Vec<Range<usize>> = children
            .iter()
            .map(|&c| self.nodes[c].span.clone())
            .collect();

        let contiguous = spans.windows(2).all(|w| w[0].end == w[1].start);
        let covers = match (owner, spans.first(), spans.last()) {
            (Some(node), Some(first), Some(last)) => {
                first.start == node.span.start && last.end == node.span.end
            }
            (None, _, _) => true,
            _ => false,
        };

        if contiguous && covers {
            return Ok(());
        }
        let span = owner.map_or_else(
            || {
                let start = spans.first().map_or(0, |s| s.start);
                let end = spans.last().map_or(start, |s| s.end);
                start..end
            },
            |node| node.span.clone(),
        );
        Err(DetectError::HeaderSpanMismatch {
            block: block.to_string(),
            label: label.to_string(),
            span,
            children: spans,
        })
    }

    fn mismatch(&self, block: &str, node: &HeaderNode, children: &[NodeId]) -> DetectError {
        DetectError::HeaderSpanMismatch {
            block: block.to_string(),
            label: node.label.clone(),
            span: node.span.clone(),
            children: children
                .iter()
                .map(|&c| self.nodes[c].span.clone())
                .collect(),
        }
    }
}

/// Reconstruct the header tree of `block`.
///
/// Within each header row a label opens a node that absorbs the following
/// blank cells until the next label, the end of the block's columns, or the
/// end of its parent's span. A blank cell at the start of a parent's span
/// opens a child carrying the parent's label, so every leaf sits on the last
/// header row. Leading top-row columns with no label become `column_<index>`.
pub fn build_header_tree(grid: &Grid, block: &Block) -> Result<HeaderTree> {
    let mut tree = HeaderTree::new(block.header_depth());
    let mut previous: Vec<NodeId> = Vec::new();

    for (level, row) in block.header_rows.clone().enumerate() {
        let mut opened = Vec::new();
        if level == 0 {
            open_nodes(&mut tree, grid, row, 0, block.cols.clone(), None, &mut opened);
        } else {
            for &parent in &previous {
                let span = tree.nodes[parent].span.clone();
                open_nodes(&mut tree, grid, row, level, span, Some(parent), &mut opened);
            }
        }
        previous = opened;
    }

    tree.validate(&block.name)?;
    Ok(tree)
}

fn open_nodes(
    tree: &mut HeaderTree,
    grid: &Grid,
    row: usize,
    level: usize,
    span: Range<usize>,
    parent: Option<NodeId>,
    opened: &mut Vec<NodeId>,
) {
    let mut col = span.start;
    while col < span.end {
        let cell = grid.cell(row, col);
        let id = if !cell.is_empty() {
            let end = absorb_blanks(grid, row, col, span.end);
            tree.add_node(cell.as_text(), level, col..end, parent)
        } else if let Some(p) = parent {
            let end = absorb_blanks(grid, row, col, span.end);
            let label = tree.nodes[p].label.clone();
            tree.add_synthetic(label, level, col..end, parent)
        } else {
            tree.add_synthetic(format!("column_{col}"), level, col..col + 1, None)
        };
        col = tree.nodes[id].span.end;
        opened.push(id);
    }
}

/// End (exclusive) of the run of blank cells after `start`, capped at `limit`.
fn absorb_blanks(grid: &Grid, row: usize, start: usize, limit: usize) -> usize {
    (start + 1..limit)
        .find(|&c| !grid.cell(row, c).is_empty())
        .unwrap_or(limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::detect_blocks;

    fn tree_for(csv: &str) -> Result<HeaderTree> {
        let grid = Grid::from_csv_str(csv).unwrap();
        let block = detect_blocks(&grid).next().unwrap().unwrap();
        build_header_tree(&grid, &block)
    }

    fn paths(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_single_row_header() {
        let tree = tree_for("Q1,,\n,Yes,No\nMale,10,5").unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.leaf_paths(), paths(&[&["Yes"], &["No"]]));
        for &leaf in &tree.leaves() {
            assert_eq!(tree.node(leaf).unwrap().span.len(), 1);
        }
    }

    #[test]
    fn test_two_level_header() {
        let tree =
            tree_for("Q2,,,,,\n,Gender,,Age,,\n,Male,Female,18-34,35+,\nYes,1,2,3,4,").unwrap();

        assert_eq!(tree.depth(), 2);
        let gender = tree.node(tree.roots()[0]).unwrap();
        assert_eq!(gender.label, "Gender");
        assert_eq!(gender.span, 1..3);
        assert_eq!(gender.children.len(), 2);

        let age = tree.node(tree.roots()[1]).unwrap();
        assert_eq!(age.span, 3..5);
        assert_eq!(
            tree.leaf_paths(),
            paths(&[
                &["Gender", "Male"],
                &["Gender", "Female"],
                &["Age", "18-34"],
                &["Age", "35+"],
            ])
        );
    }

    #[test]
    fn test_span_closes_when_sibling_opens() {
        // "A" must not swallow column 3 even though row 2 continues under it
        let tree = tree_for("T,,,\n,A,,B\n,x,y,z\nr,1,2,3").unwrap();

        let a = tree.node(tree.roots()[0]).unwrap();
        let b = tree.node(tree.roots()[1]).unwrap();
        assert_eq!(a.span, 1..3);
        assert_eq!(b.span, 3..4);
    }

    #[test]
    fn test_continuation_child_for_blank_under_parent() {
        let tree = tree_for("Q,,,\n,Gender,,Total\n,M,F,\nYes,1,2,3").unwrap();

        assert_eq!(
            tree.leaf_paths(),
            paths(&[&["Gender", "M"], &["Gender", "F"], &["Total", "Total"]])
        );
        let leaves = tree.leaves();
        let total_leaf = tree.node(leaves[2]).unwrap();
        assert!(total_leaf.synthetic);
        assert_eq!(total_leaf.level, 1);
    }

    #[test]
    fn test_uncovered_leading_column() {
        let tree = tree_for("Q,,,\n,,Gender,\n,All,M,F\nYes,9,4,5").unwrap();

        assert_eq!(
            tree.leaf_paths(),
            paths(&[&["column_1", "All"], &["Gender", "M"], &["Gender", "F"]])
        );
        assert!(tree.node(tree.roots()[0]).unwrap().synthetic);
    }

    #[test]
    fn test_three_level_header_keeps_leaves_at_full_depth() {
        let tree = tree_for("Q,,,,\n,Gender,,Age,\n,M,,Young,Old\n,a,b,c,d\nYes,1,2,3,4").unwrap();

        assert_eq!(tree.depth(), 3);
        assert_eq!(
            tree.leaf_paths(),
            paths(&[
                &["Gender", "M", "a"],
                &["Gender", "M", "b"],
                &["Age", "Young", "c"],
                &["Age", "Old", "d"],
            ])
        );
        for &leaf in &tree.leaves() {
            let node = tree.node(leaf).unwrap();
            assert_eq!(node.level, 2);
            assert_eq!(node.span.len(), 1);
        }
    }

    #[test]
    fn test_validate_rejects_gap_between_children() {
        let mut tree = HeaderTree::new(2);
        let parent = tree.add_node("Gender", 0, 1..4, None);
        tree.add_node("M", 1, 1..2, Some(parent));
        tree.add_node("F", 1, 3..4, Some(parent));

        let err = tree.validate("Q").unwrap_err();
        match err {
            DetectError::HeaderSpanMismatch {
                block,
                label,
                span,
                children,
            } => {
                assert_eq!(block, "Q");
                assert_eq!(label, "Gender");
                assert_eq!(span, 1..4);
                assert_eq!(children, vec![1..2, 3..4]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_rejects_shallow_leaf() {
        let mut tree = HeaderTree::new(2);
        tree.add_node("Total", 0, 1..2, None);

        assert!(tree.validate("Q").is_err());
    }
}
