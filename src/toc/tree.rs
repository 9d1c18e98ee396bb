use crate::error::{Result, TocError};
use crate::toc::builder::OutlineSink;
use serde::Serialize;

/// Index of a node inside an [`OutlineTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub title: String,
    pub target_page: u32,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed outline tree bounded by a page count.
///
/// The root sits at index 0 and carries no title or page. Children keep their
/// creation order.
#[derive(Debug, Clone)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    page_count: u32,
}

/// Nested, serializable view of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub title: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineItem>,
}

impl OutlineTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(page_count: u32) -> Self {
        OutlineTree {
            nodes: vec![OutlineNode {
                title: String::new(),
                target_page: 0,
                parent: None,
                children: Vec::new(),
            }],
            page_count,
        }
    }

    pub fn node(&self, id: NodeId) -> &OutlineNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of outline items, not counting the root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of items anywhere below `id`.
    pub fn descendant_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .map(|&child| 1 + self.descendant_count(child))
            .sum()
    }

    /// Every item in document order with its nesting level (0 for top level).
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.len());
        let mut pending: Vec<(usize, NodeId)> = self
            .children(Self::ROOT)
            .iter()
            .rev()
            .map(|&id| (0, id))
            .collect();

        while let Some((level, id)) = pending.pop() {
            out.push((level, id));
            pending.extend(self.children(id).iter().rev().map(|&c| (level + 1, c)));
        }

        out
    }

    pub fn items(&self) -> Vec<OutlineItem> {
        self.items_under(Self::ROOT)
    }

    fn items_under(&self, id: NodeId) -> Vec<OutlineItem> {
        self.children(id)
            .iter()
            .map(|&child| {
                let node = self.node(child);
                OutlineItem {
                    title: node.title.clone(),
                    page: node.target_page,
                    children: self.items_under(child),
                }
            })
            .collect()
    }
}

impl OutlineSink for OutlineTree {
    type Handle = NodeId;

    fn root_outline(&self) -> NodeId {
        Self::ROOT
    }

    fn create_child(&mut self, parent: NodeId, title: &str, target_page: i64) -> Result<NodeId> {
        let page = u32::try_from(target_page)
            .ok()
            .filter(|p| (1..=self.page_count).contains(p))
            .ok_or(TocError::InvalidTargetPage {
                page: target_page,
                page_count: self.page_count,
            })?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(OutlineNode {
            title: title.to_string(),
            target_page: page,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);

        Ok(id)
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::builder::build;
    use crate::toc::source::parse_toc;

    fn tree_from(text: &str, shift: i64) -> OutlineTree {
        let mut tree = OutlineTree::new(100);
        build(parse_toc(text).unwrap(), shift, &mut tree).unwrap();
        tree
    }

    fn titles(tree: &OutlineTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.node(id).title.clone()).collect()
    }

    #[test]
    fn test_end_to_end_tree() {
        let tree = tree_from(
            "1 Introduction 1\n1.1 Background 2\n1.2 Motivation 4\n2 Methods 10\n",
            0,
        );

        let top = tree.children(OutlineTree::ROOT);
        assert_eq!(titles(&tree, top), vec!["1 Introduction", "2 Methods"]);
        assert_eq!(tree.node(top[0]).target_page, 1);
        assert_eq!(tree.node(top[1]).target_page, 10);

        let intro = tree.children(top[0]);
        assert_eq!(titles(&tree, intro), vec!["1.1 Background", "1.2 Motivation"]);
        assert_eq!(tree.node(intro[0]).target_page, 2);
        assert_eq!(tree.node(intro[1]).target_page, 4);
        assert_eq!(tree.node(intro[1]).parent, Some(top[0]));
        assert!(tree.children(top[1]).is_empty());
    }

    #[test]
    fn test_sibling_after_deeper_entry() {
        // depths 0, 1, 2, 1, 0: entry 4 sits next to entry 2, not entry 3
        let tree = tree_from("1 A 1\n1.1 B 2\n1.1.1 C 3\n1.2 D 4\n2 E 5\n", 0);

        let top = tree.children(OutlineTree::ROOT);
        assert_eq!(titles(&tree, top), vec!["1 A", "2 E"]);
        let under_a = tree.children(top[0]);
        assert_eq!(titles(&tree, under_a), vec!["1.1 B", "1.2 D"]);
        assert_eq!(titles(&tree, tree.children(under_a[0])), vec!["1.1.1 C"]);
    }

    #[test]
    fn test_counts_and_walk() {
        let tree = tree_from("1 A 1\n1.1 B 2\n1.1.1 C 3\n1.2 D 4\n2 E 5\n", 0);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.descendant_count(OutlineTree::ROOT), 5);

        let top = tree.children(OutlineTree::ROOT);
        assert_eq!(tree.descendant_count(top[0]), 3);
        assert_eq!(tree.descendant_count(top[1]), 0);

        let walked: Vec<(usize, String)> = tree
            .walk()
            .into_iter()
            .map(|(level, id)| (level, tree.node(id).title.clone()))
            .collect();
        assert_eq!(
            walked,
            vec![
                (0, "1 A".to_string()),
                (1, "1.1 B".to_string()),
                (2, "1.1.1 C".to_string()),
                (1, "1.2 D".to_string()),
                (0, "2 E".to_string()),
            ]
        );
    }

    #[test]
    fn test_items_view() {
        let tree = tree_from("1 A 1\n1.1 B 2\n", 9);
        assert_eq!(
            tree.items(),
            vec![OutlineItem {
                title: "1 A".to_string(),
                page: 10,
                children: vec![OutlineItem {
                    title: "1.1 B".to_string(),
                    page: 11,
                    children: Vec::new(),
                }],
            }]
        );
    }

    #[test]
    fn test_rejects_out_of_range_pages() {
        let mut tree = OutlineTree::new(3);
        let root = tree.root_outline();
        assert!(tree.create_child(root, "ok", 3).is_ok());
        assert!(matches!(
            tree.create_child(root, "past end", 4),
            Err(TocError::InvalidTargetPage { page: 4, page_count: 3 })
        ));
        assert!(matches!(
            tree.create_child(root, "negative", -1),
            Err(TocError::InvalidTargetPage { page: -1, .. })
        ));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_empty_tree() {
        let tree = tree_from("# nothing here\n\n", 0);
        assert!(tree.is_empty());
        assert!(tree.walk().is_empty());
        assert!(tree.items().is_empty());
    }
}
