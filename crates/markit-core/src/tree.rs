//! Document tree
//!
//! Nodes live in an arena owned by [`Tree`] and are addressed by [`NodeId`].
//! Every node has at most one parent; reassigning a child list detaches the
//! new children from wherever they were before, so callers can graft
//! subtrees freely without creating shared or cyclic structure.

use std::collections::HashSet;
use std::fmt::Write;

use crate::meta::{Attrs, Meta};
use crate::span::SourceSpan;

/// Arena index of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors from structural tree edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Node {0} does not belong to this tree")]
    UnknownNode(usize),

    #[error("Attaching node {child} under node {parent} would create a cycle")]
    Cycle { parent: usize, child: usize },

    #[error("Node {0} appears more than once in a child list")]
    DuplicateChild(usize),
}

/// Payload of a new node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub kind: String,
    pub attrs: Attrs,
    pub meta: Meta,
    pub span: Option<SourceSpan>,
}

impl NodeData {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An owned, mutable document tree with a `root` node
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Slot>,
}

impl Tree {
    /// Create a tree holding only a root node
    pub fn new(root_span: Option<SourceSpan>) -> Self {
        let mut root = NodeData::new("root");
        root.span = root_span;
        Self {
            nodes: vec![Slot {
                data: root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Allocate a detached node
    pub fn create(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let mut children = self.checked(parent)?.children.clone();
        children.retain(|c| *c != child);
        children.push(child);
        self.set_children(parent, children)
    }

    // Accessors below panic on ids from another tree, like slice indexing.

    pub fn kind(&self, id: NodeId) -> &str {
        &self.nodes[id.0].data.kind
    }

    pub fn set_kind(&mut self, id: NodeId, kind: &str) {
        self.nodes[id.0].data.kind = kind.to_string();
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn attrs(&self, id: NodeId) -> &Attrs {
        &self.nodes[id.0].data.attrs
    }

    pub fn attrs_mut(&mut self, id: NodeId) -> &mut Attrs {
        &mut self.nodes[id.0].data.attrs
    }

    pub fn set_attrs(&mut self, id: NodeId, attrs: Attrs) {
        self.nodes[id.0].data.attrs = attrs;
    }

    /// Metadata is fixed at creation
    pub fn meta(&self, id: NodeId) -> &Meta {
        &self.nodes[id.0].data.meta
    }

    pub fn span(&self, id: NodeId) -> Option<SourceSpan> {
        self.nodes[id.0].data.span
    }

    /// Replace the child list of `parent`
    ///
    /// Children are detached from their previous parents; former children
    /// missing from the new list become detached. Nothing changes on error.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<(), TreeError> {
        self.checked(parent)?;
        let mut seen = HashSet::with_capacity(children.len());
        for child in &children {
            self.checked(*child)?;
            if !seen.insert(*child) {
                return Err(TreeError::DuplicateChild(child.0));
            }
            if self.is_ancestor_or_self(*child, parent) {
                return Err(TreeError::Cycle {
                    parent: parent.0,
                    child: child.0,
                });
            }
        }

        for old in std::mem::take(&mut self.nodes[parent.0].children) {
            self.nodes[old.0].parent = None;
        }
        let mut previous = HashSet::new();
        for child in &children {
            if let Some(old_parent) = self.nodes[child.0].parent.replace(parent) {
                previous.insert(old_parent);
            }
        }
        for old_parent in previous {
            self.nodes[old_parent.0].children.retain(|c| !seen.contains(c));
        }
        self.nodes[parent.0].children = children;
        Ok(())
    }

    /// Pre-order walk starting at (and including) `id`
    pub fn walk(&self, id: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![id],
        }
    }

    /// Indented textual dump of the subtree at `id`
    pub fn pretty(&self, id: NodeId, options: &PrettyOptions) -> String {
        let mut out = String::new();
        let mut stack = vec![(id, options.indent_current)];
        while let Some((id, depth)) = stack.pop() {
            self.pretty_node(id, options, depth, &mut out);
            if options.recurse {
                let children = self.nodes[id.0].children.iter().rev();
                stack.extend(children.map(|child| (*child, depth + options.indent)));
            }
        }
        out
    }

    /// The header and detail lines of one node
    fn pretty_node(&self, id: NodeId, options: &PrettyOptions, depth: usize, out: &mut String) {
        let slot = &self.nodes[id.0];
        let _ = write!(out, "{}<{}", " ".repeat(depth), slot.data.kind);
        if options.attrs {
            let mut attrs: Vec<_> = slot.data.attrs.iter().collect();
            attrs.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in attrs {
                let _ = write!(out, " {key}=\"{value}\"");
            }
        }
        if options.srcmap {
            if let Some(span) = slot.data.span {
                let _ = write!(out, " srcmap=\"{span}\"");
            }
        }
        out.push_str(">\n");

        // multi-line values continue at the column of their first line
        let inner = " ".repeat(depth + options.indent);
        let continuation = format!("\n{inner}");
        if options.meta {
            let mut meta: Vec<_> = slot.data.meta.iter().collect();
            meta.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in meta {
                let value = value.to_string().replace('\n', &continuation);
                let _ = writeln!(out, "{inner}{key}: {value}");
            }
        }
        if options.content {
            if let Some(value) = slot.data.meta.get("content") {
                let value = value.to_string().replace('\n', &continuation);
                let _ = writeln!(out, "{inner}{value}");
            }
        }
    }

    fn checked(&self, id: NodeId) -> Result<&Slot, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id.0))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == candidate {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }
}

/// Options for [`Tree::pretty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrettyOptions {
    /// Show attributes
    pub attrs: bool,
    /// Show byte-offset source spans as `srcmap="start:end"`
    pub srcmap: bool,
    /// Show metadata lines
    pub meta: bool,
    /// Show the `content` value alone
    pub content: bool,
    /// Descend into children
    pub recurse: bool,
    /// Spaces per depth level
    pub indent: usize,
    /// Starting indentation
    pub indent_current: usize,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            attrs: false,
            srcmap: false,
            meta: false,
            content: false,
            recurse: true,
            indent: 2,
            indent_current: 0,
        }
    }
}

/// Lazy pre-order iterator over a subtree
pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaValue;
    use crate::span::LineIndex;
    use pretty_assertions::assert_eq;

    fn heading_tree() -> Tree {
        let index = LineIndex::new("# markdown-it rulezz!");
        let mut tree = Tree::new(Some(index.span(0, 21)));
        let mut heading = NodeData::new("heading");
        heading.meta.insert("level".into(), MetaValue::Int(1));
        heading.span = Some(index.span(0, 21));
        let heading = tree.create(heading);
        let mut text = NodeData::new("text");
        text.meta
            .insert("content".into(), "markdown-it rulezz!".into());
        text.span = Some(index.span(2, 21));
        let text = tree.create(text);
        tree.append(heading, text).unwrap();
        tree.append(tree.root(), heading).unwrap();
        tree
    }

    /// A chain of `depth` nested `em` nodes under the root
    pub(crate) fn deep_tree(depth: usize) -> Tree {
        let mut tree = Tree::new(None);
        let ids: Vec<_> = (0..depth).map(|_| tree.create(NodeData::new("em"))).collect();
        // attach bottom-up so each cycle check starts on a detached node
        for pair in ids.windows(2).rev() {
            tree.set_children(pair[0], vec![pair[1]]).unwrap();
        }
        tree.set_children(tree.root(), ids[..1].to_vec()).unwrap();
        tree
    }

    #[test]
    fn test_pretty_with_srcmap_and_meta() {
        let tree = heading_tree();
        let options = PrettyOptions {
            srcmap: true,
            meta: true,
            ..Default::default()
        };
        assert_eq!(
            tree.pretty(tree.root(), &options),
            "<root srcmap=\"0:21\">\n  <heading srcmap=\"0:21\">\n    level: 1\n    <text srcmap=\"2:21\">\n      content: markdown-it rulezz!\n"
        );
    }

    #[test]
    fn test_pretty_plain() {
        let tree = heading_tree();
        assert_eq!(
            tree.pretty(tree.root(), &PrettyOptions::default()),
            "<root>\n  <heading>\n    <text>\n"
        );
    }

    #[test]
    fn test_pretty_sorts_attrs_and_reindents_meta() {
        let mut tree = Tree::new(None);
        let mut data = NodeData::new("fence");
        data.attrs.insert("z".into(), "1".into());
        data.attrs.insert("a".into(), "<q>".into());
        data.meta.insert("content".into(), "x\ny".into());
        let fence = tree.create(data);
        tree.append(tree.root(), fence).unwrap();
        let options = PrettyOptions {
            attrs: true,
            meta: true,
            ..Default::default()
        };
        assert_eq!(
            tree.pretty(fence, &options),
            "<fence a=\"<q>\" z=\"1\">\n  content: x\n  y\n"
        );
    }

    #[test]
    fn test_pretty_content_only() {
        let mut tree = heading_tree();
        let heading = tree.children(tree.root())[0];
        let mut code = NodeData::new("code_block");
        code.meta.insert("content".into(), "a\nb".into());
        let code = tree.create(code);
        tree.append(tree.root(), code).unwrap();
        let options = PrettyOptions {
            content: true,
            ..Default::default()
        };
        assert_eq!(
            tree.pretty(tree.root(), &options),
            "<root>\n  <heading>\n    <text>\n      markdown-it rulezz!\n  <code_block>\n    a\n    b\n"
        );
        let shallow = PrettyOptions {
            recurse: false,
            ..options
        };
        assert_eq!(tree.pretty(heading, &shallow), "<heading>\n");
    }

    #[test]
    fn test_deep_tree_walks_without_recursion() {
        let tree = deep_tree(100_000);
        let dump = tree.pretty(tree.root(), &PrettyOptions {
            indent: 0,
            ..Default::default()
        });
        assert_eq!(dump.lines().count(), 100_001);
    }

    #[test]
    fn test_set_children_many_siblings() {
        let mut tree = Tree::new(None);
        let ids: Vec<_> = (0..50_000).map(|_| tree.create(NodeData::new("text"))).collect();
        tree.set_children(tree.root(), ids.clone()).unwrap();
        let other = tree.create(NodeData::new("paragraph"));
        tree.set_children(other, ids[..10].to_vec()).unwrap();
        assert_eq!(tree.children(tree.root()).len(), 49_990);
        assert_eq!(tree.children(tree.root())[0], ids[10]);
        assert_eq!(tree.parent(ids[0]), Some(other));
    }

    #[test]
    fn test_walk_is_preorder_and_restartable() {
        let tree = heading_tree();
        let kinds: Vec<_> = tree.walk(tree.root()).map(|id| tree.kind(id)).collect();
        assert_eq!(kinds, vec!["root", "heading", "text"]);
        let again: Vec<_> = tree.walk(tree.root()).map(|id| tree.kind(id)).collect();
        assert_eq!(kinds, again);
    }

    #[test]
    fn test_set_children_detaches_from_old_parent() {
        let mut tree = heading_tree();
        let heading = tree.children(tree.root())[0];
        let text = tree.children(heading)[0];
        tree.set_children(tree.root(), vec![heading, text]).unwrap();
        assert!(tree.children(heading).is_empty());
        assert_eq!(tree.parent(text), Some(tree.root()));
    }

    #[test]
    fn test_set_children_rejects_cycle() {
        let mut tree = heading_tree();
        let heading = tree.children(tree.root())[0];
        let text = tree.children(heading)[0];
        let err = tree.set_children(text, vec![heading]).unwrap_err();
        assert_eq!(
            err,
            TreeError::Cycle {
                parent: text.index(),
                child: heading.index()
            }
        );
        assert_eq!(tree.children(heading), &[text]);
    }

    #[test]
    fn test_set_children_rejects_self_and_duplicates() {
        let mut tree = heading_tree();
        let root = tree.root();
        assert!(tree.set_children(root, vec![root]).is_err());
        let heading = tree.children(root)[0];
        assert_eq!(
            tree.set_children(root, vec![heading, heading]),
            Err(TreeError::DuplicateChild(heading.index()))
        );
    }

    #[test]
    fn test_writes_are_observable_unchanged() {
        let mut tree = heading_tree();
        let heading = tree.children(tree.root())[0];
        tree.set_kind(heading, "custom");
        let mut attrs = Attrs::new();
        attrs.insert("class".into(), "x".into());
        tree.set_attrs(heading, attrs.clone());
        assert_eq!(tree.kind(heading), "custom");
        assert_eq!(tree.attrs(heading), &attrs);
    }
}
