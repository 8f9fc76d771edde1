// LogStudio - core/namespace.rs
//
// Namespace index: distinct namespace/level extraction, the dot-segmented
// namespace tree, and the hierarchical selection rules used by the filter.
// Core layer: pure functions over entries and string sets.

use crate::core::model::LogEntry;
use crate::util::constants::NAMESPACE_SEPARATOR;
use std::collections::BTreeSet;

// =============================================================================
// Extraction
// =============================================================================

/// Sorted, distinct namespace strings present in `entries`.
///
/// The empty namespace (UNKNOWN lines, schemas without a namespace value)
/// is included when present, sorting first.
pub fn extract_namespaces(entries: &[LogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.namespace.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted, distinct level strings present in `entries`.
pub fn extract_levels(entries: &[LogEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.level.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Hierarchy helpers
// =============================================================================

/// True if `candidate` is a strict dotted descendant of `ancestor`
/// (`App.Core` under `App`, but not `Application` under `App`).
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate[ancestor.len()..].starts_with(NAMESPACE_SEPARATOR)
}

/// True if `namespace` equals `selected` or lies beneath it.
pub fn is_same_or_descendant(namespace: &str, selected: &str) -> bool {
    namespace == selected || is_descendant(namespace, selected)
}

// =============================================================================
// Namespace tree
// =============================================================================

/// One node of the namespace tree.
///
/// `count` covers every inserted path passing through the node, so a parent's
/// count includes all of its descendants. Children keep first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NamespaceNode {
    /// One dot-segment (empty for the root).
    pub name: String,

    /// Dot-joined path from the root (empty for the root).
    pub full_path: String,

    /// Child nodes in first-seen order.
    pub children: Vec<NamespaceNode>,

    /// Number of inserted paths at or below this node.
    pub count: usize,
}

impl NamespaceNode {
    /// Look up a direct child by segment name.
    pub fn child(&self, name: &str) -> Option<&NamespaceNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Look up a descendant by full dotted path.
    pub fn find(&self, path: &str) -> Option<&NamespaceNode> {
        path.split(NAMESPACE_SEPARATOR)
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first, pre-order traversal of all non-root nodes with depth
    /// (0 for top-level segments).
    pub fn walk(&self) -> Vec<(usize, &NamespaceNode)> {
        fn visit<'a>(
            node: &'a NamespaceNode,
            depth: usize,
            out: &mut Vec<(usize, &'a NamespaceNode)>,
        ) {
            for child in &node.children {
                out.push((depth, child));
                visit(child, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        visit(self, 0, &mut out);
        out
    }

    /// Insert one namespace path, bumping `count` at every node along it.
    ///
    /// A node's `full_path` is the namespace prefix up to and including its
    /// segment, so empty segments (`".A"`, `"A..B"`) keep their separators.
    fn insert(&mut self, namespace: &str) {
        let mut current = self;
        let mut end = 0;
        for (i, segment) in namespace.split(NAMESPACE_SEPARATOR).enumerate() {
            if i > 0 {
                end += NAMESPACE_SEPARATOR.len_utf8();
            }
            end += segment.len();

            let pos = match current.children.iter().position(|c| c.name == segment) {
                Some(pos) => pos,
                None => {
                    current.children.push(NamespaceNode {
                        name: segment.to_string(),
                        full_path: namespace[..end].to_string(),
                        children: Vec::new(),
                        count: 0,
                    });
                    current.children.len() - 1
                }
            };
            current = &mut current.children[pos];
            current.count += 1;
        }
    }
}

/// Build the namespace tree from a list of namespace strings.
///
/// Each string is inserted once, so with a distinct list a node's count is
/// the number of distinct namespaces at or below it. Empty namespaces are
/// skipped; they have no place in the hierarchy.
pub fn build_namespace_tree<S: AsRef<str>>(namespaces: &[S]) -> NamespaceNode {
    let mut root = NamespaceNode::default();
    for ns in namespaces {
        let ns = ns.as_ref();
        if !ns.is_empty() {
            root.insert(ns);
        }
    }
    root.count = root.children.iter().map(|c| c.count).sum();
    root
}

/// Build the namespace tree with per-entry counts: a node's count is the
/// number of entries whose namespace is at or below it.
pub fn build_namespace_tree_from_entries(entries: &[LogEntry]) -> NamespaceNode {
    let namespaces: Vec<&str> = entries.iter().map(|e| e.namespace.as_str()).collect();
    build_namespace_tree(&namespaces)
}

// =============================================================================
// Selection
// =============================================================================

/// Toggle `namespace` in the selection, returning the new selection.
///
/// Deselecting only removes the namespace. Selecting it also drops any
/// selected ancestor and any selected descendant, so the set never holds two
/// paths where one lies beneath the other.
pub fn toggle_namespace_selection(
    current: &BTreeSet<String>,
    namespace: &str,
) -> BTreeSet<String> {
    if current.contains(namespace) {
        let mut next = current.clone();
        next.remove(namespace);
        return next;
    }

    let mut next: BTreeSet<String> = current
        .iter()
        .filter(|selected| {
            !is_descendant(namespace, selected) && !is_descendant(selected, namespace)
        })
        .cloned()
        .collect();
    next.insert(namespace.to_string());

    tracing::trace!(namespace, selected = next.len(), "Namespace selection toggled");
    next
}

/// Plain set toggle used for level filters.
pub fn toggle_level(current: &BTreeSet<String>, level: &str) -> BTreeSet<String> {
    let mut next = current.clone();
    if !next.remove(level) {
        next.insert(level.to_string());
    }
    next
}

/// How a tree node relates to the current selection (display only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSelection {
    /// The node's own path is selected.
    Selected,
    /// A strict ancestor is selected, so the node is implicitly filtered in.
    Included,
    /// Neither.
    None,
}

/// Classify `path` against `selection` for highlighting.
pub fn node_selection_state(path: &str, selection: &BTreeSet<String>) -> NodeSelection {
    if selection.contains(path) {
        NodeSelection::Selected
    } else if selection.iter().any(|s| is_descendant(path, s)) {
        NodeSelection::Included
    } else {
        NodeSelection::None
    }
}

// =============================================================================
// Unit tests
// =============================================================================
