//! Mask nodes under construction and parenthesis levels.
//!
//! The parser grows the mask in an arena of nodes addressed by index. Every
//! parent gets its own child node for a key, so branches that fan out after a
//! group never share structure.

use std::collections::BTreeMap;

use crate::fieldmask::{FieldKey, Mask};

/// NodeId is the index of a node in a [`Tree`].
pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Default)]
struct Node {
    any: Option<NodeId>,
    field_parts: BTreeMap<FieldKey, NodeId>,
    depth: usize,
}

/// Tree is the arena of nodes of the mask being parsed.
///
/// Children are always created after their parent, so every child has a
/// larger index than its parent.
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree holding only the root node.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node::default()],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id].depth
    }

    /// Returns the child of `parent` at `key`, creating it when missing.
    pub fn child(&mut self, parent: NodeId, key: &FieldKey) -> NodeId {
        if let Some(&id) = self.nodes[parent].field_parts.get(key) {
            return id;
        }
        let id = self.alloc(parent);
        self.nodes[parent].field_parts.insert(key.clone(), id);
        id
    }

    /// Returns the wildcard child of `parent`, creating it when missing.
    pub fn any_child(&mut self, parent: NodeId) -> NodeId {
        if let Some(id) = self.nodes[parent].any {
            return id;
        }
        let id = self.alloc(parent);
        self.nodes[parent].any = Some(id);
        id
    }

    fn alloc(&mut self, parent: NodeId) -> NodeId {
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(Node {
            depth,
            ..Node::default()
        });
        self.nodes.len() - 1
    }

    /// Converts the arena into an owned mask.
    ///
    /// Nodes are assembled from the last to the first, so every child is
    /// complete before its parent takes it.
    pub fn into_mask(self) -> Mask {
        let mut built: Vec<Option<Mask>> = Vec::with_capacity(self.nodes.len());
        built.resize_with(self.nodes.len(), || None);
        for (id, node) in self.nodes.into_iter().enumerate().rev() {
            let mut mask = Mask::new();
            if let Some(any) = node.any {
                mask.any = built[any].take().map(Box::new);
            }
            for (key, child) in node.field_parts {
                if let Some(sub) = built[child].take() {
                    mask.field_parts.insert(key, sub);
                }
            }
            built[id] = Some(mask);
        }
        built
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_default()
    }
}

/// Level tracks the branches of one parenthesis nesting level.
#[derive(Debug)]
pub(crate) struct Level {
    /// Nodes every comma separated branch of this level starts from.
    pub starts: Vec<NodeId>,
    /// Nodes where the finished branches of this level ended.
    pub ends: Vec<NodeId>,
    /// Nodes the current branch is extending.
    pub active: Vec<NodeId>,
    /// Position of the opening brace.
    pub pos: usize,
}

impl Level {
    /// Creates the top level, rooted at `root`.
    pub fn top(root: NodeId) -> Self {
        Level {
            starts: vec![root],
            ends: Vec::new(),
            active: vec![root],
            pos: 0,
        }
    }

    /// Creates a nested level that starts from the active nodes of `parent`.
    pub fn nested(parent: &Level, pos: usize) -> Self {
        Level {
            starts: parent.active.clone(),
            ends: Vec::new(),
            active: parent.active.clone(),
            pos,
        }
    }

    /// Moves every active node to its child at `key`.
    pub fn add_key(&mut self, tree: &mut Tree, key: &FieldKey) {
        let active = std::mem::take(&mut self.active);
        self.active = dedup(active.into_iter().map(|id| tree.child(id, key)));
    }

    /// Moves every active node to its wildcard child.
    pub fn add_any(&mut self, tree: &mut Tree) {
        let active = std::mem::take(&mut self.active);
        self.active = dedup(active.into_iter().map(|id| tree.any_child(id)));
    }

    /// Finishes the current branch and restarts from the level's starts.
    pub fn new_mask(&mut self) {
        let active = std::mem::replace(&mut self.active, self.starts.clone());
        self.ends.extend(active);
    }

    /// Hands the branches of this level back to `parent` as its active nodes.
    pub fn close_into(self, parent: &mut Level) {
        let mut active = self.ends;
        active.extend(self.active);
        parent.active = dedup(active);
    }

    /// Returns the deepest active node depth.
    pub fn max_active_depth(&self, tree: &Tree) -> usize {
        self.active
            .iter()
            .map(|&id| tree.depth(id))
            .max()
            .unwrap_or(0)
    }
}

fn dedup(ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
