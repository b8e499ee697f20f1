use std::collections::HashMap;

use super::comment::{Comment, CommentId};

/// Error type for thread construction, lookup and mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThreadError {
    #[error("duplicate comment id: {0}")]
    DuplicateId(CommentId),
    #[error("parent comment not found: {0}")]
    ParentNotFound(CommentId),
    #[error("comment not found: {0}")]
    NotFound(CommentId),
    #[error("comment {id} declares parent {found:?}, expected {expected:?}")]
    ParentMismatch {
        id: CommentId,
        expected: Option<CommentId>,
        found: Option<CommentId>,
    },
}

/// A comment placed in a thread.
///
/// Children are held by id and ordered by id ascending. The parent link is
/// bookkeeping for removal and reattachment only: nodes are owned by the
/// forest's index, never by their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) comment: Comment,
    pub(crate) parent: Option<CommentId>,
    pub(crate) children: Vec<CommentId>,
}

impl Node {
    pub(crate) fn new(comment: Comment) -> Self {
        Node {
            comment,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    /// Structural parent. After a promotion this can differ from
    /// `comment().parent_id`, which keeps what the server declared.
    pub fn parent(&self) -> Option<CommentId> {
        self.parent
    }

    pub fn children(&self) -> &[CommentId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// All reply trees of one card, plus the id index.
///
/// The index is the only node store, so every id it holds is reachable from
/// `roots` and tree shape and lookup can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    pub(crate) roots: Vec<CommentId>,
    pub(crate) index: HashMap<CommentId, Node>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a node by comment id in O(1).
    pub fn find(&self, id: CommentId) -> Result<&Node, ThreadError> {
        self.index.get(&id).ok_or(ThreadError::NotFound(id))
    }

    pub fn get(&self, id: CommentId) -> Option<&Node> {
        self.index.get(&id)
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of comments in the thread, at any depth
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Root ids in display order
    pub fn roots(&self) -> &[CommentId] {
        &self.roots
    }

    /// The parent node of `id`, or `None` for a root.
    pub fn parent_of(&self, id: CommentId) -> Result<Option<&Node>, ThreadError> {
        let node = self.find(id)?;
        Ok(node.parent.and_then(|p| self.index.get(&p)))
    }

    /// Distance from `id` to its root (roots are at depth 0).
    pub fn depth_of(&self, id: CommentId) -> Result<usize, ThreadError> {
        let mut depth = 0;
        let mut current = self.find(id)?;
        while let Some(p) = current.parent {
            current = self.find(p)?;
            depth += 1;
        }
        Ok(depth)
    }

    /// All records, in no particular order
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.index.values().map(|n| &n.comment)
    }

    pub(crate) fn node_mut(&mut self, id: CommentId) -> Option<&mut Node> {
        self.index.get_mut(&id)
    }

    /// The sibling list a node with this parent lives in.
    pub(crate) fn container_mut(&mut self, parent: Option<CommentId>) -> Option<&mut Vec<CommentId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(p) => self.index.get_mut(&p).map(|n| &mut n.children),
        }
    }

    /// Link an indexed node under `parent` (or into the roots), keeping id order.
    /// The caller guarantees both ids are indexed.
    pub(crate) fn attach(&mut self, id: CommentId, parent: Option<CommentId>) {
        if let Some(list) = self.container_mut(parent) {
            insert_sorted(list, id);
        }
        if let Some(node) = self.index.get_mut(&id) {
            node.parent = parent;
        }
    }

    /// Unlink a node from its current container without touching the index.
    pub(crate) fn detach(&mut self, id: CommentId) {
        let parent = match self.index.get(&id) {
            Some(node) => node.parent,
            None => return,
        };
        if let Some(list) = self.container_mut(parent) {
            list.retain(|c| *c != id);
        }
        if let Some(node) = self.index.get_mut(&id) {
            node.parent = None;
        }
    }
}

/// Insert into an id-ordered list; a present id is left alone.
pub(crate) fn insert_sorted(list: &mut Vec<CommentId>, id: CommentId) {
    if let Err(pos) = list.binary_search(&id) {
        list.insert(pos, id);
    }
}
