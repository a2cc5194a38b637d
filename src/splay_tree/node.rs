use crate::arena::Handle;
use crate::splay_tree::tree::SplayTree;
use std::fmt;

pub struct Node<T> {
    pub key: T,
    pub left: Option<Handle>,
    pub right: Option<Handle>,
    pub parent: Option<Handle>,
}

impl<T> Node<T> {
    pub fn new(key: T, parent: Option<Handle>) -> Self {
        Node {
            key,
            left: None,
            right: None,
            parent,
        }
    }
}

/// A read-only view of a node in a `SplayTree<T>`.
///
/// The view borrows the tree, so it cannot outlive the next mutating call. Splaying may move a
/// node anywhere in the tree, but never changes its key.
pub struct NodeRef<'a, T> {
    tree: &'a SplayTree<T>,
    handle: Handle,
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(tree: &'a SplayTree<T>, handle: Handle) -> Self {
        NodeRef { tree, handle }
    }

    fn node(&self) -> &'a Node<T> {
        self.tree.node(self.handle)
    }

    fn view(&self, handle: Option<Handle>) -> Option<NodeRef<'a, T>> {
        handle.map(|handle| NodeRef::new(self.tree, handle))
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &'a T {
        &self.node().key
    }

    /// Returns the left child, whose subtree holds only smaller keys.
    pub fn left(&self) -> Option<NodeRef<'a, T>> {
        self.view(self.node().left)
    }

    /// Returns the right child, whose subtree holds only greater keys.
    pub fn right(&self) -> Option<NodeRef<'a, T>> {
        self.view(self.node().right)
    }

    /// Returns the parent, or `None` if this node is the root.
    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.view(self.node().parent)
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T> fmt::Debug for NodeRef<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef").field("key", self.key()).finish()
    }
}
