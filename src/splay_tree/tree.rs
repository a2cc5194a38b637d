use crate::arena::{Handle, TypedArena, DEFAULT_CHUNK_SIZE};
use crate::error::{Error, PreOrderError, Result};
use crate::splay_tree::node::{Node, NodeRef};
use log::{debug, trace};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::result;

/// A self-adjusting binary search tree of keys.
///
/// Every access moves the accessed node to the root through a sequence of rotations, so a
/// sequence of operations runs in amortized `O(log n)` time per operation and recently used keys
/// stay cheap to reach. Individual operations can still take `O(n)` on a degenerate tree.
///
/// Nodes live in a `TypedArena`. Each node owns its children through handles and keeps a
/// non-owning handle to its parent, which is how a node is splayed upward without recursion.
///
/// # Examples
///
/// ```
/// use splay_arena::{Error, SplayTree};
///
/// let mut tree = SplayTree::from_keys(vec![5, 3, 8, 1, 4]).unwrap();
/// assert_eq!(tree.len(), 5);
///
/// assert_eq!(tree.find(&1).map(|node| *node.key()), Ok(1));
/// assert_eq!(tree.root().map(|node| *node.key()), Some(1));
///
/// tree.remove(&3).unwrap();
/// assert_eq!(tree.find(&3).unwrap_err(), Error::KeyNotFound);
/// assert!(tree.contains(&4));
/// ```
pub struct SplayTree<T> {
    arena: TypedArena<Node<T>>,
    root: Option<Handle>,
}

impl<T> SplayTree<T> {
    /// Constructs a new, empty `SplayTree<T>`.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Constructs a new, empty `SplayTree<T>` whose node storage grows `chunk_size` nodes at a
    /// time.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_arena::SplayTree;
    ///
    /// let mut tree = SplayTree::with_chunk_size(4);
    /// for key in 0..10 {
    ///     tree.add(key);
    /// }
    /// assert_eq!(tree.len(), 10);
    /// ```
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        SplayTree {
            arena: TypedArena::new(chunk_size),
            root: None,
        }
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        &self.arena[handle]
    }

    fn node_mut(&mut self, handle: Handle) -> &mut Node<T> {
        &mut self.arena[handle]
    }

    /// Returns the root of the tree, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(|handle| NodeRef::new(self, handle))
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Releases every node in the tree.
    ///
    /// Nodes are visited with an explicit work list, so tearing down a tree that has degenerated
    /// into a long chain uses constant stack space.
    pub fn clear(&mut self) {
        let mut pending: Vec<Handle> = self.root.take().into_iter().collect();
        let mut released = 0;
        while let Some(handle) = pending.pop() {
            let node = self.arena.free(&handle);
            pending.extend(node.left);
            pending.extend(node.right);
            released += 1;
        }
        debug_assert!(self.arena.is_empty());
        self.arena.clear();
        debug!("released {} splay tree nodes", released);
    }

    pub(crate) fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder {
            tree: self,
            pending: self.root.into_iter().collect(),
            remaining: self.len(),
        }
    }

    fn max_node(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.node(handle).right {
            handle = right;
        }
        handle
    }

    fn min_node(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.node(handle).left {
            handle = left;
        }
        handle
    }

    /// Returns the minimum key of the tree without splaying it.
    pub fn min(&self) -> Option<&T> {
        self.root.map(|root| &self.node(self.min_node(root)).key)
    }

    /// Returns the maximum key of the tree without splaying it.
    pub fn max(&self) -> Option<&T> {
        self.root.map(|root| &self.node(self.max_node(root)).key)
    }

    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let up = self.node(handle).right.expect("Expected right child node to be `Some`.");
        let crossing = self.node(up).left;
        self.node_mut(handle).right = crossing;
        if let Some(crossing) = crossing {
            self.node_mut(crossing).parent = Some(handle);
        }

        let parent = self.node(handle).parent;
        self.node_mut(up).parent = parent;
        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(handle) {
                    parent_node.left = Some(up);
                } else {
                    parent_node.right = Some(up);
                }
            },
            None => self.root = Some(up),
        }

        self.node_mut(up).left = Some(handle);
        self.node_mut(handle).parent = Some(up);
        up
    }

    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let up = self.node(handle).left.expect("Expected left child node to be `Some`.");
        let crossing = self.node(up).right;
        self.node_mut(handle).left = crossing;
        if let Some(crossing) = crossing {
            self.node_mut(crossing).parent = Some(handle);
        }

        let parent = self.node(handle).parent;
        self.node_mut(up).parent = parent;
        match parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent);
                if parent_node.left == Some(handle) {
                    parent_node.left = Some(up);
                } else {
                    parent_node.right = Some(up);
                }
            },
            None => self.root = Some(up),
        }

        self.node_mut(up).right = Some(handle);
        self.node_mut(handle).parent = Some(up);
        up
    }

    fn is_left_child(&self, handle: Handle, parent: Handle) -> bool {
        self.node(parent).left == Some(handle)
    }

    // Lifts `handle` until it has no parent. When `handle` starts in a detached subtree, the
    // subtree's root slot is whatever `self.root` was set to by the caller.
    fn splay(&mut self, handle: Handle) {
        let mut moves = 0;
        while let Some(parent) = self.node(handle).parent {
            let node_is_left = self.is_left_child(handle, parent);
            let grandparent = self.node(parent).parent;
            match grandparent {
                None => {
                    trace!("splay: zig");
                    if node_is_left {
                        self.rotate_right(parent);
                    } else {
                        self.rotate_left(parent);
                    }
                },
                Some(grandparent) => {
                    let parent_is_left = self.is_left_child(parent, grandparent);
                    match (node_is_left, parent_is_left) {
                        (true, true) => {
                            trace!("splay: zig-zig");
                            self.rotate_right(grandparent);
                            self.rotate_right(parent);
                        },
                        (false, false) => {
                            trace!("splay: zig-zig");
                            self.rotate_left(grandparent);
                            self.rotate_left(parent);
                        },
                        (true, false) => {
                            trace!("splay: zig-zag");
                            self.rotate_right(parent);
                            self.rotate_left(grandparent);
                        },
                        (false, true) => {
                            trace!("splay: zig-zag");
                            self.rotate_left(parent);
                            self.rotate_right(grandparent);
                        },
                    }
                },
            }
            moves += 1;
        }
        trace!("splayed node to root in {} moves", moves);
    }
}

impl<T> SplayTree<T>
where
    T: Ord,
{
    /// Constructs a tree from a non-empty collection of keys. The first key becomes the initial
    /// root and the remaining keys are added one by one. Repeated keys are stored once.
    ///
    /// Returns `Error::EmptyKeys` if `keys` yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_arena::{Error, SplayTree};
    ///
    /// let tree = SplayTree::from_keys(vec![0, 1, 2, 98, 99, 7, 2, 0]).unwrap();
    /// assert_eq!(tree.len(), 6);
    ///
    /// assert_eq!(SplayTree::<u32>::from_keys(vec![]).unwrap_err(), Error::EmptyKeys);
    /// ```
    pub fn from_keys<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut keys = keys.into_iter();
        let first = keys.next().ok_or(Error::EmptyKeys)?;
        let mut tree = SplayTree::new();
        tree.root = Some(tree.arena.allocate(Node::new(first, None)));
        tree.extend(keys);
        Ok(tree)
    }

    // Descends from the root without splaying. Returns the node holding `key`, or the new leaf
    // created for it, and whether a leaf was created.
    pub(crate) fn insert_leaf(&mut self, key: T) -> (Handle, bool) {
        let mut curr = match self.root {
            Some(root) => root,
            None => {
                let handle = self.arena.allocate(Node::new(key, None));
                self.root = Some(handle);
                return (handle, true);
            },
        };
        loop {
            match key.cmp(&self.node(curr).key) {
                Ordering::Equal => return (curr, false),
                Ordering::Less => {
                    let left = self.node(curr).left;
                    match left {
                        Some(left) => curr = left,
                        None => {
                            let leaf = self.arena.allocate(Node::new(key, Some(curr)));
                            self.node_mut(curr).left = Some(leaf);
                            return (leaf, true);
                        },
                    }
                },
                Ordering::Greater => {
                    let right = self.node(curr).right;
                    match right {
                        Some(right) => curr = right,
                        None => {
                            let leaf = self.arena.allocate(Node::new(key, Some(curr)));
                            self.node_mut(curr).right = Some(leaf);
                            return (leaf, true);
                        },
                    }
                },
            }
        }
    }

    /// Adds a key to the tree and splays its node to the root. If the key is already present, the
    /// existing node is splayed instead and `key` is dropped. Returns the new root.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_arena::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// assert_eq!(*tree.add(2).key(), 2);
    /// assert_eq!(*tree.add(1).key(), 1);
    /// assert_eq!(*tree.add(2).key(), 2);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn add(&mut self, key: T) -> NodeRef<'_, T> {
        let (handle, _) = self.insert_leaf(key);
        self.splay(handle);
        NodeRef::new(self, handle)
    }

    fn search<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut curr = self.root?;
        loop {
            let node = self.node(curr);
            curr = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(curr),
                Ordering::Less => node.left?,
                Ordering::Greater => node.right?,
            };
        }
    }

    /// Finds the node holding `key` and splays it to the root. Returns `Error::KeyNotFound` and
    /// leaves the tree untouched if the key is absent.
    pub fn find<V>(&mut self, key: &V) -> Result<NodeRef<'_, T>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let handle = self.search(key).ok_or(Error::KeyNotFound)?;
        self.splay(handle);
        Ok(NodeRef::new(self, handle))
    }

    /// Checks if a key exists in the tree. Note that `contains` does not splay the tree in order
    /// to use a non-mutable reference.
    pub fn contains<V>(&self, key: &V) -> bool
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Removes `key` from the tree and returns the new root, which is `None` if the tree became
    /// empty. Returns `Error::KeyNotFound` if the key is absent; removing a missing key is an
    /// error rather than a no-op.
    ///
    /// The removed node is splayed to the root first. Its two subtrees are then joined by
    /// splaying the maximum of the left subtree to the top of that subtree and hanging the right
    /// subtree off it.
    ///
    /// # Examples
    ///
    /// ```
    /// use splay_arena::{Error, SplayTree};
    ///
    /// let mut tree = SplayTree::from_keys(vec![2, 1, 3]).unwrap();
    /// assert_eq!(tree.remove(&2).unwrap().map(|node| *node.key()), Some(1));
    /// assert_eq!(tree.remove(&2).unwrap_err(), Error::KeyNotFound);
    /// ```
    pub fn remove<V>(&mut self, key: &V) -> Result<Option<NodeRef<'_, T>>>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let handle = self.search(key).ok_or(Error::KeyNotFound)?;
        self.splay(handle);

        let Node { left, right, .. } = self.arena.free(&handle);
        self.root = match (left, right) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => {
                self.node_mut(child).parent = None;
                Some(child)
            },
            (Some(left), Some(right)) => {
                self.node_mut(left).parent = None;
                self.node_mut(right).parent = None;
                self.root = Some(left);
                let max = self.max_node(left);
                self.splay(max);
                self.node_mut(max).right = Some(right);
                self.node_mut(right).parent = Some(max);
                Some(max)
            },
        };
        debug!("removed splay tree node, {} remaining", self.len());
        Ok(self.root())
    }
}

/// Rebuilds a tree from its keys in pre-order.
///
/// `spine` holds the nodes that can still take a right child, with keys decreasing towards the
/// top. Each key is attached next to the spine instead of being searched for from the root, so a
/// whole tree is rebuilt in linear time whatever its shape.
pub(crate) struct PreOrderBuilder<T> {
    tree: SplayTree<T>,
    spine: Vec<Handle>,
    lower: Option<Handle>,
}

impl<T> PreOrderBuilder<T>
where
    T: Ord,
{
    pub fn new() -> Self {
        PreOrderBuilder {
            tree: SplayTree::new(),
            spine: Vec::new(),
            lower: None,
        }
    }

    pub fn push(&mut self, key: T) -> result::Result<(), PreOrderError> {
        let tree = &mut self.tree;
        // Every key after a right turn must exceed the node the turn was taken at.
        if let Some(lower) = self.lower {
            match key.cmp(&tree.node(lower).key) {
                Ordering::Less => return Err(PreOrderError::NotPreOrder),
                Ordering::Equal => return Err(PreOrderError::DuplicateKey),
                Ordering::Greater => {},
            }
        }

        let mut right_of = None;
        while let Some(&top) = self.spine.last() {
            match tree.node(top).key.cmp(&key) {
                Ordering::Less => right_of = self.spine.pop(),
                Ordering::Equal => return Err(PreOrderError::DuplicateKey),
                Ordering::Greater => break,
            }
        }

        let left_of = self.spine.last().cloned();
        let handle = tree.arena.allocate(Node::new(key, right_of.or(left_of)));
        match (right_of, left_of) {
            (Some(parent), _) => {
                tree.node_mut(parent).right = Some(handle);
                self.lower = Some(parent);
            },
            (None, Some(parent)) => {
                debug_assert!(tree.node(parent).left.is_none());
                tree.node_mut(parent).left = Some(handle);
            },
            (None, None) => tree.root = Some(handle),
        }
        self.spine.push(handle);
        Ok(())
    }

    pub fn finish(self) -> SplayTree<T> {
        self.tree
    }
}

impl<T> Default for SplayTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for SplayTree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Extend<T> for SplayTree<T>
where
    T: Ord,
{
    fn extend<I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = T>,
    {
        for key in keys {
            self.add(key);
        }
    }
}

impl<T> FromIterator<T> for SplayTree<T>
where
    T: Ord,
{
    fn from_iter<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut tree = SplayTree::new();
        tree.extend(keys);
        tree
    }
}

impl<T> fmt::Debug for SplayTree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.pre_order()).finish()
    }
}

/// Keys of a tree in pre-order, walked with an explicit stack.
pub(crate) struct PreOrder<'a, T> {
    tree: &'a SplayTree<T>,
    pending: Vec<Handle>,
    remaining: usize,
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.pending.pop().map(|handle| {
            let node = tree.node(handle);
            self.pending.extend(node.right);
            self.pending.extend(node.left);
            self.remaining -= 1;
            &node.key
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for PreOrder<'a, T> {}
