use core::borrow::Borrow;

use log::debug;
use smallvec::SmallVec;

use super::arena::{Arena, Handle};
use super::node::{InternalNode, LeafNode, Node};
use crate::order::Order;

/// The core B+Tree implementation backing `BPlusTree`.
#[derive(Clone)]
pub(crate) struct RawBPlusTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node. An empty tree is a single empty leaf.
    root: Handle,
    /// Handle to the first (leftmost) leaf, for forward iteration.
    first_leaf: Handle,
    /// Handle to the last (rightmost) leaf, for backward iteration.
    last_leaf: Handle,
    /// Maximum keys per node.
    order: Order,
    /// Total number of keys in the tree, duplicates included.
    len: usize,
}

/// Path element for tracking traversal during removal.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Type alias for a path through the tree (stack of path elements).
type Path = SmallVec<[PathElement; 16]>;

impl<K> RawBPlusTree<K> {
    /// Creates a new, empty tree.
    pub(crate) fn new(order: Order) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            first_leaf: root,
            last_leaf: root,
            order,
            len: 0,
        }
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no keys.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    /// Returns the number of levels, counting the leaf level.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Drops every key and returns to a single empty leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::Leaf(LeafNode::new()));
        self.first_leaf = self.root;
        self.last_leaf = self.root;
        self.len = 0;
    }

    pub(crate) fn first_leaf(&self) -> Handle {
        self.first_leaf
    }

    pub(crate) fn last_leaf(&self) -> Handle {
        self.last_leaf
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns the smallest key in the tree.
    pub(crate) fn first(&self) -> Option<&K> {
        self.nodes.get(self.first_leaf).as_leaf().lowest()
    }

    /// Returns the largest key in the tree.
    pub(crate) fn last(&self) -> Option<&K> {
        self.nodes.get(self.last_leaf).as_leaf().highest()
    }

    /// Returns the smallest key under `handle`, found by descending leftmost.
    fn lowest(&self, mut handle: Handle) -> Option<&K> {
        loop {
            match self.nodes.get(handle) {
                Node::Internal(internal) => handle = internal.child(0),
                Node::Leaf(leaf) => return leaf.lowest(),
            }
        }
    }
}

impl<K: Ord> RawBPlusTree<K> {
    /// Returns the first stored key equal to `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.route(key)),
                Node::Leaf(leaf) => return leaf.get(key),
            }
        }
    }
}

impl<K: Ord + Clone> RawBPlusTree<K> {
    /// Inserts `key`, keeping any keys already equal to it.
    ///
    /// Full children are split on the way down, so the leaf that receives `key` always has room.
    pub(crate) fn insert(&mut self, key: K) {
        // A root collapse can promote a full node; it must split before it gains a separator.
        self.grow_if_full();

        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let mut index = internal.route(&key);
            if self.nodes.get(internal.child(index)).is_full(self.order) {
                self.split_child(current, index);
                if self.nodes.get(current).as_internal().key(index) <= &key {
                    index += 1;
                }
            }
            current = self.nodes.get(current).as_internal().child(index);
        }

        self.nodes.get_mut(current).as_leaf_mut().insert(key);
        self.len += 1;

        self.grow_if_full();
    }

    /// Splits a full root and places both halves under a new internal root.
    fn grow_if_full(&mut self) {
        if !self.nodes.get(self.root).is_full(self.order) {
            return;
        }

        let old_root = self.root;
        let (separator, left) = self.split_node(old_root);
        self.root = self.nodes.alloc(Node::Internal(InternalNode::from_split(separator, left, old_root)));
        debug!("grew root {:?}, height now {}", self.root, self.height());
    }

    /// Splits `children[index]` of `parent` and records the new separator in `parent`.
    fn split_child(&mut self, parent: Handle, index: usize) {
        let child = self.nodes.get(parent).as_internal().child(index);
        let (separator, left) = self.split_node(child);
        self.nodes.get_mut(parent).as_internal_mut().insert_split(index, separator, left);
    }

    /// Splits the node at `handle`, which keeps the upper half. Returns the separator and the
    /// handle of the new lower half.
    fn split_node(&mut self, handle: Handle) -> (K, Handle) {
        match self.nodes.get_mut(handle) {
            Node::Leaf(leaf) => {
                let (separator, mut left) = leaf.split();
                let prev = left.prev();
                left.set_next(Some(handle));

                let left_handle = self.nodes.alloc(Node::Leaf(left));
                self.nodes.get_mut(handle).as_leaf_mut().set_prev(Some(left_handle));
                match prev {
                    Some(prev) => self.nodes.get_mut(prev).as_leaf_mut().set_next(Some(left_handle)),
                    None => self.first_leaf = left_handle,
                }

                debug!("split leaf {handle:?}, lower half moved to {left_handle:?}");
                (separator, left_handle)
            }
            Node::Internal(internal) => {
                let (separator, left) = internal.split();
                let left_handle = self.nodes.alloc(Node::Internal(left));

                debug!("split internal node {handle:?}, lower half moved to {left_handle:?}");
                (separator, left_handle)
            }
        }
    }

    /// Removes and returns the first stored key equal to `key`.
    ///
    /// An absent key leaves the tree untouched.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            let child_index = internal.route(key);
            path.push(PathElement {
                node: current,
                child_index,
            });
            current = internal.child(child_index);
        }

        let removed = self.nodes.get_mut(current).as_leaf_mut().remove(key)?;
        self.len -= 1;

        // Repair bottom-up: each parent fixes its separator and its underfull child.
        while let Some(PathElement { node, child_index }) = path.pop() {
            self.refresh_separator(node, child_index, &removed);
            self.repair_child(node, child_index);
        }

        self.collapse_root();
        Some(removed)
    }

    /// Re-derives the separator above `children[index]` when it named the removed key.
    fn refresh_separator(&mut self, parent: Handle, index: usize, removed: &K) {
        if index == 0 {
            return;
        }

        let internal = self.nodes.get(parent).as_internal();
        if internal.key(index - 1) != removed {
            return;
        }

        // An emptied leaf has no minimum; `repair_child` merges it away and drops the separator.
        if let Some(lowest) = self.lowest(internal.child(index)).cloned() {
            self.nodes.get_mut(parent).as_internal_mut().set_key(index - 1, lowest);
        }
    }

    /// Merges or rebalances `children[index]` of `parent` with a sibling if it is underfull.
    fn repair_child(&mut self, parent: Handle, index: usize) {
        let internal = self.nodes.get(parent).as_internal();
        let child_count = internal.child_count();

        // A lone child only happens at the root, which `collapse_root` replaces.
        if child_count < 2 || !self.nodes.get(internal.child(index)).is_underfull(self.order) {
            return;
        }

        // Pair with the right sibling, or the left one if the child is rightmost.
        let left_index = if index + 1 < child_count { index } else { index - 1 };
        let left = self.nodes.get(internal.child(left_index));
        let right = self.nodes.get(internal.child(left_index + 1));

        if left.can_merge(right, self.order) {
            self.merge_children(parent, left_index);
        } else {
            self.rebalance_children(parent, left_index, left_index == index);
        }
    }

    /// Folds `children[index + 1]` into `children[index]` and drops the separator between them.
    fn merge_children(&mut self, parent: Handle, index: usize) {
        let (separator, right) = self.nodes.get_mut(parent).as_internal_mut().remove_child(index);
        let left = self.nodes.get(parent).as_internal().child(index);

        // Unhook the absorbed leaf from the chain before its handle is recycled.
        if let Node::Leaf(leaf) = self.nodes.get(right) {
            match leaf.next() {
                Some(next) => self.nodes.get_mut(next).as_leaf_mut().set_prev(Some(left)),
                None => self.last_leaf = left,
            }
        }

        let absorbed = self.nodes.take(right);
        let lowest = match (self.nodes.get_mut(left), absorbed) {
            (Node::Leaf(leaf), Node::Leaf(absorbed)) => leaf.merge_with_right(absorbed).cloned(),
            (Node::Internal(internal), Node::Internal(absorbed)) => {
                internal.merge_with_right(separator, absorbed);
                None
            }
            _ => panic!("`RawBPlusTree::merge_children()` - siblings differ in kind!"),
        };

        // An emptied left leaf took its new minimum from the right one.
        if index > 0
            && let Some(lowest) = lowest
        {
            self.nodes.get_mut(parent).as_internal_mut().set_key(index - 1, lowest);
        }

        debug!("merged {right:?} into {left:?} under {parent:?}");
    }

    /// Evens out `children[index]` and `children[index + 1]` and updates the separator between.
    ///
    /// The underfull receiver gets half of the combined keys; the donor keeps the odd one.
    fn rebalance_children(&mut self, parent: Handle, index: usize, receiver_is_left: bool) {
        let internal = self.nodes.get(parent).as_internal();
        let (left, right) = (internal.child(index), internal.child(index + 1));
        let separator = internal.key(index).clone();

        let total = self.nodes.get(left).key_count() + self.nodes.get(right).key_count();
        let left_len = if receiver_is_left { total / 2 } else { total - total / 2 };

        let (boundary, left_lowest) = match self.nodes.pair_mut(left, right) {
            (Node::Leaf(l), Node::Leaf(r)) => {
                let (left_lowest, right_lowest) = l.rebalance_with_right(r, left_len);
                (right_lowest, Some(left_lowest))
            }
            (Node::Internal(l), Node::Internal(r)) => (l.rebalance_with_right(separator, r, left_len), None),
            _ => panic!("`RawBPlusTree::rebalance_children()` - siblings differ in kind!"),
        };

        let internal = self.nodes.get_mut(parent).as_internal_mut();
        internal.set_key(index, boundary);
        if index > 0
            && let Some(lowest) = left_lowest
        {
            internal.set_key(index - 1, lowest);
        }

        debug!("rebalanced {left:?} and {right:?} under {parent:?} to {left_len} + {} keys", total - left_len);
    }

    /// Replaces an internal root that is down to one child with that child.
    fn collapse_root(&mut self) {
        if let Node::Internal(root) = self.nodes.get(self.root)
            && root.child_count() == 1
        {
            let child = root.child(0);
            self.nodes.free(self.root);
            self.root = child;
            debug!("collapsed root into {child:?}, height now {}", self.height());
        }
    }
}
