use alloc::vec::Vec;
use core::borrow::Borrow;
use core::mem;

use super::arena::Handle;
use super::search::{lower_bound, route};
use crate::order::Order;

#[derive(Clone, Debug)]
pub(crate) enum Node<K> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K>),
}

// B+Tree: internal nodes route by separator keys. `keys[i]` is the minimum key of the subtree
// under `children[i + 1]`, and `children.len() == keys.len() + 1` always.
#[derive(Clone, Debug)]
pub(crate) struct InternalNode<K> {
    keys: Vec<K>,
    children: Vec<Handle>,
}

// B+Tree: leaves hold the keys themselves and link to their neighbours in sorted order.
// The links are cross references for traversal only; the parent owns the leaf.
#[derive(Clone, Debug)]
pub(crate) struct LeafNode<K> {
    prev: Option<Handle>,
    next: Option<Handle>,
    keys: Vec<K>,
}

impl<K> Node<K> {
    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node, panicking if this is not internal.
    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Returns the number of keys (or separators) in this node.
    pub(crate) fn key_count(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }

    fn capacity(&self, order: Order) -> usize {
        match self {
            Node::Internal(_) => order.internal_capacity(),
            Node::Leaf(_) => order.leaf_capacity(),
        }
    }

    /// Returns true once the node holds as many keys as its kind allows.
    pub(crate) fn is_full(&self, order: Order) -> bool {
        self.key_count() >= self.capacity(order)
    }

    /// Returns true if the node holds at most half its capacity.
    pub(crate) fn is_underfull(&self, order: Order) -> bool {
        self.key_count() <= self.capacity(order) / 2
    }

    /// Returns true if `self` and its right sibling `right` fit in a single node.
    ///
    /// Merging internal nodes pulls their parent separator down, so it counts against capacity.
    pub(crate) fn can_merge(&self, right: &Node<K>, order: Order) -> bool {
        match (self, right) {
            (Node::Leaf(left), Node::Leaf(right)) => left.key_count() + right.key_count() <= order.leaf_capacity(),
            (Node::Internal(left), Node::Internal(right)) => {
                left.key_count() + right.key_count() < order.internal_capacity()
            }
            _ => panic!("`Node::can_merge()` - siblings differ in kind!"),
        }
    }
}

impl<K> InternalNode<K> {
    /// Creates the root produced by a split: `separator` between `left` and `right`.
    pub(crate) fn from_split(separator: K, left: Handle, right: Handle) -> Self {
        let mut keys = Vec::new();
        keys.push(separator);
        let mut children = Vec::new();
        children.push(left);
        children.push(right);
        Self { keys, children }
    }

    /// Returns the number of separator keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of children in this node.
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the separator at the given index.
    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    /// Returns all separators.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the child handle at the given index.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    /// Returns all children.
    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Returns the index of the child whose subtree may hold `key`.
    #[inline]
    pub(crate) fn route<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        route(&self.keys, key)
    }

    /// Replaces the separator at the given index.
    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    /// Records the split of `children[index]`: `left` becomes `children[index]`, the original
    /// node (now holding the upper half) moves to `index + 1`, and `separator` sits between.
    pub(crate) fn insert_split(&mut self, index: usize, separator: K, left: Handle) {
        self.keys.insert(index, separator);
        self.children.insert(index, left);
    }

    /// Removes `keys[index]` together with the child to its right.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    /// Splits this node around its middle separator, which is returned for the parent.
    ///
    /// The lower half moves to the returned node; `self` keeps the upper half.
    pub(crate) fn split(&mut self) -> (K, InternalNode<K>) {
        assert!(self.keys.len() >= 3, "`InternalNode::split()` - node holds fewer than three keys!");

        let mid = self.keys.len() / 2;
        let mut upper_keys = self.keys.split_off(mid);
        let separator = upper_keys.remove(0);
        let upper_children = self.children.split_off(mid + 1);

        let left = InternalNode {
            keys: mem::replace(&mut self.keys, upper_keys),
            children: mem::replace(&mut self.children, upper_children),
        };

        (separator, left)
    }

    /// Merges with a right sibling, pulling down the parent `separator` that sat between them.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: InternalNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }

    /// Redistributes separators and children with the right sibling so that `self` ends up
    /// with `left_len` separators. Returns the separator that now sits between the two nodes.
    ///
    /// The parent `separator` rotates down into the combined sequence and the separator at
    /// position `left_len` rotates up in its place.
    pub(crate) fn rebalance_with_right(&mut self, separator: K, right: &mut InternalNode<K>, left_len: usize) -> K {
        let total = self.keys.len() + right.keys.len();
        assert!(
            left_len >= 1 && left_len < total,
            "`InternalNode::rebalance_with_right()` - both siblings must keep a separator!"
        );

        let mut keys = mem::take(&mut self.keys);
        keys.push(separator);
        keys.append(&mut right.keys);
        let mut children = mem::take(&mut self.children);
        children.append(&mut right.children);

        let mut upper_keys = keys.split_off(left_len);
        let promoted = upper_keys.remove(0);
        right.keys = upper_keys;
        right.children = children.split_off(left_len + 1);
        self.keys = keys;
        self.children = children;

        promoted
    }
}

impl<K> LeafNode<K> {
    /// Creates a new empty leaf node.
    pub(crate) const fn new() -> Self {
        Self {
            prev: None,
            next: None,
            keys: Vec::new(),
        }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the previous leaf handle.
    pub(crate) fn prev(&self) -> Option<Handle> {
        self.prev
    }

    /// Sets the previous leaf handle.
    pub(crate) fn set_prev(&mut self, prev: Option<Handle>) {
        self.prev = prev;
    }

    /// Returns the next leaf handle.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    /// Sets the next leaf handle.
    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    /// Returns all keys.
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the smallest key, or `None` for an empty leaf.
    pub(crate) fn lowest(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Returns the largest key, or `None` for an empty leaf.
    pub(crate) fn highest(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Inserts `key` in front of any keys equal to it. Duplicates are kept.
    pub(crate) fn insert(&mut self, key: K)
    where
        K: Ord,
    {
        let index = lower_bound(&self.keys, &key);
        self.keys.insert(index, key);
    }

    /// Returns the first stored key equal to `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = lower_bound(&self.keys, key);
        self.keys.get(index).filter(|k| (*k).borrow() == key)
    }

    /// Removes and returns the first stored key equal to `key`.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let index = lower_bound(&self.keys, key);
        if self.keys.get(index)?.borrow() == key {
            Some(self.keys.remove(index))
        } else {
            None
        }
    }

    /// Splits this leaf at the midpoint. Returns (`separator`, `left`).
    ///
    /// The lower half moves to the returned leaf; `self` keeps the upper half and the separator
    /// is a copy of its new first key. The returned leaf inherits `self.prev` and has no `next`;
    /// the caller links it in once it has a handle.
    pub(crate) fn split(&mut self) -> (K, LeafNode<K>)
    where
        K: Clone,
    {
        assert!(self.keys.len() >= 2, "`LeafNode::split()` - leaf holds fewer than two keys!");

        let mid = self.keys.len() / 2;
        let upper = self.keys.split_off(mid);
        let left = LeafNode {
            prev: self.prev,
            next: None,
            keys: mem::replace(&mut self.keys, upper),
        };
        let separator = self.keys[0].clone();

        (separator, left)
    }

    /// Absorbs the right sibling and takes over its `next` link. Returns the merged leaf's
    /// smallest key.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode<K>) -> Option<&K> {
        self.keys.append(&mut right.keys);
        self.next = right.next;
        self.keys.first()
    }

    /// Shifts keys across the boundary with the right sibling so that `self` ends up with
    /// `left_len` keys. Returns the new smallest keys of (`self`, `right`).
    pub(crate) fn rebalance_with_right(&mut self, right: &mut LeafNode<K>, left_len: usize) -> (K, K)
    where
        K: Clone,
    {
        let total = self.keys.len() + right.keys.len();
        assert!(
            left_len >= 1 && left_len < total,
            "`LeafNode::rebalance_with_right()` - both siblings must keep a key!"
        );

        if self.keys.len() > left_len {
            let moved = self.keys.split_off(left_len);
            right.keys.splice(0..0, moved);
        } else {
            let count = left_len - self.keys.len();
            self.keys.extend(right.keys.drain(..count));
        }

        (self.keys[0].clone(), right.keys[0].clone())
    }
}
