//! An ordered multiset index based on a B+Tree.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::order::Order;
use crate::raw::{Handle, RawBPlusTree};

/// An ordered index of keys based on a B+Tree, with duplicates allowed.
///
/// Every key lives in a leaf; internal nodes hold copies of keys as separators and only route
/// lookups. Leaves are chained in both directions, so [`iter`](BPlusTree::iter) walks the keys
/// in order from either end without revisiting internal nodes.
///
/// The tree is parameterized by its [`Order`], the maximum number of keys a node holds. Small
/// orders make deep trees, which is useful for exercising structural changes; large orders keep
/// the tree shallow.
///
/// Inserting a key equal to one already present keeps both. [`get`](BPlusTree::get) and
/// [`remove`](BPlusTree::remove) act on one matching key at a time.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key, as determined by the [`Ord`] trait, changes while it is in the tree. The behavior
/// resulting from such a logic error is not specified, but will be encapsulated to the
/// `BPlusTree` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use bplus_index::{BPlusTree, Order};
///
/// let mut index = BPlusTree::new(Order::new(4)?);
/// for key in [5, 1, 4, 1, 3] {
///     index.insert(key);
/// }
///
/// assert_eq!(index.len(), 5);
/// assert_eq!(index.get(&1), Some(&1));
/// assert!(!index.contains(&2));
///
/// // One of the two 1s goes; the other stays.
/// assert_eq!(index.remove(&1), Some(1));
/// assert!(index.contains(&1));
///
/// assert_eq!(index.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5]);
/// # Ok::<(), bplus_index::Error>(())
/// ```
#[derive(Clone)]
pub struct BPlusTree<K> {
    raw: RawBPlusTree<K>,
}

impl<K> BPlusTree<K> {
    /// Makes a new, empty `BPlusTree` with the given order.
    ///
    /// Does not allocate anything beyond a single empty leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::{BPlusTree, Order};
    ///
    /// let mut index = BPlusTree::new(Order::DEFAULT);
    /// index.insert("a");
    /// ```
    #[must_use]
    pub fn new(order: Order) -> Self {
        Self {
            raw: RawBPlusTree::new(order),
        }
    }

    /// Makes a new, empty `BPlusTree` after validating `order`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderTooSmall`](crate::Error::OrderTooSmall) if `order` is below
    /// [`Order::MIN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// assert!(BPlusTree::<u32>::with_order(3).is_ok());
    /// assert!(BPlusTree::<u32>::with_order(1).is_err());
    /// ```
    pub fn with_order(order: usize) -> Result<Self> {
        Ok(Self::new(Order::new(order)?))
    }

    /// Returns the order the tree was built with.
    #[must_use]
    pub fn order(&self) -> Order {
        self.raw.order()
    }

    /// Returns the number of keys in the tree, counting duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::default();
    /// assert_eq!(index.len(), 0);
    /// index.insert(1);
    /// index.insert(1);
    /// assert_eq!(index.len(), 2);
    /// ```
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree. A tree whose root is a leaf has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::with_order(4)?;
    /// index.extend(0..3);
    /// assert_eq!(index.height(), 1);
    /// index.insert(3);
    /// assert_eq!(index.height(), 2);
    /// # Ok::<(), bplus_index::Error>(())
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Clears the tree, removing all keys. The order is kept.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the smallest key in the tree, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::default();
    /// assert_eq!(index.first(), None);
    /// index.extend([3, 1, 2]);
    /// assert_eq!(index.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.first()
    }

    /// Returns the largest key in the tree, if any.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.last()
    }

    /// Gets an iterator that visits the keys in ascending order, duplicates included.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let index: BPlusTree<_> = [3, 1, 2, 1].into_iter().collect();
    /// let mut iter = index.iter();
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next_back(), Some(&3));
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.raw)
    }
}

impl<K: Ord> BPlusTree<K> {
    /// Returns a reference to a key in the tree equal to `key`, if any.
    ///
    /// The key may be any borrowed form of the tree's key type, but the ordering on the borrowed
    /// form *must* match the ordering on the key type. When several equal keys are stored, the
    /// one returned is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let index: BPlusTree<String> = ["kiwi", "pear"].map(String::from).into_iter().collect();
    /// assert_eq!(index.get("kiwi").map(String::as_str), Some("kiwi"));
    /// assert_eq!(index.get("apple"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key).is_some()
    }
}

impl<K: Ord + Clone> BPlusTree<K> {
    /// Adds a key to the tree. Keys equal to ones already present are kept alongside them.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index = BPlusTree::default();
    /// index.insert(2);
    /// index.insert(2);
    /// assert_eq!(index.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) {
        self.raw.insert(key);
    }

    /// Removes one key equal to `key` from the tree and returns it.
    ///
    /// Returns `None`, and leaves the tree exactly as it was, if no key is equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_index::BPlusTree;
    ///
    /// let mut index: BPlusTree<_> = [7, 7].into_iter().collect();
    /// assert_eq!(index.remove(&7), Some(7));
    /// assert_eq!(index.remove(&7), Some(7));
    /// assert_eq!(index.remove(&7), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }
}

impl<K> Default for BPlusTree<K> {
    /// Creates an empty `BPlusTree` of order [`Order::DEFAULT`].
    fn default() -> Self {
        Self::new(Order::DEFAULT)
    }
}

impl<K: fmt::Debug> fmt::Debug for BPlusTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: PartialEq> PartialEq for BPlusTree<K> {
    /// Trees are equal when they hold the same keys in the same order, whatever their orders.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for BPlusTree<K> {}

impl<K: Ord + Clone> Extend<K> for BPlusTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy> Extend<&'a K> for BPlusTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        for &key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + Clone> FromIterator<K> for BPlusTree<K> {
    /// Builds a tree of order [`Order::DEFAULT`].
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = BPlusTree::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K> IntoIterator for &'a BPlusTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// An iterator over the keys of a `BPlusTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`]. It follows the leaf chain
/// forward from the first leaf and backward from the last.
///
/// [`iter`]: BPlusTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K: 'a> {
    tree: &'a RawBPlusTree<K>,
    front_leaf: Handle,
    front: &'a [K],
    back_leaf: Handle,
    back: &'a [K],
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RawBPlusTree<K>) -> Self {
        let (first, last) = (tree.first_leaf(), tree.last_leaf());
        Self {
            tree,
            front_leaf: first,
            front: tree.node(first).as_leaf().keys(),
            back_leaf: last,
            back: tree.node(last).as_leaf().keys(),
            remaining: tree.len(),
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        // Both ends walk the same chain; the count keeps them from crossing.
        if self.remaining == 0 {
            return None;
        }

        let tree = self.tree;
        loop {
            if let Some((key, rest)) = self.front.split_first() {
                self.front = rest;
                self.remaining -= 1;
                return Some(key);
            }
            self.front_leaf = tree.node(self.front_leaf).as_leaf().next()?;
            self.front = tree.node(self.front_leaf).as_leaf().keys();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }

        let tree = self.tree;
        loop {
            if let Some((key, rest)) = self.back.split_last() {
                self.back = rest;
                self.remaining -= 1;
                return Some(key);
            }
            self.back_leaf = tree.node(self.back_leaf).as_leaf().prev()?;
            self.back = tree.node(self.back_leaf).as_leaf().keys();
        }
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
