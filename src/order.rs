use crate::error::{Error, Result};

/// The order `d` of a [`BPlusTree`](crate::BPlusTree): the maximum number of keys a node holds.
///
/// A node is *full* once it holds `d` keys and is split before anything else is inserted into
/// it. A node is *underfull* when its key count is at most half its capacity; a removal that
/// leaves a child underfull merges it with a sibling or borrows keys from one.
///
/// Splitting an internal node promotes one key and needs at least one key on each side, so
/// internal nodes never hold fewer than three keys at capacity. An order-2 tree therefore has
/// two-key leaves and three-key internal nodes.
///
/// # Examples
///
/// ```
/// use bplus_index::{Error, Order};
///
/// let order = Order::new(4)?;
/// assert_eq!(order.get(), 4);
///
/// assert_eq!(Order::new(1), Err(Error::OrderTooSmall { order: 1, minimum: 2 }));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(usize);

impl Order {
    /// The smallest order that admits a leaf split.
    pub const MIN: usize = 2;

    /// The order used by [`Default`]: 128 keys per node.
    pub const DEFAULT: Self = Self(128);

    // Internal nodes need a promoted key plus one key on each side to split.
    const MIN_INTERNAL_CAPACITY: usize = 3;

    /// Validates `order` as a maximum key count per node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OrderTooSmall`] if `order < Order::MIN`.
    pub const fn new(order: usize) -> Result<Self> {
        if order < Self::MIN {
            return Err(Error::OrderTooSmall {
                order,
                minimum: Self::MIN,
            });
        }
        Ok(Self(order))
    }

    /// Returns the maximum number of keys per node.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub(crate) const fn leaf_capacity(self) -> usize {
        self.0
    }

    #[inline]
    pub(crate) const fn internal_capacity(self) -> usize {
        if self.0 < Self::MIN_INTERNAL_CAPACITY {
            Self::MIN_INTERNAL_CAPACITY
        } else {
            self.0
        }
    }

    /// Fewest keys a non-root leaf holds between operations (what a leaf split leaves behind).
    #[cfg(test)]
    pub(crate) const fn min_leaf_keys(self) -> usize {
        self.leaf_capacity() / 2
    }

    /// Fewest keys a non-root internal node holds between operations.
    #[cfg(test)]
    pub(crate) const fn min_internal_keys(self) -> usize {
        (self.internal_capacity() - 1) / 2
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Order {
    type Error = Error;

    fn try_from(order: usize) -> Result<Self> {
        Self::new(order)
    }
}
