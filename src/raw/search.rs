//! Binary searches over a node's sorted key sequence.

use core::borrow::Borrow;

/// Returns the leftmost index `i` with `keys[i] >= key`, or `keys.len()` if there is none.
///
/// Equal keys resolve to the first of their run, so an inserted duplicate lands in front of
/// the keys it equals.
#[inline]
pub(crate) fn lower_bound<K, Q>(keys: &[K], key: &Q) -> usize
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    keys.partition_point(|k| k.borrow() < key)
}

/// Returns the child slot for `key` below a separator sequence: the smallest `i` with
/// `key < separators[i]`, or `separators.len()` (the rightmost child) if there is none.
///
/// A key equal to a separator routes right, to the subtree whose minimum that separator is.
#[inline]
pub(crate) fn route<K, Q>(separators: &[K], key: &Q) -> usize
where
    K: Borrow<Q>,
    Q: ?Sized + Ord,
{
    separators.partition_point(|k| k.borrow() <= key)
}
