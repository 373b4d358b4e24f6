/// Convenient `Result` alias for fallible `bplus_index` operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by `bplus_index`.
///
/// Looking up or removing an absent key is not an error; those operations return `None`.
/// The only fallible step is building a tree with a degenerate [`Order`](crate::Order).
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested order cannot hold enough keys for a node to be split in two.
    #[error("order {order} is below the minimum of {minimum} keys per node")]
    OrderTooSmall {
        /// The rejected order.
        order: usize,
        /// The smallest accepted order.
        minimum: usize,
    },
}
