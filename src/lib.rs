//! An in-memory B+Tree index for Rust.
//!
//! This crate provides [`BPlusTree`], an ordered multiset of keys. All keys live in the leaves,
//! which are linked in both directions; internal nodes only hold separator copies that route
//! lookups. Keys equal to one another are all kept.
//!
//! - [`insert`](BPlusTree::insert) - Add a key, splitting full nodes on the way down
//! - [`get`](BPlusTree::get) - Find a key equal to the argument
//! - [`remove`](BPlusTree::remove) - Remove one equal key, merging or rebalancing underfull nodes
//! - [`iter`](BPlusTree::iter) - Walk the leaf chain from either end
//!
//! # Example
//!
//! ```
//! use bplus_index::{BPlusTree, Order};
//!
//! let mut index = BPlusTree::new(Order::new(4)?);
//! for key in 0..16 {
//!     index.insert(key);
//! }
//! assert_eq!(index.height(), 3);
//!
//! for key in [2, 1, 0, 5, 10, 15, 14, 4, 11, 3, 6, 12] {
//!     assert_eq!(index.remove(&key), Some(key));
//! }
//! assert_eq!(index.iter().copied().collect::<Vec<_>>(), [7, 8, 9, 13]);
//! assert_eq!(index.height(), 1);
//! # Ok::<(), bplus_index::Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Duplicate keys** - Equal keys are stored side by side rather than replaced
//! - **Tunable fan-out** - The [`Order`] sets how many keys a node holds
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by index, so the leaf chain needs no shared
//! ownership. Structural changes (splits, merges, rebalances, root growth and collapse) are
//! reported through the [`log`](https://docs.rs/log) facade at `debug` level.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order;
mod raw;

pub mod bplus_tree;

pub use bplus_tree::BPlusTree;
pub use error::{Error, Result};
pub use order::Order;
