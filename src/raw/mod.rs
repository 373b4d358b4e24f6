mod arena;
mod node;
mod raw_bplus_tree;
mod search;

pub(crate) use arena::Handle;
pub(crate) use raw_bplus_tree::RawBPlusTree;
