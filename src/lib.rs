//! # andersson
//!
//! An ordered, duplicate-free collection built on the AA-tree
//! (Andersson tree).
//!
//! ## Overview
//!
//! - **Balanced tree core**: insert, remove, contains and friends in
//!   O(log N), kept balanced by the `skew` and `split` rules
//! - **Traversal engine**: one explicit-stack walk in pre-order, in-order
//!   or post-order, shared by `to_vec`, `for_each`, `map`, `fold`,
//!   `reduce`, `every`, `some` and `find`
//! - **Comparators**: element order and identity come from a comparator
//!   chosen when the tree is built
//!
//! ## Feature Flags
//!
//! - `collections`: The tree and its traversal engine (default)
//! - `serde`: Serialize trees as sequences in ascending order
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use andersson::prelude::*;
//!
//! let mut tree = AnderssonTree::new();
//! tree.insert("b");
//! tree.insert("a");
//! tree.insert("c");
//!
//! assert_eq!(tree.to_vec(TraversalOrder::InOrder), vec!["a", "b", "c"]);
//! assert_eq!(tree.to_vec(TraversalOrder::PreOrder), vec!["b", "a", "c"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use andersson::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "collections")]
    pub use crate::collections::*;
}

#[cfg(feature = "collections")]
pub mod collections;
