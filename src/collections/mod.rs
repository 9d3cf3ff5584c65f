//! Ordered collections.
//!
//! This module provides [`AnderssonTree`], an ordered, duplicate-free
//! collection balanced by the AA-tree rules, together with the traversal
//! engine that implements its queries.
//!
//! # Available Types
//!
//! - [`AnderssonTree`]: The collection itself
//! - [`TraversalOrder`]: Pre-order, in-order or post-order visiting
//! - [`Traverse`]: Borrowing iterator in a chosen order
//! - [`IntoIter`]: Owning iterator in ascending order
//! - [`Comparator`]: Three-way ordering of elements, with
//!   [`NaturalOrder`], [`PartialNaturalOrder`] and [`Reverse`]
//! - [`TreeError`] and [`InvariantViolation`]: Error types
//!
//! # Example
//!
//! ```rust
//! use andersson::collections::{AnderssonTree, TraversalOrder};
//!
//! let mut tree = AnderssonTree::new();
//! tree.extend([5, 1, 4, 2, 3]);
//!
//! assert_eq!(tree.to_vec(TraversalOrder::InOrder), vec![1, 2, 3, 4, 5]);
//! assert!(tree.every(TraversalOrder::InOrder, |value| *value > 0));
//! assert!(tree.some(TraversalOrder::PostOrder, |value| *value == 4));
//! ```

mod andersson_tree;
mod comparator;
mod error;
mod node;
mod traversal;

pub use andersson_tree::AnderssonTree;
pub use andersson_tree::IntoIter;
pub use andersson_tree::Structure;
pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use comparator::PartialNaturalOrder;
pub use comparator::Reverse;
pub use error::InvariantViolation;
pub use error::TreeError;
pub use traversal::TraversalOrder;
pub use traversal::Traverse;
