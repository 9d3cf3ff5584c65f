//! Error types for the ordered collections.
//!
//! Every failure is reported synchronously to the caller. There is nothing
//! transient to retry: an error either names an argument the collection
//! cannot work with, or an operation that has no meaningful result on an
//! empty collection.

use std::fmt;

/// Represents errors returned by [`AnderssonTree`](super::AnderssonTree)
/// operations.
///
/// # Examples
///
/// ```rust
/// use andersson::collections::{AnderssonTree, TreeError, TraversalOrder};
///
/// let tree: AnderssonTree<i32> = AnderssonTree::new();
/// let result = tree.reduce(TraversalOrder::InOrder, |accumulator, element| accumulator + element);
/// assert_eq!(result, Err(TreeError::EmptyCollection { operation: "reduce" }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// An argument was outside the accepted domain.
    ///
    /// Raised for unknown traversal order tokens and for values the
    /// configured comparator cannot order.
    InvalidArgument {
        /// Name of the rejected argument.
        argument: &'static str,
        /// Human readable reason for the rejection.
        reason: String,
    },
    /// An unseeded reduction was requested on an empty collection.
    EmptyCollection {
        /// The operation that required at least one element.
        operation: &'static str,
    },
}

impl TreeError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { argument, reason } => {
                write!(formatter, "invalid argument `{argument}`: {reason}")
            }
            Self::EmptyCollection { operation } => {
                write!(
                    formatter,
                    "{operation} of an empty collection with no initial value"
                )
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Describes a broken AA-tree invariant found by
/// [`AnderssonTree::check_invariants`](super::AnderssonTree::check_invariants).
///
/// A violation always indicates a defect in the balancing code or a
/// comparator that is not a consistent total order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Depth of the offending node, the root being at depth 0.
    pub depth: usize,
    /// Level stored on the offending node.
    pub level: usize,
    /// Which rule was broken.
    pub rule: &'static str,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "node at depth {} (level {}) violates: {}",
            self.depth, self.level, self.rule
        )
    }
}

impl std::error::Error for InvariantViolation {}
