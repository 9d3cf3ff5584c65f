//! Order-parameterized traversal and the query operations built on it.
//!
//! Every query of [`AnderssonTree`] runs through one walk, [`Traverse`],
//! which visits the stored elements in one of three structural orders:
//!
//! - [`TraversalOrder::PreOrder`]: node, left subtree, right subtree
//! - [`TraversalOrder::InOrder`]: left subtree, node, right subtree
//!   (ascending under the comparator)
//! - [`TraversalOrder::PostOrder`]: left subtree, right subtree, node
//!
//! Because `to_vec`, `for_each`, `map`, `fold`, `reduce`, `every`, `some`
//! and `find` share the walk, they always agree on the visiting order for a
//! given [`TraversalOrder`]. The walk keeps its pending work on an explicit
//! stack and never recurses.
//!
//! # Examples
//!
//! ```rust
//! use andersson::collections::{AnderssonTree, TraversalOrder};
//!
//! let tree: AnderssonTree<i32> = [2, 1, 3].into_iter().collect();
//!
//! assert_eq!(tree.to_vec(TraversalOrder::PreOrder), vec![2, 1, 3]);
//! assert_eq!(tree.to_vec(TraversalOrder::InOrder), vec![1, 2, 3]);
//! assert_eq!(tree.to_vec(TraversalOrder::PostOrder), vec![1, 3, 2]);
//!
//! let doubled = tree.map(TraversalOrder::InOrder, |value| value * 2);
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::ops::ControlFlow;
use std::str::FromStr;

use smallvec::SmallVec;

use super::andersson_tree::AnderssonTree;
use super::comparator::Comparator;
use super::error::TreeError;
use super::node::Node;

// =============================================================================
// TraversalOrder Definition
// =============================================================================

/// The structural order in which a traversal visits elements.
///
/// Parsing accepts the names `pre`, `in` and `post`, optionally followed by
/// `order` (`pre_order`, `pre-order`, `preorder`, ...), in any case.
///
/// # Examples
///
/// ```rust
/// use andersson::collections::{TraversalOrder, TreeError};
///
/// assert_eq!("PRE_ORDER".parse::<TraversalOrder>(), Ok(TraversalOrder::PreOrder));
/// assert_eq!(TraversalOrder::try_from("post"), Ok(TraversalOrder::PostOrder));
/// assert!(matches!(
///     "level".parse::<TraversalOrder>(),
///     Err(TreeError::InvalidArgument { argument: "order", .. })
/// ));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TraversalOrder {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, then node, then right subtree.
    #[default]
    InOrder,
    /// Left subtree, then right subtree, then node.
    PostOrder,
}

impl TraversalOrder {
    /// All orders, in declaration order.
    pub const ALL: [Self; 3] = [Self::PreOrder, Self::InOrder, Self::PostOrder];

    /// Returns the canonical name of the order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreOrder => "pre_order",
            Self::InOrder => "in_order",
            Self::PostOrder => "post_order",
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TraversalOrder {
    type Err = TreeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let normalized = token.trim().to_ascii_lowercase().replace('-', "_");
        let name = normalized
            .strip_suffix("_order")
            .or_else(|| normalized.strip_suffix("order"))
            .unwrap_or(&normalized);

        match name {
            "pre" => Ok(Self::PreOrder),
            "in" => Ok(Self::InOrder),
            "post" => Ok(Self::PostOrder),
            _ => Err(TreeError::invalid_argument(
                "order",
                format!("unknown traversal order `{token}`"),
            )),
        }
    }
}

impl TryFrom<&str> for TraversalOrder {
    type Error = TreeError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        token.parse()
    }
}

/// Deserializes from any name [`FromStr`] accepts; serializes as
/// [`TraversalOrder::as_str`].
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TraversalOrder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TraversalOrderVisitor;

        impl serde::de::Visitor<'_> for TraversalOrderVisitor {
            type Value = TraversalOrder;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a traversal order name such as `pre_order` or `post`")
            }

            fn visit_str<E>(self, token: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                token.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TraversalOrderVisitor)
    }
}

// =============================================================================
// Traverse Iterator
// =============================================================================

/// Pending work of a traversal.
enum Frame<'a, T> {
    /// Schedule the subtree rooted here.
    Expand(&'a Node<T>),
    /// Yield this node's element.
    Emit(&'a Node<T>),
}

impl<T> Clone for Frame<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Frame<'_, T> {}

/// Inline frame capacity; a subtree expansion leaves at most two frames per
/// level of depth on the stack.
const FRAME_CAPACITY: usize = 48;

/// A borrowing iterator over the elements of an [`AnderssonTree`] in a
/// chosen [`TraversalOrder`].
///
/// Created by [`AnderssonTree::traverse`] and [`AnderssonTree::iter`].
pub struct Traverse<'a, T> {
    order: TraversalOrder,
    stack: SmallVec<[Frame<'a, T>; FRAME_CAPACITY]>,
    remaining: usize,
}

impl<'a, T> Traverse<'a, T> {
    fn new(root: Option<&'a Node<T>>, order: TraversalOrder, remaining: usize) -> Self {
        let mut stack = SmallVec::new();
        stack.extend(root.map(Frame::Expand));
        Self {
            order,
            stack,
            remaining,
        }
    }

    /// Returns the order this traversal follows.
    #[must_use]
    pub const fn order(&self) -> TraversalOrder {
        self.order
    }

    fn schedule(&mut self, node: &'a Node<T>) {
        let left = node.left.as_deref().map(Frame::Expand);
        let right = node.right.as_deref().map(Frame::Expand);

        // Frames are popped last-in first-out, so push in reverse.
        match self.order {
            TraversalOrder::PreOrder => {
                self.stack.extend(right);
                self.stack.extend(left);
                self.stack.push(Frame::Emit(node));
            }
            TraversalOrder::InOrder => {
                self.stack.extend(right);
                self.stack.push(Frame::Emit(node));
                self.stack.extend(left);
            }
            TraversalOrder::PostOrder => {
                self.stack.push(Frame::Emit(node));
                self.stack.extend(right);
                self.stack.extend(left);
            }
        }
    }
}

impl<'a, T> Iterator for Traverse<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Expand(node) => self.schedule(node),
                Frame::Emit(node) => {
                    self.remaining -= 1;
                    return Some(&node.value);
                }
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Traverse<'_, T> {}

impl<T> FusedIterator for Traverse<'_, T> {}

impl<T> Clone for Traverse<'_, T> {
    fn clone(&self) -> Self {
        Self {
            order: self.order,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

// =============================================================================
// Query Operations
// =============================================================================

impl<T, C> AnderssonTree<T, C> {
    /// Returns an iterator visiting the elements in `order`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::{AnderssonTree, TraversalOrder};
    ///
    /// let tree: AnderssonTree<i32> = (1..=3).collect();
    /// let post: Vec<&i32> = tree.traverse(TraversalOrder::PostOrder).collect();
    /// assert_eq!(post, vec![&1, &3, &2]);
    /// ```
    #[must_use]
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_, T> {
        Traverse::new(self.root.as_deref(), order, self.len())
    }

    /// Returns an iterator visiting the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> Traverse<'_, T> {
        self.traverse(TraversalOrder::InOrder)
    }

    /// Drives `visitor` over the elements in `order` until it breaks.
    ///
    /// Returns the first [`ControlFlow::Break`] produced by the visitor, or
    /// [`ControlFlow::Continue`] if every element was visited.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::ops::ControlFlow;
    /// use andersson::collections::{AnderssonTree, TraversalOrder};
    ///
    /// let tree: AnderssonTree<i32> = (1..=10).collect();
    /// let mut visited = 0;
    /// let found = tree.walk(TraversalOrder::InOrder, |value| {
    ///     visited += 1;
    ///     if value % 4 == 0 { ControlFlow::Break(*value) } else { ControlFlow::Continue(()) }
    /// });
    /// assert_eq!(found, ControlFlow::Break(4));
    /// assert_eq!(visited, 4);
    /// ```
    pub fn walk<'a, B, F>(&'a self, order: TraversalOrder, visitor: F) -> ControlFlow<B>
    where
        F: FnMut(&'a T) -> ControlFlow<B>,
    {
        self.traverse(order).try_for_each(visitor)
    }

    /// Calls `action` on every element in `order`.
    pub fn for_each<F>(&self, order: TraversalOrder, mut action: F)
    where
        F: FnMut(&T),
    {
        let _: ControlFlow<()> = self.walk(order, |value| {
            action(value);
            ControlFlow::Continue(())
        });
    }

    /// Collects the elements in `order` into a new vector.
    ///
    /// The vector is freshly materialized on every call.
    #[must_use]
    pub fn to_vec(&self, order: TraversalOrder) -> Vec<T>
    where
        T: Clone,
    {
        self.map(order, T::clone)
    }

    /// Collects references to the elements in `order`.
    #[must_use]
    pub fn to_ref_vec(&self, order: TraversalOrder) -> Vec<&T> {
        self.traverse(order).collect()
    }

    /// Applies `transform` to every element in `order` and collects the
    /// results in visiting order.
    pub fn map<U, F>(&self, order: TraversalOrder, mut transform: F) -> Vec<U>
    where
        F: FnMut(&T) -> U,
    {
        let mut mapped = Vec::with_capacity(self.len());
        self.for_each(order, |value| mapped.push(transform(value)));
        mapped
    }

    /// Folds the elements in `order` into an accumulator seeded with `init`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::{AnderssonTree, TraversalOrder};
    ///
    /// let tree: AnderssonTree<&str> = ["b", "a", "c"].into_iter().collect();
    /// let joined = tree.fold(TraversalOrder::PreOrder, String::new(), |mut accumulator, value| {
    ///     accumulator.push_str(value);
    ///     accumulator
    /// });
    /// assert_eq!(joined, "bac");
    /// ```
    pub fn fold<B, F>(&self, order: TraversalOrder, init: B, function: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.traverse(order).fold(init, function)
    }

    /// Reduces the elements in `order` without an initial accumulator.
    ///
    /// The first visited element seeds the accumulator and is not passed to
    /// `function` again.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyCollection`] if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::{AnderssonTree, TraversalOrder};
    ///
    /// let tree: AnderssonTree<String> =
    ///     ["b", "a", "c"].into_iter().map(String::from).collect();
    /// let joined = tree.reduce(TraversalOrder::InOrder, |accumulator, value| accumulator + value);
    /// assert_eq!(joined.as_deref(), Ok("abc"));
    /// ```
    pub fn reduce<F>(&self, order: TraversalOrder, function: F) -> Result<T, TreeError>
    where
        T: Clone,
        F: FnMut(T, &T) -> T,
    {
        let mut elements = self.traverse(order);
        let seed = elements
            .next()
            .ok_or(TreeError::EmptyCollection { operation: "reduce" })?;
        Ok(elements.fold(seed.clone(), function))
    }

    /// Reduces the elements of the reversed `order` sequence without an
    /// initial accumulator.
    ///
    /// The last element visited by `order` seeds the accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyCollection`] if the tree is empty.
    pub fn reduce_right<F>(&self, order: TraversalOrder, function: F) -> Result<T, TreeError>
    where
        T: Clone,
        F: FnMut(T, &T) -> T,
    {
        let mut elements = self.to_ref_vec(order).into_iter().rev();
        let seed = elements.next().ok_or(TreeError::EmptyCollection {
            operation: "reduce_right",
        })?;
        Ok(elements.fold(seed.clone(), function))
    }

    /// Returns `true` if `predicate` holds for every element.
    ///
    /// Stops at the first element failing `predicate`; elements after it in
    /// `order` are not visited. An empty tree yields `true`.
    pub fn every<F>(&self, order: TraversalOrder, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.walk(order, |value| {
            if predicate(value) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .is_continue()
    }

    /// Returns `true` if `predicate` holds for at least one element.
    ///
    /// Stops at the first element satisfying `predicate`. An empty tree
    /// yields `false`.
    pub fn some<F>(&self, order: TraversalOrder, mut predicate: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.find(order, |value| predicate(value)).is_some()
    }

    /// Returns the first element in `order` satisfying `predicate`.
    pub fn find<F>(&self, order: TraversalOrder, mut predicate: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.walk(order, |value| {
            if predicate(value) {
                ControlFlow::Break(value)
            } else {
                ControlFlow::Continue(())
            }
        })
        .break_value()
    }

    /// Builds a new tree, with the same comparator, from the elements
    /// satisfying `predicate`. `predicate` is called in `order`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::{AnderssonTree, TraversalOrder};
    ///
    /// let tree: AnderssonTree<i32> = (1..=6).collect();
    /// let even = tree.filter(TraversalOrder::InOrder, |value| value % 2 == 0);
    /// assert_eq!(even.to_vec(TraversalOrder::InOrder), vec![2, 4, 6]);
    /// ```
    #[must_use]
    pub fn filter<F>(&self, order: TraversalOrder, mut predicate: F) -> Self
    where
        T: Clone,
        C: Comparator<T> + Clone,
        F: FnMut(&T) -> bool,
    {
        let mut filtered = Self::with_comparator(self.comparator().clone());
        self.for_each(order, |value| {
            if predicate(value) {
                filtered.insert(value.clone());
            }
        });
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample() -> AnderssonTree<i32> {
        (1..=7).collect()
    }

    #[rstest]
    #[case::short("pre", TraversalOrder::PreOrder)]
    #[case::snake("in_order", TraversalOrder::InOrder)]
    #[case::constant("POST_ORDER", TraversalOrder::PostOrder)]
    #[case::kebab("pre-order", TraversalOrder::PreOrder)]
    #[case::joined("inorder", TraversalOrder::InOrder)]
    #[case::padded("  post ", TraversalOrder::PostOrder)]
    fn test_parse_order(#[case] token: &str, #[case] expected: TraversalOrder) {
        assert_eq!(token.parse::<TraversalOrder>(), Ok(expected));
        assert_eq!(TraversalOrder::try_from(token), Ok(expected));
    }

    #[rstest]
    #[case::unknown("level")]
    #[case::empty("")]
    #[case::suffix_only("order")]
    fn test_parse_unknown_order_is_invalid_argument(#[case] token: &str) {
        assert!(matches!(
            token.parse::<TraversalOrder>(),
            Err(TreeError::InvalidArgument {
                argument: "order",
                ..
            })
        ));
    }

    #[rstest]
    fn test_display_round_trips_through_parse() {
        for order in TraversalOrder::ALL {
            assert_eq!(order.to_string().parse::<TraversalOrder>(), Ok(order));
        }
    }

    #[rstest]
    fn test_default_order_is_in_order() {
        assert_eq!(TraversalOrder::default(), TraversalOrder::InOrder);
    }

    #[rstest]
    fn test_perfect_tree_orders() {
        let tree = sample();
        assert_eq!(
            tree.to_vec(TraversalOrder::PreOrder),
            vec![4, 2, 1, 3, 6, 5, 7]
        );
        assert_eq!(
            tree.to_vec(TraversalOrder::InOrder),
            vec![1, 2, 3, 4, 5, 6, 7]
        );
        assert_eq!(
            tree.to_vec(TraversalOrder::PostOrder),
            vec![1, 3, 2, 5, 7, 6, 4]
        );
    }

    #[rstest]
    fn test_traverse_reports_exact_size() {
        let tree = sample();
        let mut traversal = tree.traverse(TraversalOrder::PostOrder);
        assert_eq!(traversal.len(), 7);
        traversal.next();
        assert_eq!(traversal.len(), 6);
        assert_eq!(traversal.order(), TraversalOrder::PostOrder);
    }

    #[rstest]
    fn test_traverse_clone_resumes_independently() {
        let tree = sample();
        let mut traversal = tree.traverse(TraversalOrder::InOrder);
        traversal.next();
        let copy = traversal.clone();
        assert_eq!(traversal.count(), 6);
        assert_eq!(copy.copied().collect::<Vec<_>>(), vec![2, 3, 4, 5, 6, 7]);
    }

    #[rstest]
    fn test_empty_tree_yields_nothing_in_every_order() {
        let tree: AnderssonTree<i32> = AnderssonTree::new();
        for order in TraversalOrder::ALL {
            assert!(tree.to_vec(order).is_empty());
            assert!(tree.map(order, |value| value + 1).is_empty());
            assert!(tree.every(order, |_| false));
            assert!(!tree.some(order, |_| true));
            assert_eq!(tree.fold(order, 10, |accumulator, value| accumulator + value), 10);
        }
    }

    #[rstest]
    fn test_reduce_empty_is_empty_collection() {
        let tree: AnderssonTree<i32> = AnderssonTree::new();
        assert_eq!(
            tree.reduce(TraversalOrder::InOrder, |accumulator, value| accumulator + value),
            Err(TreeError::EmptyCollection { operation: "reduce" })
        );
        assert_eq!(
            tree.reduce_right(TraversalOrder::InOrder, |accumulator, value| accumulator
                + value),
            Err(TreeError::EmptyCollection {
                operation: "reduce_right"
            })
        );
    }

    #[rstest]
    fn test_reduce_single_element_returns_it_untouched() {
        let tree: AnderssonTree<i32> = [9].into_iter().collect();
        let result = tree.reduce(TraversalOrder::PreOrder, |_, _| unreachable!());
        assert_eq!(result, Ok(9));
    }

    #[rstest]
    fn test_reduce_right_walks_backwards() {
        let tree: AnderssonTree<String> = ["a", "b", "c"].into_iter().map(String::from).collect();
        let joined = tree.reduce_right(TraversalOrder::InOrder, |accumulator, value| {
            accumulator + value
        });
        assert_eq!(joined.as_deref(), Ok("cba"));
    }

    #[rstest]
    fn test_every_stops_at_first_failure() {
        let tree = sample();
        let mut visited = Vec::new();
        let all_small = tree.every(TraversalOrder::InOrder, |value| {
            visited.push(*value);
            *value < 3
        });
        assert!(!all_small);
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[rstest]
    fn test_some_stops_at_first_success() {
        let tree = sample();
        let mut visited = Vec::new();
        let any_even = tree.some(TraversalOrder::PreOrder, |value| {
            visited.push(*value);
            value % 2 == 0
        });
        assert!(any_even);
        assert_eq!(visited, vec![4]);
    }

    #[rstest]
    fn test_find_in_post_order() {
        let tree = sample();
        assert_eq!(tree.find(TraversalOrder::PostOrder, |value| value % 2 == 0), Some(&2));
        assert_eq!(tree.find(TraversalOrder::PostOrder, |value| *value > 7), None);
    }

    #[rstest]
    fn test_filter_calls_predicate_in_order_and_keeps_comparator() {
        let tree = sample();
        let mut seen = Vec::new();
        let odd = tree.filter(TraversalOrder::PostOrder, |value| {
            seen.push(*value);
            value % 2 == 1
        });
        assert_eq!(seen, tree.to_vec(TraversalOrder::PostOrder));
        assert_eq!(odd.to_vec(TraversalOrder::InOrder), vec![1, 3, 5, 7]);
        assert!(odd.check_invariants().is_ok());
    }
}
