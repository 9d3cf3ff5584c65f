//! Ordered, duplicate-free collection based on the AA-tree.
//!
//! This module provides [`AnderssonTree`], a mutable balanced binary search
//! tree in which every element is unique under a user supplied
//! [`Comparator`].
//!
//! # Overview
//!
//! The AA-tree (Arne Andersson, 1993) is a red-black tree variant that
//! replaces colors with integer levels. Only two local operations are
//! needed to keep it balanced, `skew` and `split`, and both are applied
//! bottom-up along the path touched by an insertion or a removal.
//!
//! - O(log N) insert
//! - O(log N) remove
//! - O(log N) contains / get
//! - O(log N) first / last
//! - O(1) len and `is_empty`
//!
//! Insertion and removal are iterative: the search path is detached into an
//! explicit stack and reassembled on the way back, so no call depth is
//! consumed.
//!
//! # Examples
//!
//! ```rust
//! use andersson::collections::{AnderssonTree, TraversalOrder};
//!
//! let mut tree = AnderssonTree::new();
//! for word in ["c", "ca", "b", "ba", "bb", "a", "aa", "ab"] {
//!     tree.insert(word);
//! }
//!
//! assert!(tree.contains(&"bb"));
//! assert_eq!(
//!     tree.to_vec(TraversalOrder::InOrder),
//!     vec!["a", "aa", "ab", "b", "ba", "bb", "c", "ca"]
//! );
//! assert_eq!(
//!     tree.to_vec(TraversalOrder::PreOrder),
//!     vec!["ba", "aa", "a", "ab", "b", "c", "bb", "ca"]
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

use log::{debug, trace};
use smallvec::SmallVec;

use super::comparator::{Comparator, NaturalOrder};
use super::error::{InvariantViolation, TreeError};
use super::node::{
    Link, Node, Side, check_subtree, local_violation, rebalance_after_removal, skew, split,
};
use super::traversal::Traverse;

// =============================================================================
// Search Path
// =============================================================================

/// Inline capacity of a search path. The height of an AA-tree holding N
/// elements is at most `2 * log2(N + 1)`, so 32 covers every tree with
/// fewer than 65536 elements without touching the heap.
const PATH_CAPACITY: usize = 32;

/// Nodes detached from the tree while descending, each paired with the
/// side the descent continued on.
type Path<T> = SmallVec<[(Box<Node<T>>, Side); PATH_CAPACITY]>;

const REBALANCE_INVARIANT_PANIC_MESSAGE: &str =
    "AA-tree rules must hold at every node returned by rebalancing";

/// Re-links a detached path above `subtree`, passing every ancestor through
/// `rebalance` from the bottom up.
fn reassemble<T>(
    mut path: Path<T>,
    mut subtree: Link<T>,
    mut rebalance: impl FnMut(Box<Node<T>>) -> Box<Node<T>>,
) -> Link<T> {
    while let Some((mut parent, side)) = path.pop() {
        *parent.child_mut(side) = subtree;
        subtree = Some(rebalance(parent));
    }
    subtree
}

fn rebalance_after_insertion<T>(node: Box<Node<T>>) -> Box<Node<T>> {
    let node = split(skew(node));
    debug_assert!(
        local_violation(&node).is_none(),
        "{}",
        REBALANCE_INVARIANT_PANIC_MESSAGE
    );
    node
}

fn rebalance_after_unlink<T>(node: Box<Node<T>>) -> Box<Node<T>> {
    let node = rebalance_after_removal(node);
    debug_assert!(
        local_violation(&node).is_none(),
        "{}",
        REBALANCE_INVARIANT_PANIC_MESSAGE
    );
    node
}

/// Unlinks `found` from the structure.
///
/// Returns the removed element and the subtree that takes the place of the
/// last node on `path`'s open side. A node with two children keeps its
/// position and receives its in-order predecessor's element instead; the
/// predecessor (never a node with a right child) is unlinked in its place.
fn unlink<T>(path: &mut Path<T>, mut found: Box<Node<T>>) -> (T, Link<T>) {
    match (found.left.take(), found.right.take()) {
        (Some(left), Some(right)) => {
            found.right = Some(right);
            let found_index = path.len();
            path.push((found, Side::Left));

            let mut predecessor = left;
            while let Some(next) = predecessor.right.take() {
                path.push((predecessor, Side::Right));
                predecessor = next;
            }

            let Node {
                value: predecessor_value,
                left: predecessor_left,
                ..
            } = *predecessor;
            let removed = std::mem::replace(&mut path[found_index].0.value, predecessor_value);
            (removed, predecessor_left)
        }
        (left, right) => {
            let Node { value, .. } = *found;
            (value, left.or(right))
        }
    }
}

// =============================================================================
// AnderssonTree Definition
// =============================================================================

/// An ordered set of unique elements stored in an AA-tree.
///
/// Element identity is decided by the comparator `C`, not by `PartialEq`:
/// inserting an element that compares equal to a stored one leaves the tree
/// untouched. The comparator is chosen once, when the tree is built.
///
/// # Time Complexity
///
/// | Operation              | Complexity |
/// |------------------------|------------|
/// | `new`                  | O(1)       |
/// | `insert`               | O(log N)   |
/// | `remove` / `take`      | O(log N)   |
/// | `contains` / `get`     | O(log N)   |
/// | `first` / `last`       | O(log N)   |
/// | `pop_first`/`pop_last` | O(log N)   |
/// | `len` / `is_empty`     | O(1)       |
/// | traversal queries      | O(N)       |
///
/// # Examples
///
/// ```rust
/// use andersson::collections::AnderssonTree;
///
/// let mut tree = AnderssonTree::new();
/// assert!(tree.insert(3));
/// assert!(tree.insert(1));
/// assert!(!tree.insert(3));
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.first(), Some(&1));
/// assert!(tree.remove(&1));
/// assert!(!tree.contains(&1));
/// ```
#[derive(Clone)]
pub struct AnderssonTree<T, C = NaturalOrder> {
    /// Root node of the tree
    pub(crate) root: Link<T>,
    /// Orders and identifies elements
    comparator: C,
    /// Number of stored elements
    length: usize,
}

static_assertions::assert_impl_all!(AnderssonTree<i32>: Send, Sync);
static_assertions::assert_impl_all!(AnderssonTree<String, super::Reverse<NaturalOrder>>: Send, Sync);

impl<T> AnderssonTree<T> {
    /// Creates an empty tree ordered by `T`'s natural order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::AnderssonTree;
    ///
    /// let tree: AnderssonTree<i32> = AnderssonTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C> AnderssonTree<T, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::AnderssonTree;
    ///
    /// let mut tree = AnderssonTree::with_comparator(|left: &i32, right: &i32| right.cmp(left));
    /// tree.extend([1, 2, 3]);
    /// assert_eq!(tree.first(), Some(&3));
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            comparator,
            length: 0,
        }
    }

    /// Returns the number of stored elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree stores no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the comparator the tree was built with.
    #[inline]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        debug!("clearing tree of {} elements", self.length);
        self.root = None;
        self.length = 0;
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// An empty tree has height 0. The balancing rules keep the height of a
    /// tree holding N elements at or below `2 * log2(N + 1)`.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: SmallVec<[(&Node<T>, usize); PATH_CAPACITY]> = SmallVec::new();
        stack.extend(self.root.as_deref().map(|root| (root, 1)));
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.left.as_deref().map(|left| (left, depth + 1)));
            stack.extend(node.right.as_deref().map(|right| (right, depth + 1)));
        }
        deepest
    }

    /// Returns the smallest element under the comparator.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.extreme(Side::Left)
    }

    /// Returns the largest element under the comparator.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        loop {
            let next = match side {
                Side::Left => node.left.as_deref(),
                Side::Right => node.right.as_deref(),
            };
            match next {
                Some(child) => node = child,
                None => return Some(&node.value),
            }
        }
    }

    /// Removes and returns the smallest element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::AnderssonTree;
    ///
    /// let mut tree: AnderssonTree<i32> = [2, 1, 3].into_iter().collect();
    /// assert_eq!(tree.pop_first(), Some(1));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn pop_first(&mut self) -> Option<T> {
        self.pop_extreme(Side::Left)
    }

    /// Removes and returns the largest element.
    pub fn pop_last(&mut self) -> Option<T> {
        self.pop_extreme(Side::Right)
    }

    fn pop_extreme(&mut self, side: Side) -> Option<T> {
        let mut path = Path::new();
        let mut node = self.root.take()?;
        while let Some(next) = node.child_mut(side).take() {
            path.push((node, side));
            node = next;
        }

        let (removed, replacement) = unlink(&mut path, node);
        self.root = reassemble(path, replacement, rebalance_after_unlink);
        self.length -= 1;
        Some(removed)
    }
}

impl<T, C: Comparator<T>> AnderssonTree<T, C> {
    /// Inserts `value` at its comparator-determined position.
    ///
    /// Returns `true` if the value was stored. Returns `false`, leaving the
    /// tree unchanged, when an equal element is already present (the stored
    /// element is kept) or when the comparator cannot order `value`.
    ///
    /// A rejected value is only reported through a trace-level log record.
    /// Callers that need to see the [`TreeError::InvalidArgument`] must use
    /// [`try_insert`](Self::try_insert) instead.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn insert(&mut self, value: T) -> bool {
        match self.comparator.validate(&value) {
            Ok(()) => self.insert_validated(value),
            Err(error) => {
                trace!("insert ignored: {error}");
                false
            }
        }
    }

    /// Inserts `value`, reporting values the comparator cannot order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidArgument`] if the comparator rejects
    /// `value`. The tree is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::{AnderssonTree, PartialNaturalOrder};
    ///
    /// let mut tree = AnderssonTree::with_comparator(PartialNaturalOrder);
    /// assert_eq!(tree.try_insert(0.5), Ok(true));
    /// assert_eq!(tree.try_insert(0.5), Ok(false));
    /// assert!(tree.try_insert(f64::NAN).is_err());
    /// ```
    pub fn try_insert(&mut self, value: T) -> Result<bool, TreeError> {
        self.comparator.validate(&value)?;
        Ok(self.insert_validated(value))
    }

    fn insert_validated(&mut self, value: T) -> bool {
        let mut path = Path::new();
        let mut cursor = self.root.take();

        let inserted = loop {
            let Some(mut node) = cursor else {
                cursor = Some(Node::leaf(value));
                break true;
            };
            match self.comparator.compare(&value, &node.value) {
                Ordering::Less => {
                    cursor = node.left.take();
                    path.push((node, Side::Left));
                }
                Ordering::Greater => {
                    cursor = node.right.take();
                    path.push((node, Side::Right));
                }
                Ordering::Equal => {
                    cursor = Some(node);
                    break false;
                }
            }
        };

        self.root = if inserted {
            self.length += 1;
            trace!("inserted element at depth {}", path.len());
            reassemble(path, cursor, rebalance_after_insertion)
        } else {
            trace!("equal element already present, insert ignored");
            reassemble(path, cursor, |node| node)
        };
        inserted
    }

    /// Removes the element equal to `value`.
    ///
    /// Returns `true` if an element was removed. Removing an absent value is
    /// a no-op.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored element equal to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::AnderssonTree;
    ///
    /// let mut tree = AnderssonTree::with_comparator(|left: &(i32, &str), right: &(i32, &str)| {
    ///     left.0.cmp(&right.0)
    /// });
    /// tree.insert((1, "stored"));
    /// assert_eq!(tree.take(&(1, "lookup")), Some((1, "stored")));
    /// assert!(tree.is_empty());
    /// ```
    pub fn take(&mut self, value: &T) -> Option<T> {
        if let Err(error) = self.comparator.validate(value) {
            trace!("remove ignored: {error}");
            return None;
        }

        let mut path = Path::new();
        let mut cursor = self.root.take();
        let found = loop {
            let Some(mut node) = cursor else {
                break None;
            };
            match self.comparator.compare(value, &node.value) {
                Ordering::Less => {
                    cursor = node.left.take();
                    path.push((node, Side::Left));
                }
                Ordering::Greater => {
                    cursor = node.right.take();
                    path.push((node, Side::Right));
                }
                Ordering::Equal => break Some(node),
            }
        };

        let Some(found) = found else {
            trace!("no equal element present, remove ignored");
            self.root = reassemble(path, None, |node| node);
            return None;
        };

        let (removed, replacement) = unlink(&mut path, found);
        self.root = reassemble(path, replacement, rebalance_after_unlink);
        self.length -= 1;
        trace!("removed element, {} remaining", self.length);
        Some(removed)
    }

    /// Returns `true` if an element equal to `value` is stored.
    ///
    /// # Complexity
    ///
    /// O(log N)
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns the stored element equal to `value`.
    #[must_use]
    pub fn get(&self, value: &T) -> Option<&T> {
        if self.comparator.validate(value).is_err() {
            return None;
        }

        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match self.comparator.compare(value, &node.value) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Verifies every AA-tree rule, the strict ascending order of the
    /// elements and the recorded length.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        check_subtree(
            &self.root,
            &|left: &T, right: &T| self.comparator.compare(left, right),
            0,
            None,
            None,
        )?;

        let counted = self.traverse(super::TraversalOrder::InOrder).count();
        if counted == self.length {
            Ok(())
        } else {
            Err(InvariantViolation {
                depth: 0,
                level: self.root.as_ref().map_or(0, |root| root.level),
                rule: "recorded length must match the number of nodes",
            })
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// An owning iterator over the elements of an [`AnderssonTree`] in
/// ascending order.
pub struct IntoIter<T> {
    stack: Vec<Box<Node<T>>>,
    remaining: usize,
}

impl<T> IntoIter<T> {
    fn new(root: Link<T>, remaining: usize) -> Self {
        let mut iterator = Self {
            stack: Vec::new(),
            remaining,
        };
        iterator.descend_left(root);
        iterator
    }

    fn descend_left(&mut self, mut link: Link<T>) {
        while let Some(mut node) = link {
            link = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.descend_left(node.right.take());
        self.remaining -= 1;
        Some(node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

// =============================================================================
// Structural Dump
// =============================================================================

impl<T, C> AnderssonTree<T, C> {
    /// Returns a view that formats the node layout of the tree.
    ///
    /// Each node is written on its own line in pre-order, indented two
    /// spaces per depth, prefixed with `L` or `R` for the side it hangs on
    /// and followed by its level. An empty tree formats as an empty string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use andersson::collections::AnderssonTree;
    ///
    /// let tree: AnderssonTree<i32> = (1..=3).collect();
    /// assert_eq!(
    ///     tree.structure().to_string(),
    ///     "2 (level 2)\n  L 1 (level 1)\n  R 3 (level 1)\n"
    /// );
    /// ```
    #[must_use]
    pub fn structure(&self) -> Structure<'_, T> {
        Structure {
            root: self.root.as_deref(),
        }
    }
}

/// Formats the node layout of an [`AnderssonTree`].
///
/// Created by [`AnderssonTree::structure`].
pub struct Structure<'a, T> {
    root: Option<&'a Node<T>>,
}

impl<T: fmt::Display> fmt::Display for Structure<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack: SmallVec<[(&Node<T>, usize, &str); PATH_CAPACITY]> = SmallVec::new();
        stack.extend(self.root.map(|root| (root, 0, "")));
        while let Some((node, depth, side)) = stack.pop() {
            writeln!(
                formatter,
                "{:indent$}{side}{} (level {})",
                "",
                node.value,
                node.level,
                indent = depth * 2
            )?;
            stack.extend(node.right.as_deref().map(|right| (right, depth + 1, "R ")));
            stack.extend(node.left.as_deref().map(|left| (left, depth + 1, "L ")));
        }
        Ok(())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Default> Default for AnderssonTree<T, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for AnderssonTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<T, C: Comparator<T>> Extend<T> for AnderssonTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C> IntoIterator for AnderssonTree<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.length)
    }
}

impl<'a, T, C> IntoIterator for &'a AnderssonTree<T, C> {
    type Item = &'a T;
    type IntoIter = Traverse<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, C> PartialEq for AnderssonTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for AnderssonTree<T, C> {}

impl<T: Hash, C> Hash for AnderssonTree<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AnderssonTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for AnderssonTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for value in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, C> serde::Serialize for AnderssonTree<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.len()))?;
        for value in self {
            sequence.serialize_element(value)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct AnderssonTreeVisitor<T, C> {
    marker: std::marker::PhantomData<(T, C)>,
}

#[cfg(feature = "serde")]
impl<T, C> AnderssonTreeVisitor<T, C> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::de::Visitor<'de> for AnderssonTreeVisitor<T, C>
where
    T: serde::Deserialize<'de>,
    C: Comparator<T> + Default,
{
    type Value = AnderssonTree<T, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut tree = AnderssonTree::default();
        while let Some(value) = access.next_element()? {
            tree.try_insert(value)
                .map_err(<A::Error as serde::de::Error>::custom)?;
        }
        debug!("deserialized tree of {} elements", tree.len());
        Ok(tree)
    }
}

#[cfg(feature = "serde")]
impl<'de, T, C> serde::Deserialize<'de> for AnderssonTree<T, C>
where
    T: serde::Deserialize<'de>,
    C: Comparator<T> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(AnderssonTreeVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================
