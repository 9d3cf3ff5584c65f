//! AA-tree nodes and the local rebalancing primitives.
//!
//! Levels play the role that colors play in a red-black tree. A link
//! between a parent and a child of the same level is *horizontal*; the
//! balancing rules only allow single horizontal links, and only to the
//! right:
//!
//! 1. A node without children has level 1.
//! 2. A left child is strictly below its parent.
//! 3. A right child is at most at its parent's level.
//! 4. A right grandchild (`right.right`) is strictly below its grandparent.
//! 5. Every node above level 1 has two children.
//!
//! An absent child has level 0. That value only appears in the rules above
//! and is never exposed outside this module.

use log::trace;

use super::error::InvariantViolation;

/// Owning link to a subtree.
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// Which child link a path step followed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) level: usize,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Creates a level 1 node without children.
    pub(crate) fn leaf(value: T) -> Box<Self> {
        Box::new(Self {
            value,
            level: 1,
            left: None,
            right: None,
        })
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link<T> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Level of a possibly absent subtree root.
#[inline]
pub(crate) fn level<T>(link: &Link<T>) -> usize {
    link.as_ref().map_or(0, |node| node.level)
}

/// Removes a left horizontal link by rotating right.
///
/// ```text
///     L <- T              L -> T
///    / \    \     =>     /    / \
///   A   B    R          A    B   R
/// ```
pub(crate) fn skew<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.left.take() {
        Some(mut left) if left.level == node.level => {
            trace!("skew at level {}", node.level);
            node.left = left.right.take();
            left.right = Some(node);
            left
        }
        left => {
            node.left = left;
            node
        }
    }
}

/// Removes two consecutive right horizontal links by rotating left and
/// raising the middle node one level.
///
/// ```text
///                           R
///   T -> R -> X            / \
///  /    /         =>      T   X
/// A    B                 / \
///                       A   B
/// ```
pub(crate) fn split<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.right.take() {
        Some(mut right) if level(&right.right) == node.level => {
            trace!("split raises node to level {}", node.level + 1);
            node.right = right.left.take();
            right.left = Some(node);
            right.level += 1;
            right
        }
        right => {
            node.right = right;
            node
        }
    }
}

/// Restores the rules at `node` after one of its subtrees lost a level.
///
/// When `node` sits more than one level above its lowest child its level is
/// lowered (together with a right child that would otherwise end up above
/// it), then the right spine is re-skewed and re-split.
pub(crate) fn rebalance_after_removal<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let expected = level(&node.left).min(level(&node.right)) + 1;
    if expected >= node.level {
        return node;
    }

    trace!("lowering node from level {} to {expected}", node.level);
    node.level = expected;
    if let Some(right) = node.right.as_mut()
        && right.level > expected
    {
        right.level = expected;
    }

    let mut node = skew(node);
    if let Some(right) = node.right.take() {
        let mut right = skew(right);
        if let Some(right_right) = right.right.take() {
            right.right = Some(skew(right_right));
        }
        node.right = Some(right);
    }

    let mut node = split(node);
    if let Some(right) = node.right.take() {
        node.right = Some(split(right));
    }
    node
}

/// Checks rules 1 to 5 between `node` and its direct descendants.
pub(crate) fn local_violation<T>(node: &Node<T>) -> Option<&'static str> {
    let left_level = level(&node.left);
    let right_level = level(&node.right);

    if node.left.is_none() && node.right.is_none() && node.level != 1 {
        Some("a node without children must have level 1")
    } else if left_level >= node.level {
        Some("left child level must be below parent level")
    } else if right_level > node.level {
        Some("right child level must not exceed parent level")
    } else if node
        .right
        .as_ref()
        .is_some_and(|right| level(&right.right) >= node.level)
    {
        Some("right grandchild level must be below grandparent level")
    } else if node.level > 1 && (node.left.is_none() || node.right.is_none()) {
        Some("a node above level 1 must have two children")
    } else {
        None
    }
}

/// Walks the whole subtree and reports the first broken rule, plus any
/// pair of in-order neighbours that are not strictly ascending under
/// `compare`.
pub(crate) fn check_subtree<T, F>(
    link: &Link<T>,
    compare: &F,
    depth: usize,
    lower: Option<&T>,
    upper: Option<&T>,
) -> Result<(), InvariantViolation>
where
    F: Fn(&T, &T) -> std::cmp::Ordering,
{
    let Some(node) = link else {
        return Ok(());
    };

    let violation = |rule| InvariantViolation {
        depth,
        level: node.level,
        rule,
    };

    if let Some(rule) = local_violation(node) {
        return Err(violation(rule));
    }
    if lower.is_some_and(|bound| compare(bound, &node.value).is_ge())
        || upper.is_some_and(|bound| compare(&node.value, bound).is_ge())
    {
        return Err(violation("elements must be strictly ascending in order"));
    }

    check_subtree(&node.left, compare, depth + 1, lower, Some(&node.value))?;
    check_subtree(&node.right, compare, depth + 1, Some(&node.value), upper)
}
