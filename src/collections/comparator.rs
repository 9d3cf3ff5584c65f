//! Three-way comparators used to order tree elements.
//!
//! A tree is configured with exactly one comparator, chosen when the tree is
//! built. The comparator decides both where an element is stored and which
//! elements count as equal: two elements comparing [`Ordering::Equal`] are
//! the same element as far as the tree is concerned.
//!
//! # Contract
//!
//! A comparator must be a consistent total order over the values it
//! accepts (reflexive, antisymmetric, transitive) for the whole lifetime of
//! the tree. Breaking this contract never makes the tree panic, but the
//! resulting iteration order is unspecified.
//!
//! # Examples
//!
//! ```rust
//! use andersson::collections::{AnderssonTree, Reverse, NaturalOrder};
//!
//! let mut tree = AnderssonTree::with_comparator(Reverse(NaturalOrder));
//! tree.extend([1, 3, 2]);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
//! ```

use std::cmp::Ordering;

use super::error::TreeError;

/// A three-way comparison over `T`.
pub trait Comparator<T: ?Sized> {
    /// Compares two elements.
    fn compare(&self, left: &T, right: &T) -> Ordering;

    /// Checks that `value` can be ordered by this comparator.
    ///
    /// The default accepts everything.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidArgument`] when the value has no place in
    /// the order.
    fn validate(&self, value: &T) -> Result<(), TreeError> {
        let _ = value;
        Ok(())
    }
}

/// The natural total order of `T: Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

/// The natural order of `T: PartialOrd`, restricted to values comparable with
/// themselves.
///
/// Values such as `f64::NAN` are rejected by [`Comparator::validate`], which
/// every tree entry point consults before comparing.
///
/// ```rust
/// use andersson::collections::{AnderssonTree, PartialNaturalOrder, TreeError};
///
/// let mut tree = AnderssonTree::with_comparator(PartialNaturalOrder);
/// assert_eq!(tree.try_insert(1.5), Ok(true));
/// assert!(matches!(tree.try_insert(f64::NAN), Err(TreeError::InvalidArgument { .. })));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PartialNaturalOrder;

impl<T: PartialOrd + ?Sized> Comparator<T> for PartialNaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        // Validated values are always comparable.
        left.partial_cmp(right).unwrap_or(Ordering::Equal)
    }

    fn validate(&self, value: &T) -> Result<(), TreeError> {
        if value.partial_cmp(value).is_some() {
            Ok(())
        } else {
            Err(TreeError::invalid_argument(
                "value",
                "value is not comparable under its partial order",
            ))
        }
    }
}

/// Inverts another comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C>(
    /// The comparator being inverted.
    pub C,
);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reverse<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(right, left)
    }

    fn validate(&self, value: &T) -> Result<(), TreeError> {
        self.0.validate(value)
    }
}

/// Any `Fn(&T, &T) -> Ordering` closure is a comparator.
///
/// ```rust
/// use andersson::collections::AnderssonTree;
///
/// let mut tree = AnderssonTree::with_comparator(|left: &&str, right: &&str| {
///     left.len().cmp(&right.len())
/// });
/// tree.insert("ccc");
/// tree.insert("a");
/// assert!(!tree.insert("b"));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec!["a", "ccc"]);
/// ```
impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::less(1, 2, Ordering::Less)]
    #[case::equal(2, 2, Ordering::Equal)]
    #[case::greater(3, 2, Ordering::Greater)]
    fn test_natural_order(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_natural_order_on_unsized_str() {
        assert_eq!(NaturalOrder.compare("a", "b"), Ordering::Less);
    }

    #[rstest]
    fn test_reverse_inverts() {
        assert_eq!(Reverse(NaturalOrder).compare(&1, &2), Ordering::Greater);
        assert_eq!(Reverse(NaturalOrder).compare(&2, &2), Ordering::Equal);
    }

    #[rstest]
    fn test_partial_order_rejects_nan() {
        assert!(PartialNaturalOrder.validate(&1.0_f64).is_ok());
        assert!(matches!(
            PartialNaturalOrder.validate(&f64::NAN),
            Err(TreeError::InvalidArgument {
                argument: "value",
                ..
            })
        ));
    }

    #[rstest]
    fn test_reverse_forwards_validation() {
        assert!(Reverse(PartialNaturalOrder).validate(&f64::NAN).is_err());
    }

    #[rstest]
    fn test_closure_comparator_by_length() {
        let comparator = |left: &&str, right: &&str| left.len().cmp(&right.len());
        assert_eq!(comparator.compare(&"ab", &"xy"), Ordering::Equal);
        assert_eq!(comparator.compare(&"a", &"xy"), Ordering::Less);
        assert!(comparator.validate(&"anything").is_ok());
    }
}
