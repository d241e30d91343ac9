use core::cmp::Ordering;
use core::fmt;

/// The ordering and key extraction operations an [`AvlTree`](crate::AvlTree) is built with.
///
/// Keeping these separate from the element type allows the same element type to be sorted
/// differently in different trees. Key based lookups and removals go through
/// [`TreeOps::compare_key`], so a bare key is enough to find an element, no full element has to be
/// materialized.
///
/// Implementations must be pure and consistent with each other: `compare` must be a total order
/// and `compare_key(a, extract_key(b))` must agree with `compare(a, b)`. The tree does not detect
/// violations, they corrupt the ordering of the tree (but never memory safety).
pub trait TreeOps<T: ?Sized> {
    /// The type by which elements are identified.
    type Key: ?Sized;

    /// Compares two elements.
    fn compare(&self, a: &T, b: &T) -> Ordering;

    /// Compares an element against a bare key.
    fn compare_key(&self, node: &T, key: &Self::Key) -> Ordering;

    /// Returns a reference to the element's key, or `None` if the element has no key.
    ///
    /// The returned key must stay stable for as long as the element is linked into a tree.
    fn extract_key<'a>(&self, node: &'a T) -> Option<&'a Self::Key>;
}

impl<T: ?Sized, O: TreeOps<T> + ?Sized> TreeOps<T> for &O {
    type Key = O::Key;

    fn compare(&self, a: &T, b: &T) -> Ordering {
        (**self).compare(a, b)
    }

    fn compare_key(&self, node: &T, key: &Self::Key) -> Ordering {
        (**self).compare_key(node, key)
    }

    fn extract_key<'a>(&self, node: &'a T) -> Option<&'a Self::Key> {
        (**self).extract_key(node)
    }
}

/// [`TreeOps`] made up of three plain functions.
///
/// # Example
///
/// ```
/// use core::cmp::Ordering;
/// use avltree::FnOps;
///
/// struct Data {
///     key: u32,
/// }
///
/// fn compare(a: &Data, b: &Data) -> Ordering {
///     a.key.cmp(&b.key)
/// }
/// fn compare_key(a: &Data, key: &u32) -> Ordering {
///     a.key.cmp(key)
/// }
/// fn extract_key(a: &Data) -> Option<&u32> {
///     Some(&a.key)
/// }
///
/// let ops = FnOps::new(compare, compare_key, extract_key);
/// ```
pub struct FnOps<T: ?Sized, K: ?Sized> {
    /// Compares two elements.
    pub compare: fn(&T, &T) -> Ordering,
    /// Compares an element against a bare key.
    pub compare_key: fn(&T, &K) -> Ordering,
    /// Returns a reference to the element's key.
    pub extract_key: fn(&T) -> Option<&K>,
}

impl<T: ?Sized, K: ?Sized> FnOps<T, K> {
    /// Creates a new set of operations from the given functions.
    pub const fn new(
        compare: fn(&T, &T) -> Ordering,
        compare_key: fn(&T, &K) -> Ordering,
        extract_key: fn(&T) -> Option<&K>,
    ) -> Self {
        Self {
            compare,
            compare_key,
            extract_key,
        }
    }
}

impl<T: ?Sized, K: ?Sized> Clone for FnOps<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, K: ?Sized> Copy for FnOps<T, K> {}

impl<T: ?Sized, K: ?Sized> fmt::Debug for FnOps<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOps").finish_non_exhaustive()
    }
}

impl<T: ?Sized, K: ?Sized> TreeOps<T> for FnOps<T, K> {
    type Key = K;

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    #[inline]
    fn compare_key(&self, node: &T, key: &K) -> Ordering {
        (self.compare_key)(node, key)
    }

    #[inline]
    fn extract_key<'a>(&self, node: &'a T) -> Option<&'a K> {
        (self.extract_key)(node)
    }
}

/// [`TreeOps`] that order elements by a key implementing [`Ord`].
///
/// Only the key accessor has to be provided, both comparisons are derived from the key's [`Ord`]
/// implementation. Elements without a key sort before all others.
pub struct ByKey<T: ?Sized, K: ?Sized> {
    key: fn(&T) -> Option<&K>,
}

impl<T: ?Sized, K: Ord + ?Sized> ByKey<T, K> {
    /// Creates a new set of operations ordering elements by the key returned from `key`.
    pub const fn new(key: fn(&T) -> Option<&K>) -> Self {
        Self { key }
    }
}

impl<T: ?Sized, K: ?Sized> Clone for ByKey<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized, K: ?Sized> Copy for ByKey<T, K> {}

impl<T: ?Sized, K: ?Sized> fmt::Debug for ByKey<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByKey").finish_non_exhaustive()
    }
}

impl<T: ?Sized, K: Ord + ?Sized> TreeOps<T> for ByKey<T, K> {
    type Key = K;

    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.key)(a).cmp(&(self.key)(b))
    }

    #[inline]
    fn compare_key(&self, node: &T, key: &K) -> Ordering {
        (self.key)(node).map_or(Ordering::Less, |k| k.cmp(key))
    }

    #[inline]
    fn extract_key<'a>(&self, node: &'a T) -> Option<&'a K> {
        (self.key)(node)
    }
}
