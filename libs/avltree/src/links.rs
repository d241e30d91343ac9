use crate::utils::Side;
use crate::{Link, Linked};
use core::cell::UnsafeCell;
use core::marker::PhantomPinned;
use core::ptr::NonNull;
use core::{fmt, mem};

/// Links to other nodes in an [`AvlTree`](crate::AvlTree).
///
/// In order to be part of an [`AvlTree`](crate::AvlTree), a type must contain an instance of this
/// type, and must implement the [`Linked`] trait. The links may live at any offset inside the
/// element, [`Linked::links`] is responsible for locating them.
///
/// Links are only ever written by the tree. When an element is removed its links are **not**
/// cleared, they may still point into the tree and must not be interpreted by the caller.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

struct LinksInner<T: ?Sized> {
    left: Link<T>,
    right: Link<T>,
    /// Height of the subtree rooted at this node, a linked node always has height >= 1.
    height: u8,
    /// Links must always be `!Unpin`, in order to ensure that they
    /// never receive LLVM `noalias` annotations; see also
    /// <https://github.com/rust-lang/rust/issues/63818>.
    _unpin: PhantomPinned,
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("self", &format_args!("{self:p}"))
            .field("left", &self.left())
            .field("right", &self.right())
            .field("height", &self.height())
            .finish()
    }
}

impl<T: ?Sized> Links<T> {
    /// Returns new, unlinked links for an [`AvlTree`](crate::AvlTree).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                left: None,
                right: None,
                height: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// The cached height of the subtree rooted at this node.
    ///
    /// This is only meaningful while the node is linked into a tree.
    pub fn height(&self) -> u8 {
        // Safety: the tree only mutates links while it holds `&mut self`, so no write can race
        // with this read.
        unsafe { (*self.inner.get()).height }
    }

    #[inline]
    pub(crate) fn left(&self) -> Link<T> {
        // Safety: see `height`
        unsafe { (*self.inner.get()).left }
    }

    #[inline]
    pub(crate) fn right(&self) -> Link<T> {
        // Safety: see `height`
        unsafe { (*self.inner.get()).right }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link<T> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    #[inline]
    pub(crate) fn replace_left(&self, lk: Link<T>) -> Link<T> {
        // Safety: callers hold the tree mutably, no other reference to the inner value exists
        unsafe { mem::replace(&mut (*self.inner.get()).left, lk) }
    }

    #[inline]
    pub(crate) fn replace_right(&self, lk: Link<T>) -> Link<T> {
        // Safety: see `replace_left`
        unsafe { mem::replace(&mut (*self.inner.get()).right, lk) }
    }

    #[inline]
    pub(crate) fn replace_child(&self, side: Side, child: Link<T>) -> Link<T> {
        match side {
            Side::Left => self.replace_left(child),
            Side::Right => self.replace_right(child),
        }
    }

    #[inline]
    pub(crate) fn set_height(&self, height: u8) {
        // Safety: see `replace_left`
        unsafe {
            (*self.inner.get()).height = height;
        }
    }

    /// Turns these links into those of a fresh leaf: no children, height 1.
    pub(crate) fn reset(&self) {
        self.replace_left(None);
        self.replace_right(None);
        self.set_height(1);
    }

    /// Asserts as many invariants about this particular node as possible.
    #[track_caller]
    pub fn assert_valid(&self)
    where
        T: Linked,
    {
        assert!(self.height() >= 1, "linked node must have a height of at least 1; node={self:#?}");

        if let Some(left) = self.left() {
            assert_ne!(
                // Safety: `left` is linked into the same tree as `self` and therefore valid
                unsafe { T::links(left) },
                NonNull::from(self),
                "node's left child cannot be itself; node={self:#?}"
            );
        }

        if let Some(right) = self.right() {
            assert_ne!(
                // Safety: see above
                unsafe { T::links(right) },
                NonNull::from(self),
                "node's right child cannot be itself; node={self:#?}"
            );
        }

        if let (Some(left), Some(right)) = (self.left(), self.right()) {
            assert_ne!(
                // Safety: see above
                unsafe { T::links(left) },
                // Safety: see above
                unsafe { T::links(right) },
                "node's left and right children cannot be the same; node={self:#?}"
            );
        }
    }
}
