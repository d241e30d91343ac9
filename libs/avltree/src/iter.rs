use crate::utils::MAX_HEIGHT;
use crate::{AvlTree, Link, Linked, TreeOps};
use core::fmt;
use core::iter::FusedIterator;

/// An iterator over references to the entries of an [`AvlTree`], sorted by their key.
///
/// Nodes carry no parent links, so the iterator keeps the path to the next entry on a
/// fixed-size stack instead. It never allocates and never recurses.
pub struct Iter<'a, T, O>
where
    T: Linked + ?Sized,
{
    stack: [Link<T>; MAX_HEIGHT],
    depth: usize,
    remaining: usize,
    _tree: &'a AvlTree<T, O>,
}

impl<'a, T, O> Iter<'a, T, O>
where
    T: Linked + ?Sized,
    O: TreeOps<T>,
{
    pub(crate) fn new(tree: &'a AvlTree<T, O>) -> Self {
        let mut this = Self {
            stack: [None; MAX_HEIGHT],
            depth: 0,
            remaining: tree.size(),
            _tree: tree,
        };
        this.descend_left(tree.root);
        this
    }

    /// Pushes `link` and all of its left descendants onto the stack.
    fn descend_left(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            self.stack[self.depth] = Some(node);
            self.depth += 1;
            // Safety: `node` is linked into the tree we borrow
            link = unsafe { T::links(node).as_ref().left() };
        }
    }
}

impl<'a, T, O> Clone for Iter<'a, T, O>
where
    T: Linked + ?Sized,
{
    #[inline]
    fn clone(&self) -> Iter<'a, T, O> {
        Iter {
            stack: self.stack,
            depth: self.depth,
            remaining: self.remaining,
            _tree: self._tree,
        }
    }
}

impl<T, O> fmt::Debug for Iter<'_, T, O>
where
    T: Linked + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("depth", &self.depth)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl<'a, T, O> Iterator for Iter<'a, T, O>
where
    T: Linked + ?Sized + 'a,
    O: TreeOps<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.depth = self.depth.checked_sub(1)?;
        let node = self.stack[self.depth]?;

        // Safety: `node` is linked into the tree we borrow
        unsafe {
            self.descend_left(T::links(node).as_ref().right());
            self.remaining -= 1;
            Some(node.as_ref())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, O> ExactSizeIterator for Iter<'a, T, O>
where
    T: Linked + ?Sized + 'a,
    O: TreeOps<T>,
{
}

impl<'a, T, O> FusedIterator for Iter<'a, T, O>
where
    T: Linked + ?Sized + 'a,
    O: TreeOps<T>,
{
}

impl<'a, T, O> IntoIterator for &'a AvlTree<T, O>
where
    T: Linked + ?Sized + 'a,
    O: TreeOps<T>,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
