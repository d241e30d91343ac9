use crate::{Link, Linked};
use core::cmp;
use core::fmt;
use core::ptr::NonNull;

/// Upper bound on the height of any tree this crate can build.
///
/// An AVL tree of height `h` holds at least `fib(h + 2) - 1` nodes, so even a tree with
/// `usize::MAX` (64-bit) nodes stays below this height.
pub(crate) const MAX_HEIGHT: usize = 96;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Height of the subtree behind `link`, a missing node has height 0.
pub(crate) unsafe fn height<T: Linked + ?Sized>(link: Link<T>) -> u8 {
    match link {
        // Safety: ensured by caller
        Some(node) => unsafe { T::links(node).as_ref().height() },
        None => 0,
    }
}

/// Recomputes the cached height of `node` from the heights of its children.
pub(crate) unsafe fn update_height<T: Linked + ?Sized>(node: NonNull<T>) {
    // Safety: ensured by caller
    unsafe {
        let links = T::links(node).as_ref();
        links.set_height(1 + cmp::max(height(links.left()), height(links.right())));
    }
}

/// Difference between the left and right subtree heights of `link`, 0 for a missing node.
pub(crate) unsafe fn balance_factor<T: Linked + ?Sized>(link: Link<T>) -> i32 {
    let Some(node) = link else {
        return 0;
    };

    // Safety: ensured by caller
    unsafe {
        let links = T::links(node).as_ref();
        i32::from(height(links.left())) - i32::from(height(links.right()))
    }
}

/// Rotates the subtree rooted at `root` towards `side`, returning the new subtree root.
///
/// The child on the opposite side is promoted into `root`'s position, `root` becomes its
/// `side`-child and the promoted node's inner subtree is handed over to `root`. Heights are
/// recomputed bottom-up: first the demoted `root`, then the promoted node.
///
/// # Safety
///
/// `root` must be linked into a tree the caller holds mutably and must have a child on the
/// side opposite of `side`.
pub(crate) unsafe fn rotate<T: Linked + ?Sized>(root: NonNull<T>, side: Side) -> NonNull<T> {
    // Safety: ensured by caller
    unsafe {
        let root_links = T::links(root).as_ref();
        let pivot = root_links
            .child(side.opposite())
            .expect("rotation requires a child opposite of the rotation direction");
        let pivot_links = T::links(pivot).as_ref();

        tracing::trace!(%side, "rotating subtree");

        let inner = pivot_links.replace_child(side, Some(root));
        root_links.replace_child(side.opposite(), inner);

        update_height(root);
        update_height(pivot);

        pivot
    }
}

/// Restores the balance of the subtree rooted at `root` after a removal below it.
///
/// `root`'s height must be up to date. Since there is no newly inserted key to tell the
/// outer and inner cases apart, the heavy child's own balance factor decides: a child that
/// leans towards the heavy side (or not at all) gets a single rotation, one leaning the
/// other way a double rotation.
///
/// # Safety
///
/// `root` must be linked into a tree the caller holds mutably.
pub(crate) unsafe fn rebalance<T: Linked + ?Sized>(root: NonNull<T>) -> NonNull<T> {
    // Safety: ensured by caller
    unsafe {
        let root_links = T::links(root).as_ref();
        let balance = balance_factor(Some(root));

        if balance > 1 {
            if balance_factor(root_links.left()) < 0 {
                let left = root_links.left().expect("left-heavy node must have a left child");
                root_links.replace_left(Some(rotate(left, Side::Left)));
            }
            return rotate(root, Side::Right);
        }

        if balance < -1 {
            if balance_factor(root_links.right()) > 0 {
                let right = root_links.right().expect("right-heavy node must have a right child");
                root_links.replace_right(Some(rotate(right, Side::Right)));
            }
            return rotate(root, Side::Left);
        }

        root
    }
}

/// Unlinks the minimum of the subtree rooted at `root`, rebalancing on the way back up.
///
/// Returns the new root of the subtree and the unlinked node.
///
/// # Safety
///
/// `root` must be linked into a tree the caller holds mutably.
pub(crate) unsafe fn remove_minimum<T: Linked + ?Sized>(root: NonNull<T>) -> (Link<T>, NonNull<T>) {
    // Safety: ensured by caller
    unsafe {
        let root_links = T::links(root).as_ref();

        match root_links.left() {
            // splice the right subtree into our place
            None => (root_links.right(), root),
            Some(left) => {
                let (subtree, min) = remove_minimum(left);
                root_links.replace_left(subtree);
                update_height(root);
                (Some(rebalance(root)), min)
            }
        }
    }
}

pub(crate) unsafe fn find_minimum<T: Linked + ?Sized>(mut curr: NonNull<T>) -> NonNull<T> {
    // Safety: ensured by caller
    while let Some(left) = unsafe { T::links(curr).as_ref().left() } {
        curr = left;
    }

    curr
}

pub(crate) unsafe fn find_maximum<T: Linked + ?Sized>(mut curr: NonNull<T>) -> NonNull<T> {
    // Safety: ensured by caller
    while let Some(right) = unsafe { T::links(curr).as_ref().right() } {
        curr = right;
    }

    curr
}
