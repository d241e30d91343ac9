//! # An intrusive AVL Tree.
//!
//! A Rust implementation of AVL trees for embedded and other resource-constrained environments.
//!
//! AVL trees are *self-balancing binary search trees* that keep the heights of the two subtrees of
//! every node within one of each other. This bounds their height to ~1.44log2(n), making lookups
//! cheap and stack usage of the recursive algorithms predictable.
//! Additionally, this implementation is *intrusive* meaning node data (pointers to other nodes etc.)
//! are stored _within_ participating values, rather than being allocated and owned by the tree itself.
//!
//! This crate is self-contained, never allocates, and is fully `no_std`.
//!
//! ## when to use this
//!
//! - **want binary search** - AVL trees are *sorted* collections that are efficient to search.
//! - **want to avoid hidden allocations** - Because node data is stored _inside_ participating values,
//!   an element can be added without requiring additional heap allocations.
//! - **have no allocator at all** - When elements have fixed memory locations (such as `static`s or
//!   pools of buffers), they can be added without *any allocations at all*.
//! - **need custom orderings** - The ordering is supplied at construction through [`TreeOps`], not
//!   baked into the element type, so lookups only need a bare key.
//!
//! ## when not to use this
//!
//! - **need to store primitives** - Intrusive collections require elements to store the node data,
//!   which excludes primitives such as strings or numbers, since they can't hold this metadata.
//! - **need to share across threads** - The tree does no locking of its own, callers must serialize
//!   access to it.
//! - **can't use unsafe** - The [`Linked`] trait is unsafe to implement since it requires
//!   implementors uphold special invariants.
//!
//! ## example
//!
//! ```
//! use core::ptr::NonNull;
//! use core::pin::Pin;
//! use avltree::{AvlTree, ByKey, Linked, Links};
//!
//! struct Entry {
//!     links: Links<Self>,
//!     key: u32,
//! }
//!
//! unsafe impl Linked for Entry {
//!     type Handle = Pin<Box<Self>>;
//!
//!     fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
//!         unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
//!     }
//!
//!     unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
//!         unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
//!     }
//!
//!     unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
//!         unsafe { NonNull::new_unchecked(&raw mut (*ptr.as_ptr()).links) }
//!     }
//! }
//!
//! fn key(entry: &Entry) -> Option<&u32> {
//!     Some(&entry.key)
//! }
//!
//! let mut tree = AvlTree::new(ByKey::new(key));
//!
//! for key in [50, 10, 47] {
//!     tree.insert(Box::pin(Entry { links: Links::new(), key })).unwrap();
//! }
//!
//! assert_eq!(tree.get(&47).map(|e| e.key), Some(47));
//! assert_eq!(tree.remove(&10).map(|e| e.key), Some(10));
//! assert_eq!(tree.iter().map(|e| e.key).collect::<Vec<_>>(), [47, 50]);
//! ```
//!
//! ## features
//!
//! The following features are available:
//!
//! | Feature   | Default | Explanation                                                                       |
//! |:----------|:--------|:----------------------------------------------------------------------------------|
//! | `mermaid` | `false` | Enables the `AvlTree::mermaid` method, which renders the tree as a [mermaid] graph |
//!
//! [mermaid]: https://mermaid.js.org/syntax/flowchart.html

#![cfg_attr(not(test), no_std)]

mod error;
mod iter;
mod links;
#[cfg(feature = "mermaid")]
mod mermaid;
mod ops;
mod utils;

use crate::utils::Side;
use core::cmp::Ordering;
use core::pin::Pin;
use core::ptr::NonNull;

pub use error::{Error, InsertError};
pub use iter::Iter;
pub use links::Links;
#[cfg(feature = "mermaid")]
pub use mermaid::Mermaid;
pub use ops::{ByKey, FnOps, TreeOps};

/// Trait implemented by types which can be members of an [intrusive AVL tree][AvlTree].
///
/// In order to be part of an intrusive AVL tree, a type must contain a
/// `Links` type that stores the pointers to other nodes in the tree.
///
/// # Safety
///
/// This is unsafe to implement because it's the implementation's responsibility
/// to ensure that types implementing this trait are valid intrusive collection
/// nodes. In particular:
///
/// - Implementations **must** ensure that implementors are pinned in memory while they
///   are in an intrusive collection. While a given `Linked` type is in an intrusive
///   data structure, it may not be deallocated or moved to a different memory
///   location.
/// - The type implementing this trait **must not** implement [`Unpin`].
/// - Additional safety requirements for individual methods on this trait are
///   documented on those methods.
///
/// Failure to uphold these invariants will result in corruption of the
/// intrusive data structure, including dangling pointers.
///
/// # Implementing `Linked::links`
///
/// The [`Linked::links`] method provides access to a `Linked` type's `Links`
/// field through a [`NonNull`] pointer. It must not create a temporary reference to the
/// element in the process, as that reborrow is rejected by Stacked Borrows. Project
/// the field directly from the raw pointer instead:
///
/// ```
/// use core::ptr::NonNull;
/// # use avltree::Linked;
/// # struct Entry {
/// #    links: avltree::Links<Self>,
/// #    data: usize,
/// # }
///
/// unsafe impl Linked for Entry {
///     # type Handle = NonNull<Self>;
///     # fn into_ptr(r: Self::Handle) -> NonNull<Self> { r }
///     # unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle { ptr }
///     // ...
///
///     unsafe fn links(target: NonNull<Self>) -> NonNull<avltree::Links<Self>> {
///         // Using the `offset_of!` macro here to calculate the offset of the `links` field
///         // in our overall struct.
///         target
///             .map_addr(|addr| {
///                 let offset = core::mem::offset_of!(Self, links);
///                 addr.checked_add(offset).unwrap()
///             })
///             .cast()
///     }
/// }
/// ```
///
/// The links do not have to be the first field of the element.
pub unsafe trait Linked {
    /// The handle owning nodes in the tree.
    ///
    /// This type must have ownership over a `Self`-typed value. When a `Handle`
    /// is dropped, it should drop the corresponding `Linked` type.
    ///
    /// A quintessential example of a `Handle` is `Pin<Box<Self>>`, elements that live in static
    /// storage may use `NonNull<Self>` instead.
    type Handle;

    /// Convert a [`Self::Handle`] to a raw pointer to `Self`, taking ownership
    /// of it in the process.
    fn into_ptr(r: Self::Handle) -> NonNull<Self>;

    /// Convert a raw pointer to Self into an owning Self::Handle.
    ///
    /// # Safety
    ///
    /// This function is safe to call when:
    /// - It is valid to construct a Self::Handle from a raw pointer
    /// - The pointer points to a valid instance of Self (e.g. it does not dangle).
    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle;

    /// Return the links of the node pointed to by ptr.
    ///
    /// # Safety
    ///
    /// This function is safe to call when the pointer points to a valid instance of Self
    /// (e.g. it does not dangle).
    /// See the [the trait-level documentation](#implementing-linkedlinks) for details on how to
    /// correctly implement this method.
    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>>;
}

type Link<T> = Option<NonNull<T>>;

/// An intrusive AVL Tree.
///
/// This data structure supports efficient O(log n) lookup, insertion and removal of elements.
/// Elements are ordered by the [`TreeOps`] supplied when the tree is created, keys must be
/// unique under that ordering.
///
/// The tree takes ownership of an element's [`Linked::Handle`] on [`insert`](AvlTree::insert)
/// and gives it back on [`remove`](AvlTree::remove). Elements still in the tree when it is
/// dropped are dropped along with it.
pub struct AvlTree<T, O>
where
    T: Linked + ?Sized,
{
    pub(crate) root: Link<T>,
    size: usize,
    ops: O,
}

// Safety: the tree owns all linked elements through their handles, moving the tree to another
// thread moves those handles with it.
unsafe impl<T, O> Send for AvlTree<T, O>
where
    T: Linked + ?Sized,
    T::Handle: Send,
    O: Send,
{
}

// Safety: a shared tree only hands out shared references to its elements and never
// mutates links through `&self`.
unsafe impl<T, O> Sync for AvlTree<T, O>
where
    T: Linked + Sync + ?Sized,
    O: Sync,
{
}

impl<T, O> Drop for AvlTree<T, O>
where
    T: Linked + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, O> Default for AvlTree<T, O>
where
    T: Linked + ?Sized,
    O: Default,
{
    fn default() -> Self {
        Self::new(O::default())
    }
}

impl<T, O> AvlTree<T, O>
where
    T: Linked + ?Sized,
{
    /// Creates a new, empty tree ordered by `ops`.
    #[must_use]
    pub const fn new(ops: O) -> Self {
        Self {
            root: None,
            size: 0,
            ops,
        }
    }

    /// Returns the number of entries in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_none(), self.size() == 0);
        self.size() == 0
    }

    /// Returns the height of the tree, an empty tree has height 0.
    pub fn height(&self) -> u8 {
        // Safety: the root is linked into this tree
        unsafe { utils::height(self.root) }
    }

    /// Returns the operations this tree is ordered by.
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Removes all elements from the tree.
    ///
    /// This drops the handles of all entries, which requires visiting every node.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            self.clear_inner(root);
        }
        self.size = 0;
    }

    #[allow(
        clippy::only_used_in_recursion,
        reason = "need to ensure tree is borrowed for the entire time we operate on it"
    )]
    fn clear_inner(&mut self, node: NonNull<T>) {
        // Safety: `node` is linked into this tree, and we're reading the children before
        // giving ownership of the node back to its handle.
        unsafe {
            let node_links = T::links(node).as_ref();
            if let Some(left) = node_links.left() {
                self.clear_inner(left);
            }
            if let Some(right) = node_links.right() {
                self.clear_inner(right);
            }
            drop(T::from_ptr(node));
        }
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<&T> {
        // Safety: the root and all of its descendants are linked into this tree
        self.root
            .map(|root| unsafe { utils::find_minimum(root).as_ref() })
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<&T> {
        // Safety: the root and all of its descendants are linked into this tree
        self.root
            .map(|root| unsafe { utils::find_maximum(root).as_ref() })
    }

    /// Calls `visit` for every entry in the tree, in ascending key order.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&T),
    {
        Self::walk_inner(self.root, &mut visit);
    }

    fn walk_inner<F>(link: Link<T>, visit: &mut F)
    where
        F: FnMut(&T),
    {
        if let Some(node) = link {
            // Safety: `node` is linked into the tree borrowed by `walk`
            unsafe {
                let node_links = T::links(node).as_ref();
                Self::walk_inner(node_links.left(), visit);
                visit(node.as_ref());
                Self::walk_inner(node_links.right(), visit);
            }
        }
    }
}

impl<T, O> AvlTree<T, O>
where
    T: Linked + ?Sized,
    O: TreeOps<T>,
{
    /// Insert a new entry into the `AvlTree`.
    ///
    /// The entry's [`Links`] are reset once its place in the tree has been found, whatever they
    /// held before is discarded. A rejected entry's links are never written.
    ///
    /// Inserting an element that is already linked into *this* tree is rejected with
    /// [`Error::AlreadyExists`]. Inserting an element that is linked into a *different* tree is
    /// a contract violation and corrupts both trees.
    ///
    /// # Errors
    ///
    /// Returns an [`InsertError`] carrying the handle back to the caller if
    /// - the entry has no key ([`Error::InvalidArgument`]), or
    /// - an entry with an equal key is already part of the tree ([`Error::AlreadyExists`]).
    ///
    /// The tree is left unchanged in both cases.
    pub fn insert(&mut self, element: T::Handle) -> Result<(), InsertError<T::Handle>> {
        let ptr = T::into_ptr(element);

        // Safety: the handle owns a valid element
        if self.ops.extract_key(unsafe { ptr.as_ref() }).is_none() {
            tracing::trace!("rejecting element without key");
            // Safety: `ptr` was obtained from `into_ptr` above and was never linked
            return Err(InsertError::new(Error::InvalidArgument, unsafe {
                T::from_ptr(ptr)
            }));
        }

        // Safety: the handle owns a valid element and the tree is borrowed mutably for the rest of
        // the function. The element's links are only written once it is known not to be part of
        // the tree.
        unsafe {
            match self.insert_at(self.root, ptr) {
                Ok(root) => {
                    self.root = Some(root);
                    self.size += 1;
                    tracing::trace!(size = self.size, height = self.height(), "inserted element");
                    Ok(())
                }
                Err(err) => {
                    tracing::trace!("rejecting duplicate element");
                    Err(InsertError::new(err, T::from_ptr(ptr)))
                }
            }
        }
    }

    /// Removes an entry - identified by the given key - from the tree, returning the owned handle
    /// if the associated entry was part of the tree.
    ///
    /// The links of the returned entry are left as they were and may point into the tree.
    pub fn remove(&mut self, key: &O::Key) -> Option<T::Handle> {
        let root = self.root?;

        // Safety: the root is linked into this tree which is borrowed mutably
        let (root, removed) = unsafe { self.remove_at(root, key)? };
        self.root = root;
        self.size -= 1;
        tracing::trace!(size = self.size, height = self.height(), "removed element");

        // Safety: `removed` was unlinked and is owned by nobody else
        Some(unsafe { T::from_ptr(removed) })
    }

    /// Returns a reference to the entry with the given key.
    pub fn get(&self, key: &O::Key) -> Option<&T> {
        // Safety: the tree is borrowed for the lifetime of the returned reference
        unsafe { self.find_at(self.root, key).map(|ptr| ptr.as_ref()) }
    }

    /// Returns a pinned mutable reference to the entry with the given key.
    ///
    /// Callers must not change the parts of the entry that determine its key while it is part
    /// of the tree.
    pub fn get_mut(&mut self, key: &O::Key) -> Option<Pin<&mut T>> {
        // Safety: the tree is borrowed mutably for the lifetime of the returned reference and
        // elements never move while linked.
        unsafe {
            self.find_at(self.root, key)
                .map(|mut ptr| Pin::new_unchecked(ptr.as_mut()))
        }
    }

    /// Returns `true` if the tree contains an entry with the given key.
    pub fn contains(&self, key: &O::Key) -> bool {
        self.get(key).is_some()
    }

    /// Gets an iterator over the entries in the tree, sorted by their key.
    pub fn iter(&self) -> Iter<'_, T, O> {
        Iter::new(self)
    }

    /// Returns a [`Mermaid`] graph of the tree's shape for display.
    #[cfg(feature = "mermaid")]
    pub fn mermaid(&self) -> Mermaid<'_, T, O> {
        Mermaid { tree: self }
    }

    /// Asserts as many of the tree's invariants as possible.
    ///
    /// # Panics
    ///
    /// Panics if a cached height is wrong, a node is out of balance, the entries are not strictly
    /// ordered or the size does not match the number of linked entries.
    #[track_caller]
    pub fn assert_valid(&self) {
        // Safety: all nodes reachable from the root are linked into this tree
        let (height, count) = unsafe { self.assert_valid_inner(self.root) };
        assert_eq!(height, self.height());
        assert_eq!(
            count, self.size,
            "size mismatch: tree reports {} entries but {count} are linked",
            self.size
        );

        let mut prev: Option<&T> = None;
        for curr in self {
            if let Some(prev) = prev {
                assert_eq!(
                    self.ops.compare(prev, curr),
                    Ordering::Less,
                    "Ordering violation: entries are not strictly ascending"
                );
            }
            prev = Some(curr);
        }
    }

    /// Returns the computed height and number of nodes of the subtree rooted at `link`.
    #[track_caller]
    unsafe fn assert_valid_inner(&self, link: Link<T>) -> (u8, usize) {
        let Some(node) = link else {
            return (0, 0);
        };

        // Safety: ensured by caller
        unsafe {
            let node_links = T::links(node).as_ref();

            // assert that all links are set up correctly (no self references etc.)
            node_links.assert_valid();

            let (left_height, left_count) = self.assert_valid_inner(node_links.left());
            let (right_height, right_count) = self.assert_valid_inner(node_links.right());

            let height = 1 + left_height.max(right_height);
            assert_eq!(
                node_links.height(),
                height,
                "cached height is stale; node={node_links:#?}"
            );

            let balance = i32::from(left_height) - i32::from(right_height);
            assert!(
                (-1..=1).contains(&balance),
                "AVL balance violation: balance factor must be -1, 0 or 1, but was {balance}; node={node_links:#?}"
            );

            (height, left_count + right_count + 1)
        }
    }

    /// Inserts `node` into the subtree rooted at `root`, returning the new subtree root.
    ///
    /// Nothing is modified before the insertion point has been found, so an `Err` leaves the
    /// subtree (and `node`) as it was.
    unsafe fn insert_at(&self, root: Link<T>, node: NonNull<T>) -> Result<NonNull<T>, Error> {
        let Some(root) = root else {
            // Safety: ensured by caller, no equal element exists so `node` is not linked here
            unsafe { T::links(node).as_ref().reset() };
            return Ok(node);
        };

        // Safety: ensured by caller
        unsafe {
            let side = match self.ops.compare(node.as_ref(), root.as_ref()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Err(Error::AlreadyExists),
            };

            let root_links = T::links(root).as_ref();
            let child = self.insert_at(root_links.child(side), node)?;
            root_links.replace_child(side, Some(child));

            utils::update_height(root);
            Ok(self.balance_after_insert(root, node))
        }
    }

    /// Restores the balance of `root` after `inserted` was added to one of its subtrees.
    ///
    /// Where the new key landed relative to the heavy child tells the outer case (single
    /// rotation) from the inner case (double rotation).
    unsafe fn balance_after_insert(&self, root: NonNull<T>, inserted: NonNull<T>) -> NonNull<T> {
        // Safety: ensured by caller
        unsafe {
            let root_links = T::links(root).as_ref();
            let balance = utils::balance_factor(Some(root));

            if balance > 1 {
                let left = root_links.left().expect("left-heavy node must have a left child");
                if self.ops.compare(inserted.as_ref(), left.as_ref()) != Ordering::Less {
                    root_links.replace_left(Some(utils::rotate(left, Side::Left)));
                }
                return utils::rotate(root, Side::Right);
            }

            if balance < -1 {
                let right = root_links.right().expect("right-heavy node must have a right child");
                if self.ops.compare(inserted.as_ref(), right.as_ref()) != Ordering::Greater {
                    root_links.replace_right(Some(utils::rotate(right, Side::Right)));
                }
                return utils::rotate(root, Side::Left);
            }

            root
        }
    }

    /// Removes the entry matching `key` from the subtree rooted at `root`.
    ///
    /// Returns the new subtree root and the removed node, or `None` (leaving the subtree
    /// untouched) if no entry matches.
    unsafe fn remove_at(&self, root: NonNull<T>, key: &O::Key) -> Option<(Link<T>, NonNull<T>)> {
        // Safety: ensured by caller
        unsafe {
            let root_links = T::links(root).as_ref();

            let (root, removed) = match self.ops.compare_key(root.as_ref(), key) {
                Ordering::Greater => {
                    let (subtree, removed) = self.remove_at(root_links.left()?, key)?;
                    root_links.replace_left(subtree);
                    (root, removed)
                }
                Ordering::Less => {
                    let (subtree, removed) = self.remove_at(root_links.right()?, key)?;
                    root_links.replace_right(subtree);
                    (root, removed)
                }
                Ordering::Equal => match (root_links.left(), root_links.right()) {
                    (Some(left), Some(right)) => {
                        // Unlink the in-order successor from our right subtree and splice it
                        // into our place.
                        let (right, successor) = utils::remove_minimum(right);
                        let successor_links = T::links(successor).as_ref();
                        successor_links.replace_left(Some(left));
                        successor_links.replace_right(right);
                        (successor, root)
                    }
                    // At most one child, which simply takes our place.
                    (left, right) => return Some((left.or(right), root)),
                },
            };

            utils::update_height(root);
            Some((Some(utils::rebalance(root)), removed))
        }
    }

    unsafe fn find_at(&self, link: Link<T>, key: &O::Key) -> Link<T> {
        let node = link?;

        // Safety: ensured by caller
        unsafe {
            match self.ops.compare_key(node.as_ref(), key) {
                Ordering::Equal => Some(node),
                Ordering::Greater => self.find_at(T::links(node).as_ref().left(), key),
                Ordering::Less => self.find_at(T::links(node).as_ref().right(), key),
            }
        }
    }
}
