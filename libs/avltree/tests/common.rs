#![allow(unused, reason = "not used by all tests")]

use core::cmp::Ordering;
use std::cell::Cell;
use std::pin::Pin;
use std::ptr::NonNull;
use std::rc::Rc;

use avltree::{AvlTree, ByKey, FnOps, Linked, Links};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A heap allocated entry, owned by the tree through a pinned box while linked.
pub struct Entry {
    pub key: Option<u64>,
    pub payload: &'static str,
    links: Links<Self>,
    drops: Option<Rc<Cell<usize>>>,
}

impl Entry {
    pub fn new(key: u64) -> Pin<Box<Self>> {
        Box::pin(Self {
            key: Some(key),
            payload: "",
            links: Links::new(),
            drops: None,
        })
    }

    pub fn keyless() -> Pin<Box<Self>> {
        Box::pin(Self {
            key: None,
            payload: "",
            links: Links::new(),
            drops: None,
        })
    }

    pub fn with_payload(key: u64, payload: &'static str) -> Pin<Box<Self>> {
        Box::pin(Self {
            key: Some(key),
            payload,
            links: Links::new(),
            drops: None,
        })
    }

    /// An entry that bumps `drops` when it is dropped.
    pub fn counted(key: u64, drops: &Rc<Cell<usize>>) -> Pin<Box<Self>> {
        Box::pin(Self {
            key: Some(key),
            payload: "",
            links: Links::new(),
            drops: Some(drops.clone()),
        })
    }

    pub fn links(&self) -> &Links<Self> {
        &self.links
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.set(drops.get() + 1);
        }
    }
}

// Safety: entries are pinned boxes and never move while linked
unsafe impl Linked for Entry {
    type Handle = Pin<Box<Self>>;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        // Safety: the pointer is turned back into a pinned box by `from_ptr`
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: `NonNull` *must* be constructed from a pinned reference
        // which the tree implementation upholds.
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
        // Safety: `ptr` points to a valid entry
        unsafe { NonNull::new_unchecked(&raw mut (*ptr.as_ptr()).links) }
    }
}

fn entry_key(entry: &Entry) -> Option<&u64> {
    entry.key.as_ref()
}

pub type EntryTree = AvlTree<Entry, ByKey<Entry, u64>>;

pub fn entry_tree() -> EntryTree {
    AvlTree::new(ByKey::new(entry_key))
}

pub fn keys(tree: &EntryTree) -> Vec<u64> {
    let mut out = Vec::with_capacity(tree.size());
    tree.walk(|entry| out.push(entry.key.unwrap()));
    out
}

/// A caller-allocated element, the tree never owns its memory.
///
/// The links are deliberately not the first field.
pub struct Data {
    pub key: i32,
    links: Links<Self>,
}

impl Data {
    pub const fn new(key: i32) -> Self {
        Self {
            key,
            links: Links::new(),
        }
    }

    pub fn links(&self) -> &Links<Self> {
        &self.links
    }
}

// Safety: `Data` elements are only inserted while they outlive the tree and are not moved
unsafe impl Linked for Data {
    type Handle = NonNull<Self>;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        handle
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        ptr
    }

    unsafe fn links(target: NonNull<Self>) -> NonNull<Links<Self>> {
        target
            .map_addr(|addr| {
                let offset = core::mem::offset_of!(Self, links);
                addr.checked_add(offset).unwrap()
            })
            .cast()
    }
}

fn compare_data(a: &Data, b: &Data) -> Ordering {
    a.key.cmp(&b.key)
}

fn compare_data_key(a: &Data, key: &i32) -> Ordering {
    a.key.cmp(key)
}

fn data_key(a: &Data) -> Option<&i32> {
    Some(&a.key)
}

pub type DataTree = AvlTree<Data, FnOps<Data, i32>>;

pub fn data_tree() -> DataTree {
    AvlTree::new(FnOps::new(compare_data, compare_data_key, data_key))
}

pub fn data_keys(tree: &DataTree) -> Vec<i32> {
    tree.iter().map(|data| data.key).collect()
}

pub const SCENARIO: [i32; 12] = [
    50, 10, 47, 108, 13, 5, 1, 127, 354562934, 2345, 123, 111,
];
