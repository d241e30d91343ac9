#![no_main]

use std::collections::BTreeSet;
use std::pin::Pin;
use std::ptr::NonNull;

use arbitrary::Arbitrary;
use avltree::{AvlTree, ByKey, Error, Linked, Links};
use libfuzzer_sys::fuzz_target;

struct TestEntry {
    value: u16,
    links: Links<Self>,
}
impl TestEntry {
    pub fn new(value: u16) -> Self {
        Self {
            value,
            links: Links::new(),
        }
    }
}
unsafe impl Linked for TestEntry {
    type Handle = Pin<Box<Self>>;
    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }
    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: `NonNull` *must* be constructed from a pinned reference
        // which the tree implementation upholds.
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }
    unsafe fn links(target: NonNull<Self>) -> NonNull<Links<TestEntry>> {
        unsafe { NonNull::new_unchecked(&raw mut (*target.as_ptr()).links) }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(u16),
    Remove(u16),
    Get(u16),
}

fn value(entry: &TestEntry) -> Option<&u16> {
    Some(&entry.value)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut tree = AvlTree::new(ByKey::new(value));
    let mut model = BTreeSet::new();

    for op in ops {
        match op {
            Op::Insert(i) => {
                let res = tree.insert(Box::pin(TestEntry::new(i)));
                if model.insert(i) {
                    assert!(res.is_ok());
                } else {
                    assert_eq!(res.unwrap_err().error(), Error::AlreadyExists);
                }
            }
            Op::Remove(i) => {
                let removed = tree.remove(&i).map(|e| e.value);
                assert_eq!(removed, model.take(&i));
            }
            Op::Get(i) => {
                assert_eq!(tree.get(&i).map(|e| e.value), model.get(&i).copied());
            }
        }
        tree.assert_valid();
        assert_eq!(tree.size(), model.len());
    }

    assert!(tree.iter().map(|e| e.value).eq(model.iter().copied()));
});
