use std::fmt;
use std::hint::black_box;
use std::mem::offset_of;
use std::pin::Pin;
use std::ptr::NonNull;

use avltree::{AvlTree, ByKey, Linked, Links};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::seq::SliceRandom;

#[derive(Default)]
struct AvlEntry {
    value: usize,
    links: Links<Self>,
}
impl AvlEntry {
    pub fn new(value: usize) -> Self {
        let mut this = Self::default();
        this.value = value;
        this
    }
}
impl fmt::Debug for AvlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlEntry")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
unsafe impl Linked for AvlEntry {
    type Handle = Pin<Box<Self>>;
    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        unsafe { NonNull::from(Box::leak(Pin::into_inner_unchecked(handle))) }
    }
    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        // Safety: `NonNull` *must* be constructed from a pinned reference
        // which the tree implementation upholds.
        unsafe { Pin::new_unchecked(Box::from_raw(ptr.as_ptr())) }
    }
    unsafe fn links(target: NonNull<Self>) -> NonNull<Links<AvlEntry>> {
        target
            .map_addr(|addr| {
                let offset = offset_of!(Self, links);
                addr.checked_add(offset).unwrap()
            })
            .cast()
    }
}

type Tree = AvlTree<AvlEntry, ByKey<AvlEntry, usize>>;

fn value(entry: &AvlEntry) -> Option<&usize> {
    Some(&entry.value)
}

fn new_tree() -> Tree {
    AvlTree::new(ByKey::new(value))
}

fn inserts_removals(inserts: &[usize], removals: &[usize]) {
    let mut tree = new_tree();

    for i in inserts {
        tree.insert(Box::pin(AvlEntry::new(*i))).unwrap();
    }

    for i in removals {
        black_box(tree.remove(i));
    }
}

fn bench_inserts_removals(c: &mut Criterion) {
    let mut rng = rand::rng();

    let mut nums = (0..700).collect::<Vec<_>>();
    nums.shuffle(&mut rng);
    let inserts = nums.clone();
    nums.shuffle(&mut rng);
    let removals = nums;

    c.bench_function("Insertions & Removals", |b| {
        b.iter(|| inserts_removals(&inserts, &removals))
    });
}

fn bench_searches(c: &mut Criterion) {
    let mut rng = rand::rng();

    let mut nums = (0..10_000).collect::<Vec<_>>();
    nums.shuffle(&mut rng);

    let mut tree = new_tree();
    for i in &nums {
        tree.insert(Box::pin(AvlEntry::new(*i))).unwrap();
    }

    nums.shuffle(&mut rng);

    c.bench_function("Searches", |b| {
        b.iter(|| {
            for i in &nums {
                black_box(tree.get(i));
            }
        })
    });
}

criterion_group!(benches, bench_inserts_removals, bench_searches);
criterion_main!(benches);
