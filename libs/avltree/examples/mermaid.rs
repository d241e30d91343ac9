//! Builds a small tree out of stack allocated elements, removes two of them again and prints a
//! mermaid diagram of the tree after every step.
//!
//! Run with `cargo run -p avltree --example mermaid --features mermaid`, set `RUST_LOG=trace` to
//! see the rotations.

use std::cmp::Ordering;
use std::ptr::NonNull;

use avltree::{AvlTree, FnOps, Linked, Links};
use tracing_subscriber::EnvFilter;

struct Data {
    links: Links<Self>,
    key: i32,
}

impl Data {
    const fn new(key: i32) -> Self {
        Self {
            links: Links::new(),
            key,
        }
    }
}

// Safety: all elements live on the stack of `main`, outlive the tree and are never moved
unsafe impl Linked for Data {
    type Handle = NonNull<Self>;

    fn into_ptr(handle: Self::Handle) -> NonNull<Self> {
        handle
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        ptr
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<Self>> {
        // Safety: `ptr` points to a valid `Data`
        unsafe { NonNull::new_unchecked(&raw mut (*ptr.as_ptr()).links) }
    }
}

fn compare(a: &Data, b: &Data) -> Ordering {
    a.key.cmp(&b.key)
}

fn compare_key(a: &Data, key: &i32) -> Ordering {
    a.key.cmp(key)
}

fn extract_key(a: &Data) -> Option<&i32> {
    Some(&a.key)
}

fn print_mermaid(tree: &AvlTree<Data, FnOps<Data, i32>>) {
    println!("Mermaid diagram:");
    println!("```mermaid");
    print!("{}", tree.mermaid());
    println!("```");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let nodes = [
        50, 10, 47, 108, 13, 5, 1, 127, 354562934, 2345, 123, 111,
    ]
    .map(Data::new);

    let mut tree = AvlTree::new(FnOps::new(compare, compare_key, extract_key));

    for node in &nodes {
        if let Err(err) = tree.insert(NonNull::from(node)) {
            eprintln!("failed to insert {}: {err}", node.key);
        }
    }
    print_mermaid(&tree);

    for key in [354562934, 127] {
        if tree.remove(&key).is_none() {
            eprintln!("{key} was not part of the tree");
        }
        print_mermaid(&tree);
    }
}
