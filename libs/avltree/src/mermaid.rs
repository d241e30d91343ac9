use crate::utils::Side;
use crate::{AvlTree, Linked, TreeOps};
use core::fmt;
use core::ptr::NonNull;

/// Renders the shape of an [`AvlTree`] as a [mermaid] flowchart.
///
/// Every node is labelled with its key and the height of its subtree, missing children are drawn
/// as `null` leaves. Node identifiers are derived from the keys, so the same tree always renders
/// the same diagram. Keys must therefore display as valid mermaid identifiers.
///
/// ```text
/// graph TB;
///     ROOT[ROOT]-->N47
///     N10((key: 10<br/>height: 1))
///         N10-->EL10((null))
///         N10-->ER10((null))
///     N47((key: 47<br/>height: 2))
///         N47-->N10
///         N47-->ER47((null))
/// ```
///
/// [mermaid]: https://mermaid.js.org/syntax/flowchart.html
pub struct Mermaid<'a, T, O>
where
    T: Linked + ?Sized,
{
    pub(crate) tree: &'a AvlTree<T, O>,
}

impl<T, O> Mermaid<'_, T, O>
where
    T: Linked + ?Sized,
    O: TreeOps<T>,
    O::Key: fmt::Display,
{
    /// Every linked element has a key, `insert` rejects those without.
    fn key(&self, node: NonNull<T>) -> Result<&O::Key, fmt::Error> {
        // Safety: `node` is linked into the tree we borrow
        self.tree
            .ops()
            .extract_key(unsafe { node.as_ref() })
            .ok_or(fmt::Error)
    }

    fn node_fmt(&self, f: &mut fmt::Formatter, node: NonNull<T>) -> fmt::Result {
        // Safety: `node` is linked into the tree we borrow
        let node_links = unsafe { T::links(node).as_ref() };
        let id = self.key(node)?;

        // nodes are emitted in order, so start with the left subtree
        if let Some(left) = node_links.left() {
            self.node_fmt(f, left)?;
        }

        writeln!(f, "\tN{id}((key: {id}<br/>height: {}))", node_links.height())?;

        for side in [Side::Left, Side::Right] {
            match node_links.child(side) {
                Some(child) => writeln!(f, "\t\tN{id}-->N{}", self.key(child)?)?,
                None => {
                    let leaf = match side {
                        Side::Left => "EL",
                        Side::Right => "ER",
                    };
                    writeln!(f, "\t\tN{id}-->{leaf}{id}((null))")?;
                }
            }
        }

        if let Some(right) = node_links.right() {
            self.node_fmt(f, right)?;
        }

        Ok(())
    }
}

impl<T, O> fmt::Display for Mermaid<'_, T, O>
where
    T: Linked + ?Sized,
    O: TreeOps<T>,
    O::Key: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "graph TB;")?;

        if let Some(root) = self.tree.root {
            writeln!(f, "\tROOT[ROOT]-->N{}", self.key(root)?)?;
            self.node_fmt(f, root)?;
        }

        Ok(())
    }
}

impl<T, O> fmt::Debug for Mermaid<'_, T, O>
where
    T: Linked + ?Sized,
    O: TreeOps<T>,
    O::Key: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
