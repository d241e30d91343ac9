use core::fmt;

/// Errors reported by [`AvlTree`](crate::AvlTree) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The element has no key (its [`TreeOps::extract_key`](crate::TreeOps::extract_key) returned `None`).
    InvalidArgument,
    /// An element with an equal key is already part of the tree.
    AlreadyExists,
    /// No element with the requested key is part of the tree.
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "element has no key"),
            Error::AlreadyExists => write!(f, "an element with an equal key already exists"),
            Error::NotFound => write!(f, "no element with the given key"),
        }
    }
}

impl core::error::Error for Error {}

/// Error returned by [`AvlTree::insert`](crate::AvlTree::insert).
///
/// A rejected element is never linked into the tree, so ownership of its handle is returned to the
/// caller through this error.
pub struct InsertError<H> {
    error: Error,
    handle: H,
}

impl<H> InsertError<H> {
    pub(crate) fn new(error: Error, handle: H) -> Self {
        Self { error, handle }
    }

    /// The reason the element was rejected.
    pub fn error(&self) -> Error {
        self.error
    }

    /// Returns the handle of the rejected element.
    pub fn into_handle(self) -> H {
        self.handle
    }
}

impl<H> From<InsertError<H>> for Error {
    fn from(err: InsertError<H>) -> Self {
        err.error
    }
}

impl<H> fmt::Debug for InsertError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<H> fmt::Display for InsertError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to insert element: {}", self.error)
    }
}

impl<H> core::error::Error for InsertError<H> {}
