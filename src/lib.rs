//! This crate provides a persistent sequence with cheap clones and
//! structural sharing between versions.
//!
//! [`Sequence`] is an immutable ordered list backed by a 2-3 finger tree
//! annotated with element counts. Compared to the persistent vectors in
//! [rpds](https://crates.io/crates/rpds) or [im](https://crates.io/crates/im),
//! the emphasis here is on the operations a bitmapped trie is bad at:
//! - pushing and popping at *both* ends in amortized constant time,
//! - splitting at any index in `O(log n)`,
//! - concatenating two sequences in `O(log min(n, m))`, sharing the
//!   untouched subtrees of both inputs,
//! - inserting or removing at any position in `O(log n)` on top of those.
//!
//! Indexing descends the cached counts, so `get`/`set` are `O(log n)` rather
//! than effectively constant; if all you do is index and append, a trie is
//! the better structure.
//!
//! All operations return a new sequence and leave the input alone; old
//! versions stay valid and share structure with the new ones. Sharing is
//! reference-counted with [`std::rc::Rc`], so a sequence is single-threaded;
//! send a copy of the elements across threads instead.

// Not yet implemented (do we need them?)
// - chunked leaves to cut pointer chasing on iteration
// - mutable indexing

mod node;
mod tree;

pub mod sequence;

/// An error from an operation on a [`Sequence`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An end-access operation was invoked on a sequence with no elements.
    #[error("operation on an empty sequence")]
    Empty,

    /// An index was outside the operation's documented range, after negative
    /// indices were normalized against the length.
    #[error("index {index} out of range for a sequence of length {len}")]
    OutOfRange { index: isize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub use sequence::{IntoIter, Iter, RevIter, Sequence};
