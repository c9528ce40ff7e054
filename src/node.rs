use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::tree::Tree;

/// A shared child at some level of the tree.
pub(crate) type Child<T> = Rc<Node<T>>;

// The level of a node is erased: a child is either a leaf element or an
// interior 2-3 node, and a well-formed tree keeps every leaf at the same
// depth. `check` validates the depth invariant; nothing else relies on
// carrying it in the types.
#[derive(Debug, Clone)]
pub(crate) enum Node<T> {
    Leaf(T),
    Branch {
        /// Number of leaf elements under this node.
        len: usize,
        // Always 2 or 3 children.
        children: Chunk<Child<T>, 3>,
    },
}

impl<T> Node<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch { len, .. } => *len,
        }
    }

    /// The element at `index`, counting leaves from the left.
    ///
    /// Panics if `index` is out of bounds; callers check against `len`.
    pub(crate) fn get(&self, mut index: usize) -> &T {
        match self {
            Node::Leaf(elt) => {
                debug_assert_eq!(index, 0);
                elt
            }
            Node::Branch { children, .. } => {
                for child in children.iter() {
                    if index < child.len() {
                        return child.get(index);
                    }
                    index -= child.len();
                }
                unreachable!("index out of bounds in node")
            }
        }
    }

    pub(crate) fn leftmost(&self) -> &T {
        match self {
            Node::Leaf(elt) => elt,
            Node::Branch { children, .. } => {
                // unwrap: interior nodes always have at least two children
                children.first().expect("empty node").leftmost()
            }
        }
    }

    pub(crate) fn rightmost(&self) -> &T {
        match self {
            Node::Leaf(elt) => elt,
            Node::Branch { children, .. } => {
                children.last().expect("empty node").rightmost()
            }
        }
    }

    /// Walks this subtree asserting the structural invariants, returning the
    /// number of leaves found. `depth` is the expected distance to the
    /// leaves.
    pub(crate) fn check(&self, depth: usize) -> usize {
        match self {
            Node::Leaf(_) => {
                assert_eq!(depth, 0, "leaf at the wrong depth");
                1
            }
            Node::Branch { len, children } => {
                assert!(depth > 0, "interior node at leaf depth");
                assert!(
                    (2..=3).contains(&children.len()),
                    "interior node with {} children",
                    children.len()
                );
                let total: usize = children.iter().map(|c| c.check(depth - 1)).sum();
                assert_eq!(*len, total, "stale cached length on interior node");
                total
            }
        }
    }
}

impl<T: Clone> Node<T> {
    pub(crate) fn leaf(elt: T) -> Child<T> {
        Rc::new(Node::Leaf(elt))
    }

    pub(crate) fn branch2(a: Child<T>, b: Child<T>) -> Child<T> {
        let len = a.len() + b.len();
        Rc::new(Node::Branch {
            len,
            children: Chunk::pair(a, b),
        })
    }

    pub(crate) fn branch3(a: Child<T>, b: Child<T>, c: Child<T>) -> Child<T> {
        let len = a.len() + b.len() + c.len();
        let mut children = Chunk::pair(a, b);
        children.push_back(c);
        Rc::new(Node::Branch { len, children })
    }

    /// Unpacks an interior node into a digit holding the same children.
    /// Used when an emptied digit is refilled from the spine and when a
    /// split lands inside a node.
    pub(crate) fn to_digit(&self) -> Digit<T> {
        match self {
            Node::Leaf(_) => unreachable!("leaf unpacked as a digit"),
            Node::Branch { children, .. } => Digit {
                children: children.iter().cloned().collect(),
            },
        }
    }

    /// Replaces the element at `index` in place, copying only the path from
    /// here to the leaf (shared children are cloned by `Rc::make_mut`).
    pub(crate) fn set(&mut self, mut index: usize, elt: T) {
        match self {
            Node::Leaf(old) => {
                debug_assert_eq!(index, 0);
                *old = elt;
            }
            Node::Branch { children, .. } => {
                for child in children.iter_mut() {
                    if index < child.len() {
                        return Rc::make_mut(child).set(index, elt);
                    }
                    index -= child.len();
                }
                unreachable!("index out of bounds in node")
            }
        }
    }
}

/// The 1-to-4 element buffer at each end of a `Deep` tree. The measure is
/// not cached; summing at most four cached child lengths is as cheap as
/// maintaining a cache would be.
#[derive(Debug, Clone)]
pub(crate) struct Digit<T> {
    pub(crate) children: Chunk<Child<T>, 4>,
}

impl<T> Digit<T> {
    pub(crate) fn len(&self) -> usize {
        self.children.iter().map(|c| c.len()).sum()
    }

    pub(crate) fn get(&self, mut index: usize) -> &T {
        for child in self.children.iter() {
            if index < child.len() {
                return child.get(index);
            }
            index -= child.len();
        }
        unreachable!("index out of bounds in digit")
    }

    pub(crate) fn check(&self, depth: usize) -> usize {
        assert!(
            (1..=4).contains(&self.children.len()),
            "digit with {} children",
            self.children.len()
        );
        self.children.iter().map(|c| c.check(depth)).sum()
    }
}

impl<T: Clone> Digit<T> {
    pub(crate) fn unit(child: Child<T>) -> Self {
        Digit {
            children: Chunk::unit(child),
        }
    }

    pub(crate) fn set(&mut self, mut index: usize, elt: T) {
        for child in self.children.iter_mut() {
            if index < child.len() {
                return Rc::make_mut(child).set(index, elt);
            }
            index -= child.len();
        }
        unreachable!("index out of bounds in digit")
    }

    /// Splits around the child containing offset `index`, which must be less
    /// than this digit's measure. Either side may come back empty.
    pub(crate) fn split(&self, mut index: usize) -> (Chunk<Child<T>, 4>, Child<T>, Chunk<Child<T>, 4>) {
        let mut before = Chunk::new();
        let mut iter = self.children.iter();
        loop {
            // unwrap: the offset is within the digit's measure
            let child = iter.next().expect("split offset out of bounds in digit");
            if index < child.len() {
                let after = iter.cloned().collect();
                return (before, child.clone(), after);
            }
            index -= child.len();
            before.push_back(child.clone());
        }
    }

    /// Promotes this digit to a tree of the same level.
    pub(crate) fn into_tree(self) -> Tree<T> {
        let mut children = self.children;
        if children.len() == 1 {
            Tree::Single(children.pop_front())
        } else {
            let half = children.len() / 2;
            let mut after = children.clone();
            after.drop_left(half);
            children.drop_right(half);
            Tree::deep(
                Digit { children },
                Rc::new(Tree::Empty),
                Digit { children: after },
            )
        }
    }
}
