use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::node::{Child, Digit, Node};

// A 2-3 finger tree measured by element count. The two digits give cheap
// access to both ends; the spine is a tree one level deeper whose children
// are the 2-3 nodes squeezed out of overflowing digits. Every shape caches
// its measure at construction, so positional descent never recounts.
#[derive(Debug, Clone)]
pub(crate) enum Tree<T> {
    Empty,
    Single(Child<T>),
    Deep {
        /// Number of leaf elements under this tree.
        len: usize,
        left: Digit<T>,
        spine: Rc<Tree<T>>,
        right: Digit<T>,
    },
}

impl<T> Tree<T> {
    pub(crate) fn len(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Single(node) => node.len(),
            Tree::Deep { len, .. } => *len,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self, Tree::Empty)
    }

    pub(crate) fn first(&self) -> Option<&T> {
        match self {
            Tree::Empty => None,
            Tree::Single(node) => Some(node.leftmost()),
            Tree::Deep { left, .. } => {
                // unwrap: digits are never empty
                Some(left.children.first().expect("empty digit").leftmost())
            }
        }
    }

    pub(crate) fn last(&self) -> Option<&T> {
        match self {
            Tree::Empty => None,
            Tree::Single(node) => Some(node.rightmost()),
            Tree::Deep { right, .. } => {
                Some(right.children.last().expect("empty digit").rightmost())
            }
        }
    }

    pub(crate) fn get(&self, mut index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let mut tree = self;
        loop {
            match tree {
                Tree::Empty => unreachable!("bounds were checked against the cached length"),
                Tree::Single(node) => return Some(node.get(index)),
                Tree::Deep {
                    left, spine, right, ..
                } => {
                    if index < left.len() {
                        return Some(left.get(index));
                    }
                    index -= left.len();
                    if index < spine.len() {
                        tree = spine.as_ref();
                        continue;
                    }
                    index -= spine.len();
                    return Some(right.get(index));
                }
            }
        }
    }

    /// Walks the whole tree asserting the structural invariants and returns
    /// the leaf count. `depth` is the level of this tree's direct children.
    pub(crate) fn check(&self, depth: usize) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Single(node) => node.check(depth),
            Tree::Deep {
                len,
                left,
                spine,
                right,
            } => {
                let total = left.check(depth) + spine.check(depth + 1) + right.check(depth);
                assert_eq!(*len, total, "stale cached length on deep tree");
                total
            }
        }
    }
}

impl<T: Clone> Tree<T> {
    pub(crate) fn deep(left: Digit<T>, spine: Rc<Tree<T>>, right: Digit<T>) -> Tree<T> {
        Tree::Deep {
            len: left.len() + spine.len() + right.len(),
            left,
            spine,
            right,
        }
    }

    pub(crate) fn push_front(&mut self, node: Child<T>) {
        match self {
            Tree::Empty => *self = Tree::Single(node),
            Tree::Single(_) => {
                let Tree::Single(old) = std::mem::replace(self, Tree::Empty) else {
                    unreachable!();
                };
                *self = Tree::deep(Digit::unit(node), Rc::new(Tree::Empty), Digit::unit(old));
            }
            Tree::Deep {
                len, left, spine, ..
            } => {
                *len += node.len();
                if left.children.is_full() {
                    // [a, b, c, d] becomes [x, a]; b, c, d sink one level down
                    let d = left.children.pop_back();
                    let c = left.children.pop_back();
                    let b = left.children.pop_back();
                    Rc::make_mut(spine).push_front(Node::branch3(b, c, d));
                }
                left.children.push_front(node);
            }
        }
    }

    pub(crate) fn push_back(&mut self, node: Child<T>) {
        match self {
            Tree::Empty => *self = Tree::Single(node),
            Tree::Single(_) => {
                let Tree::Single(old) = std::mem::replace(self, Tree::Empty) else {
                    unreachable!();
                };
                *self = Tree::deep(Digit::unit(old), Rc::new(Tree::Empty), Digit::unit(node));
            }
            Tree::Deep {
                len, spine, right, ..
            } => {
                *len += node.len();
                if right.children.is_full() {
                    let a = right.children.pop_front();
                    let b = right.children.pop_front();
                    let c = right.children.pop_front();
                    Rc::make_mut(spine).push_back(Node::branch3(a, b, c));
                }
                right.children.push_back(node);
            }
        }
    }

    pub(crate) fn pop_front(&mut self) -> Option<Child<T>> {
        match std::mem::replace(self, Tree::Empty) {
            Tree::Empty => None,
            Tree::Single(node) => Some(node),
            Tree::Deep {
                mut left,
                spine,
                right,
                ..
            } => {
                let head = left.children.pop_front();
                *self = Tree::deep_left(left.children, spine, right);
                Some(head)
            }
        }
    }

    pub(crate) fn pop_back(&mut self) -> Option<Child<T>> {
        match std::mem::replace(self, Tree::Empty) {
            Tree::Empty => None,
            Tree::Single(node) => Some(node),
            Tree::Deep {
                left,
                spine,
                mut right,
                ..
            } => {
                let tail = right.children.pop_back();
                *self = Tree::deep_right(left, spine, right.children);
                Some(tail)
            }
        }
    }

    /// Rebuilds a deep tree whose left digit may have been emptied, borrowing
    /// a node from the spine to refill it or collapsing to a smaller shape.
    fn deep_left(left: Chunk<Child<T>, 4>, mut spine: Rc<Tree<T>>, right: Digit<T>) -> Tree<T> {
        if !left.is_empty() {
            return Tree::deep(Digit { children: left }, spine, right);
        }
        match Rc::make_mut(&mut spine).pop_front() {
            Some(node) => Tree::deep(node.to_digit(), spine, right),
            None => right.into_tree(),
        }
    }

    fn deep_right(left: Digit<T>, mut spine: Rc<Tree<T>>, right: Chunk<Child<T>, 4>) -> Tree<T> {
        if !right.is_empty() {
            return Tree::deep(left, spine, Digit { children: right });
        }
        match Rc::make_mut(&mut spine).pop_back() {
            Some(node) => Tree::deep(left, spine, node.to_digit()),
            None => left.into_tree(),
        }
    }

    /// Replaces the element at `index`, which callers have checked against
    /// the length. Only the path down to the leaf is copied.
    pub(crate) fn set(&mut self, mut index: usize, elt: T) {
        match self {
            Tree::Empty => unreachable!("bounds were checked against the cached length"),
            Tree::Single(node) => Rc::make_mut(node).set(index, elt),
            Tree::Deep {
                left, spine, right, ..
            } => {
                if index < left.len() {
                    return left.set(index, elt);
                }
                index -= left.len();
                if index < spine.len() {
                    return Rc::make_mut(spine).set(index, elt);
                }
                index -= spine.len();
                right.set(index, elt);
            }
        }
    }

    pub(crate) fn concat(self, other: Tree<T>) -> Tree<T> {
        app3(self, Chunk::new(), other)
    }

    /// Splits into the first `index` elements and the rest. `index` must be
    /// in `0..=len`.
    pub(crate) fn split(self, index: usize) -> (Tree<T>, Tree<T>) {
        debug_assert!(index <= self.len());
        if index == 0 {
            return (Tree::Empty, self);
        }
        if index == self.len() {
            return (self, Tree::Empty);
        }
        let (before, node, mut after) = self.split_around(index);
        after.push_front(node);
        (before, after)
    }

    /// Splits around the child containing `index`, which must be strictly
    /// inside the tree. Everything before the child goes left, everything
    /// after it goes right.
    fn split_around(self, index: usize) -> (Tree<T>, Child<T>, Tree<T>) {
        match self {
            Tree::Empty => unreachable!("split offset out of bounds"),
            Tree::Single(node) => (Tree::Empty, node, Tree::Empty),
            Tree::Deep {
                left, spine, right, ..
            } => {
                if index < left.len() {
                    let (before, node, after) = left.split(index);
                    return (
                        Tree::from_children(before),
                        node,
                        Tree::deep_left(after, spine, right),
                    );
                }
                let index = index - left.len();
                if index < spine.len() {
                    let (before_spine, mid, after_spine) =
                        Rc::unwrap_or_clone(spine).split_around(index);
                    let (before, node, after) = mid.to_digit().split(index - before_spine.len());
                    return (
                        Tree::deep_right(left, Rc::new(before_spine), before),
                        node,
                        Tree::deep_left(after, Rc::new(after_spine), right),
                    );
                }
                let index = index - spine.len();
                let (before, node, after) = right.split(index);
                (
                    Tree::deep_right(left, spine, before),
                    node,
                    Tree::from_children(after),
                )
            }
        }
    }

    fn from_children(children: Chunk<Child<T>, 4>) -> Tree<T> {
        if children.is_empty() {
            Tree::Empty
        } else {
            Digit { children }.into_tree()
        }
    }
}

/// Concatenates two trees of the same level with up to four carried nodes in
/// between. The carried nodes come from regrouping the touching digits of
/// the level above.
fn app3<T: Clone>(left: Tree<T>, mut mid: Chunk<Child<T>, 4>, right: Tree<T>) -> Tree<T> {
    match (left, right) {
        (Tree::Empty, mut tree) => {
            while !mid.is_empty() {
                tree.push_front(mid.pop_back());
            }
            tree
        }
        (mut tree, Tree::Empty) => {
            while !mid.is_empty() {
                tree.push_back(mid.pop_front());
            }
            tree
        }
        (Tree::Single(node), mut tree) => {
            while !mid.is_empty() {
                tree.push_front(mid.pop_back());
            }
            tree.push_front(node);
            tree
        }
        (mut tree, Tree::Single(node)) => {
            while !mid.is_empty() {
                tree.push_back(mid.pop_front());
            }
            tree.push_back(node);
            tree
        }
        (
            Tree::Deep {
                len: left_len,
                left: left_outer,
                spine: left_spine,
                right: left_inner,
            },
            Tree::Deep {
                len: right_len,
                left: right_inner,
                spine: right_spine,
                right: right_outer,
            },
        ) => {
            let len = left_len + mid.iter().map(|n| n.len()).sum::<usize>() + right_len;
            let carried = regroup(left_inner, mid, right_inner);
            let spine = Rc::new(app3(
                Rc::unwrap_or_clone(left_spine),
                carried,
                Rc::unwrap_or_clone(right_spine),
            ));
            Tree::Deep {
                len,
                left: left_outer,
                spine,
                right: right_outer,
            }
        }
    }
}

/// Packs the children of the two touching digits, plus any carried nodes,
/// into interior nodes of size 2 or 3. With 2 to 12 children to place and a
/// pair of 2-nodes covering the awkward remainders, no node of size 1 or 4
/// can come out, and at most four nodes are produced.
fn regroup<T: Clone>(
    left: Digit<T>,
    mid: Chunk<Child<T>, 4>,
    right: Digit<T>,
) -> Chunk<Child<T>, 4> {
    let mut all: Chunk<Child<T>, 12> = Chunk::new();
    all.extend(left.children);
    all.extend(mid);
    all.extend(right.children);

    let mut remaining = all.len();
    let mut iter = all.into_iter();
    // unwrap: `remaining` tracks exactly how many children are left
    let mut next = move || iter.next().expect("regroup ran out of children");

    let mut out = Chunk::new();
    while remaining > 0 {
        match remaining {
            2 => {
                out.push_back(Node::branch2(next(), next()));
                remaining = 0;
            }
            3 => {
                out.push_back(Node::branch3(next(), next(), next()));
                remaining = 0;
            }
            4 => {
                out.push_back(Node::branch2(next(), next()));
                out.push_back(Node::branch2(next(), next()));
                remaining = 0;
            }
            _ => {
                out.push_back(Node::branch3(next(), next(), next()));
                remaining -= 3;
            }
        }
    }
    out
}
