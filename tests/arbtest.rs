use arbitrary::Unstructured;
use arbtest::{arbitrary, arbtest};
use plait::Sequence;

#[derive(arbitrary::Arbitrary, Debug)]
enum Op {
    PushFront(u32),
    PushBack(u32),
    DropFront,
    DropBack,
    Set(usize, u32),
    Insert(usize, u32),
    Remove(usize),
    Append(Vec<u32>),
    SplitKeepLeft(usize),
    SplitKeepRight(usize),
    Reverse,
    // Save/Restore park the current version and come back to it later, so
    // the same version gets hit with operations repeatedly. Persistent
    // sharing has to survive that.
    Save,
    Restore(usize),
}

impl Op {
    fn apply_to_vec(&self, vec: &mut Vec<u32>, saved: &mut Vec<Vec<u32>>) {
        match self {
            Op::PushFront(x) => vec.insert(0, *x),
            Op::PushBack(x) => vec.push(*x),
            Op::DropFront => {
                if !vec.is_empty() {
                    vec.remove(0);
                }
            }
            Op::DropBack => {
                vec.pop();
            }
            Op::Set(i, x) => {
                if !vec.is_empty() {
                    let i = i % vec.len();
                    vec[i] = *x;
                }
            }
            Op::Insert(i, x) => {
                let i = i % (vec.len() + 1);
                vec.insert(i, *x);
            }
            Op::Remove(i) => {
                if !vec.is_empty() {
                    let i = i % vec.len();
                    vec.remove(i);
                }
            }
            Op::Append(xs) => vec.extend_from_slice(xs),
            Op::SplitKeepLeft(i) => {
                let i = i % (vec.len() + 1);
                vec.truncate(i);
            }
            Op::SplitKeepRight(i) => {
                let i = i % (vec.len() + 1);
                vec.drain(..i);
            }
            Op::Reverse => vec.reverse(),
            Op::Save => saved.push(vec.clone()),
            Op::Restore(k) => {
                if !saved.is_empty() {
                    *vec = saved[k % saved.len()].clone();
                }
            }
        }
    }

    fn apply_to_seq(&self, seq: &mut Sequence<u32>, saved: &mut Vec<Sequence<u32>>) {
        match self {
            Op::PushFront(x) => *seq = seq.push_front(*x),
            Op::PushBack(x) => *seq = seq.push_back(*x),
            Op::DropFront => {
                if let Ok(rest) = seq.drop_front() {
                    *seq = rest;
                }
            }
            Op::DropBack => {
                if let Ok(rest) = seq.drop_back() {
                    *seq = rest;
                }
            }
            Op::Set(i, x) => {
                if !seq.is_empty() {
                    let i = i % seq.len();
                    *seq = seq.set(i as isize, *x).unwrap();
                }
            }
            Op::Insert(i, x) => {
                let i = i % (seq.len() + 1);
                *seq = seq.insert(i as isize, *x).unwrap();
            }
            Op::Remove(i) => {
                if !seq.is_empty() {
                    let i = i % seq.len();
                    *seq = seq.remove(i as isize).unwrap();
                }
            }
            Op::Append(xs) => *seq = seq.append(xs.iter().copied()),
            Op::SplitKeepLeft(i) => {
                let i = i % (seq.len() + 1);
                *seq = seq.take(i).unwrap();
            }
            Op::SplitKeepRight(i) => {
                let i = i % (seq.len() + 1);
                *seq = seq.skip(i).unwrap();
            }
            Op::Reverse => *seq = seq.reverse(),
            Op::Save => saved.push(seq.clone()),
            Op::Restore(k) => {
                if !saved.is_empty() {
                    *seq = saved[k % saved.len()].clone();
                }
            }
        }
    }
}

// u.arbitrary() generates very short vecs by default:
// https://github.com/matklad/arbtest/issues/8
fn arb_vec(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<u32>> {
    let len = u.arbitrary_len::<u32>()?;
    std::iter::from_fn(|| Some(u.arbitrary::<u32>()))
        .take(len)
        .collect()
}

#[test]
fn mutations() {
    arbtest(|u| {
        let mut vec: Vec<u32> = arb_vec(u)?;
        let mut seq: Sequence<u32> = vec.iter().copied().collect();
        let mut saved_vecs = Vec::new();
        let mut saved_seqs = Vec::new();
        let ops: Vec<Op> = u.arbitrary()?;

        for op in ops {
            op.apply_to_vec(&mut vec, &mut saved_vecs);
            op.apply_to_seq(&mut seq, &mut saved_seqs);

            seq.check_invariants();

            assert_eq!(vec, seq.iter().copied().collect::<Vec<_>>());
        }

        Ok(())
    });
}

#[test]
fn split_then_concat_is_identity() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;
        let seq: Sequence<u32> = vec.iter().copied().collect();
        let at: usize = u.arbitrary()?;
        let at = at % (vec.len() + 1);

        let (a, b) = seq.split_at(at).unwrap();
        a.check_invariants();
        b.check_invariants();
        assert_eq!(a.len(), at);
        assert_eq!(b.len(), vec.len() - at);
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec[..at]);
        assert_eq!(b.iter().copied().collect::<Vec<_>>(), vec[at..]);

        let glued = a.concat(&b);
        glued.check_invariants();
        assert_eq!(glued, seq);

        Ok(())
    });
}

#[test]
fn indexing_matches_the_model() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;
        let seq: Sequence<u32> = vec.iter().copied().collect();
        let len = vec.len() as isize;

        for (i, expected) in vec.iter().enumerate() {
            assert_eq!(seq.get(i as isize), Ok(expected));
            // the same element, counted from the end
            assert_eq!(seq.get(i as isize - len), Ok(expected));
        }
        assert!(seq.get(len).is_err());
        assert!(seq.get(-len - 1).is_err());

        Ok(())
    });
}

#[test]
fn concat_matches_the_model() {
    arbtest(|u| {
        let left: Vec<u32> = arb_vec(u)?;
        let right: Vec<u32> = arb_vec(u)?;
        let seq = Sequence::from_iter(left.iter().copied())
            .concat(&right.iter().copied().collect());
        seq.check_invariants();

        let mut expected = left;
        expected.extend_from_slice(&right);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), expected);
        for (i, x) in expected.iter().enumerate() {
            assert_eq!(seq.get(i as isize), Ok(x));
        }

        Ok(())
    });
}

#[test]
fn iteration_agrees_in_both_directions() {
    arbtest(|u| {
        let vec: Vec<u32> = arb_vec(u)?;
        let seq: Sequence<u32> = vec.iter().copied().collect();

        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec);
        assert_eq!(seq.clone().into_iter().collect::<Vec<_>>(), vec);

        let mut reversed: Vec<u32> = seq.rev_iter().copied().collect();
        reversed.reverse();
        assert_eq!(reversed, vec);

        assert_eq!(seq.iter().len(), vec.len());

        Ok(())
    });
}
