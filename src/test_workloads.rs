use std::{
    collections::BTreeSet,
    hash::{Hash, Hasher},
    iter::once,
};

use rand::Rng;
use rustc_hash::FxHasher;

use crate::Registry;

#[derive(Debug)]
pub(crate) enum Operation {
    Insert(Vec<u64>),
    Remove(Vec<u64>),
    Clear,
    Dump,
}

pub(crate) fn fx_hash(seq: &[u64]) -> u64 {
    let mut hasher = FxHasher::default();
    seq.hash(&mut hasher);
    hasher.finish()
}

pub(crate) fn first_element_hash(seq: &[u64]) -> u64 {
    seq[0]
}

pub(crate) fn constant_hash(_: &[u64]) -> u64 {
    0
}

/// Replays `ops` against two tables of one registry and a `BTreeSet` oracle.
/// The first table uses `hash`, the second the well-distributed `fx_hash`, so
/// a broken collision path shows up as disagreement.
pub(crate) fn test_registry(
    hash: impl Fn(&[u64]) -> u64 + Send + 'static,
    ops: impl IntoIterator<Item = Operation>,
) {
    let mut oracle = BTreeSet::<Vec<u64>>::new();
    let mut removed = BTreeSet::<Vec<u64>>::new();
    let mut registry = Registry::new();
    let t1 = registry.create(hash);
    let t2 = registry.create(fx_hash);
    for op in ops {
        match op {
            Operation::Insert(seq) => {
                assert_eq!(oracle.contains(&seq), registry.test(t1, &seq));
                assert_eq!(oracle.contains(&seq), registry.test(t2, &seq));
                let expected = oracle.insert(seq.clone());
                assert_eq!(expected, registry.insert(t1, &seq));
                assert_eq!(expected, registry.insert(t2, &seq));
                removed.remove(&seq);
                assert!(registry.test(t1, &seq));
                assert_eq!(oracle.len(), registry.size(t1));
                assert_eq!(registry.size(t1), registry.size(t2));
            }
            Operation::Remove(seq) => {
                assert_eq!(oracle.contains(&seq), registry.test(t1, &seq));
                let expected = oracle.remove(&seq);
                assert_eq!(expected, registry.remove(t1, &seq));
                assert_eq!(expected, registry.remove(t2, &seq));
                removed.insert(seq.clone());
                assert!(!registry.test(t1, &seq));
                assert_eq!(oracle.len(), registry.size(t1));
                assert_eq!(registry.size(t1), registry.size(t2));
            }
            Operation::Clear => {
                removed.extend(std::mem::take(&mut oracle));
                registry.clear(t1);
                registry.clear(t2);
                assert_eq!(0, registry.size(t1));
                assert_eq!(0, registry.size(t2));
                assert!(registry.contains_table(t1));
            }
            Operation::Dump => {
                assert_eq!(oracle.len(), registry.size(t1));
                assert_eq!(oracle.len(), registry.size(t2));
                for seq in &oracle {
                    assert!(registry.test(t1, seq));
                    assert!(registry.test(t2, seq));
                }
                for seq in &removed {
                    assert!(!registry.test(t1, seq));
                    assert!(!registry.test(t2, seq));
                }
            }
        }
    }
}

const N: usize = 1000;

fn random_sequence(rng: &mut impl Rng) -> Vec<u64> {
    let len = rng.gen_range(1..8);
    (0..len).map(|_| rng.gen_range(0..16)).collect()
}

/// Short sequences built from a few small values, so that many of them share
/// prefixes and first elements.
fn random_sequences(n: usize) -> Vec<Vec<u64>> {
    let mut rng = rand::thread_rng();
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let seq = random_sequence(&mut rng);
        if seen.insert(seq.clone()) {
            out.push(seq);
        }
    }
    out
}

pub(crate) fn insert_remove_sparse() -> impl Iterator<Item = Operation> {
    let seqs = random_sequences(N);
    let in_set: Vec<Vec<u64>> = seqs[0..(N / 2)].to_vec();
    let not_in_set: Vec<Vec<u64>> = seqs[(N / 2)..].to_vec();
    in_set
        .clone()
        .into_iter()
        .map(Operation::Insert)
        .chain(once(Operation::Dump))
        .chain(not_in_set.into_iter().map(Operation::Remove))
        .chain(once(Operation::Dump))
        .chain(in_set.into_iter().map(Operation::Remove))
        .chain(once(Operation::Dump))
}

pub(crate) fn insert_remove_dense() -> impl Iterator<Item = Operation> {
    const K: u64 = N as u64;
    let seqs = || (0..K).flat_map(|i| [vec![i], vec![i, i], vec![i, i + 1]]);
    seqs()
        .map(Operation::Insert)
        .chain(once(Operation::Dump))
        .chain(seqs().map(Operation::Remove))
        .chain(once(Operation::Dump))
}

pub(crate) fn reinsert() -> impl Iterator<Item = Operation> {
    let seqs = random_sequences(N);
    let half: Vec<Vec<u64>> = seqs[0..(N / 2)].to_vec();
    seqs.clone()
        .into_iter()
        .map(Operation::Insert)
        .chain(seqs.clone().into_iter().map(Operation::Insert))
        .chain(once(Operation::Dump))
        .chain(half.clone().into_iter().map(Operation::Remove))
        .chain(once(Operation::Dump))
        .chain(half.into_iter().map(Operation::Insert))
        .chain(once(Operation::Dump))
        .chain(seqs.into_iter().map(Operation::Remove))
        .chain(once(Operation::Dump))
}

pub(crate) fn clear_and_refill() -> impl Iterator<Item = Operation> {
    let first = random_sequences(N);
    let second = random_sequences(N);
    first
        .clone()
        .into_iter()
        .map(Operation::Insert)
        .chain(once(Operation::Clear))
        .chain(once(Operation::Dump))
        .chain(once(Operation::Clear))
        .chain(second.into_iter().map(Operation::Insert))
        .chain(once(Operation::Dump))
        .chain(first.into_iter().map(Operation::Remove))
        .chain(once(Operation::Dump))
}
