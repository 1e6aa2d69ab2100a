// Partition refinement (Moore's algorithm)
//
// Shared by single-pattern minimization and by the combined automaton in
// the engine crate, which seeds the initial partition with accept-sets.

use ahash::{AHashMap, AHashSet};

/// Refine `initial` until states in one block agree, for every alphabet
/// class, on the block of their successor.
///
/// `initial[s]` is the starting block label of state `s` (labels need not be
/// dense). `next(s, k)` is the successor of `s` on class `k`. States with
/// different starting labels never end up in the same block.
///
/// Returns the final block of each state and the number of blocks.
pub fn refine_partition<F>(initial: &[usize], class_count: usize, next: F) -> (Vec<usize>, usize)
where
    F: Fn(usize, usize) -> Option<usize>,
{
    let mut blocks = initial.to_vec();
    let mut count = initial.iter().collect::<AHashSet<_>>().len();

    loop {
        let mut ids: AHashMap<(usize, Vec<Option<usize>>), usize> = AHashMap::new();
        let mut refined = Vec::with_capacity(blocks.len());

        for (state, &block) in blocks.iter().enumerate() {
            let successors = (0..class_count)
                .map(|k| next(state, k).map(|t| blocks[t]))
                .collect();
            let fresh = ids.len();
            refined.push(*ids.entry((block, successors)).or_insert(fresh));
        }

        let refined_count = ids.len();
        blocks = refined;
        if refined_count == count {
            return (blocks, count);
        }
        count = refined_count;
    }
}
