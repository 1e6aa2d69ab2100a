// Alphabet Partition - split points shared by a set of automata
//
// Consecutive scalar values between two split points behave identically in
// every contributing automaton, so the union only needs one probe per
// interval instead of one per character.

use multire_automaton::{Dfa, MAX_CHAR};
use std::ops::RangeInclusive;

/// Union of every automaton's start points, sorted and duplicate-free.
/// Always contains 0.
pub fn compute_split_points<'a, I>(automata: I) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Dfa>,
{
    let mut points = vec![0];
    for dfa in automata {
        points.extend(dfa.start_points());
    }
    points.sort_unstable();
    points.dedup();
    points
}

/// The alphabet cut into intervals of uniform behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetPartition {
    points: Vec<u32>,
}

impl AlphabetPartition {
    pub fn from_automata<'a, I>(automata: I) -> Self
    where
        I: IntoIterator<Item = &'a Dfa>,
    {
        Self {
            points: compute_split_points(automata),
        }
    }

    pub fn split_points(&self) -> &[u32] {
        &self.points
    }

    pub fn class_count(&self) -> usize {
        self.points.len()
    }

    /// Interval containing `c`
    pub fn class_of(&self, c: u32) -> usize {
        // points[0] == 0, so the partition point is at least 1
        self.points.partition_point(|&p| p <= c) - 1
    }

    /// First scalar value of interval `class`; every value in the interval
    /// behaves like this one
    pub fn representative(&self, class: usize) -> u32 {
        self.points[class]
    }

    pub fn class_range(&self, class: usize) -> RangeInclusive<u32> {
        let start = self.points[class];
        let end = self
            .points
            .get(class + 1)
            .map(|&next| next - 1)
            .unwrap_or(MAX_CHAR);
        start..=end
    }

    pub fn classes(&self) -> impl Iterator<Item = RangeInclusive<u32>> + '_ {
        (0..self.points.len()).map(move |k| self.class_range(k))
    }
}
