use memchr::memmem::Finder;
use rand::Rng;

use super::{replace_all, Transform};
use crate::utils::reverse_complement;

const BASES: &[u8; 4] = b"ACGT";

/// Removes a fixed set of subsequences (and their reverse complements)
///
/// The subsequences are drawn once, at construction, from the random source
/// handed in by the caller. Seeding that source makes a run reproducible.
#[derive(Debug, Clone, Default)]
pub struct Deleter {
    /// Forward and reverse complement targets, interleaved
    targets: Vec<Finder<'static>>,
}
impl Deleter {
    /// Draws `count` random `ACGT` strings of `length` bases
    ///
    /// A `count` of zero builds the identity stage.
    pub fn new<R: Rng>(count: usize, length: usize, rng: &mut R) -> Self {
        let mut sequences = Vec::with_capacity(count);
        for _ in 0..count {
            let seq: Vec<u8> = (0..length)
                .map(|_| BASES[rng.random_range(0..BASES.len())])
                .collect();
            sequences.push(seq);
        }
        Self::from_sequences(sequences)
    }

    /// Builds a deleter for explicitly chosen subsequences
    pub fn from_sequences<S: AsRef<[u8]>>(sequences: impl IntoIterator<Item = S>) -> Self {
        let mut targets = Vec::new();
        for seq in sequences {
            let seq = seq.as_ref();
            targets.push(Finder::new(seq).into_owned());
            targets.push(Finder::new(&reverse_complement(seq)).into_owned());
        }
        Self { targets }
    }

    /// Subsequences removed by this stage, in application order
    pub fn targets(&self) -> impl Iterator<Item = &[u8]> {
        self.targets.iter().map(Finder::needle)
    }
}
impl Transform for Deleter {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        let mut line = data.to_vec();
        for target in &self.targets {
            line = replace_all(&line, target, b"");
        }
        line
    }

    fn is_identity(&self) -> bool {
        self.targets.is_empty()
    }
}
