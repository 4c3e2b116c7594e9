use memchr::memmem::Finder;

use super::{replace_all, Transform};

/// Default replacement table: break words at CpG, GpC, ApT and TpA steps and drop `N`
pub const DEFAULT_SPLIT_PAIRS: [(&str, &str); 5] = [
    ("CG", "C G"),
    ("GC", "G C"),
    ("AT", "A T"),
    ("TA", "T A"),
    ("N", ""),
];

#[derive(Debug, Clone)]
struct SplitRule {
    finder: Finder<'static>,
    replacement: Vec<u8>,
}

/// Turns a sequence into space-separated words
///
/// The data is uppercased first, then every `(match, replacement)` pair is
/// applied over the whole string in list order. Later pairs see the output of
/// earlier ones, so for the default table `"ATCG"` becomes `"A TC G"`: the
/// `CG` step is split first and `TC` is not a split point.
#[derive(Debug, Clone)]
pub struct WordSplitter {
    rules: Vec<SplitRule>,
}
impl WordSplitter {
    pub fn new<M, R>(pairs: impl IntoIterator<Item = (M, R)>) -> Self
    where
        M: AsRef<[u8]>,
        R: AsRef<[u8]>,
    {
        let rules = pairs
            .into_iter()
            .map(|(needle, replacement)| SplitRule {
                finder: Finder::new(needle.as_ref()).into_owned(),
                replacement: replacement.as_ref().to_vec(),
            })
            .collect();
        Self { rules }
    }

    /// The replacement table, in application order
    pub fn pairs(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.rules
            .iter()
            .map(|rule| (rule.finder.needle(), rule.replacement.as_slice()))
    }
}
impl Default for WordSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_PAIRS)
    }
}
impl Transform for WordSplitter {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        let mut line = data.to_ascii_uppercase();
        for rule in &self.rules {
            line = replace_all(&line, &rule.finder, &rule.replacement);
        }
        line
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let splitter = WordSplitter::default();
        assert_eq!(splitter.transform(b"ATCG"), b"A TC G");
        assert_eq!(splitter.transform(b"CGAT"), b"C GA T");
    }

    #[test]
    fn test_uppercases_first() {
        let splitter = WordSplitter::default();
        assert_eq!(splitter.transform(b"acgt"), b"AC GT");
    }

    #[test]
    fn test_drops_n() {
        let splitter = WordSplitter::default();
        assert_eq!(splitter.transform(b"NNNAAANNN"), b"AAA");
        assert_eq!(splitter.transform(b"NNNN"), b"");
    }

    #[test]
    fn test_inserted_spaces_are_not_rematched() {
        // "CGC": CG is split first, leaving "C GC", then GC is split as well
        let splitter = WordSplitter::default();
        assert_eq!(splitter.transform(b"CGC"), b"C G C");

        // later pairs match against the output of earlier ones
        let splitter = WordSplitter::new([("AT", "A T"), ("A T", "XX")]);
        assert_eq!(splitter.transform(b"AT"), b"XX");
        let splitter = WordSplitter::new([("A T", "XX"), ("AT", "A T")]);
        assert_eq!(splitter.transform(b"AT"), b"A T");
    }

    #[test]
    fn test_pairs_roundtrip_table() {
        let splitter = WordSplitter::default();
        let pairs: Vec<_> = splitter.pairs().collect();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0], (&b"CG"[..], &b"C G"[..]));
        assert_eq!(pairs[4], (&b"N"[..], &b""[..]));
    }
}
