use super::Transform;

/// Drops words shorter than a minimum length
///
/// Data is split on ASCII whitespace and the surviving words are joined with
/// single spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordFilter {
    min_length: usize,
}
impl WordFilter {
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    #[must_use]
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}
impl Transform for WordFilter {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        data.split(u8::is_ascii_whitespace)
            .filter(|word| !word.is_empty() && word.len() >= self.min_length)
            .for_each(|word| {
                if !out.is_empty() {
                    out.push(b' ');
                }
                out.extend_from_slice(word);
            });
        out
    }
}
