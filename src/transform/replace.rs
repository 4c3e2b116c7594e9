use memchr::memmem::Finder;

/// Replaces every occurrence of the finder's needle, scanning left to right
///
/// Occurrences are non-overlapping, and text produced by a replacement is never
/// searched again. An empty needle leaves the haystack untouched.
pub fn replace_all(haystack: &[u8], finder: &Finder<'_>, replacement: &[u8]) -> Vec<u8> {
    let needle_len = finder.needle().len();
    if needle_len == 0 {
        return haystack.to_vec();
    }

    let mut out = Vec::with_capacity(haystack.len());
    let mut last = 0;
    for pos in finder.find_iter(haystack) {
        out.extend_from_slice(&haystack[last..pos]);
        out.extend_from_slice(replacement);
        last = pos + needle_len;
    }
    out.extend_from_slice(&haystack[last..]);
    out
}
