use crate::error::{ConfigError, Result};

/// Complement of a single symbol
///
/// Only `A`, `C`, `G` and `T` have complements; everything else (lowercase
/// bases, `N`, the spaces inserted by word splitting) maps to itself.
#[inline]
#[must_use]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Reverse complement of a sequence
///
/// The reversal applies to the characters of the sequence, not to its
/// whitespace-delimited words.
#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Parses a count written as an integer or with a `K`, `M` or `B` suffix
///
/// `"250"`, `"50K"`, `"1M"`, `"1.5k"` and `"2B"` are all accepted. Fractional
/// results are truncated.
pub fn parse_count(s: &str) -> Result<usize> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        return Ok(n);
    }
    let invalid = || ConfigError::InvalidCount(s.to_string());

    let Some(suffix) = s.chars().last() else {
        return Err(invalid().into());
    };
    let number = &s[..s.len() - suffix.len_utf8()];
    let scale: f64 = match suffix {
        'K' | 'k' => 1e3,
        'M' | 'm' => 1e6,
        'B' | 'b' => 1e9,
        _ => return Err(invalid().into()),
    };
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid().into());
    }

    #[allow(clippy::cast_sign_loss)]
    Ok((value * scale) as usize)
}
