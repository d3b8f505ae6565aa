//! Four-pass suffix array validator.

use crate::error::{Error, Result};
use crate::SaIndex;
use log::{trace, warn};

const ALPHABET_SIZE: usize = 256;

/// Verifies that `sa` (length `t.len()+1`) is a valid suffix array of `t`.
///
/// Runs the reference's four passes in order, stopping at the first
/// failure: index ranges, first-character monotonicity, full suffix order,
/// and each suffix's bucket position. When `verbose` is set, each failure
/// logs a descriptive message identifying the failing pass and index.
pub fn sufcheck(t: &[u8], sa: &[SaIndex], verbose: bool) -> Result<()> {
    let n = t.len();
    if sa.len() != n + 1 {
        return Err(Error::InvalidArgument("sufcheck: SA length must be n+1"));
    }

    for &v in sa.iter() {
        if v < 0 || v as usize > n {
            if verbose {
                warn!("sufcheck: SA entry {} out of range [0,{}]", v, n);
            }
            return Err(Error::Check("suffix array index out of range"));
        }
    }

    for i in 1..n {
        if t[sa[i] as usize] > t[sa[i + 1] as usize] {
            if verbose {
                warn!("sufcheck: suffixes out of order at rank {}", i);
            }
            return Err(Error::Check("suffixes in wrong order"));
        }
    }

    let mut c = [0 as SaIndex; ALPHABET_SIZE];
    for &byte in t.iter() {
        c[byte as usize] += 1;
    }
    let mut p: SaIndex = 1;
    for slot in c.iter_mut() {
        let cnt = *slot;
        *slot = p;
        p += cnt;
    }

    let mut t_idx: SaIndex = 0;
    for i in 0..=n {
        let mut pos = sa[i];
        let ch: i32;
        if pos > 0 {
            pos -= 1;
            ch = t[pos as usize] as i32;
            t_idx = c[ch as usize];
        } else {
            pos = n as SaIndex;
            ch = -1;
            t_idx = 0;
        }
        if pos != sa[t_idx as usize] {
            if verbose {
                warn!("sufcheck: suffix at rank {} in wrong position", i);
            }
            return Err(Error::Check("suffix in wrong position"));
        }
        if ch >= 0 {
            c[ch as usize] += 1;
            let cc = c[ch as usize];
            if cc as usize > n || t[sa[cc as usize] as usize] as i32 != ch {
                c[ch as usize] = -1;
            }
        }
    }

    trace!("sufcheck: {} bytes verified", n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core;

    #[test]
    fn accepts_correct_array() {
        let t = b"mississippi";
        let mut sa = vec![0 as SaIndex; t.len() + 1];
        core::build_sa(t, &mut sa);
        sufcheck(t, &sa, true).unwrap();
    }

    #[test]
    fn rejects_shuffled_array() {
        let t = b"mississippi";
        let mut sa = vec![0 as SaIndex; t.len() + 1];
        core::build_sa(t, &mut sa);
        sa.swap(1, 2);
        assert!(sufcheck(t, &sa, true).is_err());
    }
}
