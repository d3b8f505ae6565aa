//! Binary search over a suffix array: find every occurrence of a pattern,
//! or of a single byte.

use crate::error::Result;
use crate::SaIndex;
use std::cmp::min;

fn compare_at(t: &[u8], p: &[u8], suf: usize, match_len: &mut usize) -> i32 {
    let mut i = suf + *match_len;
    let mut j = *match_len;
    let mut r = 0i32;
    while i < t.len() && j < p.len() {
        r = t[i] as i32 - p[j] as i32;
        if r != 0 {
            break;
        }
        i += 1;
        j += 1;
    }
    *match_len = j;
    if r == 0 {
        if j != p.len() {
            -1
        } else {
            0
        }
    } else {
        r
    }
}

/// Returns the half-open range within `sa` whose suffixes all start with
/// `pattern`, as `(count, first_index)`.
pub fn sa_search(t: &[u8], pattern: &[u8], sa: &[SaIndex]) -> Result<(SaIndex, SaIndex)> {
    if t.is_empty() || sa.is_empty() {
        return Ok((0, 0));
    }
    if pattern.is_empty() {
        return Ok((sa.len() as SaIndex, 0));
    }

    let (mut i, mut j, mut k) = (0usize, 0usize, 0usize);
    let (mut lmatch, mut rmatch) = (0usize, 0usize);
    let mut size = sa.len();
    let mut half = size >> 1;

    while size > 0 {
        let mut m = min(lmatch, rmatch);
        let r = compare_at(t, pattern, sa[i + half] as usize, &mut m);
        if r < 0 {
            i += half + 1;
            half -= if size & 1 == 0 { 1 } else { 0 };
            lmatch = m;
        } else if r > 0 {
            rmatch = m;
        } else {
            let lsize = half;
            j = i;
            let rsize = size - half - 1;
            k = i + half + 1;

            let (mut llmatch, mut lrmatch) = (lmatch, m);
            let mut lsize = lsize;
            let mut half2 = lsize >> 1;
            while lsize > 0 {
                let mut lm = min(llmatch, lrmatch);
                let r = compare_at(t, pattern, sa[j + half2] as usize, &mut lm);
                if r < 0 {
                    j += half2 + 1;
                    half2 -= if lsize & 1 == 0 { 1 } else { 0 };
                    llmatch = lm;
                } else {
                    lrmatch = lm;
                }
                lsize = half2;
                half2 >>= 1;
            }

            let (mut rlmatch, mut rrmatch) = (m, rmatch);
            let mut rsize = rsize;
            let mut half3 = rsize >> 1;
            while rsize > 0 {
                let mut rm = min(rlmatch, rrmatch);
                let r = compare_at(t, pattern, sa[k + half3] as usize, &mut rm);
                if r <= 0 {
                    k += half3 + 1;
                    half3 -= if rsize & 1 == 0 { 1 } else { 0 };
                    rlmatch = rm;
                } else {
                    rrmatch = rm;
                }
                rsize = half3;
                half3 >>= 1;
            }

            break;
        }
        size = half;
        half >>= 1;
    }

    let idx = if k > j { j } else { i };
    Ok((k.saturating_sub(j) as SaIndex, idx as SaIndex))
}

/// Returns the half-open range within `sa` whose suffixes start with the
/// single byte `c`, as `(count, first_index)`.
pub fn sa_simplesearch(t: &[u8], sa: &[SaIndex], c: u8) -> Result<(SaIndex, SaIndex)> {
    if t.is_empty() || sa.is_empty() {
        return Ok((0, 0));
    }

    let (mut i, mut j, mut k) = (0usize, 0usize, 0usize);
    let mut size = sa.len();
    let mut half = size >> 1;

    let byte_at = |p: SaIndex| -> i32 {
        let p = p as usize;
        if p < t.len() {
            t[p] as i32 - c as i32
        } else {
            -1
        }
    };

    while size > 0 {
        let r = byte_at(sa[i + half]);
        if r < 0 {
            i += half + 1;
            half -= if size & 1 == 0 { 1 } else { 0 };
        } else if r == 0 {
            let mut lsize = half;
            j = i;
            let mut rsize = size - half - 1;
            k = i + half + 1;

            let mut half2 = lsize >> 1;
            while lsize > 0 {
                let r = byte_at(sa[j + half2]);
                if r < 0 {
                    j += half2 + 1;
                    half2 -= if lsize & 1 == 0 { 1 } else { 0 };
                }
                lsize = half2;
                half2 >>= 1;
            }

            let mut half3 = rsize >> 1;
            while rsize > 0 {
                let r = byte_at(sa[k + half3]);
                if r <= 0 {
                    k += half3 + 1;
                    half3 -= if rsize & 1 == 0 { 1 } else { 0 };
                }
                rsize = half3;
                half3 >>= 1;
            }

            break;
        }
        size = half;
        half >>= 1;
    }

    let idx = if k > j { j } else { i };
    Ok((k.saturating_sub(j) as SaIndex, idx as SaIndex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core;

    fn sa_of(t: &[u8]) -> Vec<SaIndex> {
        let mut sa = vec![0 as SaIndex; t.len() + 1];
        core::build_sa(t, &mut sa);
        sa
    }

    #[test]
    fn finds_all_occurrences() {
        let t = b"banana";
        let sa = sa_of(t);
        let (count, first) = sa_search(t, b"ana", &sa).unwrap();
        assert_eq!(count, 2);
        let first = first as usize;
        let count = count as usize;
        let mut starts: Vec<usize> = (first..first + count).map(|i| sa[i] as usize).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![1, 3]);
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let t = b"banana";
        let sa = sa_of(t);
        let (count, _) = sa_search(t, b"", &sa).unwrap();
        assert_eq!(count as usize, sa.len());
    }

    #[test]
    fn simplesearch_finds_byte() {
        let t = b"banana";
        let sa = sa_of(t);
        let (count, _) = sa_simplesearch(t, &sa, b'a').unwrap();
        assert_eq!(count, 3);
    }
}
