//! Core suffix-array construction: two-stage induced sorting over A/B/B*
//! suffix classes, with the B* substrings refined by [`substring_sort`] and
//! [`tr_sort`].

pub(crate) mod compare;
pub(crate) mod substring_sort;
pub(crate) mod tr_sort;

use compare::{ALPHABET_SIZE, BUCKET_A_SIZE, BUCKET_B_SIZE, LOCALMERGE_BUFFERSIZE};
use crate::SaIndex;

#[inline]
fn bucket_b(bucket_b: &[SaIndex], c0: usize, c1: usize) -> SaIndex {
    bucket_b[c1 * ALPHABET_SIZE + c0]
}
#[inline]
fn bucket_b_set(bucket_b: &mut [SaIndex], c0: usize, c1: usize, v: SaIndex) {
    bucket_b[c1 * ALPHABET_SIZE + c0] = v;
}
#[inline]
fn bucket_bstar(bucket_b: &[SaIndex], c0: usize, c1: usize) -> SaIndex {
    bucket_b[c0 * ALPHABET_SIZE + c1]
}
#[inline]
fn bucket_bstar_set(bucket_b: &mut [SaIndex], c0: usize, c1: usize, v: SaIndex) {
    bucket_b[c0 * ALPHABET_SIZE + c1] = v;
}

/// Classifies and sorts B* suffixes, returning their count `m`.
///
/// On return, `sa[0..m)` holds the sorted-order B* positions and
/// `sa[m..n)`/`sa[n-m..n)` are left in the bookkeeping layout the second
/// stage ([`construct_sa`] / [`construct_bwt`]) expects.
pub(crate) fn sort_type_bstar(t: &[u8], sa: &mut [SaIndex], bucket_a: &mut [SaIndex], bucket_b: &mut [SaIndex], n: usize) -> usize {
    for x in bucket_a.iter_mut() {
        *x = 0;
    }
    for x in bucket_b.iter_mut() {
        *x = 0;
    }

    let mut m = n;
    let mut i = n as isize - 1;
    while i >= 0 {
        let mut ii = i as usize;
        loop {
            bucket_a[t[ii] as usize] += 1;
            if ii == 0 {
                i = -1;
                break;
            }
            ii -= 1;
            i = ii as isize;
            if t[ii] < t[ii + 1] {
                break;
            }
        }
        if i >= 0 {
            let ii = i as usize;
            bucket_bstar_set(bucket_b, t[ii] as usize, t[ii + 1] as usize, bucket_bstar(bucket_b, t[ii] as usize, t[ii + 1] as usize) + 1);
            m -= 1;
            sa[m] = i as SaIndex;

            i -= 1;
            while i >= 0 {
                let ii = i as usize;
                if t[ii] > t[ii + 1] {
                    break;
                }
                bucket_b_set(bucket_b, t[ii] as usize, t[ii + 1] as usize, bucket_b(bucket_b, t[ii] as usize, t[ii + 1] as usize) + 1);
                i -= 1;
            }
        }
    }
    let m = n - m;

    let mut i: SaIndex = 0;
    let mut j: SaIndex = 0;
    for c0 in 0..ALPHABET_SIZE {
        let t_ = i + bucket_a[c0];
        bucket_a[c0] = i + j;
        i = t_ + bucket_b(bucket_b, c0, c0);
        for c1 in c0 + 1..ALPHABET_SIZE {
            j += bucket_bstar(bucket_b, c0, c1);
            bucket_bstar_set(bucket_b, c0, c1, j);
            i += bucket_b(bucket_b, c0, c1);
        }
    }

    if m > 0 {
        // PAb is built at sa[n-m..] before being copied out to its own Vec
        // below; ISAb is a separate Vec entirely (see isab below).
        let pab_off = n - m;
        sa[pab_off + m] = n as SaIndex - 2; // sentinel, valid because m <= n/2
        let mut i = m as isize - 2;
        while i >= 0 {
            let tpos = sa[pab_off + i as usize];
            let (c0, c1) = (t[tpos as usize] as usize, t[tpos as usize + 1] as usize);
            let slot = bucket_bstar(bucket_b, c0, c1) - 1;
            bucket_bstar_set(bucket_b, c0, c1, slot);
            sa[slot as usize] = i as SaIndex;
            i -= 1;
        }
        let tpos = sa[pab_off + m - 1];
        let (c0, c1) = (t[tpos as usize] as usize, t[tpos as usize + 1] as usize);
        let slot = bucket_bstar(bucket_b, c0, c1) - 1;
        bucket_bstar_set(bucket_b, c0, c1, slot);
        sa[slot as usize] = (m - 1) as SaIndex;

        // Sort the B* substrings using the block/merge substring sorter.
        // PAb is read-only for the remainder of this phase; copying it out
        // of `sa` sidesteps the reference's pointer aliasing between PAb,
        // ISAb and the merge scratch buffer.
        let pab: Vec<SaIndex> = sa[pab_off..pab_off + m + 1].to_vec();
        let bufsize = std::cmp::max(n - 2 * m, LOCALMERGE_BUFFERSIZE);
        let mut buf = vec![0 as SaIndex; bufsize];

        let mut j = m;
        for c0 in (0..ALPHABET_SIZE).rev() {
            let mut c1 = ALPHABET_SIZE - 1;
            while c0 < c1 {
                let i = bucket_bstar(bucket_b, c0, c1) as usize;
                if j - i > 1 {
                    let lastsuffix = sa[i] as usize == m - 1;
                    substring_sort::substring_sort(t, &pab, sa, i, j, &mut buf, bufsize, 2, lastsuffix);
                }
                j = i;
                c1 -= 1;
            }
        }

        // Compute ranks of the B* substrings (isab[...] = rank), applying
        // the negation-sentinel convention for equal-key runs. isab is a
        // genuinely separate array (not overlaid on `sa`), sized n-m so the
        // rank-doubling addressing in tr_sort stays in bounds.
        let mut isab = vec![0 as SaIndex; n - m];
        let mut i = m as isize - 1;
        while i >= 0 {
            if sa[i as usize] >= 0 {
                let j = i;
                loop {
                    let v = sa[i as usize];
                    isab[v as usize] = i;
                    i -= 1;
                    if i < 0 || sa[i as usize] < 0 {
                        break;
                    }
                }
                sa[i as usize + 1] = i - j;
                if i <= 0 {
                    break;
                }
            }
            let j = i;
            loop {
                let negated = !sa[i as usize];
                sa[i as usize] = negated;
                isab[negated as usize] = j;
                i -= 1;
                if sa[i as usize] >= 0 {
                    break;
                }
            }
            isab[sa[i as usize] as usize] = j;
        }

        // Refine isab/SA[0..m) into the full inverse suffix array of the B*
        // suffixes via the budgeted tandem-repeat sorter.
        tr_sort::trsort(&mut isab, &mut sa[..m], m, 1);

        // Set the sorted order of type B* suffixes (write positions back).
        let mut i = n as isize - 1;
        let mut j = m;
        while i >= 0 {
            i -= 1;
            while i >= 0 && t[i as usize] >= t[i as usize + 1] {
                i -= 1;
            }
            if i >= 0 {
                j -= 1;
                let rank = isab[j] as usize;
                sa[rank] = i as SaIndex;
                i -= 1;
                while i >= 0 && t[i as usize] <= t[i as usize + 1] {
                    i -= 1;
                }
            }
        }

        // Recompute bucket start/end points and move B* suffixes into place.
        let mut i = n;
        let mut k = m as isize - 1;
        for c0 in (0..ALPHABET_SIZE).rev() {
            let mut c1 = ALPHABET_SIZE - 1;
            while c0 < c1 {
                let t_ = i as isize - bucket_b(bucket_b, c0, c1) as isize;
                bucket_b_set(bucket_b, c0, c1, i as SaIndex + 1);

                let mut ii = t_;
                let mut jj = bucket_bstar(bucket_b, c0, c1) as isize;
                while jj <= k {
                    sa[ii as usize] = sa[k as usize];
                    ii -= 1;
                    k -= 1;
                }
                i = ii as usize;
                c1 -= 1;
            }
            let t_ = i as isize - bucket_b(bucket_b, c0, c0) as isize;
            bucket_b_set(bucket_b, c0, c0, i as SaIndex + 1);
            if c0 < ALPHABET_SIZE - 1 {
                bucket_bstar_set(bucket_b, c0, c0 + 1, t_ as SaIndex + 1);
            }
            i = bucket_a[c0] as usize;
        }
    }

    m
}

/// Second-stage induced sort: extends the sorted B* order to the full
/// suffix array of types A and B.
pub(crate) fn construct_sa(t: &[u8], sa: &mut [SaIndex], bucket_a: &mut [SaIndex], bucket_b: &mut [SaIndex], n: usize, m: usize) {
    if m > 0 {
        for c1 in (0..ALPHABET_SIZE - 1).rev() {
            let mut i = bucket_bstar(bucket_b, c1, c1 + 1) as isize;
            let mut j = bucket_a[c1 + 1] as isize - 1;
            let mut t_: isize = -1;
            let mut c2: isize = -1;
            while i <= j {
                let s = sa[j as usize];
                if s >= 0 {
                    let mut s = s - 1;
                    if s >= 0 {
                        let c0 = t[s as usize] as isize;
                        if c0 <= c1 as isize {
                            sa[j as usize] = !(s + 1);
                            if s > 0 && t[s as usize - 1] as isize > c0 {
                                s = !s;
                            }
                            if c2 == c0 {
                                t_ -= 1;
                                sa[t_ as usize] = s;
                            } else {
                                if c2 >= 0 {
                                    bucket_b_set(bucket_b, c2 as usize, c1, t_ as SaIndex);
                                }
                                c2 = c0;
                                t_ = bucket_b(bucket_b, c2 as usize, c1) as isize - 1;
                                sa[t_ as usize] = s;
                            }
                        }
                    }
                } else {
                    sa[j as usize] = !s;
                }
                j -= 1;
            }
        }
    }

    sa[0] = n as SaIndex;
    let mut c2 = t[n - 1] as usize;
    let mut t_ = bucket_a[c2] as isize + 1;
    sa[t_ as usize] = n as SaIndex - 1;

    let mut i: isize = 1;
    let j: isize = n as isize;
    while i <= j {
        let s = sa[i as usize];
        if s >= 0 {
            let mut s = s - 1;
            if s >= 0 {
                let c0 = t[s as usize] as usize;
                if t[s as usize] >= t[s as usize + 1] {
                    if s > 0 && (t[s as usize - 1] as usize) < c0 {
                        s = !s;
                    }
                    if c0 == c2 {
                        t_ += 1;
                        sa[t_ as usize] = s;
                    } else {
                        bucket_a[c2] = t_ as SaIndex;
                        c2 = c0;
                        t_ = bucket_a[c2] as isize + 1;
                        sa[t_ as usize] = s;
                    }
                }
            }
        } else {
            sa[i as usize] = !s;
        }
        i += 1;
    }
}

/// Second-stage induced sort producing the BWT directly, without a full
/// suffix array. Returns the BWT's primary index.
pub(crate) fn construct_bwt(t: &[u8], sa: &mut [SaIndex], bucket_a: &mut [SaIndex], bucket_b: &mut [SaIndex], n: usize, m: usize) -> usize {
    if m > 0 {
        for c1 in (0..ALPHABET_SIZE - 1).rev() {
            let mut i = bucket_bstar(bucket_b, c1, c1 + 1) as isize;
            let mut j = bucket_a[c1 + 1] as isize - 1;
            let mut t_: isize = -1;
            let mut c2: isize = -1;
            while i <= j {
                let s = sa[j as usize];
                if s >= 0 {
                    let mut s = s - 1;
                    if s >= 0 {
                        let c0 = t[s as usize] as isize;
                        if c0 <= c1 as isize {
                            sa[j as usize] = !c0;
                            if s > 0 && t[s as usize - 1] as isize > c0 {
                                s = !s;
                            }
                            if c0 == c2 {
                                t_ -= 1;
                                sa[t_ as usize] = s;
                            } else {
                                if c2 >= 0 {
                                    bucket_b_set(bucket_b, c2 as usize, c1, t_ as SaIndex);
                                }
                                c2 = c0;
                                t_ = bucket_b(bucket_b, c2 as usize, c1) as isize - 1;
                                sa[t_ as usize] = s;
                            }
                        }
                    }
                } else {
                    sa[j as usize] = !s;
                }
                j -= 1;
            }
        }
    }

    let mut s = n - 1;
    let mut c0 = t[s] as usize;
    sa[0] = c0 as SaIndex;
    let mut s_signed: isize = s as isize;
    if (t[s - 1] as usize) < c0 {
        s_signed = !(t[s - 1] as isize);
    }
    let mut c2 = c0;
    let mut t_ = bucket_a[c2] as isize + 1;
    sa[t_ as usize] = s_signed as SaIndex;

    let mut orig: isize = -1;
    let mut i: isize = 1;
    let j: isize = n as isize;
    while i <= j {
        let sv = sa[i as usize];
        if sv >= 0 {
            let mut sv2 = sv - 1;
            if sv2 >= 0 {
                c0 = t[sv2 as usize] as usize;
                if t[sv2 as usize] >= t[sv2 as usize + 1] {
                    sa[i as usize] = c0 as SaIndex;
                    if sv2 > 0 && (t[sv2 as usize - 1] as usize) < c0 {
                        sv2 = !(t[sv2 as usize - 1] as isize);
                    }
                    if c0 == c2 {
                        t_ += 1;
                        sa[t_ as usize] = sv2 as SaIndex;
                    } else {
                        bucket_a[c2] = t_ as SaIndex;
                        c2 = c0;
                        t_ = bucket_a[c2] as isize + 1;
                        sa[t_ as usize] = sv2 as SaIndex;
                    }
                }
            } else if sv2 < 0 {
                orig = i;
            }
        } else {
            sa[i as usize] = !sv;
        }
        let _ = s;
        i += 1;
    }

    orig as usize
}

/// Builds the full suffix array of `t` into `sa[0..=n]` (`sa[0] == n`, the
/// empty-suffix sentinel, matching libdivsufsort's `SA[0] = n` convention).
pub(crate) fn build_sa(t: &[u8], sa: &mut [SaIndex]) {
    let n = t.len();
    if n == 0 {
        sa[0] = 0;
        return;
    }
    if n == 1 {
        sa[0] = 1;
        sa[1] = 0;
        return;
    }

    let mut bucket_a = vec![0 as SaIndex; BUCKET_A_SIZE];
    let mut bucket_b = vec![0 as SaIndex; BUCKET_B_SIZE];

    let m = sort_type_bstar(t, sa, &mut bucket_a, &mut bucket_b, n);
    construct_sa(t, sa, &mut bucket_a, &mut bucket_b, n, m);
}

/// Builds the BWT of `t` directly, returning the primary index. `work` must
/// have length `n + 1` and is used as scratch (mirrors `divbwt`'s optional
/// caller-supplied `A` buffer).
pub(crate) fn build_bwt(t: &[u8], u: &mut [u8], work: &mut [SaIndex]) -> usize {
    let n = t.len();
    if n <= 1 {
        if n == 1 {
            u[0] = t[0];
        }
        return n;
    }

    let mut bucket_a = vec![0 as SaIndex; BUCKET_A_SIZE];
    let mut bucket_b = vec![0 as SaIndex; BUCKET_B_SIZE];

    let m = sort_type_bstar(t, work, &mut bucket_a, &mut bucket_b, n);
    let pidx = construct_bwt(t, work, &mut bucket_a, &mut bucket_b, n, m);

    for i in 0..pidx {
        u[i] = work[i] as u8;
    }
    for i in pidx..n {
        u[i] = work[i + 1] as u8;
    }
    pidx
}
