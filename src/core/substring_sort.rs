//! Block-wise multikey introsort plus balanced internal-buffer merges for
//! ordering B* suffixes by their substrings.
//!
//! `ss` holds indices into `pa` (the B* suffix positions); `pa` itself never
//! moves during this phase. Pointers of the reference implementation become
//! plain `usize` offsets into `ss`/`buf` here — there is only ever one array
//! doing the moving, so the index-for-pointer substitution is exact.

use super::compare::{
    compare, get_idx, lg, ALPHABET_SIZE as _, LOCALMERGE_BUFFERSIZE as _, SS_BLOCKSIZE,
    SS_INSERTIONSORT_THRESHOLD, STACK_SIZE,
};
use crate::SaIndex;

#[inline]
fn td(t: &[u8], pa: &[SaIndex], depth: SaIndex, v: SaIndex) -> i32 {
    t[(depth + pa[v as usize]) as usize] as i32
}

/// `Td[PA[v] - 1]` in the reference: one byte before the current compare
/// window of suffix `v`.
#[inline]
fn td_prev(t: &[u8], pa: &[SaIndex], depth: SaIndex, v: SaIndex) -> i32 {
    t[(depth + pa[v as usize] - 1) as usize] as i32
}

fn insertion_sort(t: &[u8], pa: &[SaIndex], ss: &mut [SaIndex], first: usize, last: usize, depth: SaIndex) {
    if last < 2 {
        return;
    }
    let mut i = last - 2;
    loop {
        let cur = ss[i];
        let mut j = i + 1;
        let mut r;
        loop {
            r = compare(t, pa, cur, ss[j], depth);
            if r <= 0 {
                break;
            }
            loop {
                ss[j - 1] = ss[j];
                j += 1;
                if j >= last || ss[j] >= 0 {
                    break;
                }
            }
            if j >= last {
                break;
            }
        }
        if r == 0 {
            ss[j] = !ss[j];
        }
        ss[j - 1] = cur;
        if i == first {
            break;
        }
        i -= 1;
    }
}

fn fixdown(t: &[u8], pa: &[SaIndex], ss: &mut [SaIndex], depth: SaIndex, mut i: usize, size: usize) {
    let v = ss[i];
    let c = td(t, pa, depth, v);
    loop {
        let j = 2 * i + 1;
        if j >= size {
            break;
        }
        let mut k = j;
        let mut d = td(t, pa, depth, ss[k]);
        if j + 1 < size {
            let e = td(t, pa, depth, ss[j + 1]);
            if d < e {
                k = j + 1;
                d = e;
            }
        }
        if d <= c {
            break;
        }
        ss[i] = ss[k];
        i = k;
    }
    ss[i] = v;
}

fn heapsort(t: &[u8], pa: &[SaIndex], ss: &mut [SaIndex], depth: SaIndex, size: usize) {
    let mut m = size;
    if size % 2 == 0 {
        m -= 1;
        if td(t, pa, depth, ss[m / 2]) < td(t, pa, depth, ss[m]) {
            ss.swap(m, m / 2);
        }
    }
    if m > 0 {
        let mut i = m / 2;
        loop {
            if i == 0 {
                fixdown(t, pa, ss, depth, 0, m);
                break;
            }
            i -= 1;
            fixdown(t, pa, ss, depth, i, m);
        }
    }
    if size % 2 == 0 {
        ss.swap(0, m);
        fixdown(t, pa, ss, depth, 0, m);
    }
    let mut i = m;
    while i > 1 {
        i -= 1;
        let tmp = ss[0];
        ss[0] = ss[i];
        fixdown(t, pa, ss, depth, 0, i);
        ss[i] = tmp;
    }
}

fn median3(t: &[u8], pa: &[SaIndex], depth: SaIndex, ss: &[SaIndex], mut v1: usize, mut v2: usize, v3: usize) -> usize {
    if td(t, pa, depth, ss[v1]) > td(t, pa, depth, ss[v2]) {
        std::mem::swap(&mut v1, &mut v2);
    }
    if td(t, pa, depth, ss[v2]) > td(t, pa, depth, ss[v3]) {
        return if td(t, pa, depth, ss[v1]) > td(t, pa, depth, ss[v3]) {
            v1
        } else {
            v3
        };
    }
    v2
}

#[allow(clippy::too_many_arguments)]
fn median5(
    t: &[u8],
    pa: &[SaIndex],
    depth: SaIndex,
    ss: &[SaIndex],
    mut v1: usize,
    mut v2: usize,
    mut v3: usize,
    mut v4: usize,
    mut v5: usize,
) -> usize {
    if td(t, pa, depth, ss[v2]) > td(t, pa, depth, ss[v3]) {
        std::mem::swap(&mut v2, &mut v3);
    }
    if td(t, pa, depth, ss[v4]) > td(t, pa, depth, ss[v5]) {
        std::mem::swap(&mut v4, &mut v5);
    }
    if td(t, pa, depth, ss[v2]) > td(t, pa, depth, ss[v4]) {
        std::mem::swap(&mut v2, &mut v4);
        std::mem::swap(&mut v3, &mut v5);
    }
    if td(t, pa, depth, ss[v1]) > td(t, pa, depth, ss[v3]) {
        std::mem::swap(&mut v1, &mut v3);
    }
    if td(t, pa, depth, ss[v1]) > td(t, pa, depth, ss[v4]) {
        std::mem::swap(&mut v1, &mut v4);
        std::mem::swap(&mut v3, &mut v5);
    }
    if td(t, pa, depth, ss[v3]) > td(t, pa, depth, ss[v4]) {
        return v4;
    }
    v3
}

fn pivot(t: &[u8], pa: &[SaIndex], depth: SaIndex, ss: &[SaIndex], first: usize, last: usize) -> usize {
    let mut span = last - first;
    let middle = first + span / 2;

    if span <= 512 {
        return if span <= 32 {
            median3(t, pa, depth, ss, first, middle, last - 1)
        } else {
            span >>= 2;
            median5(t, pa, depth, ss, first, first + span, middle, last - 1 - span, last - 1)
        };
    }
    span >>= 3;
    let a = median3(t, pa, depth, ss, first, first + span, first + (span << 1));
    let b = median3(t, pa, depth, ss, middle - span, middle, middle + span);
    let c = median3(t, pa, depth, ss, last - 1 - (span << 1), last - 1 - span, last - 1);
    median3(t, pa, depth, ss, a, b, c)
}

/// Partitions `[first,last)` into not-yet-fully-compared suffixes (left) and
/// suffixes whose compared span already reached its PA bound (right,
/// negation-marked). Returns the new `first` of the still-live sub-range.
fn substring_partition(pa: &[SaIndex], ss: &mut [SaIndex], first: usize, last: usize, depth: SaIndex) -> usize {
    let mut a = first;
    let mut b = last;
    loop {
        loop {
            if a >= b {
                break;
            }
            if pa[ss[a] as usize] + depth >= pa[ss[a] as usize + 1] + 1 {
                ss[a] = !ss[a];
                a += 1;
            } else {
                break;
            }
        }
        loop {
            if b == 0 {
                break;
            }
            b -= 1;
            if a >= b {
                b += 1;
                break;
            }
            if pa[ss[b] as usize] + depth >= pa[ss[b] as usize + 1] + 1 {
                b += 1;
                break;
            }
        }
        if b <= a {
            break;
        }
        let t = !ss[b];
        ss[b] = ss[a];
        ss[a] = t;
        a += 1;
    }
    if first < a {
        ss[first] = !ss[first];
    }
    a
}

struct Frame {
    first: usize,
    last: usize,
    depth: SaIndex,
    limit: SaIndex,
}

/// Multikey introsort for medium-sized groups of B* indices.
fn multikey_introsort(t: &[u8], pa: &[SaIndex], ss: &mut [SaIndex], mut first: usize, mut last: usize, mut depth: SaIndex) {
    let mut stack: Vec<Frame> = Vec::with_capacity(STACK_SIZE);
    let mut limit = lg((last - first) as SaIndex);

    loop {
        if last - first <= SS_INSERTIONSORT_THRESHOLD {
            if last - first > 1 {
                insertion_sort(t, pa, ss, first, last, depth);
            }
            match stack.pop() {
                Some(f) => {
                    first = f.first;
                    last = f.last;
                    depth = f.depth;
                    limit = f.limit;
                    continue;
                }
                None => return,
            }
        }

        if limit == 0 {
            heapsort(t, pa, ss, depth, last - first);
            limit = -1;
        } else {
            limit -= 1;
        }

        if limit < 0 {
            let v0 = td(t, pa, depth, ss[first]);
            let mut v = v0;
            let mut a = first + 1;
            let mut x;
            while a < last {
                x = td(t, pa, depth, ss[a]);
                if x != v {
                    if a - first > 1 {
                        break;
                    }
                    v = x;
                    first = a;
                }
                a += 1;
            }
            if td_prev(t, pa, depth, ss[first]) < v {
                first = substring_partition(pa, ss, first, a, depth);
            }
            if a - first <= last - a {
                if a - first > 1 {
                    stack.push(Frame { first: a, last, depth, limit: -1 });
                    last = a;
                    depth += 1;
                    limit = lg((a - first) as SaIndex);
                } else {
                    first = a;
                    limit = -1;
                }
            } else if last - a > 1 {
                stack.push(Frame { first, last: a, depth: depth + 1, limit: lg((a - first) as SaIndex) });
                first = a;
                limit = -1;
            } else {
                last = a;
                depth += 1;
                limit = lg((a - first) as SaIndex);
            }
            continue;
        }

        let piv = pivot(t, pa, depth, ss, first, last);
        let v = td(t, pa, depth, ss[piv]);
        ss.swap(first, piv);

        let mut b = first;
        let mut x;
        loop {
            b += 1;
            if b >= last {
                break;
            }
            x = td(t, pa, depth, ss[b]);
            if x != v {
                break;
            }
        }
        let mut a = b;
        if a < last && x < v {
            loop {
                b += 1;
                if b >= last {
                    break;
                }
                x = td(t, pa, depth, ss[b]);
                if x > v {
                    break;
                }
                if x == v {
                    ss.swap(b, a);
                    a += 1;
                }
            }
        }
        let mut c = last;
        loop {
            if b >= c {
                break;
            }
            c -= 1;
            x = td(t, pa, depth, ss[c]);
            if x != v {
                break;
            }
        }
        let mut d = c;
        if b < d && x > v {
            loop {
                if b >= c {
                    break;
                }
                c -= 1;
                x = td(t, pa, depth, ss[c]);
                if x < v {
                    break;
                }
                if x == v {
                    ss.swap(c, d);
                    d -= 1;
                }
            }
        }
        while b < c {
            ss.swap(b, c);
            loop {
                b += 1;
                if b >= c {
                    break;
                }
                x = td(t, pa, depth, ss[b]);
                if x > v {
                    break;
                }
                if x == v {
                    ss.swap(b, a);
                    a += 1;
                }
            }
            loop {
                if b >= c {
                    break;
                }
                c -= 1;
                x = td(t, pa, depth, ss[c]);
                if x < v {
                    break;
                }
                if x == v {
                    ss.swap(c, d);
                    d -= 1;
                }
            }
        }

        if a <= d {
            c = b - 1;

            let mut s = a - first;
            let mut tt = b - a;
            if s > tt {
                s = tt;
            }
            let (mut e, mut f) = (first, b - s);
            while s > 0 {
                ss.swap(e, f);
                s -= 1;
                e += 1;
                f += 1;
            }
            s = d - c;
            tt = last - d - 1;
            if s > tt {
                s = tt;
            }
            let (mut e, mut f) = (b, last - s);
            while s > 0 {
                ss.swap(e, f);
                s -= 1;
                e += 1;
                f += 1;
            }

            a = first + (b - a);
            c = last - (d - c);
            b = if v <= td_prev(t, pa, depth, ss[a]) {
                a
            } else {
                substring_partition(pa, ss, a, c, depth)
            };

            if a - first <= last - c {
                if last - c <= c - b {
                    stack.push(Frame { first: b, last: c, depth: depth + 1, limit: lg((c - b) as SaIndex) });
                    stack.push(Frame { first: c, last, depth, limit });
                    last = a;
                } else if a - first <= c - b {
                    stack.push(Frame { first: c, last, depth, limit });
                    stack.push(Frame { first: b, last: c, depth: depth + 1, limit: lg((c - b) as SaIndex) });
                    last = a;
                } else {
                    stack.push(Frame { first: c, last, depth, limit });
                    stack.push(Frame { first, last: a, depth, limit });
                    first = b;
                    last = c;
                    depth += 1;
                    limit = lg((c - b) as SaIndex);
                }
            } else if a - first <= c - b {
                stack.push(Frame { first: b, last: c, depth: depth + 1, limit: lg((c - b) as SaIndex) });
                stack.push(Frame { first, last: a, depth, limit });
                first = c;
            } else if last - c <= c - b {
                stack.push(Frame { first, last: a, depth, limit });
                stack.push(Frame { first: b, last: c, depth: depth + 1, limit: lg((c - b) as SaIndex) });
                first = c;
            } else {
                stack.push(Frame { first, last: a, depth, limit });
                stack.push(Frame { first: c, last, depth, limit });
                first = b;
                last = c;
                depth += 1;
                limit = lg((c - b) as SaIndex);
            }
        } else {
            limit += 1;
            if td_prev(t, pa, depth, ss[first]) < v {
                first = substring_partition(pa, ss, first, last, depth);
                limit = lg((last - first) as SaIndex);
            }
            depth += 1;
        }
    }
}

fn block_swap(ss: &mut [SaIndex], first1: usize, first2: usize, size: usize) {
    for i in 0..size {
        ss.swap(first1 + i, first2 + i);
    }
}

#[allow(clippy::too_many_arguments)]
fn merge_forward(
    t: &[u8],
    pa: &[SaIndex],
    ss: &mut [SaIndex],
    buf: &mut [SaIndex],
    first: usize,
    middle: usize,
    last: usize,
    depth: SaIndex,
) {
    let bufend = (middle - first) - 1;
    for idx in 0..(middle - first) {
        buf[idx] = ss[first + idx];
    }

    let tmp = ss[first];
    let mut i = first;
    let mut j = 0usize;
    let mut k = middle;
    loop {
        let r = compare(t, pa, buf[j], ss[k], depth);
        if r < 0 {
            loop {
                ss[i] = buf[j];
                i += 1;
                if j >= bufend {
                    buf[j] = tmp;
                    return;
                }
                buf[j] = ss[i];
                if buf[j] >= 0 {
                    break;
                }
            }
        } else if r > 0 {
            loop {
                ss[i] = ss[k];
                i += 1;
                ss[k] = ss[i];
                k += 1;
                if k >= last {
                    while j < bufend {
                        ss[i] = buf[j];
                        i += 1;
                        buf[j] = ss[i];
                        j += 1;
                    }
                    ss[i] = buf[j];
                    buf[j] = tmp;
                    return;
                }
                if ss[k] >= 0 {
                    break;
                }
            }
        } else {
            ss[k] = !ss[k];
            loop {
                ss[i] = buf[j];
                i += 1;
                if j >= bufend {
                    buf[j] = tmp;
                    return;
                }
                buf[j] = ss[i];
                if buf[j] >= 0 {
                    break;
                }
            }
            loop {
                ss[i] = ss[k];
                i += 1;
                ss[k] = ss[i];
                k += 1;
                if k >= last {
                    while j < bufend {
                        ss[i] = buf[j];
                        i += 1;
                        buf[j] = ss[i];
                        j += 1;
                    }
                    ss[i] = buf[j];
                    buf[j] = tmp;
                    return;
                }
                if ss[k] >= 0 {
                    break;
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn merge_backward(
    t: &[u8],
    pa: &[SaIndex],
    ss: &mut [SaIndex],
    buf: &mut [SaIndex],
    first: usize,
    middle: usize,
    last: usize,
    depth: SaIndex,
) {
    let bufend = last - middle;
    for idx in 0..(last - middle) {
        buf[idx] = ss[middle + idx];
    }

    let mut x = 0u8;
    let mut p1 = if buf[bufend - 1] < 0 {
        x |= 1;
        !buf[bufend - 1]
    } else {
        buf[bufend - 1]
    };
    let mut p2 = if ss[middle - 1] < 0 {
        x |= 2;
        !ss[middle - 1]
    } else {
        ss[middle - 1]
    };

    let tmp = ss[last - 1];
    let mut i = last - 1;
    let mut j = bufend - 1;
    let mut k = middle - 1;
    loop {
        let r = compare(t, pa, p1, p2, depth);
        if r > 0 {
            if x & 1 != 0 {
                loop {
                    ss[i] = buf[j];
                    i -= 1;
                    buf[j] = ss[i];
                    if j == 0 || buf[j] >= 0 {
                        break;
                    }
                    j -= 1;
                }
                x ^= 1;
            }
            ss[i] = buf[j];
            i -= 1;
            if j == 0 {
                buf[j] = tmp;
                return;
            }
            j -= 1;
            buf[j] = ss[i];

            p1 = if buf[j] < 0 {
                x |= 1;
                !buf[j]
            } else {
                buf[j]
            };
        } else if r < 0 {
            if x & 2 != 0 {
                loop {
                    ss[i] = ss[k];
                    i -= 1;
                    ss[k] = ss[i];
                    if k == 0 || ss[k] >= 0 {
                        break;
                    }
                    k -= 1;
                }
                x ^= 2;
            }
            ss[i] = ss[k];
            i -= 1;
            ss[k] = ss[i];
            if k == first {
                while j > 0 {
                    j -= 1;
                    ss[i] = buf[j];
                    i -= 1;
                    buf[j] = ss[i];
                }
                ss[i] = buf[j];
                buf[j] = tmp;
                return;
            }
            k -= 1;

            p2 = if ss[k] < 0 {
                x |= 2;
                !ss[k]
            } else {
                ss[k]
            };
        } else {
            if x & 1 != 0 {
                loop {
                    ss[i] = buf[j];
                    i -= 1;
                    buf[j] = ss[i];
                    if j == 0 || buf[j] >= 0 {
                        break;
                    }
                    j -= 1;
                }
                x ^= 1;
            }
            ss[i] = !buf[j];
            i -= 1;
            if j == 0 {
                buf[j] = tmp;
                return;
            }
            j -= 1;
            buf[j] = ss[i];

            if x & 2 != 0 {
                loop {
                    ss[i] = ss[k];
                    i -= 1;
                    ss[k] = ss[i];
                    if k == 0 || ss[k] >= 0 {
                        break;
                    }
                    k -= 1;
                }
                x ^= 2;
            }
            ss[i] = ss[k];
            i -= 1;
            ss[k] = ss[i];
            if k == first {
                while j > 0 {
                    j -= 1;
                    ss[i] = buf[j];
                    i -= 1;
                    buf[j] = ss[i];
                }
                ss[i] = buf[j];
                buf[j] = tmp;
                return;
            }
            k -= 1;

            p1 = if buf[j] < 0 {
                x |= 1;
                !buf[j]
            } else {
                buf[j]
            };
            p2 = if ss[k] < 0 {
                x |= 2;
                !ss[k]
            } else {
                ss[k]
            };
        }
    }
}

struct MergeFrame {
    first: usize,
    middle: usize,
    last: usize,
    check: i32,
}

fn merge_check_equal(t: &[u8], pa: &[SaIndex], ss: &mut [SaIndex], a: usize, depth: SaIndex) {
    if a > 0 && ss[a] >= 0 && compare(t, pa, get_idx(ss[a - 1]), ss[a], depth) == 0 {
        ss[a] = !ss[a];
    }
}

/// Balanced divide-and-conquer merge of `[first,middle)` with
/// `[middle,last)`, using an internal rotation buffer when either side fits.
#[allow(clippy::too_many_arguments)]
fn merge(
    t: &[u8],
    pa: &[SaIndex],
    ss: &mut [SaIndex],
    mut first: usize,
    mut middle: usize,
    mut last: usize,
    buf: &mut [SaIndex],
    bufsize: usize,
    depth: SaIndex,
) {
    let mut stack: Vec<MergeFrame> = Vec::with_capacity(STACK_SIZE);
    let mut check = 0i32;

    loop {
        if last - middle <= bufsize {
            if first < middle && middle < last {
                merge_backward(t, pa, ss, buf, first, middle, last, depth);
            }
            if check & 1 != 0 {
                merge_check_equal(t, pa, ss, first, depth);
            }
            if check & 2 != 0 {
                merge_check_equal(t, pa, ss, last, depth);
            }
            match stack.pop() {
                Some(f) => {
                    first = f.first;
                    middle = f.middle;
                    last = f.last;
                    check = f.check;
                    continue;
                }
                None => return,
            }
        }

        if middle - first <= bufsize {
            if first < middle {
                merge_forward(t, pa, ss, buf, first, middle, last, depth);
            }
            if check & 1 != 0 {
                merge_check_equal(t, pa, ss, first, depth);
            }
            if check & 2 != 0 {
                merge_check_equal(t, pa, ss, last, depth);
            }
            match stack.pop() {
                Some(f) => {
                    first = f.first;
                    middle = f.middle;
                    last = f.last;
                    check = f.check;
                    continue;
                }
                None => return,
            }
        }

        let mut m = 0usize;
        let mut len = std::cmp::min(middle - first, last - middle);
        let mut half = len >> 1;
        while len > 0 {
            if compare(t, pa, get_idx(ss[middle + m + half]), get_idx(ss[middle - m - half - 1]), depth) < 0 {
                m += half + 1;
                half -= if len & 1 == 0 { 1 } else { 0 };
            }
            len = half;
            half >>= 1;
        }

        if m > 0 {
            block_swap(ss, middle - m, middle, m);
            let mut i = middle;
            let mut j = middle;
            let mut next = 0i32;
            if middle + m < last {
                if ss[middle + m] < 0 {
                    while i > first && ss[i - 1] < 0 {
                        i -= 1;
                    }
                    ss[middle + m] = !ss[middle + m];
                }
                j = middle;
                while ss[j] < 0 {
                    j += 1;
                }
                next = 1;
            }
            if i - first <= last - j {
                stack.push(MergeFrame { first: j, middle: middle + m, last, check: (check & 2) | (next & 1) });
                last = i;
                middle -= m;
                check &= 1;
            } else {
                let next2 = if i == middle && middle == j { next << 1 } else { next };
                stack.push(MergeFrame { first, middle: middle - m, last: i, check: (check & 1) | (next2 & 2) });
                first = j;
                middle += m;
                check = (check & 2) | (next2 & 1);
            }
        } else {
            if check & 1 != 0 {
                merge_check_equal(t, pa, ss, first, depth);
            }
            merge_check_equal(t, pa, ss, middle, depth);
            if check & 2 != 0 {
                merge_check_equal(t, pa, ss, last, depth);
            }
            match stack.pop() {
                Some(f) => {
                    first = f.first;
                    middle = f.middle;
                    last = f.last;
                    check = f.check;
                }
                None => return,
            }
        }
    }
}

/// Sorts `ss[first..last)` (indices into `pa`) into lexicographic order of
/// the B* substrings they name, block-wise with balanced merges.
#[allow(clippy::too_many_arguments)]
pub(crate) fn substring_sort(
    t: &[u8],
    pa: &[SaIndex],
    ss: &mut [SaIndex],
    first_in: usize,
    last: usize,
    buf: &mut [SaIndex],
    bufsize: usize,
    depth: SaIndex,
    lastsuffix: bool,
) {
    let first = if lastsuffix { first_in + 1 } else { first_in };

    let mut a = first;
    let mut i = 0usize;
    while a + SS_BLOCKSIZE < last {
        multikey_introsort(t, pa, ss, a, a + SS_BLOCKSIZE, depth);
        let (mut curbuf_is_buf, mut curbufsize, mut curbuf_off) = (false, last - (a + SS_BLOCKSIZE), a + SS_BLOCKSIZE);
        if curbufsize <= bufsize {
            curbuf_is_buf = true;
            curbufsize = bufsize;
            curbuf_off = 0;
        }
        let mut b = a;
        let mut k = SS_BLOCKSIZE;
        let mut j = i;
        while j & 1 != 0 {
            if curbuf_is_buf {
                merge(t, pa, ss, b - k, b, b + k, buf, curbufsize, depth);
            } else {
                let (left, right) = ss.split_at_mut(curbuf_off);
                merge(t, pa, left, b - k, b, b + k, right, curbufsize, depth);
            }
            b -= k;
            k <<= 1;
            j >>= 1;
        }
        a += SS_BLOCKSIZE;
        i += 1;
    }
    multikey_introsort(t, pa, ss, a, last, depth);

    let mut k = SS_BLOCKSIZE;
    let mut i = i;
    while i != 0 {
        if i & 1 != 0 {
            merge(t, pa, ss, a - k, a, last, buf, bufsize, depth);
            a -= k;
        }
        k <<= 1;
        i >>= 1;
    }

    if lastsuffix {
        let last_bstar = ss[first - 1];
        let mut a = first;
        while a < last && (ss[a] < 0 || compare(t, pa, last_bstar, ss[a], depth) > 0) {
            ss[a - 1] = ss[a];
            a += 1;
        }
        ss[a - 1] = last_bstar;
    }
}
