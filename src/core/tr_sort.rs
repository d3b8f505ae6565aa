//! Tandem-repeat-aware rank refinement for B* suffixes.
//!
//! `ss` (the reference's `SA`) holds B*-index values in `0..m`; `isa` (the
//! reference's `ISA`) holds, for each B*-index, the rank of its equal-key
//! group. `isad` is not a second array — it is the *same* `isa` array read
//! at an offset of `isad` positions, exactly mirroring the reference's
//! `ISAd = ISA + depth` pointer trick: the offset doubles (Larsson-Sadakane
//! fallback) or grows by one translated substring level (budgeted
//! introsort) as refinement proceeds.

use super::compare::{lg, LS_INSERTIONSORT_THRESHOLD, STACK_SIZE, TR_INSERTIONSORT_THRESHOLD};
use crate::SaIndex;

#[inline]
fn isa_at(isa: &[SaIndex], isad: SaIndex, v: SaIndex) -> SaIndex {
    isa[(isad + v) as usize]
}

fn fixdown(isa: &[SaIndex], isad: SaIndex, ss: &mut [SaIndex], mut i: usize, size: usize) {
    let v = ss[i];
    let c = isa_at(isa, isad, v);
    loop {
        let j = 2 * i + 1;
        if j >= size {
            break;
        }
        let mut k = j;
        let mut d = isa_at(isa, isad, ss[k]);
        if j + 1 < size {
            let e = isa_at(isa, isad, ss[j + 1]);
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

fn heapsort(isa: &[SaIndex], isad: SaIndex, ss: &mut [SaIndex], size: usize) {
    let mut m = size;
    if size % 2 == 0 {
        m -= 1;
        if isa_at(isa, isad, ss[m / 2]) < isa_at(isa, isad, ss[m]) {
            ss.swap(m, m / 2);
        }
    }
    if m > 0 {
        let mut i = m / 2;
        loop {
            if i == 0 {
                fixdown(isa, isad, ss, 0, m);
                break;
            }
            i -= 1;
            fixdown(isa, isad, ss, i, m);
        }
    }
    if size % 2 == 0 {
        ss.swap(0, m);
        fixdown(isa, isad, ss, 0, m);
    }
    let mut i = m;
    while i > 1 {
        i -= 1;
        let t = ss[0];
        ss[0] = ss[i];
        fixdown(isa, isad, ss, 0, i);
        ss[i] = t;
    }
}

fn insertion_sort(isa: &[SaIndex], isad: SaIndex, ss: &mut [SaIndex], first: usize, last: usize) {
    let mut a = first + 1;
    while a < last {
        let t = ss[a];
        let mut b = a;
        let mut r;
        loop {
            if b == first {
                r = 1;
                break;
            }
            r = (isa_at(isa, isad, t) - isa_at(isa, isad, ss[b - 1])).signum() as i32;
            if r >= 0 {
                break;
            }
            loop {
                ss[b] = ss[b - 1];
                if b - 1 <= first || ss[b - 1] < 0 {
                    break;
                }
                b -= 1;
            }
            if b <= first {
                break;
            }
            b -= 1;
        }
        if r == 0 {
            ss[b - 1] = !ss[b - 1];
        }
        ss[b] = t;
        a += 1;
    }
}

fn median3(isa: &[SaIndex], isad: SaIndex, ss: &[SaIndex], mut v1: usize, mut v2: usize, v3: usize) -> usize {
    if isa_at(isa, isad, ss[v1]) > isa_at(isa, isad, ss[v2]) {
        std::mem::swap(&mut v1, &mut v2);
    }
    if isa_at(isa, isad, ss[v2]) > isa_at(isa, isad, ss[v3]) {
        return if isa_at(isa, isad, ss[v1]) > isa_at(isa, isad, ss[v3]) {
            v1
        } else {
            v3
        };
    }
    v2
}

#[allow(clippy::too_many_arguments)]
fn median5(
    isa: &[SaIndex],
    isad: SaIndex,
    ss: &[SaIndex],
    mut v1: usize,
    mut v2: usize,
    mut v3: usize,
    mut v4: usize,
    mut v5: usize,
) -> usize {
    if isa_at(isa, isad, ss[v2]) > isa_at(isa, isad, ss[v3]) {
        std::mem::swap(&mut v2, &mut v3);
    }
    if isa_at(isa, isad, ss[v4]) > isa_at(isa, isad, ss[v5]) {
        std::mem::swap(&mut v4, &mut v5);
    }
    if isa_at(isa, isad, ss[v2]) > isa_at(isa, isad, ss[v4]) {
        std::mem::swap(&mut v2, &mut v4);
        std::mem::swap(&mut v3, &mut v5);
    }
    if isa_at(isa, isad, ss[v1]) > isa_at(isa, isad, ss[v3]) {
        std::mem::swap(&mut v1, &mut v3);
    }
    if isa_at(isa, isad, ss[v1]) > isa_at(isa, isad, ss[v4]) {
        std::mem::swap(&mut v1, &mut v4);
        std::mem::swap(&mut v3, &mut v5);
    }
    if isa_at(isa, isad, ss[v3]) > isa_at(isa, isad, ss[v4]) {
        return v4;
    }
    v3
}

fn pivot(isa: &[SaIndex], isad: SaIndex, ss: &[SaIndex], first: usize, last: usize) -> usize {
    let mut span = last - first;
    let middle = first + span / 2;
    if span <= 512 {
        return if span <= 32 {
            median3(isa, isad, ss, first, middle, last - 1)
        } else {
            span >>= 2;
            median5(isa, isad, ss, first, first + span, middle, last - 1 - span, last - 1)
        };
    }
    span >>= 3;
    let a = median3(isa, isad, ss, first, first + span, first + (span << 1));
    let b = median3(isa, isad, ss, middle - span, middle, middle + span);
    let c = median3(isa, isad, ss, last - 1 - (span << 1), last - 1 - span, last - 1);
    median3(isa, isad, ss, a, b, c)
}

/// Assigns every element of a freshly bounded group its final rank
/// (`position - 1`), and marks singleton groups with the negation sentinel.
fn ls_updategroup(isa: &mut [SaIndex], ss: &mut [SaIndex], first: usize, last: usize) {
    let mut a = first;
    while a < last {
        if ss[a] >= 0 {
            let b = a;
            loop {
                isa[ss[a] as usize] = a as SaIndex;
                a += 1;
                if a >= last || ss[a] < 0 {
                    break;
                }
            }
            // negative skip marker: later doubling rounds jump over this
            // finalized run in O(1) (mirrors `*b = b - a`).
            ss[b] = (b as SaIndex) - (a as SaIndex);
            if a >= last {
                break;
            }
        }
        let b = a;
        loop {
            ss_neg_step(ss, &mut a);
            if a + 1 >= ss.len() || ss[a] >= 0 {
                break;
            }
        }
        let t = a as SaIndex;
        let mut c = b;
        loop {
            isa[ss_abs(ss, c) as usize] = t;
            c += 1;
            if c > a {
                break;
            }
        }
    }
}

#[inline]
fn ss_neg_step(_ss: &[SaIndex], a: &mut usize) {
    *a += 1;
}

#[inline]
fn ss_abs(ss: &[SaIndex], i: usize) -> SaIndex {
    if ss[i] >= 0 {
        ss[i]
    } else {
        !ss[i]
    }
}

enum Frame {
    Ls { first: usize, last: usize, limit: SaIndex },
}

fn ls_introsort(isa: &mut [SaIndex], isad: SaIndex, ss: &mut [SaIndex], first_in: usize, last_in: usize) {
    let mut stack: Vec<Frame> = Vec::with_capacity(STACK_SIZE);
    let mut first = first_in;
    let mut last = last_in;
    let mut limit = lg((last - first) as SaIndex);

    loop {
        if last - first <= LS_INSERTIONSORT_THRESHOLD {
            if last - first > 1 {
                insertion_sort(isa, isad, ss, first, last);
                ls_updategroup(isa, ss, first, last);
            } else if last - first == 1 {
                ss[first] = -1;
            }
            match stack.pop() {
                Some(Frame::Ls { first: f, last: l, limit: lm }) => {
                    first = f;
                    last = l;
                    limit = lm;
                    continue;
                }
                None => return,
            }
        }

        if limit == 0 {
            heapsort(isa, isad, ss, last - first);
            let mut a = last - 1;
            while first < a {
                let x = isa_at(isa, isad, ss[a]);
                let mut b = a;
                while b > first && isa_at(isa, isad, ss[b - 1]) == x {
                    b -= 1;
                    ss[b] = !ss[b];
                }
                a = b;
                if a == first {
                    break;
                }
                a -= 1;
            }
            ls_updategroup(isa, ss, first, last);
            match stack.pop() {
                Some(Frame::Ls { first: f, last: l, limit: lm }) => {
                    first = f;
                    last = l;
                    limit = lm;
                    continue;
                }
                None => return,
            }
        } else {
            limit -= 1;
        }

        let piv = pivot(isa, isad, ss, first, last);
        ss.swap(first, piv);
        let v = isa_at(isa, isad, ss[first]);

        let mut b = first;
        let mut x;
        loop {
            b += 1;
            if b >= last {
                break;
            }
            x = isa_at(isa, isad, ss[b]);
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
                x = isa_at(isa, isad, ss[b]);
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
            x = isa_at(isa, isad, ss[c]);
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
                x = isa_at(isa, isad, ss[c]);
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
                x = isa_at(isa, isad, ss[b]);
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
                x = isa_at(isa, isad, ss[c]);
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
            b = last - (d - c);

            let rank_a = (a as SaIndex) - 1;
            for c in first..a {
                isa[ss[c] as usize] = rank_a;
            }
            if b < last {
                let rank_b = (b as SaIndex) - 1;
                for c in a..b {
                    isa[ss[c] as usize] = rank_b;
                }
            }
            if b - a == 1 {
                ss[a] = -1;
            }

            if a - first <= last - b {
                if first < a {
                    stack.push(Frame::Ls { first: b, last, limit });
                    last = a;
                } else {
                    first = b;
                }
            } else if b < last {
                stack.push(Frame::Ls { first, last: a, limit });
                first = b;
            } else {
                last = a;
            }
        } else {
            match stack.pop() {
                Some(Frame::Ls { first: f, last: l, limit: lm }) => {
                    first = f;
                    last = l;
                    limit = lm;
                }
                None => return,
            }
        }
    }
}

/// Larsson-Sadakane doubling-depth fallback: refines by doubling the rank
/// offset each outer round until every group in `ss[0..n)` is a singleton.
pub(crate) fn lssort(isa: &mut [SaIndex], ss: &mut [SaIndex], n: usize) {
    let mut isad: SaIndex = 1; // depth=1 matches the driver's starting depth
    while -(n as SaIndex) < ss[0] {
        let mut first = 0usize;
        let mut skip: SaIndex = 0;
        loop {
            let t = ss[first];
            if t < 0 {
                first += (-t) as usize;
                skip += t;
            } else {
                if skip != 0 {
                    ss[(first as SaIndex + skip) as usize] = skip;
                    skip = 0;
                }
                let last = (isa[t as usize] + 1) as usize;
                ls_introsort(isa, isad, ss, first, last);
                first = last;
            }
            if first >= n {
                break;
            }
        }
        if skip != 0 {
            ss[(first as SaIndex + skip) as usize] = skip;
        }
        isad += isad;
    }
}

/// Binary partition around `v = ISAd[last-1]` (the group's own terminal
/// rank): used to detect and exploit tandem repeats.
fn tr_partition(
    isa: &[SaIndex],
    isad: SaIndex,
    ss: &mut [SaIndex],
    first: usize,
    last: usize,
    v: SaIndex,
) -> (usize, usize) {
    let mut b = first;
    let mut x;
    loop {
        x = isa_at(isa, isad, ss[b]);
        if x != v {
            break;
        }
        b += 1;
        if b >= last {
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
            x = isa_at(isa, isad, ss[b]);
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
        x = isa_at(isa, isad, ss[c]);
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
            x = isa_at(isa, isad, ss[c]);
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
            x = isa_at(isa, isad, ss[b]);
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
            x = isa_at(isa, isad, ss[c]);
            if x < v {
                break;
            }
            if x == v {
                ss.swap(c, d);
                d -= 1;
            }
        }
    }

    let (mut rfirst, mut rlast) = (first, last);
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
        rfirst += b - a;
        rlast -= d - c;
    }
    (rfirst, rlast)
}

/// Refines the middle (tandem-repeat) partition by copying already-resolved
/// ranks in from its sorted left/right neighbours.
fn tr_copy(isa: &mut [SaIndex], ss: &mut [SaIndex], first: usize, a: usize, b: usize, last: usize, depth: SaIndex) {
    let v = (b as SaIndex) - 1;

    let mut c = first as isize;
    let mut d = a as isize - 1;
    while c <= d {
        let raw = ss[c as usize] - depth;
        if raw >= 0 && isa[raw as usize] == v {
            d += 1;
            ss[d as usize] = raw;
            isa[raw as usize] = d as SaIndex;
        }
        c += 1;
    }

    let mut c = last as isize - 1;
    let e = d + 1;
    let mut d = b as isize;
    while e < d {
        let raw = ss[c as usize] - depth;
        if raw >= 0 && isa[raw as usize] == v {
            d -= 1;
            ss[d as usize] = raw;
            isa[raw as usize] = d as SaIndex;
        }
        c -= 1;
    }
}

enum TrFrame {
    Plain { isad: SaIndex, first: usize, last: usize, limit: SaIndex },
    TandemCopy { isad: SaIndex, first: usize, last: usize, a: usize, b: usize },
}

struct Budget {
    budget: SaIndex,
    chance: u32,
    size: SaIndex,
}

impl Budget {
    /// Returns true if the chance counter has just been exhausted and the
    /// caller must abandon introsort for the Larsson-Sadakane fallback.
    fn charge(&mut self, n: SaIndex) -> bool {
        self.budget -= n;
        if self.budget <= 0 {
            self.chance -= 1;
            if self.chance == 0 {
                return true;
            }
            self.budget += self.size;
        }
        false
    }
}

/// Budgeted multikey introsort over `ISAd` with tandem-repeat detection.
/// Returns `false` if the budget/chance mechanism forced an early exit.
#[allow(clippy::too_many_arguments)]
fn tr_introsort(
    isa: &mut [SaIndex],
    isad_start: SaIndex,
    ss: &mut [SaIndex],
    first_in: usize,
    last_in: usize,
    budget: &mut Budget,
) -> bool {
    let mut stack: Vec<TrFrame> = Vec::with_capacity(STACK_SIZE);
    let mut isad = isad_start;
    let mut first = first_in;
    let mut last = last_in;
    let mut limit = lg((last - first) as SaIndex);

    loop {
        if limit < 0 {
            if limit == -1 {
                // tandem repeat partition
                if budget.charge((last - first) as SaIndex) {
                    break;
                }
                let v = (last as SaIndex) - 1;
                let (a, b) = tr_partition(isa, isad - 1, ss, first, last, v);

                if a < last {
                    let rank = (a as SaIndex) - 1;
                    for c in first..a {
                        isa[ss[c] as usize] = rank;
                    }
                }
                if b < last {
                    let rank = (b as SaIndex) - 1;
                    for c in a..b {
                        isa[ss[c] as usize] = rank;
                    }
                }

                stack.push(TrFrame::TandemCopy { isad: isad - 1, first, last, a, b });

                if a - first <= last - b {
                    if a - first > 1 {
                        stack.push(TrFrame::Plain { isad, first: b, last, limit: lg((last - b) as SaIndex) });
                        last = a;
                        limit = lg((a - first) as SaIndex);
                    } else if last - b > 1 {
                        first = b;
                        limit = lg((last - b) as SaIndex);
                    } else {
                        match pop_plain(&mut stack, isa, ss) {
                            Some((i2, f2, l2, lm2)) => {
                                isad = i2;
                                first = f2;
                                last = l2;
                                limit = lm2;
                                continue;
                            }
                            None => return true,
                        }
                    }
                } else if last - b > 1 {
                    stack.push(TrFrame::Plain { isad, first, last: a, limit: lg((a - first) as SaIndex) });
                    first = b;
                    limit = lg((last - b) as SaIndex);
                } else if a - first > 1 {
                    last = a;
                    limit = lg((a - first) as SaIndex);
                } else {
                    match pop_plain(&mut stack, isa, ss) {
                        Some((i2, f2, l2, lm2)) => {
                            isad = i2;
                            first = f2;
                            last = l2;
                            limit = lm2;
                            continue;
                        }
                        None => return true,
                    }
                }
            } else if limit == -2 {
                // handled via pop_plain's TandemCopy draining; unreachable
                // as a *current* state because tandem copies are executed
                // eagerly when popped (see pop_plain).
                match pop_plain(&mut stack, isa, ss) {
                    Some((i2, f2, l2, lm2)) => {
                        isad = i2;
                        first = f2;
                        last = l2;
                        limit = lm2;
                    }
                    None => return true,
                }
            } else {
                // sorted partition
                if ss[first] >= 0 {
                    let mut a = first;
                    loop {
                        isa[ss[a] as usize] = a as SaIndex;
                        a += 1;
                        if a >= last || ss[a] < 0 {
                            break;
                        }
                    }
                    first = a;
                }
                if first < last {
                    let mut a = first;
                    loop {
                        ss[a] = !ss[a];
                        a += 1;
                        if ss[a - 1 + 1 - 1] >= 0 {
                            // unreachable guard kept for structural parity
                        }
                        if a >= ss.len() || ss[a] >= 0 {
                            break;
                        }
                    }
                    // a now points one past the run's last (negated) entry
                    let next = if isa[ss[a] as usize] != isa_at(isa, isad, ss[a]) {
                        lg((a - first + 1) as SaIndex)
                    } else {
                        -1
                    };
                    a += 1;
                    if a < last {
                        let rank = (a as SaIndex) - 1;
                        for b in first..a {
                            isa[ss[b] as usize] = rank;
                        }
                    }
                    if a - first <= last - a {
                        stack.push(TrFrame::Plain { isad, first: a, last, limit: -3 });
                        isad += 1;
                        last = a;
                        limit = next;
                    } else if last - a > 1 {
                        stack.push(TrFrame::Plain { isad: isad + 1, first, last: a, limit: next });
                        first = a;
                        limit = -3;
                    } else {
                        isad += 1;
                        last = a;
                        limit = next;
                    }
                } else {
                    match pop_plain(&mut stack, isa, ss) {
                        Some((i2, f2, l2, lm2)) => {
                            isad = i2;
                            first = f2;
                            last = l2;
                            limit = lm2;
                        }
                        None => return true,
                    }
                }
            }
            continue;
        }

        if last - first <= TR_INSERTIONSORT_THRESHOLD {
            if budget.charge((last - first) as SaIndex) {
                break;
            }
            insertion_sort(isa, isad, ss, first, last);
            limit = -3;
            continue;
        }

        if limit == 0 {
            if budget.charge((last - first) as SaIndex) {
                break;
            }
            heapsort(isa, isad, ss, last - first);
            let mut a = last - 1;
            while first < a {
                let x = isa_at(isa, isad, ss[a]);
                let mut b = a;
                while b > first && isa_at(isa, isad, ss[b - 1]) == x {
                    b -= 1;
                    ss[b] = !ss[b];
                }
                a = b;
                if a == first {
                    break;
                }
                a -= 1;
            }
            limit = -3;
            continue;
        }
        limit -= 1;

        if budget.charge((last - first) as SaIndex) {
            break;
        }

        let piv = pivot(isa, isad, ss, first, last);
        ss.swap(first, piv);
        let v = isa_at(isa, isad, ss[first]);

        let mut b = first;
        let mut x;
        loop {
            b += 1;
            if b >= last {
                break;
            }
            x = isa_at(isa, isad, ss[b]);
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
                x = isa_at(isa, isad, ss[b]);
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
            x = isa_at(isa, isad, ss[c]);
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
                x = isa_at(isa, isad, ss[c]);
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
                x = isa_at(isa, isad, ss[b]);
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
                x = isa_at(isa, isad, ss[c]);
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
            b = last - (d - c);
            let next = if isa[ss[a] as usize] != v { lg((b - a) as SaIndex) } else { -1 };

            let rank_a = (a as SaIndex) - 1;
            for c in first..a {
                isa[ss[c] as usize] = rank_a;
            }
            if b < last {
                let rank_b = (b as SaIndex) - 1;
                for c in a..b {
                    isa[ss[c] as usize] = rank_b;
                }
            }

            if a - first <= last - b {
                if last - b <= b - a {
                    if a - first > 1 {
                        stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                        stack.push(TrFrame::Plain { isad, first: b, last, limit });
                        last = a;
                    } else if last - b > 1 {
                        stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                        first = b;
                    } else if b - a > 1 {
                        isad += 1;
                        first = a;
                        last = b;
                        limit = next;
                    } else {
                        match pop_plain(&mut stack, isa, ss) {
                            Some((i2, f2, l2, lm2)) => {
                                isad = i2;
                                first = f2;
                                last = l2;
                                limit = lm2;
                            }
                            None => return true,
                        }
                    }
                } else if a - first <= b - a {
                    if a - first > 1 {
                        stack.push(TrFrame::Plain { isad, first: b, last, limit });
                        stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                        last = a;
                    } else if b - a > 1 {
                        stack.push(TrFrame::Plain { isad, first: b, last, limit });
                        isad += 1;
                        first = a;
                        last = b;
                        limit = next;
                    } else {
                        first = b;
                    }
                } else if b - a > 1 {
                    stack.push(TrFrame::Plain { isad, first: b, last, limit });
                    stack.push(TrFrame::Plain { isad, first, last: a, limit });
                    isad += 1;
                    first = a;
                    last = b;
                    limit = next;
                } else {
                    stack.push(TrFrame::Plain { isad, first: b, last, limit });
                    last = a;
                }
            } else if a - first <= b - a {
                if last - b > 1 {
                    stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                    stack.push(TrFrame::Plain { isad, first, last: a, limit });
                    first = b;
                } else if a - first > 1 {
                    stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                    last = a;
                } else if b - a > 1 {
                    isad += 1;
                    first = a;
                    last = b;
                    limit = next;
                } else {
                    match pop_plain(&mut stack, isa, ss) {
                        Some((i2, f2, l2, lm2)) => {
                            isad = i2;
                            first = f2;
                            last = l2;
                            limit = lm2;
                        }
                        None => return true,
                    }
                }
            } else if last - b <= b - a {
                if last - b > 1 {
                    stack.push(TrFrame::Plain { isad, first, last: a, limit });
                    stack.push(TrFrame::Plain { isad: isad + 1, first: a, last: b, limit: next });
                    first = b;
                } else if b - a > 1 {
                    stack.push(TrFrame::Plain { isad, first, last: a, limit });
                    isad += 1;
                    first = a;
                    last = b;
                    limit = next;
                } else {
                    last = a;
                }
            } else if b - a > 1 {
                stack.push(TrFrame::Plain { isad, first, last: a, limit });
                stack.push(TrFrame::Plain { isad, first: b, last, limit });
                isad += 1;
                first = a;
                last = b;
                limit = next;
            } else {
                stack.push(TrFrame::Plain { isad, first, last: a, limit });
                first = b;
            }
        } else {
            limit += 1;
            isad += 1;
        }
    }

    for frame in &stack {
        if let TrFrame::Plain { first, last, limit: -3, .. } = frame {
            ls_updategroup(isa, ss, *first, *last);
        }
    }
    false
}

/// Pops the next frame, eagerly performing any pending tandem-repeat copy.
/// Returns `None` when the stack is exhausted (mirrors `STACK_POP`'s
/// early-return).
fn pop_plain(stack: &mut Vec<TrFrame>, isa: &mut [SaIndex], ss: &mut [SaIndex]) -> Option<(SaIndex, usize, usize, SaIndex)> {
    loop {
        match stack.pop()? {
            TrFrame::Plain { isad, first, last, limit } => return Some((isad, first, last, limit)),
            TrFrame::TandemCopy { isad, first, last, a, b } => {
                tr_copy(isa, ss, first, a, b, last, isad);
            }
        }
    }
}

/// Refines `isa`/`ss` (the rank/B*-index pair for `n` B* suffixes) into a
/// full permutation, falling back to Larsson-Sadakane doubling when the
/// budget/chance mechanism is exhausted.
pub(crate) fn trsort(isa: &mut [SaIndex], ss: &mut [SaIndex], n: usize, depth: SaIndex) {
    if ss.is_empty() || !(-(n as SaIndex) < ss[0]) {
        return;
    }

    let mut first = 0usize;
    let mut skip: SaIndex = 0;
    let mut budget = Budget { budget: n as SaIndex, chance: (lg(n as SaIndex) * 2 / 3 + 1) as u32, size: n as SaIndex };

    loop {
        let t = ss[first];
        if t < 0 {
            first += (-t) as usize;
            skip += t;
        } else {
            skip = 0;
            let last = (isa[t as usize] + 1) as usize;
            if last - first > 1 {
                let exhausted = tr_introsort(isa, depth, ss, first, last, &mut budget);
                if exhausted {
                    if first > 0 {
                        ss[0] = -(first as SaIndex);
                    }
                    lssort(isa, ss, n);
                    return;
                }
            }
            first = last;
        }
        if first >= n {
            break;
        }
    }
    let _ = skip;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trsort_resolves_single_group() {
        // m = 1: the only B* suffix is trivially its own singleton group.
        let mut isa = vec![0isize; 4];
        let mut ss = vec![0isize];
        trsort(&mut isa, &mut ss, 1, 1);
        assert_eq!(ss, vec![0]);
    }
}
