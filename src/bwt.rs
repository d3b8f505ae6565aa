//! Forward and inverse Burrows-Wheeler Transform, plus the file-framing
//! helpers used to round-trip a BWT block through a byte stream.

use crate::core;
use crate::error::{Error, Result};
use crate::SaIndex;
use log::{debug, trace};
use std::io::{self, Read, Write};

const ALPHABET_SIZE: usize = 256;

/// Computes the Burrows-Wheeler Transform of `t`, returning the transformed
/// bytes and the primary index. Allocates fresh output and scratch buffers;
/// [`bwt_in_place`] avoids this when reusing buffers across calls.
pub fn bwt(t: &[u8]) -> Result<(Vec<u8>, SaIndex)> {
    let mut u = vec![0u8; t.len()];
    let mut sa = vec![0 as SaIndex; t.len() + 1];
    let idx = bwt_in_place(t, &mut u, &mut sa)?;
    Ok((u, idx))
}

/// Computes the Burrows-Wheeler Transform of `t` into `u` (same length as
/// `t`), returning the primary index. `sa` is scratch of length `t.len()+1`
/// and, on return, no longer holds a meaningful suffix array (mirrors
/// `divbwt`'s in-place reuse of its `A` buffer).
pub fn bwt_in_place(t: &[u8], u: &mut [u8], sa: &mut [SaIndex]) -> Result<SaIndex> {
    if u.len() != t.len() {
        return Err(Error::InvalidArgument("bwt output buffer must match input length"));
    }
    if sa.len() != t.len() + 1 {
        return Err(Error::InvalidArgument("bwt scratch buffer must have length n+1"));
    }
    trace!("computing bwt of {} bytes", t.len());
    let pidx = core::build_bwt(t, u, sa);
    debug!("bwt primary index = {}", pidx);
    Ok(pidx as SaIndex)
}

/// Inverts a Burrows-Wheeler Transform, returning the original string.
pub fn unbwt(t: &[u8], idx: SaIndex) -> Result<Vec<u8>> {
    let mut u = vec![0u8; t.len()];
    unbwt_in_place(t, &mut u, idx)?;
    Ok(u)
}

/// Inverts a Burrows-Wheeler Transform into caller-supplied `u` (same length
/// as `t`), avoiding an allocation when `u` is reused across calls.
pub fn unbwt_in_place(t: &[u8], u: &mut [u8], idx: SaIndex) -> Result<()> {
    let n = t.len();
    if u.len() != n {
        return Err(Error::InvalidArgument("unbwt output buffer must match input length"));
    }
    if n == 0 {
        return Ok(());
    }
    if idx < 0 || idx as usize > n || (idx == 0 && n > 1) {
        return Err(Error::InvalidArgument("unbwt primary index out of range"));
    }
    let idx = idx as usize;
    if n <= 1 {
        return Ok(());
    }

    let mut c = [0 as SaIndex; ALPHABET_SIZE];
    for &byte in t.iter() {
        c[byte as usize] += 1;
    }
    let mut sum: SaIndex = 0;
    for slot in c.iter_mut() {
        let cnt = *slot;
        *slot = sum;
        sum += cnt;
    }

    let mut b = vec![0 as SaIndex; n + 1];
    b[0] = idx as SaIndex;
    for i in 0..idx {
        c[t[i] as usize] += 1;
        b[c[t[i] as usize] as usize] = i as SaIndex;
    }
    for i in idx..n {
        c[t[i] as usize] += 1;
        b[c[t[i] as usize] as usize] = i as SaIndex + 1;
    }

    let mut d = [0 as SaIndex; ALPHABET_SIZE];
    let mut k = 0usize;
    let mut prev: SaIndex = 0;
    let mut first = true;
    for (i, &cnt) in c.iter().enumerate() {
        if first || prev != cnt {
            d[k] = i as SaIndex;
            prev = cnt;
            k += 1;
        }
        first = false;
    }

    let mut t_idx: SaIndex = 0;
    for out in u.iter_mut() {
        t_idx = b[t_idx as usize];
        *out = d[binary_search_counts(&c, k, t_idx)] as u8;
    }

    Ok(())
}

fn binary_search_counts(counts: &[SaIndex], len: usize, val: SaIndex) -> usize {
    let mut m = 0usize;
    let mut len = len;
    let mut half = len >> 1;
    while len > 0 {
        if counts[m + half] < val {
            m += half + 1;
            half -= if len & 1 == 0 { 1 } else { 0 };
        }
        len = half;
        half >>= 1;
    }
    m
}

/// Writes the one-time blocksize header that precedes every `write_bwt_block`
/// record in a stream, mirroring `bwt.c`'s single `fwrite(&blocksize, ...)`
/// before the per-block loop.
pub fn write_bwt_header<W: Write>(mut w: W, blocksize: i32) -> io::Result<()> {
    w.write_all(&blocksize.to_le_bytes())
}

/// Reads the blocksize header written by [`write_bwt_header`].
pub fn read_bwt_header<R: Read>(mut r: R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Writes one `(idx, transformed)` record. No per-record length is stored;
/// readers know how much data to expect from the stream's blocksize header,
/// except for the final record which may be short.
pub fn write_bwt_block<W: Write>(mut w: W, transformed: &[u8], idx: SaIndex) -> io::Result<()> {
    w.write_all(&(idx as i32).to_le_bytes())?;
    w.write_all(transformed)?;
    Ok(())
}

/// Reads one `(idx, transformed)` record written by [`write_bwt_block`].
/// `blocksize` is the stream's header value; the final block may contain
/// fewer than `blocksize` bytes. Returns `Ok(None)` at a clean end of
/// stream (no more records), mirroring `unbwt.c`'s `fread(&idx, ...) == 0`
/// loop termination.
pub fn read_bwt_block<R: Read>(mut r: R, blocksize: usize) -> io::Result<Option<(Vec<u8>, SaIndex)>> {
    let mut idx_buf = [0u8; 4];
    let mut filled = 0usize;
    while filled < idx_buf.len() {
        let n = r.read(&mut idx_buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated bwt block index"));
        }
        filled += n;
    }
    let idx = i32::from_le_bytes(idx_buf) as SaIndex;

    let mut data = vec![0u8; blocksize];
    let mut filled = 0usize;
    while filled < blocksize {
        let n = r.read(&mut data[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated bwt block data"));
    }
    data.truncate(filled);
    Ok(Some((data, idx)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bwt_roundtrip_banana() {
        let t = b"banana";
        let (u, idx) = bwt(t).unwrap();
        let back = unbwt(&u, idx).unwrap();
        assert_eq!(&back[..], &t[..]);
    }

    #[test]
    fn block_roundtrips_through_bytes() {
        let mut buf = Vec::new();
        write_bwt_header(&mut buf, 3).unwrap();
        write_bwt_block(&mut buf, b"xyz", 2).unwrap();
        let mut cursor = &buf[..];
        let blocksize = read_bwt_header(&mut cursor).unwrap();
        let (data, idx) = read_bwt_block(&mut cursor, blocksize as usize).unwrap().unwrap();
        assert_eq!(data, b"xyz");
        assert_eq!(idx, 2);
        assert!(read_bwt_block(&mut cursor, blocksize as usize).unwrap().is_none());
    }
}
