//! Block-parallel token primitives.
//!
//! Everything the scanner does in bulk goes through here: whitespace
//! skipping, stop-set searches, and the string/container skippers. The
//! algorithms are written once, generically, over a [`Chunk`] — a fixed-width
//! block of bytes that can classify itself into `u64` bitmasks — and
//! instantiated per ISA:
//!
//! - x86_64: SSE2 (baseline), AVX2 behind a runtime probe (`std` feature).
//! - aarch64: NEON (baseline).
//! - everywhere: a portable scalar block that the optimizer auto-vectorizes,
//!   which doubles as the reference kernel in tests.
//!
//! The probe runs once per scanner construction ([`Isa::detect`]); each
//! primitive then dispatches on the stored [`Isa`].
//!
//! Cursor convention: primitives that return a byte leave the cursor one past
//! it, so the returned byte sits at `data[pos - 1]`. A return of `0` means
//! the input was exhausted.

pub(crate) mod bits;
mod scalar;

#[cfg(all(target_arch = "x86_64", feature = "std"))]
mod avx2;
#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "x86_64")]
mod sse2;

use bits::{escaped_mask, lane_mask};

/// Padding (in bytes) that unlocks the unchecked whitespace fast path; at
/// least one block for the widest kernel.
pub(crate) const PADDING: usize = 64;

/// A fixed-width block of input bytes with bit-parallel classification.
///
/// Masks use one bit per lane in the low `LANES` bits of a `u64`, lane 0
/// being the lowest-addressed byte.
pub(crate) trait Chunk: Copy {
    /// Block width in bytes. At most 64.
    const LANES: usize;

    /// Load `LANES` bytes starting at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `LANES` bytes.
    unsafe fn load(ptr: *const u8) -> Self;

    /// Bit `i` set iff byte `i` equals `b`.
    fn eq(self, b: u8) -> u64;

    /// Bit `i` set iff byte `i` is JSON whitespace (space, tab, LF, CR).
    fn whitespace(self) -> u64;
}

/// Outcome of skipping over a JSON string body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StringStatus {
    /// Unterminated (EOF before the closing quote).
    Invalid,
    /// Terminated, and the body contains no backslash escapes.
    Clean,
    /// Terminated, and the body contains at least one escape.
    Escaped,
}

/// Instruction set chosen for the block kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Isa {
    /// Portable fallback; also the reference kernel for tests.
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Sse2,
    #[cfg(all(target_arch = "x86_64", feature = "std"))]
    Avx2,
    #[cfg(target_arch = "aarch64")]
    Neon,
}

impl Isa {
    /// Probe the host once and pick the widest available kernel.
    pub(crate) fn detect() -> Self {
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        if std::arch::is_x86_feature_detected!("avx2") {
            return Isa::Avx2;
        }
        #[cfg(target_arch = "x86_64")]
        {
            Isa::Sse2
        }
        #[cfg(target_arch = "aarch64")]
        {
            Isa::Neon
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Isa::Scalar
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatchers
// ---------------------------------------------------------------------------

/// Skip whitespace, clamping every read at `data.len()`.
pub(crate) fn skip_space_safe(data: &[u8], pos: &mut usize, isa: Isa) -> u8 {
    match isa {
        Isa::Scalar => skip_space_safe_impl::<scalar::ScalarChunk>(data, pos),
        #[cfg(target_arch = "x86_64")]
        Isa::Sse2 => skip_space_safe_impl::<sse2::Sse2Chunk>(data, pos),
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        // SAFETY: `Isa::Avx2` is only constructed after a successful probe.
        Isa::Avx2 => unsafe { avx2::skip_space_safe(data, pos) },
        #[cfg(target_arch = "aarch64")]
        Isa::Neon => skip_space_safe_impl::<neon::NeonChunk>(data, pos),
    }
}

/// Skip whitespace with full-block loads that may read past `data.len()`.
///
/// # Safety
///
/// At least [`PADDING`] readable bytes must follow `data`. Padding bytes are
/// never reported as tokens: a hit inside padding returns `0` with the cursor
/// clamped to `data.len()`.
pub(crate) unsafe fn skip_space_padded(data: &[u8], pos: &mut usize, isa: Isa) -> u8 {
    // SAFETY: forwarded contract — the caller guarantees the padding.
    unsafe {
        match isa {
            Isa::Scalar => skip_space_padded_impl::<scalar::ScalarChunk>(data, pos),
            #[cfg(target_arch = "x86_64")]
            Isa::Sse2 => skip_space_padded_impl::<sse2::Sse2Chunk>(data, pos),
            #[cfg(all(target_arch = "x86_64", feature = "std"))]
            Isa::Avx2 => avx2::skip_space_padded(data, pos),
            #[cfg(target_arch = "aarch64")]
            Isa::Neon => skip_space_padded_impl::<neon::NeonChunk>(data, pos),
        }
    }
}

/// Advance to the first byte in `stops`, returning it (cursor one past it),
/// or `0` at end of input.
pub(crate) fn get_next_token(data: &[u8], pos: &mut usize, stops: &[u8], isa: Isa) -> u8 {
    match isa {
        Isa::Scalar => get_next_token_impl::<scalar::ScalarChunk>(data, pos, stops),
        #[cfg(target_arch = "x86_64")]
        Isa::Sse2 => get_next_token_impl::<sse2::Sse2Chunk>(data, pos, stops),
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        // SAFETY: `Isa::Avx2` is only constructed after a successful probe.
        Isa::Avx2 => unsafe { avx2::get_next_token(data, pos, stops) },
        #[cfg(target_arch = "aarch64")]
        Isa::Neon => get_next_token_impl::<neon::NeonChunk>(data, pos, stops),
    }
}

/// Skip a string body. Precondition: `data[*pos - 1]` is the opening quote.
/// On success the cursor is one past the closing quote.
pub(crate) fn skip_string(data: &[u8], pos: &mut usize, isa: Isa) -> StringStatus {
    match isa {
        Isa::Scalar => skip_string_impl::<scalar::ScalarChunk>(data, pos),
        #[cfg(target_arch = "x86_64")]
        Isa::Sse2 => skip_string_impl::<sse2::Sse2Chunk>(data, pos),
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        // SAFETY: `Isa::Avx2` is only constructed after a successful probe.
        Isa::Avx2 => unsafe { avx2::skip_string(data, pos) },
        #[cfg(target_arch = "aarch64")]
        Isa::Neon => skip_string_impl::<neon::NeonChunk>(data, pos),
    }
}

/// Skip a container. Precondition: `data[*pos - 1] == open`. On success the
/// cursor is one past the matching `close`.
pub(crate) fn skip_container(data: &[u8], pos: &mut usize, open: u8, close: u8, isa: Isa) -> bool {
    match isa {
        Isa::Scalar => skip_container_impl::<scalar::ScalarChunk>(data, pos, open, close),
        #[cfg(target_arch = "x86_64")]
        Isa::Sse2 => skip_container_impl::<sse2::Sse2Chunk>(data, pos, open, close),
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        // SAFETY: `Isa::Avx2` is only constructed after a successful probe.
        Isa::Avx2 => unsafe { avx2::skip_container(data, pos, open, close) },
        #[cfg(target_arch = "aarch64")]
        Isa::Neon => skip_container_impl::<neon::NeonChunk>(data, pos, open, close),
    }
}

/// Skip one of `true` / `false` / `null`. Precondition: `data[*pos - 1]` is
/// `first`, which must be `t`, `f`, or `n`.
pub(crate) fn skip_literal(data: &[u8], pos: &mut usize, first: u8) -> bool {
    let rest: &[u8] = match first {
        b't' => b"rue",
        b'f' => b"alse",
        b'n' => b"ull",
        _ => return false,
    };
    if data.len() - *pos >= rest.len() && &data[*pos..*pos + rest.len()] == rest {
        *pos += rest.len();
        true
    } else {
        false
    }
}

// ---------------------------------------------------------------------------
// Generic block algorithms
// ---------------------------------------------------------------------------

/// Load the sub-block tail `data[*pos..]` (shorter than `C::LANES`) into a
/// zero-padded block. Padding bytes are `0`, which none of the byte classes
/// we test for contains, except that callers classifying *whitespace* must
/// intersect with the returned validity mask.
#[inline(always)]
fn load_tail<C: Chunk>(data: &[u8], pos: usize) -> (C, u64) {
    let mut buf = [0u8; 64];
    let n = data.len() - pos;
    buf[..n].copy_from_slice(&data[pos..]);
    // SAFETY: `buf` is 64 bytes and `C::LANES <= 64`.
    let chunk = unsafe { C::load(buf.as_ptr()) };
    (chunk, lane_mask(n as u32))
}

#[inline(always)]
fn skip_space_safe_impl<C: Chunk>(data: &[u8], pos: &mut usize) -> u8 {
    let len = data.len();
    while *pos + C::LANES <= len {
        // SAFETY: the bound above guarantees `LANES` readable bytes.
        let chunk = unsafe { C::load(data.as_ptr().add(*pos)) };
        let nonspace = !chunk.whitespace() & lane_mask(C::LANES as u32);
        if nonspace != 0 {
            *pos += nonspace.trailing_zeros() as usize;
            let b = data[*pos];
            *pos += 1;
            return b;
        }
        *pos += C::LANES;
    }
    while *pos < len {
        let b = data[*pos];
        *pos += 1;
        if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            return b;
        }
    }
    0
}

/// # Safety
///
/// At least `C::LANES` readable bytes must follow `data`.
#[inline(always)]
unsafe fn skip_space_padded_impl<C: Chunk>(data: &[u8], pos: &mut usize) -> u8 {
    let len = data.len();
    loop {
        // SAFETY: blocks stay within `len + C::LANES`; the first block that
        // overlaps the zero padding yields a non-space hit and terminates the
        // loop, so `*pos` never advances past `len`.
        let chunk = unsafe { C::load(data.as_ptr().add(*pos)) };
        let nonspace = !chunk.whitespace() & lane_mask(C::LANES as u32);
        if nonspace != 0 {
            let idx = *pos + nonspace.trailing_zeros() as usize;
            if idx >= len {
                *pos = len;
                return 0;
            }
            *pos = idx + 1;
            return data[idx];
        }
        *pos += C::LANES;
    }
}

#[inline(always)]
fn get_next_token_impl<C: Chunk>(data: &[u8], pos: &mut usize, stops: &[u8]) -> u8 {
    debug_assert!(stops.len() <= 8);
    let len = data.len();
    while *pos + C::LANES <= len {
        // SAFETY: the bound above guarantees `LANES` readable bytes.
        let chunk = unsafe { C::load(data.as_ptr().add(*pos)) };
        let mut hits = 0u64;
        for &s in stops {
            hits |= chunk.eq(s);
        }
        if hits != 0 {
            *pos += hits.trailing_zeros() as usize;
            let b = data[*pos];
            *pos += 1;
            return b;
        }
        *pos += C::LANES;
    }
    while *pos < len {
        let b = data[*pos];
        *pos += 1;
        if stops.contains(&b) {
            return b;
        }
    }
    0
}

#[inline(always)]
fn skip_string_impl<C: Chunk>(data: &[u8], pos: &mut usize) -> StringStatus {
    let len = data.len();
    let mut prev_escaped = 0u64;
    let mut has_escape = false;
    while *pos + C::LANES <= len {
        // SAFETY: the bound above guarantees `LANES` readable bytes.
        let chunk = unsafe { C::load(data.as_ptr().add(*pos)) };
        let backslash = chunk.eq(b'\\');
        let escaped = escaped_mask(backslash, &mut prev_escaped, C::LANES as u32);
        let quotes = chunk.eq(b'"') & !escaped;
        if quotes != 0 {
            let i = quotes.trailing_zeros();
            let before = lane_mask(i);
            has_escape |= (backslash | escaped) & before != 0;
            *pos += i as usize + 1;
            return if has_escape {
                StringStatus::Escaped
            } else {
                StringStatus::Clean
            };
        }
        has_escape |= backslash != 0 || escaped != 0;
        *pos += C::LANES;
    }
    if *pos < len {
        let (chunk, _valid) = load_tail::<C>(data, *pos);
        let backslash = chunk.eq(b'\\');
        let escaped = escaped_mask(backslash, &mut prev_escaped, C::LANES as u32);
        let quotes = chunk.eq(b'"') & !escaped;
        if quotes != 0 {
            let i = quotes.trailing_zeros();
            let before = lane_mask(i);
            has_escape |= (backslash | escaped) & before != 0;
            *pos += i as usize + 1;
            return if has_escape {
                StringStatus::Escaped
            } else {
                StringStatus::Clean
            };
        }
    }
    *pos = len;
    StringStatus::Invalid
}

#[inline(always)]
fn skip_container_impl<C: Chunk>(data: &[u8], pos: &mut usize, open: u8, close: u8) -> bool {
    let len = data.len();
    let mut depth = 1usize;
    let mut in_string = false;
    let mut prev_escaped = 0u64;
    loop {
        let chunk;
        if *pos + C::LANES <= len {
            // SAFETY: the bound above guarantees `LANES` readable bytes.
            chunk = unsafe { C::load(data.as_ptr().add(*pos)) };
        } else if *pos < len {
            chunk = load_tail::<C>(data, *pos).0;
        } else {
            break;
        }
        let backslash = chunk.eq(b'\\');
        let escaped = escaped_mask(backslash, &mut prev_escaped, C::LANES as u32);
        let quotes = chunk.eq(b'"') & !escaped;
        let opens = chunk.eq(open);
        let closes = chunk.eq(close);
        let mut pending = quotes | opens | closes;
        while pending != 0 {
            let i = pending.trailing_zeros() as usize;
            if *pos + i >= len {
                break;
            }
            let bit = 1u64 << i;
            if quotes & bit != 0 {
                in_string = !in_string;
            } else if !in_string {
                if opens & bit != 0 {
                    depth += 1;
                } else {
                    depth -= 1;
                    if depth == 0 {
                        *pos += i + 1;
                        return true;
                    }
                }
            }
            pending &= pending - 1;
        }
        *pos += C::LANES;
        if *pos >= len {
            break;
        }
    }
    *pos = len;
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn isas() -> Vec<Isa> {
        let mut v = vec![Isa::Scalar];
        #[cfg(target_arch = "x86_64")]
        v.push(Isa::Sse2);
        #[cfg(all(target_arch = "x86_64", feature = "std"))]
        if std::arch::is_x86_feature_detected!("avx2") {
            v.push(Isa::Avx2);
        }
        #[cfg(target_arch = "aarch64")]
        v.push(Isa::Neon);
        v
    }

    #[test]
    fn skip_space_stops_at_first_token() {
        for isa in isas() {
            let data = b"   \t\n\r  {\"a\":1}";
            let mut pos = 0;
            assert_eq!(skip_space_safe(data, &mut pos, isa), b'{');
            assert_eq!(pos, 9, "{isa:?}");
        }
    }

    #[test]
    fn skip_space_handles_long_runs_and_eof() {
        for isa in isas() {
            let mut data = vec![b' '; 200];
            data.push(b'x');
            let mut pos = 0;
            assert_eq!(skip_space_safe(&data, &mut pos, isa), b'x');
            assert_eq!(pos, 201);

            let blank = vec![b'\t'; 77];
            let mut pos = 0;
            assert_eq!(skip_space_safe(&blank, &mut pos, isa), 0);
            assert_eq!(pos, 77);
        }
    }

    #[test]
    fn padded_skip_clamps_inside_padding() {
        for isa in isas() {
            let mut data = vec![b' '; 100];
            data.extend_from_slice(&[0u8; PADDING]);
            let logical = &data[..100];
            let mut pos = 0;
            // SAFETY: `data` carries `PADDING` bytes past the logical slice.
            let b = unsafe { skip_space_padded(logical, &mut pos, isa) };
            assert_eq!(b, 0, "{isa:?}");
            assert_eq!(pos, 100);
        }
    }

    #[test]
    fn next_token_finds_stop_set_members() {
        for isa in isas() {
            let data = b"123e5   ,  7]";
            let mut pos = 0;
            assert_eq!(get_next_token(data, &mut pos, b"]},", isa), b',');
            assert_eq!(pos, 9);
            assert_eq!(get_next_token(data, &mut pos, b"]},", isa), b']');
            assert_eq!(pos, 13);
            assert_eq!(get_next_token(data, &mut pos, b"]},", isa), 0);
        }
    }

    #[test]
    fn string_skipping_reports_escape_status() {
        for isa in isas() {
            let cases: &[(&[u8], StringStatus, usize)] = &[
                (b"plain\" tail", StringStatus::Clean, 6),
                (b"\" tail", StringStatus::Clean, 1),
                (b"es\\\"caped\" tail", StringStatus::Escaped, 10),
                (b"a\\\\\" t", StringStatus::Escaped, 4),
                (b"no end", StringStatus::Invalid, 6),
                (b"trailing backslash\\", StringStatus::Invalid, 19),
            ];
            for &(body, want, want_pos) in cases {
                let mut pos = 0;
                let got = skip_string(body, &mut pos, isa);
                assert_eq!(got, want, "{isa:?}: {:?}", core::str::from_utf8(body));
                assert_eq!(pos, want_pos, "{isa:?}: {:?}", core::str::from_utf8(body));
            }
        }
    }

    #[test]
    fn string_skipping_across_block_boundaries() {
        // A backslash run ending exactly at a 16/32-byte boundary must not
        // leak its escape into the next block.
        for isa in isas() {
            for boundary in [16usize, 32, 64] {
                for run in 1..=4usize {
                    let mut body = vec![b'a'; boundary - run];
                    body.extend(core::iter::repeat(b'\\').take(run));
                    body.push(b'"');
                    body.extend_from_slice(b" tail");
                    let mut pos = 0;
                    let got = skip_string(&body, &mut pos, isa);
                    if run % 2 == 0 {
                        // Even run: the quote terminates the string.
                        assert_eq!(got, StringStatus::Escaped, "{isa:?} b{boundary} r{run}");
                        assert_eq!(pos, boundary + 1);
                    } else {
                        // Odd run: the quote is escaped; no terminator follows.
                        assert_eq!(got, StringStatus::Invalid, "{isa:?} b{boundary} r{run}");
                    }
                }
            }
        }
    }

    #[test]
    fn container_skipping_respects_nesting_and_strings() {
        for isa in isas() {
            let data = b"\"}\": {\"deep\": [1, \"]\"]}} tail";
            let mut pos = 0;
            assert!(skip_container(data, &mut pos, b'{', b'}', isa));
            assert_eq!(pos, 24, "{isa:?}");

            let arr = b"1, [2, [3]], \"][\"] tail";
            let mut pos = 0;
            assert!(skip_container(arr, &mut pos, b'[', b']', isa));
            assert_eq!(pos, 18, "{isa:?}");
        }
    }

    #[test]
    fn container_skipping_deep_nesting() {
        for isa in isas() {
            let depth = 1024;
            let mut data = Vec::new();
            // The opening bracket is consumed by the caller; start inside.
            for _ in 0..depth - 1 {
                data.push(b'[');
            }
            for _ in 0..depth {
                data.push(b']');
            }
            let mut pos = 0;
            assert!(skip_container(&data, &mut pos, b'[', b']', isa));
            assert_eq!(pos, data.len(), "{isa:?}");
        }
    }

    #[test]
    fn container_skipping_unterminated() {
        for isa in isas() {
            let data = b"{\"a\": [1, 2}";
            let mut pos = 0;
            assert!(!skip_container(data, &mut pos, b'[', b']', isa));
        }
    }

    #[test]
    fn literal_skipping() {
        let mut pos = 1;
        assert!(skip_literal(b"true,", &mut pos, b't'));
        assert_eq!(pos, 4);
        let mut pos = 1;
        assert!(skip_literal(b"false", &mut pos, b'f'));
        assert_eq!(pos, 5);
        let mut pos = 1;
        assert!(skip_literal(b"null}", &mut pos, b'n'));
        assert_eq!(pos, 4);
        let mut pos = 1;
        assert!(!skip_literal(b"nul", &mut pos, b'n'));
        let mut pos = 1;
        assert!(!skip_literal(b"nill", &mut pos, b'n'));
    }
}
