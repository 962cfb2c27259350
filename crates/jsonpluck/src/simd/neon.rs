//! NEON block kernel. NEON is part of the aarch64 baseline.
//!
//! NEON has no `movemask`; the bitmask is recovered by shifting each
//! comparison byte down to 0/1, extracting the two 64-bit halves, and packing
//! each half's eight bytes into eight bits with a multiply.

use core::arch::aarch64::{
    uint8x16_t, vceqq_u8, vdupq_n_u8, vgetq_lane_u64, vld1q_u8, vreinterpretq_u64_u8, vshrq_n_u8,
};

use super::Chunk;

#[derive(Clone, Copy)]
pub(crate) struct NeonChunk(uint8x16_t);

#[inline(always)]
fn movemask(hits: uint8x16_t) -> u64 {
    const MAGIC: u64 = 0x0102_0408_1020_4080;
    // SAFETY: NEON is part of the aarch64 baseline, so these intrinsics are
    // always available; none of them touch memory.
    let (lo_half, hi_half) = unsafe {
        let ones = vshrq_n_u8::<7>(hits);
        let halves = vreinterpretq_u64_u8(ones);
        (vgetq_lane_u64::<0>(halves), vgetq_lane_u64::<1>(halves))
    };
    let lo = lo_half.wrapping_mul(MAGIC) >> 56;
    let hi = hi_half.wrapping_mul(MAGIC) >> 56;
    lo | (hi << 8)
}

impl Chunk for NeonChunk {
    const LANES: usize = 16;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        // SAFETY: the caller guarantees 16 readable bytes.
        Self(unsafe { vld1q_u8(ptr) })
    }

    #[inline(always)]
    fn eq(self, b: u8) -> u64 {
        // SAFETY: NEON is part of the aarch64 baseline, so these intrinsics
        // are always available; none of them touch memory.
        movemask(unsafe { vceqq_u8(self.0, vdupq_n_u8(b)) })
    }

    #[inline(always)]
    fn whitespace(self) -> u64 {
        self.eq(b' ') | self.eq(b'\t') | self.eq(b'\n') | self.eq(b'\r')
    }
}
