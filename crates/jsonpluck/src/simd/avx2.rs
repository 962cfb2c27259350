//! AVX2 block kernel, reached only through [`super::Isa::Avx2`], which the
//! probe in [`super::Isa::detect`] hands out after `is_x86_feature_detected!`
//! confirms the feature. The `#[target_feature]` wrappers below re-enter the
//! generic algorithms with a 32-lane chunk so the whole loop body compiles
//! with AVX2 enabled.

use core::arch::x86_64::{
    __m256i, _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_movemask_epi8, _mm256_set1_epi8,
};

use super::{Chunk, StringStatus};

#[derive(Clone, Copy)]
pub(crate) struct Avx2Chunk(__m256i);

impl Chunk for Avx2Chunk {
    const LANES: usize = 32;

    #[inline(always)]
    unsafe fn load(ptr: *const u8) -> Self {
        // SAFETY: the caller guarantees 32 readable bytes; loadu has no
        // alignment requirement.
        Self(unsafe { _mm256_loadu_si256(ptr.cast::<__m256i>()) })
    }

    #[inline(always)]
    fn eq(self, b: u8) -> u64 {
        // SAFETY: an `Avx2Chunk` is only ever constructed inside the
        // `#[target_feature(enable = "avx2")]` wrappers below, which the
        // dispatcher reaches after the runtime probe.
        unsafe {
            let hits = _mm256_cmpeq_epi8(self.0, _mm256_set1_epi8(b as i8));
            _mm256_movemask_epi8(hits) as u32 as u64
        }
    }

    #[inline(always)]
    fn whitespace(self) -> u64 {
        self.eq(b' ') | self.eq(b'\t') | self.eq(b'\n') | self.eq(b'\r')
    }
}

/// # Safety
///
/// AVX2 must be available on the running CPU.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn skip_space_safe(data: &[u8], pos: &mut usize) -> u8 {
    super::skip_space_safe_impl::<Avx2Chunk>(data, pos)
}

/// # Safety
///
/// AVX2 must be available, and at least [`super::PADDING`] readable bytes
/// must follow `data`.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn skip_space_padded(data: &[u8], pos: &mut usize) -> u8 {
    // SAFETY: padding contract forwarded from the caller.
    unsafe { super::skip_space_padded_impl::<Avx2Chunk>(data, pos) }
}

/// # Safety
///
/// AVX2 must be available on the running CPU.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn get_next_token(data: &[u8], pos: &mut usize, stops: &[u8]) -> u8 {
    super::get_next_token_impl::<Avx2Chunk>(data, pos, stops)
}

/// # Safety
///
/// AVX2 must be available on the running CPU.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn skip_string(data: &[u8], pos: &mut usize) -> StringStatus {
    super::skip_string_impl::<Avx2Chunk>(data, pos)
}

/// # Safety
///
/// AVX2 must be available on the running CPU.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn skip_container(data: &[u8], pos: &mut usize, open: u8, close: u8) -> bool {
    super::skip_container_impl::<Avx2Chunk>(data, pos, open, close)
}
