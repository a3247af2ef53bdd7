//! Vectorised accumulation of the five sums the single-block SSIM formula
//! needs (`sum_a`, `sum_b`, `sum_a2`, `sum_b2`, `sum_ab`), with runtime CPU
//! feature detection and a portable scalar fallback.
//!
//! The scalar path is the reference: every vector path must reproduce its
//! output within `1e-9` for identical inputs (§4.S).

/// Sum of `a`, sum of `b`, sum of `a*a`, sum of `b*b`, sum of `a*b` over two
/// equal-length byte slices. Integer accumulation throughout so the scalar
/// and vector paths agree bit-for-bit, not merely within tolerance.
pub fn luma_sums(a: &[u8], b: &[u8]) -> (u64, u64, u64, u64, u64) {
    debug_assert_eq!(a.len(), b.len());

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            return unsafe { luma_sums_avx2(a, b) };
        }
    }
    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { luma_sums_neon(a, b) };
        }
    }
    luma_sums_scalar(a, b)
}

/// Portable reference implementation.
pub fn luma_sums_scalar(a: &[u8], b: &[u8]) -> (u64, u64, u64, u64, u64) {
    let (mut sum_a, mut sum_b, mut sum_a2, mut sum_b2, mut sum_ab) = (0u64, 0u64, 0u64, 0u64, 0u64);
    for (&av, &bv) in a.iter().zip(b.iter()) {
        let (av, bv) = (av as u64, bv as u64);
        sum_a += av;
        sum_b += bv;
        sum_a2 += av * av;
        sum_b2 += bv * bv;
        sum_ab += av * bv;
    }
    (sum_a, sum_b, sum_a2, sum_b2, sum_ab)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn luma_sums_avx2(a: &[u8], b: &[u8]) -> (u64, u64, u64, u64, u64) {
    use std::arch::x86_64::*;

    let len = a.len();
    let chunks = len / 32;

    let mut sum_a: u64 = 0;
    let mut sum_b: u64 = 0;
    let mut sum_a2: u64 = 0;
    let mut sum_b2: u64 = 0;
    let mut sum_ab: u64 = 0;
    let zero = _mm256_setzero_si256();

    for i in 0..chunks {
        let off = i * 32;
        let va = _mm256_loadu_si256(a.as_ptr().add(off) as *const __m256i);
        let vb = _mm256_loadu_si256(b.as_ptr().add(off) as *const __m256i);

        // sum_a / sum_b: byte-wise sum-of-absolute-differences against zero.
        let sad_a = _mm256_sad_epu8(va, zero);
        let sad_b = _mm256_sad_epu8(vb, zero);
        sum_a += horizontal_sum_u64(sad_a);
        sum_b += horizontal_sum_u64(sad_b);

        // Widen to 16-bit lanes for the product terms.
        let a_lo = _mm256_unpacklo_epi8(va, zero);
        let a_hi = _mm256_unpackhi_epi8(va, zero);
        let b_lo = _mm256_unpacklo_epi8(vb, zero);
        let b_hi = _mm256_unpackhi_epi8(vb, zero);

        let a2_lo = _mm256_mullo_epi16(a_lo, a_lo);
        let a2_hi = _mm256_mullo_epi16(a_hi, a_hi);
        let b2_lo = _mm256_mullo_epi16(b_lo, b_lo);
        let b2_hi = _mm256_mullo_epi16(b_hi, b_hi);
        let ab_lo = _mm256_mullo_epi16(a_lo, b_lo);
        let ab_hi = _mm256_mullo_epi16(a_hi, b_hi);

        sum_a2 += horizontal_sum_u16_widened(a2_lo) + horizontal_sum_u16_widened(a2_hi);
        sum_b2 += horizontal_sum_u16_widened(b2_lo) + horizontal_sum_u16_widened(b2_hi);
        sum_ab += horizontal_sum_u16_widened(ab_lo) + horizontal_sum_u16_widened(ab_hi);
    }

    // Scalar tail for the remainder that doesn't fill a 32-byte lane.
    let (ta, tb, ta2, tb2, tab) = luma_sums_scalar(&a[chunks * 32..], &b[chunks * 32..]);
    (
        sum_a + ta,
        sum_b + tb,
        sum_a2 + ta2,
        sum_b2 + tb2,
        sum_ab + tab,
    )
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn horizontal_sum_u64(v: std::arch::x86_64::__m256i) -> u64 {
    let mut lanes = [0u64; 4];
    std::arch::x86_64::_mm256_storeu_si256(lanes.as_mut_ptr() as *mut std::arch::x86_64::__m256i, v);
    lanes.iter().sum()
}

/// `v` holds sixteen `u16`-as-`i16` products (each really in `[0, 65025]`, so
/// safely within i16's unsigned-reinterpretation range up to 32767 is NOT
/// guaranteed — values up to 255*255=65025 overflow i16). We therefore widen
/// lane-by-lane to u32 before summing.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn horizontal_sum_u16_widened(v: std::arch::x86_64::__m256i) -> u64 {
    let mut lanes = [0u16; 16];
    std::arch::x86_64::_mm256_storeu_si256(lanes.as_mut_ptr() as *mut std::arch::x86_64::__m256i, v);
    lanes.iter().map(|&x| x as u64).sum()
}

/// Multiply two `uint16x8_t`s lane-wise, widening to `u32`, and sum all 8
/// products. `vmull_u16` only takes the 4-lane halves, so the low and high
/// halves are multiplied separately (`vmull_high_u16` covers the high half
/// without an explicit `vget_high_u16`) and the two `u32x4` results summed.
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn widen_mul_sum_u16(x: std::arch::aarch64::uint16x8_t, y: std::arch::aarch64::uint16x8_t) -> u64 {
    use std::arch::aarch64::*;
    let lo = vmull_u16(vget_low_u16(x), vget_low_u16(y));
    let hi = vmull_high_u16(x, y);
    vaddvq_u32(lo) as u64 + vaddvq_u32(hi) as u64
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn luma_sums_neon(a: &[u8], b: &[u8]) -> (u64, u64, u64, u64, u64) {
    use std::arch::aarch64::*;

    let len = a.len();
    let chunks = len / 16;

    let mut sum_a: u64 = 0;
    let mut sum_b: u64 = 0;
    let mut sum_a2: u64 = 0;
    let mut sum_b2: u64 = 0;
    let mut sum_ab: u64 = 0;

    for i in 0..chunks {
        let off = i * 16;
        let va = vld1q_u8(a.as_ptr().add(off));
        let vb = vld1q_u8(b.as_ptr().add(off));

        sum_a += vaddvq_u32(vpaddlq_u16(vpaddlq_u8(va))) as u64;
        sum_b += vaddvq_u32(vpaddlq_u16(vpaddlq_u8(vb))) as u64;

        // vmovl_u8 widens 8 lanes of u8 into 8 lanes of u16 (uint16x8_t); each
        // still needs splitting into 4-lane halves before `vmull_u16`, which
        // only accepts uint16x4_t.
        let a_lo = vmovl_u8(vget_low_u8(va));
        let a_hi = vmovl_u8(vget_high_u8(va));
        let b_lo = vmovl_u8(vget_low_u8(vb));
        let b_hi = vmovl_u8(vget_high_u8(vb));

        sum_a2 += widen_mul_sum_u16(a_lo, a_lo) + widen_mul_sum_u16(a_hi, a_hi);
        sum_b2 += widen_mul_sum_u16(b_lo, b_lo) + widen_mul_sum_u16(b_hi, b_hi);
        sum_ab += widen_mul_sum_u16(a_lo, b_lo) + widen_mul_sum_u16(a_hi, b_hi);
    }

    let (ta, tb, ta2, tb2, tab) = luma_sums_scalar(&a[chunks * 16..], &b[chunks * 16..]);
    (
        sum_a + ta,
        sum_b + tb,
        sum_a2 + ta2,
        sum_b2 + tb2,
        sum_ab + tab,
    )
}
