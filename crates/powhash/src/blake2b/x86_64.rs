//! BLAKE2b x86_64 SSSE3 compression.
//!
//! The 4x4 working state is held as eight 128-bit row halves:
//!
//! ```text
//! row1l = [v0,  v1 ]  row1h = [v2,  v3 ]
//! row2l = [v4,  v5 ]  row2h = [v6,  v7 ]
//! row3l = [v8,  v9 ]  row3h = [v10, v11]
//! row4l = [v12, v13]  row4h = [v14, v15]
//! ```
//!
//! so each G step runs on four lanes at once. The diagonal step realigns
//! rows 2-4 with `palignr` and restores them afterwards.
//!
//! # Safety
//!
//! [`compress_ssse3`] requires SSE2 and SSSE3. Dispatch only selects this
//! kernel when `platform::caps::x86::SSSE3_READY` is present.

#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::inline_always)]
#![allow(clippy::undocumented_unsafe_blocks)]

use core::arch::x86_64::*;

use super::{BLOCK_LEN, IV, SIGMA, message_words};

/// `pshufb` mask rotating each u64 lane right by 16 bits.
const ROT16_SHUFFLE: [i8; 16] = [2, 3, 4, 5, 6, 7, 0, 1, 10, 11, 12, 13, 14, 15, 8, 9];

/// `pshufb` mask rotating each u64 lane right by 24 bits.
const ROT24_SHUFFLE: [i8; 16] = [3, 4, 5, 6, 7, 0, 1, 2, 11, 12, 13, 14, 15, 8, 9, 10];

/// Kernel entry stored in the dispatch table.
pub(crate) fn compress(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], t: &[u64; 2], f: &[u64; 2]) {
  // SAFETY: this kernel is only reachable through `kernels::compress_fn`,
  // and every caller checks `required_caps` against detected capabilities.
  unsafe { compress_ssse3(h, block, t, f) }
}

#[inline(always)]
unsafe fn pair(lo: u64, hi: u64) -> __m128i {
  _mm_set_epi64x(hi as i64, lo as i64)
}

#[inline(always)]
unsafe fn rotr63(x: __m128i) -> __m128i {
  _mm_xor_si128(_mm_srli_epi64(x, 63), _mm_add_epi64(x, x))
}

/// # Safety
///
/// Caller must ensure SSE2 and SSSE3 are available.
#[target_feature(enable = "sse2,ssse3")]
pub(crate) unsafe fn compress_ssse3(h: &mut [u64; 8], block: &[u8; BLOCK_LEN], t: &[u64; 2], f: &[u64; 2]) {
  let m = message_words(block);
  let r16 = _mm_loadu_si128(ROT16_SHUFFLE.as_ptr().cast());
  let r24 = _mm_loadu_si128(ROT24_SHUFFLE.as_ptr().cast());

  let h_lo = _mm_loadu_si128(h.as_ptr().cast());
  let h_lh = _mm_loadu_si128(h.as_ptr().add(2).cast());
  let h_hl = _mm_loadu_si128(h.as_ptr().add(4).cast());
  let h_hh = _mm_loadu_si128(h.as_ptr().add(6).cast());

  let mut row1l = h_lo;
  let mut row1h = h_lh;
  let mut row2l = h_hl;
  let mut row2h = h_hh;
  let mut row3l = _mm_loadu_si128(IV.as_ptr().cast());
  let mut row3h = _mm_loadu_si128(IV.as_ptr().add(2).cast());
  let mut row4l = _mm_xor_si128(_mm_loadu_si128(IV.as_ptr().add(4).cast()), _mm_loadu_si128(t.as_ptr().cast()));
  let mut row4h = _mm_xor_si128(_mm_loadu_si128(IV.as_ptr().add(6).cast()), _mm_loadu_si128(f.as_ptr().cast()));

  // First half of G: rotations by 32 and 24.
  macro_rules! g1 {
    ($bl:expr, $bh:expr) => {{
      row1l = _mm_add_epi64(_mm_add_epi64(row1l, $bl), row2l);
      row1h = _mm_add_epi64(_mm_add_epi64(row1h, $bh), row2h);
      row4l = _mm_xor_si128(row4l, row1l);
      row4h = _mm_xor_si128(row4h, row1h);
      row4l = _mm_shuffle_epi32(row4l, 0b10_11_00_01);
      row4h = _mm_shuffle_epi32(row4h, 0b10_11_00_01);
      row3l = _mm_add_epi64(row3l, row4l);
      row3h = _mm_add_epi64(row3h, row4h);
      row2l = _mm_xor_si128(row2l, row3l);
      row2h = _mm_xor_si128(row2h, row3h);
      row2l = _mm_shuffle_epi8(row2l, r24);
      row2h = _mm_shuffle_epi8(row2h, r24);
    }};
  }

  // Second half of G: rotations by 16 and 63.
  macro_rules! g2 {
    ($bl:expr, $bh:expr) => {{
      row1l = _mm_add_epi64(_mm_add_epi64(row1l, $bl), row2l);
      row1h = _mm_add_epi64(_mm_add_epi64(row1h, $bh), row2h);
      row4l = _mm_xor_si128(row4l, row1l);
      row4h = _mm_xor_si128(row4h, row1h);
      row4l = _mm_shuffle_epi8(row4l, r16);
      row4h = _mm_shuffle_epi8(row4h, r16);
      row3l = _mm_add_epi64(row3l, row4l);
      row3h = _mm_add_epi64(row3h, row4h);
      row2l = _mm_xor_si128(row2l, row3l);
      row2h = _mm_xor_si128(row2h, row3h);
      row2l = rotr63(row2l);
      row2h = rotr63(row2h);
    }};
  }

  // row2 -> [v5, v6 | v7, v4], row3 -> [v10, v11 | v8, v9], row4 -> [v15, v12 | v13, v14]
  macro_rules! diagonalize {
    () => {{
      let t0 = _mm_alignr_epi8(row2h, row2l, 8);
      let t1 = _mm_alignr_epi8(row2l, row2h, 8);
      row2l = t0;
      row2h = t1;

      core::mem::swap(&mut row3l, &mut row3h);

      let t0 = _mm_alignr_epi8(row4h, row4l, 8);
      let t1 = _mm_alignr_epi8(row4l, row4h, 8);
      row4l = t1;
      row4h = t0;
    }};
  }

  macro_rules! undiagonalize {
    () => {{
      let t0 = _mm_alignr_epi8(row2l, row2h, 8);
      let t1 = _mm_alignr_epi8(row2h, row2l, 8);
      row2l = t0;
      row2h = t1;

      core::mem::swap(&mut row3l, &mut row3h);

      let t0 = _mm_alignr_epi8(row4l, row4h, 8);
      let t1 = _mm_alignr_epi8(row4h, row4l, 8);
      row4l = t1;
      row4h = t0;
    }};
  }

  macro_rules! round {
    ($r:expr) => {{
      let s = &SIGMA[$r];

      g1!(pair(m[s[0]], m[s[2]]), pair(m[s[4]], m[s[6]]));
      g2!(pair(m[s[1]], m[s[3]]), pair(m[s[5]], m[s[7]]));
      diagonalize!();
      g1!(pair(m[s[8]], m[s[10]]), pair(m[s[12]], m[s[14]]));
      g2!(pair(m[s[9]], m[s[11]]), pair(m[s[13]], m[s[15]]));
      undiagonalize!();
    }};
  }

  round!(0);
  round!(1);
  round!(2);
  round!(3);
  round!(4);
  round!(5);
  round!(6);
  round!(7);
  round!(8);
  round!(9);
  round!(10);
  round!(11);

  row1l = _mm_xor_si128(row3l, row1l);
  row1h = _mm_xor_si128(row3h, row1h);
  row2l = _mm_xor_si128(row4l, row2l);
  row2h = _mm_xor_si128(row4h, row2h);

  _mm_storeu_si128(h.as_mut_ptr().cast(), _mm_xor_si128(h_lo, row1l));
  _mm_storeu_si128(h.as_mut_ptr().add(2).cast(), _mm_xor_si128(h_lh, row1h));
  _mm_storeu_si128(h.as_mut_ptr().add(4).cast(), _mm_xor_si128(h_hl, row2l));
  _mm_storeu_si128(h.as_mut_ptr().add(6).cast(), _mm_xor_si128(h_hh, row2h));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blake2b::portable;

  fn ssse3_available() -> bool {
    platform::caps().has(platform::caps::x86::SSSE3_READY)
  }

  #[test]
  fn matches_portable_on_varied_states() {
    if !ssse3_available() {
      return;
    }

    let mut block = [0u8; BLOCK_LEN];
    for (i, b) in block.iter_mut().enumerate() {
      *b = (i as u8).wrapping_mul(73).wrapping_add(11);
    }

    let counters = [[0u64, 0], [128, 0], [u64::MAX, 0], [5, u64::MAX]];
    let flags = [[0u64, 0], [u64::MAX, 0], [u64::MAX, u64::MAX]];

    for t in &counters {
      for f in &flags {
        let mut expected = IV;
        expected[0] ^= 0x0101_0020;
        let mut actual = expected;

        portable::compress(&mut expected, &block, t, f);
        // SAFETY: SSSE3 availability checked above.
        unsafe { compress_ssse3(&mut actual, &block, t, f) };
        assert_eq!(actual, expected, "t={t:?} f={f:?}");
      }
    }
  }

  #[test]
  fn chained_blocks_match_portable() {
    if !ssse3_available() {
      return;
    }

    let mut expected = IV;
    let mut actual = IV;
    let mut block = [0u8; BLOCK_LEN];
    for n in 0..64u64 {
      for (i, b) in block.iter_mut().enumerate() {
        *b = (i as u8).wrapping_add(n as u8).rotate_left((n % 8) as u32);
      }
      let t = [(n + 1) * BLOCK_LEN as u64, 0];
      let f = if n == 63 { [u64::MAX, 0] } else { [0, 0] };

      portable::compress(&mut expected, &block, &t, &f);
      // SAFETY: SSSE3 availability checked above.
      unsafe { compress_ssse3(&mut actual, &block, &t, &f) };
      assert_eq!(actual, expected, "block {n}");
    }
  }

  #[test]
  fn rotation_masks_match_scalar_rotations() {
    if !ssse3_available() {
      return;
    }

    let x = 0x0123_4567_89ab_cdefu64;
    let y = 0xfedc_ba98_7654_3210u64;
    let mut out = [0u64; 2];
    // SAFETY: SSSE3 availability checked above.
    unsafe {
      let v = pair(x, y);
      let r16 = _mm_loadu_si128(ROT16_SHUFFLE.as_ptr().cast());
      _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_shuffle_epi8(v, r16));
    }
    assert_eq!(out, [x.rotate_right(16), y.rotate_right(16)]);

    // SAFETY: SSSE3 availability checked above.
    unsafe {
      let v = pair(x, y);
      let r24 = _mm_loadu_si128(ROT24_SHUFFLE.as_ptr().cast());
      _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_shuffle_epi8(v, r24));
    }
    assert_eq!(out, [x.rotate_right(24), y.rotate_right(24)]);

    // SAFETY: SSE2 is baseline on x86_64.
    unsafe {
      _mm_storeu_si128(out.as_mut_ptr().cast(), rotr63(pair(x, y)));
    }
    assert_eq!(out, [x.rotate_right(63), y.rotate_right(63)]);
  }
}
