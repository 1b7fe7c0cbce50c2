//! Differential fuzzing of BLAKE2b-256.
//!
//! Arbitrary chunked updates must match the one-shot digest, and both must
//! match `blake2b_simd` with the same personalization.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use powhash::blake2b::{self, Blake2b256, PERSONALIZATION};

#[derive(Arbitrary, Debug)]
struct Input {
  data: Vec<u8>,
  /// Chunk sizes for streaming updates
  chunk_sizes: Vec<u16>,
}

fuzz_target!(|input: Input| {
  let data = &input.data;
  let one_shot = blake2b::hash(data);

  let reference = blake2b_simd::Params::new()
    .hash_length(32)
    .personal(PERSONALIZATION)
    .hash(data);
  assert_eq!(
    &one_shot[..],
    reference.as_bytes(),
    "oracle mismatch: len={}, kernel={}",
    data.len(),
    blake2b::kernel_name()
  );

  let mut hasher = Blake2b256::new();
  let mut offset = 0;
  let mut chunk_idx = 0;
  while offset < data.len() {
    let chunk_size = match input.chunk_sizes.get(chunk_idx % input.chunk_sizes.len().max(1)) {
      Some(&n) => (n as usize % 512).max(1),
      None => 1,
    };
    let end = (offset + chunk_size).min(data.len());
    hasher.update(&data[offset..end]).unwrap();
    offset = end;
    chunk_idx += 1;
  }
  assert_eq!(hasher.bytes_hashed(), data.len() as u128);
  assert_eq!(hasher.finalize_array().unwrap(), one_shot, "streaming mismatch");

  assert_eq!(blake2b::kernel_test::verify_blake2b256_kernels(data), Ok(()));
});
