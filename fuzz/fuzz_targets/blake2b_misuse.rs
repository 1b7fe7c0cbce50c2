//! Fuzz target for the BLAKE2b-256 state machine.
//!
//! Replays arbitrary sequences of update/finalize/reset against a model that
//! tracks the expected phase and the bytes absorbed since the last reset.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use powhash::{
  HashError,
  blake2b::{self, Blake2b256, Phase},
};

#[derive(Arbitrary, Debug)]
enum Op {
  Update(Vec<u8>),
  Finalize { out_len: u8 },
  Reset,
}

fuzz_target!(|ops: Vec<Op>| {
  let mut hasher = Blake2b256::new();
  let mut absorbed = Vec::new();
  let mut finalized = false;

  for op in ops {
    match op {
      Op::Update(data) => {
        let res = hasher.update(&data);
        if finalized {
          assert_eq!(res, Err(HashError::AlreadyFinalized));
        } else {
          assert_eq!(res, Ok(()));
          absorbed.extend_from_slice(&data);
        }
      }
      Op::Finalize { out_len } => {
        let mut out = vec![0xa5u8; out_len as usize];
        let res = hasher.finalize(&mut out);
        if out.len() < 32 {
          assert!(matches!(res, Err(HashError::InvalidOutputBuffer { .. })));
          assert!(out.iter().all(|&b| b == 0xa5));
        } else if finalized {
          assert_eq!(res, Err(HashError::AlreadyFinalized));
        } else {
          assert_eq!(res, Ok(()));
          assert_eq!(&out[..32], &blake2b::hash(&absorbed));
          assert!(out[32..].iter().all(|&b| b == 0xa5));
          finalized = true;
        }
      }
      Op::Reset => {
        hasher.reset();
        absorbed.clear();
        finalized = false;
      }
    }

    let expected_phase = if finalized {
      Phase::Finalized
    } else if absorbed.is_empty() {
      Phase::Fresh
    } else {
      Phase::Accumulating
    };
    assert_eq!(hasher.phase(), expected_phase);
  }
});
