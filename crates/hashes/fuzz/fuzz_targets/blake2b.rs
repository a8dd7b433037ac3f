#![no_main]

use hashes::Digest as _;
use hashes::crypto::{Blake2b512, blake2b, blake2b::kernel_test};
use libfuzzer_sys::fuzz_target;

fn split_point(input: &[u8]) -> usize {
  if input.is_empty() {
    return 0;
  }
  (input[0] as usize) % (input.len() + 1)
}

fuzz_target!(|input: &[u8]| {
  let split = split_point(input);
  let (a, b) = input.split_at(split);

  // Streaming equals one-shot for any split.
  let ours = Blake2b512::digest(input);
  let mut h = Blake2b512::new();
  h.update(a);
  h.update(b);
  assert_eq!(ours, h.finalize());

  // Matches the RustCrypto oracle.
  {
    use blake2::Digest as _;
    let ref_out = blake2::Blake2b512::digest(input);
    let mut expected = [0u8; 64];
    expected.copy_from_slice(&ref_out);
    assert_eq!(ours, expected);
  }

  // Every available kernel agrees.
  kernel_test::verify_kernels(input).unwrap();

  // Keyed mode: take the key from the input tail.
  if !input.is_empty() {
    let keylen = (input[input.len() - 1] as usize % 64) + 1;
    if input.len() >= keylen {
      let (key, msg) = input.split_at(keylen);
      let mut out = [0u8; 64];
      blake2b::keyed_hash_into(&mut out, key, msg).unwrap();

      use digest::Mac as _;
      let mut mac = blake2::Blake2bMac512::new_from_slice(key).unwrap();
      mac.update(msg);
      assert_eq!(&out[..], &mac.finalize().into_bytes()[..]);
    }
  }
});
