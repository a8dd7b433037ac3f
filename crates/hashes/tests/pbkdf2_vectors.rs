//! PBKDF2-HMAC-BLAKE2b-512 vectors and a differential against the
//! RustCrypto `pbkdf2` crate.

use hashes::crypto::pbkdf2::derive_into;
use proptest::prelude::*;

fn unhex(s: &str) -> Vec<u8> {
  hex::decode(s).unwrap()
}

#[test]
fn known_answer_vectors() {
  // password="password", salt="salt", c=1, dkLen=64
  let mut out = [0u8; 64];
  derive_into(&mut out, b"password", b"salt", 1).unwrap();
  assert_eq!(
    &out[..],
    &unhex(
      "684e7cc1dd9b241d2c977f38a896645da49b85eb13cf8f5c021efc167aad7993\
       43c06f50e2959de06a0bca80a154457d8e92e70ebdcdb3722dcf9badd6ff1dfb"
    )[..],
  );

  // password="password", salt="salt", c=2, dkLen=64
  let mut out2 = [0u8; 64];
  derive_into(&mut out2, b"password", b"salt", 2).unwrap();
  assert_eq!(
    &out2[..],
    &unhex(
      "40b77cc2ee4b4c44eeb5babc299be14af5670e39ea3ce14c0fe70e6c99369886\
       ab4d693bad8bd811ed64c5cf65a4cc5260993e17bbf2423c77164752fcbf5a60"
    )[..],
  );

  assert_ne!(out, out2);
}

fn pbkdf2_ref(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
  type Prf = hmac::SimpleHmac<blake2::Blake2b512>;
  pbkdf2::pbkdf2::<Prf>(password, salt, rounds, out).unwrap();
}

#[test]
fn multi_block_output_matches_the_oracle() {
  // Outputs spanning several 64-byte PRF blocks, including a ragged tail.
  for outlen in [1usize, 63, 64, 65, 128, 200] {
    let mut ours = vec![0u8; outlen];
    derive_into(&mut ours, b"password", b"NaCl", 3).unwrap();

    let mut theirs = vec![0u8; outlen];
    pbkdf2_ref(b"password", b"NaCl", 3, &mut theirs);
    assert_eq!(ours, theirs, "outlen {outlen}");
  }
}

proptest! {
  // PBKDF2 is deliberately slow; keep the case count modest.
  #![proptest_config(ProptestConfig::with_cases(64))]

  #[test]
  fn matches_rustcrypto_pbkdf2(
    password in proptest::collection::vec(any::<u8>(), 1..64),
    salt in proptest::collection::vec(any::<u8>(), 0..64),
    rounds in 1u32..8,
    outlen in 1usize..160,
  ) {
    let mut ours = vec![0u8; outlen];
    derive_into(&mut ours, &password, &salt, rounds).unwrap();

    let mut theirs = vec![0u8; outlen];
    pbkdf2_ref(&password, &salt, rounds, &mut theirs);
    prop_assert_eq!(ours, theirs);
  }

  #[test]
  fn shorter_outputs_are_prefixes(
    password in proptest::collection::vec(any::<u8>(), 1..32),
    salt in proptest::collection::vec(any::<u8>(), 0..32),
    short in 1usize..128,
  ) {
    let mut long = [0u8; 128];
    derive_into(&mut long, &password, &salt, 2).unwrap();

    let mut prefix = vec![0u8; short];
    derive_into(&mut prefix, &password, &salt, 2).unwrap();
    prop_assert_eq!(&prefix[..], &long[..short]);
  }
}

#[test]
fn deterministic_and_sensitive() {
  let mut a = [0u8; 64];
  let mut b = [0u8; 64];
  derive_into(&mut a, b"password", b"salt", 4).unwrap();
  derive_into(&mut b, b"password", b"salt", 4).unwrap();
  assert_eq!(a, b);

  derive_into(&mut b, b"passworD", b"salt", 4).unwrap();
  assert_ne!(a, b);
  derive_into(&mut b, b"password", b"salT", 4).unwrap();
  assert_ne!(a, b);
  derive_into(&mut b, b"password", b"salt", 5).unwrap();
  assert_ne!(a, b);
}
