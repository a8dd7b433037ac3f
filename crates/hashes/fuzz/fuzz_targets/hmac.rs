#![no_main]

use hashes::crypto::{Hmac, hmac};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &[u8]| {
  if input.is_empty() {
    return;
  }

  let keylen = (input[0] as usize % 200) + 1;
  if input.len() < keylen {
    return;
  }
  let (key, msg) = input.split_at(keylen);

  let one_shot = hmac::mac(key, msg).unwrap();

  // Incremental with a data-derived split.
  let split = if msg.is_empty() { 0 } else { (msg[0] as usize) % (msg.len() + 1) };
  let (a, b) = msg.split_at(split);
  let mut state = Hmac::new(key).unwrap();
  state.update(a).unwrap();
  state.update(b).unwrap();
  assert_eq!(state.finalize().unwrap(), one_shot);

  // Matches the RustCrypto oracle.
  {
    use ::hmac::Mac as _;
    let mut mac = ::hmac::SimpleHmac::<blake2::Blake2b512>::new_from_slice(key).unwrap();
    mac.update(msg);
    assert_eq!(&one_shot[..], &mac.finalize().into_bytes()[..]);
  }

  // Verification round-trips.
  let mut state = Hmac::new(key).unwrap();
  state.update(msg).unwrap();
  state.verify(&one_shot).unwrap();
});
