//! Cryptographic hash, MAC, and key-derivation functions.

pub mod blake2b;
pub mod hmac;
pub mod pbkdf2;

pub use blake2b::{Blake2b, Blake2b512, Params};
pub use hmac::Hmac;
