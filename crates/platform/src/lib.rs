//! CPU detection and capabilities for rsblake.
//!
//! This crate is the single source of truth for CPU feature detection
//! across the rsblake workspace.
//!
//! # Core Type
//!
//! - [`Caps`]: what vector extensions can run on this machine
//!
//! # Main Entry Point
//!
//! ```ignore
//! let caps = platform::caps();
//!
//! if caps.has(platform::caps::x86::AVX512_READY) {
//!   // Use the AVX-512 compression kernel
//! } else if caps.has(platform::caps::x86::AVX2) {
//!   // Use the AVX2 compression kernel
//! }
//! ```
//!
//! # Design
//!
//! 1. **One API**: algorithms query [`caps()`] instead of doing ad-hoc
//!    detection.
//! 2. **OS gating**: CPUID bits are only honored when XGETBV confirms the
//!    OS saves the corresponding register state.
//! 3. **Cached**: runtime detection happens once per process behind a
//!    lock-free write-once cell.
//! 4. **Miri-safe**: under Miri, always portable-only caps.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod caps;
mod detect;

pub use caps::{Arch, Caps};
pub use detect::{detect_uncached, has_override, set_caps_override};

/// Get the detected CPU capabilities.
///
/// Cached after the first call. The x86-64 probe gates every CPUID bit on
/// OSXSAVE + XGETBV state support.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  detect::get()
}
