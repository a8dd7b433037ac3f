//! Runtime CPU detection.
//!
//! This module provides the unified [`get()`] function that returns the
//! detected capability set. It handles:
//!
//! - Compile-time detection (via `cfg!(target_feature = "...")`)
//! - Runtime detection (CPUID + XGETBV on x86-64)
//! - One-time caching (`OnceLock` with `std`, an atomic state machine
//!   without)
//! - User-supplied overrides for bare metal and testing
//! - Miri fallback (always portable)
//!
//! CPUID reports what the CPU supports, not what the OS allows. Every
//! AVX-class bit is therefore gated on OSXSAVE + XGETBV(XCR0): AVX2 needs
//! the XMM+YMM state bits, AVX-512 additionally needs opmask+ZMM. Bits the
//! OS does not save are forced off regardless of CPUID.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::caps::Caps;

// ─────────────────────────────────────────────────────────────────────────────
// Override support
// ─────────────────────────────────────────────────────────────────────────────

static OVERRIDE_SET: AtomicBool = AtomicBool::new(false);
static OVERRIDE_BITS: AtomicU64 = AtomicU64::new(0);

/// Set or clear the capabilities override.
///
/// When set, [`get()`] returns the override value instead of detecting.
/// Pass `None` to clear the override and resume detection.
///
/// Typically called early in program initialization, or around a test that
/// needs to pin a specific code path.
pub fn set_caps_override(value: Option<Caps>) {
  match value {
    Some(caps) => {
      OVERRIDE_BITS.store(caps.0, Ordering::Release);
      OVERRIDE_SET.store(true, Ordering::Release);
    }
    None => OVERRIDE_SET.store(false, Ordering::Release),
  }
}

/// Check if an override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  OVERRIDE_SET.load(Ordering::Acquire)
}

#[inline]
fn get_override() -> Option<Caps> {
  if OVERRIDE_SET.load(Ordering::Acquire) {
    Some(Caps(OVERRIDE_BITS.load(Ordering::Acquire)))
  } else {
    None
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-time cache
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(feature = "std"))]
mod cache {
  use core::sync::atomic::{AtomicU8, AtomicU64, Ordering};

  use crate::caps::Caps;

  /// 0 = uninitialized, 1 = initializing, 2 = ready
  static STATE: AtomicU8 = AtomicU8::new(0);
  static CACHED_BITS: AtomicU64 = AtomicU64::new(0);

  #[inline]
  pub fn get_or_init(f: fn() -> Caps) -> Caps {
    if STATE.load(Ordering::Acquire) == 2 {
      return Caps(CACHED_BITS.load(Ordering::Acquire));
    }

    match STATE.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
      Ok(_) => {
        let caps = f();
        CACHED_BITS.store(caps.0, Ordering::Release);
        STATE.store(2, Ordering::Release);
        caps
      }
      Err(_) => {
        while STATE.load(Ordering::Acquire) != 2 {
          core::hint::spin_loop();
        }
        Caps(CACHED_BITS.load(Ordering::Acquire))
      }
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main API
// ─────────────────────────────────────────────────────────────────────────────

/// Get the detected CPU capabilities.
///
/// The first call probes the host; every subsequent call returns the cached
/// result. If an override has been set via [`set_caps_override`], that value
/// is returned instead.
///
/// Under Miri, always returns [`Caps::NONE`] to avoid interpreting SIMD
/// intrinsics.
#[inline]
#[must_use]
pub fn get() -> Caps {
  #[cfg(miri)]
  {
    Caps::NONE
  }

  #[cfg(not(miri))]
  {
    if let Some(caps) = get_override() {
      return caps;
    }

    #[cfg(feature = "std")]
    {
      static CACHED: std::sync::OnceLock<Caps> = std::sync::OnceLock::new();
      *CACHED.get_or_init(detect_uncached)
    }

    #[cfg(not(feature = "std"))]
    {
      cache::get_or_init(detect_uncached)
    }
  }
}

/// Detect capabilities without caching.
///
/// Useful for tests that need fresh detection.
#[must_use]
pub fn detect_uncached() -> Caps {
  #[cfg(target_arch = "x86_64")]
  {
    caps_static().union(cpuid_x86_64())
  }

  #[cfg(target_arch = "x86")]
  {
    caps_static()
  }

  #[cfg(target_arch = "aarch64")]
  {
    // NEON (ASIMD) is architecturally mandatory on AArch64.
    crate::caps::aarch64::NEON
  }

  #[cfg(target_arch = "arm")]
  {
    if cfg!(target_feature = "neon") {
      crate::caps::aarch64::NEON
    } else {
      Caps::NONE
    }
  }

  #[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "x86",
    target_arch = "aarch64",
    target_arch = "arm"
  )))]
  {
    Caps::NONE
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86 detection
// ─────────────────────────────────────────────────────────────────────────────

/// Compile-time detected x86 features.
#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
const fn caps_static() -> Caps {
  use crate::caps::x86;

  let mut caps = Caps::NONE;

  #[cfg(target_feature = "avx2")]
  {
    caps = caps.union(x86::AVX2);
  }

  #[cfg(target_feature = "avx512f")]
  {
    caps = caps.union(x86::AVX512F);
  }

  #[cfg(target_feature = "avx512vl")]
  {
    caps = caps.union(x86::AVX512VL);
  }

  #[cfg(target_feature = "avx512vbmi2")]
  {
    caps = caps.union(x86::AVX512VBMI2);
  }

  caps
}

/// Runtime x86-64 feature detection via CPUID + XGETBV.
///
/// Reads leaf 0 (max leaf), leaf 1 (OSXSAVE), and leaf 7 subleaf 0 for the
/// vector extension bits, then consults XCR0 to verify the OS saves the
/// corresponding register state.
#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
fn cpuid_x86_64() -> Caps {
  use core::arch::x86_64::{__cpuid, __cpuid_count, _xgetbv};

  use crate::caps::x86;

  // XCR0 bits 1-2: XMM + YMM state, required for AVX2.
  const XCR0_AVX_MASK: u64 = 0x06;
  // XCR0 bits 5-7: opmask + ZMM_Hi256 + Hi16_ZMM state, required for AVX-512.
  const XCR0_AVX512_MASK: u64 = 0xE0;

  let cpuid0 = __cpuid(0);
  if cpuid0.eax < 7 {
    return Caps::NONE;
  }

  let cpuid1 = __cpuid(1);

  // OSXSAVE (bit 27): the OS has set CR4.OSXSAVE and supports XGETBV.
  let osxsave = cpuid1.ecx & (1 << 27) != 0;
  let xcr0 = if osxsave {
    // SAFETY: XGETBV is valid when OSXSAVE is set (checked above).
    unsafe { _xgetbv(0) }
  } else {
    0
  };

  let os_avx = (xcr0 & XCR0_AVX_MASK) == XCR0_AVX_MASK;
  let os_avx512 = os_avx && (xcr0 & XCR0_AVX512_MASK) == XCR0_AVX512_MASK;

  let cpuid7 = __cpuid_count(7, 0);
  let mut caps = Caps::NONE;

  if os_avx && cpuid7.ebx & (1 << 5) != 0 {
    caps |= x86::AVX2;
  }

  if os_avx512 {
    if cpuid7.ebx & (1 << 16) != 0 {
      caps |= x86::AVX512F;
    }
    if cpuid7.ebx & (1 << 31) != 0 {
      caps |= x86::AVX512VL;
    }
    if cpuid7.ecx & (1 << 6) != 0 {
      caps |= x86::AVX512VBMI2;
    }
  }

  caps
}
