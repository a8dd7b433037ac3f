//! Process-wide kernel selection.
//!
//! One atomic slot holds the selected kernel id. Readers load with
//! `Acquire`; on the unset sentinel they resolve the kernel (a pure
//! function of the cached CPU capabilities) and store it with `Release`.
//! Racing initializers compute identical values, so the last writer wins
//! and no lock is taken.

use core::sync::atomic::{AtomicU8, Ordering};

use platform::Caps;

use super::kernels::{CompressFn, KernelId, compress_fn, required_caps};

const UNSET: u8 = u8::MAX;

static ACTIVE: AtomicU8 = AtomicU8::new(UNSET);

/// Selection policy over a capability set.
///
/// The `force-portable` cargo feature short-circuits to the portable
/// kernel regardless of detected features.
fn resolve(caps: Caps) -> KernelId {
  if cfg!(feature = "force-portable") {
    return KernelId::Portable;
  }

  #[cfg(target_arch = "x86_64")]
  {
    use platform::caps::x86;
    if caps.has(x86::AVX512_READY) {
      return KernelId::Avx512;
    }
    if caps.has(x86::AVX2) {
      return KernelId::Avx2;
    }
  }

  #[cfg(target_arch = "aarch64")]
  {
    use platform::caps::aarch64;
    if caps.has(aarch64::NEON) {
      return KernelId::Neon;
    }
  }

  let _ = caps;
  KernelId::Portable
}

fn id_from_u8(v: u8) -> KernelId {
  match v {
    1 => KernelId::Avx2,
    2 => KernelId::Avx512,
    3 => KernelId::Neon,
    _ => KernelId::Portable,
  }
}

fn active() -> KernelId {
  let v = ACTIVE.load(Ordering::Acquire);
  if v != UNSET {
    return id_from_u8(v);
  }

  let id = resolve(platform::caps());
  debug_assert!(platform::caps().has(required_caps(id)));
  ACTIVE.store(id as u8, Ordering::Release);
  id
}

/// The compression function selected for this process.
#[inline]
#[must_use]
pub(crate) fn active_compress() -> CompressFn {
  compress_fn(active())
}

/// Name of the kernel the dispatcher selected for this process.
#[inline]
#[must_use]
pub fn kernel_name() -> &'static str {
  active().as_str()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_without_features_is_portable() {
    assert_eq!(resolve(Caps::NONE), KernelId::Portable);
  }

  #[test]
  #[cfg(all(target_arch = "x86_64", not(feature = "force-portable")))]
  fn resolve_prefers_widest_x86_kernel() {
    use platform::caps::x86;

    assert_eq!(resolve(x86::AVX2), KernelId::Avx2);
    assert_eq!(resolve(x86::AVX2 | x86::AVX512_READY), KernelId::Avx512);
    // AVX-512 needs all three of F, VL, VBMI2.
    assert_eq!(resolve(x86::AVX2 | x86::AVX512F | x86::AVX512VL), KernelId::Avx2);
  }

  #[test]
  #[cfg(all(target_arch = "aarch64", not(feature = "force-portable")))]
  fn resolve_selects_neon() {
    use platform::caps::aarch64;
    assert_eq!(resolve(aarch64::NEON), KernelId::Neon);
  }

  #[test]
  #[cfg(feature = "force-portable")]
  fn force_portable_overrides_detection() {
    use platform::caps::x86;
    assert_eq!(resolve(x86::AVX2 | x86::AVX512_READY), KernelId::Portable);
  }

  #[test]
  fn slot_is_stable_after_first_resolution() {
    let first = active();
    for _ in 0..16 {
      assert_eq!(active(), first);
    }
    assert_eq!(kernel_name(), first.as_str());
  }
}
