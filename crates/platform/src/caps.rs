//! CPU capability representation.
//!
//! [`Caps`] is a compact bitset answering one question: "which vector
//! extensions can I legally run on this machine?" Legally means the CPU
//! reports the feature *and* the OS saves the corresponding register state.

/// CPU capability bitset.
///
/// Each bit corresponds to one ISA extension. The bits are
/// architecture-specific but the API is uniform; each architecture uses a
/// distinct region of the bitset:
///
/// - Bits 0..32: x86/x86-64 features
/// - Bits 32..48: aarch64/arm features
///
/// # Thread Safety
///
/// `Caps` is `Copy`, `Send`, and `Sync`. It can be freely shared across
/// threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub u64);

impl Caps {
  /// No capabilities (portable baseline).
  pub const NONE: Self = Self(0);

  /// Check if all bits in `required` are set in `self`.
  #[inline]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0 & required.0) == required.0
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  /// Check if the set is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

/// x86/x86-64 feature bits (bits 0..32).
pub mod x86 {
  use super::Caps;

  pub const AVX2: Caps = Caps(1 << 0);
  pub const AVX512F: Caps = Caps(1 << 1);
  pub const AVX512VL: Caps = Caps(1 << 2);
  pub const AVX512VBMI2: Caps = Caps(1 << 3);

  /// Everything the wide-rotate kernel needs: F + VL + VBMI2.
  pub const AVX512_READY: Caps = Caps(AVX512F.0 | AVX512VL.0 | AVX512VBMI2.0);
}

/// aarch64/arm feature bits (bits 32..48).
pub mod aarch64 {
  use super::Caps;

  pub const NEON: Caps = Caps(1 << 32);
}

/// Target architecture enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
  X86_64,
  X86,
  Aarch64,
  Arm,
  #[default]
  Other,
}

impl Arch {
  /// Get the architecture for the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    #[cfg(target_arch = "x86_64")]
    {
      Self::X86_64
    }
    #[cfg(target_arch = "x86")]
    {
      Self::X86
    }
    #[cfg(target_arch = "aarch64")]
    {
      Self::Aarch64
    }
    #[cfg(target_arch = "arm")]
    {
      Self::Arm
    }
    #[cfg(not(any(
      target_arch = "x86_64",
      target_arch = "x86",
      target_arch = "aarch64",
      target_arch = "arm"
    )))]
    {
      Self::Other
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn caps_has_and_union() {
    let caps = x86::AVX2.union(x86::AVX512F);
    assert!(caps.has(x86::AVX2));
    assert!(caps.has(x86::AVX512F));
    assert!(!caps.has(x86::AVX512VBMI2));
    assert!(!caps.has(x86::AVX512_READY));
  }

  #[test]
  fn avx512_ready_requires_all_three() {
    assert!(x86::AVX512_READY.has(x86::AVX512F));
    assert!(x86::AVX512_READY.has(x86::AVX512VL));
    assert!(x86::AVX512_READY.has(x86::AVX512VBMI2));

    let partial = x86::AVX512F | x86::AVX512VL;
    assert!(!partial.has(x86::AVX512_READY));
  }

  #[test]
  fn feature_bits_do_not_overlap() {
    assert_eq!(x86::AVX2.0 & x86::AVX512F.0, 0);
    assert_eq!(x86::AVX512VBMI2.0 & aarch64::NEON.0, 0);
  }

  #[test]
  fn none_is_empty() {
    assert!(Caps::NONE.is_empty());
    assert!(!aarch64::NEON.is_empty());
  }

  #[test]
  fn arch_current_matches_target() {
    let arch = Arch::current();
    #[cfg(target_arch = "x86_64")]
    assert_eq!(arch, Arch::X86_64);
    #[cfg(target_arch = "aarch64")]
    assert_eq!(arch, Arch::Aarch64);
    let _ = arch;
  }
}
