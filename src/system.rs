use std::ptr::{self, NonNull};

use libc::{c_void, free, posix_memalign};
use tracing::debug;

use crate::error::AllocError;

/// A chunk of memory claimed from the system allocator.
///
/// The region is released back to libc when dropped. Nothing inside it is
/// ever dropped: the region only knows about bytes.
///
/// ```text
///   base                                   base + bytes
///   ▼                                           ▼
///   ┌───────────┬───────────────┬───────────────┐
///   │  buffer   │  free block   │    buffer     │
///   └───────────┴───────────────┴───────────────┘
/// ```
pub(crate) struct SystemRegion {
  base: NonNull<u8>,
  bytes: usize,
}

impl SystemRegion {
  /// Claims `bytes` bytes aligned to `alignment` for a request of
  /// `requested` elements.
  ///
  /// `alignment` must be a power of two and a multiple of the pointer size.
  pub(crate) fn claim(
    requested: usize,
    bytes: usize,
    alignment: usize,
  ) -> Result<Self, AllocError> {
    debug_assert!(bytes > 0);
    debug_assert!(alignment.is_power_of_two());

    if bytes > isize::MAX as usize {
      return Err(AllocError::CapacityOverflow { requested });
    }

    let mut raw: *mut c_void = ptr::null_mut();

    // SAFETY: `raw` is a valid out pointer and `alignment` satisfies the
    // power-of-two / word-multiple requirement of posix_memalign.
    let status = unsafe { posix_memalign(&mut raw, alignment, bytes) };

    if status != 0 {
      return Err(AllocError::Exhausted { requested, bytes });
    }

    let base = NonNull::new(raw as *mut u8).ok_or(AllocError::Exhausted { requested, bytes })?;

    debug!(address = ?base, bytes, alignment, "claimed system region");

    Ok(Self { base, bytes })
  }

  pub(crate) fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub(crate) fn addr(&self) -> usize {
    self.base.as_ptr() as usize
  }

  /// Whether the byte range `[addr, addr + len)` lies inside this region.
  pub(crate) fn contains(
    &self,
    addr: usize,
    len: usize,
  ) -> bool {
    addr >= self.addr() && addr.saturating_add(len) <= self.addr() + self.bytes
  }
}

impl Drop for SystemRegion {
  fn drop(&mut self) {
    debug!(address = ?self.base, bytes = self.bytes, "released system region");

    // SAFETY: `base` came from posix_memalign and is released exactly once.
    unsafe { free(self.base.as_ptr() as *mut c_void) };
  }
}
