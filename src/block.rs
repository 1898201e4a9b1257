use std::{fmt, mem, ptr::NonNull};

/// A run of unused elements in the allocator's free set.
///
/// `region` is the base address of the system region the run was carved
/// from. Two runs are only ever fused when they share a region.
pub struct FreeBlock<T> {
  ptr: NonNull<T>,
  len: usize,
  region: usize,
}

impl<T> FreeBlock<T> {
  pub(crate) fn new(
    ptr: NonNull<T>,
    len: usize,
    region: usize,
  ) -> Self {
    Self { ptr, len, region }
  }

  /// Pointer to the first element of the run.
  pub fn ptr(&self) -> NonNull<T> {
    self.ptr
  }

  /// Starting address of the run.
  pub fn addr(&self) -> usize {
    self.ptr.as_ptr() as usize
  }

  /// Length of the run in elements.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Always false: empty runs are never kept.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  #[cfg(debug_assertions)]
  pub(crate) fn region(&self) -> usize {
    self.region
  }

  /// Address one past the last byte of the run.
  pub(crate) fn end(&self) -> usize {
    self.addr() + self.len * mem::size_of::<T>()
  }

  /// Whether `next` starts exactly where this run ends, in the same region.
  pub(crate) fn is_adjacent_to(
    &self,
    next: &FreeBlock<T>,
  ) -> bool {
    self.region == next.region && self.end() == next.addr()
  }

  pub(crate) fn overlaps(
    &self,
    other: &FreeBlock<T>,
  ) -> bool {
    self.addr() < other.end() && other.addr() < self.end()
  }

  /// Cuts the first `count` elements off the run, returning the remainder.
  pub(crate) fn split_off(
    &mut self,
    count: usize,
  ) -> FreeBlock<T> {
    debug_assert!(count < self.len);

    // SAFETY: `count < len`, so the remainder starts inside the run.
    let rest = unsafe { self.ptr.add(count) };
    let remainder = FreeBlock::new(rest, self.len - count, self.region);
    self.len = count;

    remainder
  }

  /// Fuses `next` onto the end of this run.
  pub(crate) fn absorb(
    &mut self,
    next: FreeBlock<T>,
  ) {
    debug_assert!(self.is_adjacent_to(&next));
    self.len += next.len;
  }
}

impl<T> Clone for FreeBlock<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for FreeBlock<T> {}

impl<T> fmt::Debug for FreeBlock<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("FreeBlock")
      .field("addr", &format_args!("{:#x}", self.addr()))
      .field("len", &self.len)
      .finish()
  }
}
