use std::{
  cell::RefCell,
  fmt,
  mem,
  ops::{Deref, DerefMut},
  ptr,
  rc::Rc,
  slice,
};

use tracing::{trace, warn};

use crate::{
  best_fit::BlockAllocator,
  config::ArrayConfig,
  error::{AllocError, OutOfRange},
  raw_buf::{RawBuf, SharedAllocator},
};

/// A growable, contiguous sequence whose buffer comes from a
/// [`BlockAllocator`].
///
/// ```text
///   buf.ptr()
///   ▼
///   ┌────┬────┬────┬────┬────┬─────────────────┐
///   │ e0 │ e1 │ e2 │ e3 │ e4 │  uninitialized  │
///   └────┴────┴────┴────┴────┴─────────────────┘
///   ◄──────── len ─────────►
///   ◄──────────────── capacity ────────────────►
/// ```
///
/// Pushing onto a full buffer moves every element into a buffer
/// `growth_factor` times larger. Popping or clearing below
/// `shrink_threshold` occupancy moves them into a buffer of exactly `len`.
/// The old buffer always goes back to the allocator.
pub struct DynArray<T> {
  buf: RawBuf<T>,
  len: usize,
  config: ArrayConfig,
}

impl<T> DynArray<T> {
  /// An empty array with the default policy and a private allocator.
  pub fn new() -> Self {
    Self::with_config(ArrayConfig::default())
  }

  /// An empty array with `config` and a private allocator.
  pub fn with_config(config: ArrayConfig) -> Self {
    Self::with_config_in(config, Rc::new(RefCell::new(BlockAllocator::new())))
  }

  /// An empty array drawing from `alloc`.
  pub fn new_in(alloc: SharedAllocator<T>) -> Self {
    Self::with_config_in(ArrayConfig::default(), alloc)
  }

  pub fn with_config_in(
    config: ArrayConfig,
    alloc: SharedAllocator<T>,
  ) -> Self {
    Self {
      buf: RawBuf::empty(alloc),
      len: 0,
      config,
    }
  }

  /// Number of live elements.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Number of elements the current buffer can hold.
  pub fn capacity(&self) -> usize {
    self.buf.capacity()
  }

  pub fn config(&self) -> &ArrayConfig {
    &self.config
  }

  /// The allocator this array draws its buffers from.
  pub fn allocator(&self) -> &SharedAllocator<T> {
    self.buf.allocator()
  }

  /// Appends `value`, growing the buffer first if it is full.
  ///
  /// On error the array is left exactly as it was and `value` is dropped.
  pub fn push(
    &mut self,
    value: T,
  ) -> Result<(), AllocError> {
    if self.len == self.capacity() {
      let new_cap = self
        .config
        .grown_capacity(self.capacity())
        .ok_or(AllocError::CapacityOverflow { requested: self.capacity().saturating_add(1) })?;

      self.reallocate(new_cap)?;
    }

    // SAFETY: `len < capacity`, so the slot is inside the buffer and
    // uninitialized.
    unsafe { self.buf.ptr().add(self.len).write(value) };
    self.len += 1;

    Ok(())
  }

  /// Removes and returns the last element, shrinking the buffer if it has
  /// become sparse.
  pub fn pop(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    self.len -= 1;

    // SAFETY: the slot at the old `len - 1` was live and is now past the
    // end, so reading it out moves ownership to the caller.
    let value = unsafe { self.buf.ptr().add(self.len).read() };

    self.shrink_if_sparse();

    Some(value)
  }

  /// Drops every element and gives the buffer back to the allocator.
  pub fn clear(&mut self) {
    let len = mem::replace(&mut self.len, 0);

    // SAFETY: the first `len` slots were live. `len` is already zero, so a
    // panicking destructor leaks the rest instead of dropping them twice.
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr().as_ptr(), len)) };

    self.shrink_if_sparse();
  }

  /// The element at `index`, or [`OutOfRange`] when `index >= len`.
  pub fn at(
    &self,
    index: usize,
  ) -> Result<&T, OutOfRange> {
    self.as_slice().get(index).ok_or(OutOfRange { index, size: self.len })
  }

  pub fn at_mut(
    &mut self,
    index: usize,
  ) -> Result<&mut T, OutOfRange> {
    let size = self.len;

    self.as_mut_slice().get_mut(index).ok_or(OutOfRange { index, size })
  }

  /// The element at `index` without a bounds check.
  ///
  /// # Safety
  ///
  /// `index` must be less than [`len`](Self::len).
  pub unsafe fn get_unchecked(
    &self,
    index: usize,
  ) -> &T {
    debug_assert!(index < self.len, "get_unchecked: index {index} >= len {}", self.len);

    unsafe { &*self.buf.ptr().as_ptr().add(index) }
  }

  /// Mutable counterpart of [`get_unchecked`](Self::get_unchecked).
  ///
  /// # Safety
  ///
  /// `index` must be less than [`len`](Self::len).
  pub unsafe fn get_unchecked_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    debug_assert!(index < self.len, "get_unchecked_mut: index {index} >= len {}", self.len);

    unsafe { &mut *self.buf.ptr().as_ptr().add(index) }
  }

  pub fn as_slice(&self) -> &[T] {
    // SAFETY: the first `len` slots are live, and the pointer is aligned and
    // non-null even when no buffer is held.
    unsafe { slice::from_raw_parts(self.buf.ptr().as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    // SAFETY: as in `as_slice`, and `&mut self` makes the borrow unique.
    unsafe { slice::from_raw_parts_mut(self.buf.ptr().as_ptr(), self.len) }
  }

  /// Moves the contents out, leaving `self` empty with no buffer.
  ///
  /// The returned array keeps the buffer, length, capacity and config. Both
  /// arrays keep drawing from the same allocator.
  pub fn take(&mut self) -> Self {
    let empty = RawBuf::empty(Rc::clone(self.allocator()));

    Self {
      buf: mem::replace(&mut self.buf, empty),
      len: mem::replace(&mut self.len, 0),
      config: self.config,
    }
  }

  /// Copies every element into a fresh buffer of the same capacity from the
  /// same allocator.
  ///
  /// If a `clone` panics, the copies made so far are dropped and the new
  /// buffer is returned to the allocator before the panic continues.
  pub fn try_clone(&self) -> Result<Self, AllocError>
  where
    T: Clone,
  {
    self.clone_with_capacity(self.capacity())
  }

  fn clone_with_capacity(
    &self,
    capacity: usize,
  ) -> Result<Self, AllocError>
  where
    T: Clone,
  {
    debug_assert!(capacity >= self.len);

    let buf = RawBuf::allocate(capacity, Rc::clone(self.allocator()))?;

    // `out.len` only counts finished clones, so its own drop is the cleanup.
    let mut out = Self {
      buf,
      len: 0,
      config: self.config,
    };

    for item in self.iter() {
      // SAFETY: `out.len < self.len <= out.capacity()`.
      unsafe { out.buf.ptr().add(out.len).write(item.clone()) };
      out.len += 1;
    }

    Ok(out)
  }

  /// Moves the live elements into a buffer of `new_cap` slots.
  fn reallocate(
    &mut self,
    new_cap: usize,
  ) -> Result<(), AllocError> {
    debug_assert!(new_cap >= self.len);

    let new_buf = RawBuf::allocate(new_cap, Rc::clone(self.allocator()))?;

    trace!(len = self.len, from = self.capacity(), to = new_cap, "reallocate");

    // SAFETY: the buffers are distinct allocations, both hold at least `len`
    // slots, and the bitwise copy moves ownership of each element. The old
    // buffer is returned below without dropping anything in it.
    unsafe { ptr::copy_nonoverlapping(self.buf.ptr().as_ptr(), new_buf.ptr().as_ptr(), self.len) };

    drop(mem::replace(&mut self.buf, new_buf));

    Ok(())
  }

  fn shrink_if_sparse(&mut self) {
    if !self.config.should_shrink(self.len, self.capacity()) {
      return;
    }

    if let Err(err) = self.reallocate(self.len) {
      warn!(len = self.len, capacity = self.capacity(), %err, "shrink failed, keeping current buffer");
    }
  }
}

impl<T> Drop for DynArray<T> {
  fn drop(&mut self) {
    // SAFETY: the first `len` slots are live; the buffer itself is returned
    // when `buf` drops after this.
    unsafe { ptr::drop_in_place(self.as_mut_slice()) };
  }
}

impl<T> Default for DynArray<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone> Clone for DynArray<T> {
  /// # Panics
  ///
  /// Panics if the allocator cannot supply the new buffer. Use
  /// [`DynArray::try_clone`] to handle that case.
  fn clone(&self) -> Self {
    match self.try_clone() {
      Ok(copy) => copy,
      Err(err) => panic!("failed to clone array: {err}"),
    }
  }

  /// Replaces `self` with a copy of `source`, taking its config and
  /// allocator. The old elements and buffer are released first.
  fn clone_from(
    &mut self,
    source: &Self,
  ) {
    *self = Self::with_config_in(source.config, Rc::clone(source.allocator()));
    *self = source.clone();
  }
}

impl<T> Deref for DynArray<T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T> DerefMut for DynArray<T> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
  type Item = &'a mut T;
  type IntoIter = slice::IterMut<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter_mut()
  }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq> Eq for DynArray<T> {}
