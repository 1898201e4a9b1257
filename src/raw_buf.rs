use std::{cell::RefCell, ptr::NonNull, rc::Rc};

use tracing::trace;

use crate::{best_fit::BlockAllocator, error::AllocError};

/// An allocator shared by every array that draws from it.
pub type SharedAllocator<T> = Rc<RefCell<BlockAllocator<T>>>;

/// Sole owner of one buffer handed out by a [`BlockAllocator`].
///
/// Knows nothing about which slots hold live elements; dropping it returns
/// the memory to the allocator without dropping any element.
pub(crate) struct RawBuf<T> {
  ptr: NonNull<T>,
  cap: usize,
  alloc: SharedAllocator<T>,
}

impl<T> RawBuf<T> {
  /// A buffer that holds no memory.
  pub(crate) fn empty(alloc: SharedAllocator<T>) -> Self {
    Self {
      ptr: NonNull::dangling(),
      cap: 0,
      alloc,
    }
  }

  /// Obtains room for `cap` elements from `alloc`.
  pub(crate) fn allocate(
    cap: usize,
    alloc: SharedAllocator<T>,
  ) -> Result<Self, AllocError> {
    if cap == 0 {
      return Ok(Self::empty(alloc));
    }

    let ptr = alloc.borrow_mut().allocate(cap)?;

    Ok(Self { ptr, cap, alloc })
  }

  pub(crate) fn ptr(&self) -> NonNull<T> {
    self.ptr
  }

  pub(crate) fn capacity(&self) -> usize {
    self.cap
  }

  pub(crate) fn allocator(&self) -> &SharedAllocator<T> {
    &self.alloc
  }
}

impl<T> Drop for RawBuf<T> {
  fn drop(&mut self) {
    if self.cap == 0 {
      return;
    }

    trace!(address = ?self.ptr, capacity = self.cap, "returning buffer");

    // SAFETY: `ptr`/`cap` is exactly what `allocate` handed out, and this
    // buffer is its only owner.
    unsafe { self.alloc.borrow_mut().deallocate(self.ptr, self.cap) };
  }
}
