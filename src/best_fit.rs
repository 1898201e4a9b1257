use std::{
  collections::{BTreeMap, BTreeSet},
  mem,
  ops::Bound,
  ptr::NonNull,
};

use tracing::trace;

use crate::{align::claim_alignment, block::FreeBlock, error::AllocError, system::SystemRegion};

/// Address-ordered, best-fit allocator over memory claimed from the system.
///
/// Requests are counted in elements of `T`. Freed runs are kept for reuse
/// and never handed back to the system until the allocator is dropped.
///
/// ```text
///   by_addr (address order)          by_len (length, address)
///   ┌──────────┬─────┐               ┌─────┬──────────┐
///   │ 0x1000   │  4  │               │  2  │ 0x3000   │ ◄── best fit for 1..=2
///   │ 0x2000   │ 16  │               │  4  │ 0x1000   │
///   │ 0x3000   │  2  │               │ 16  │ 0x2000   │
///   └──────────┴─────┘               └─────┴──────────┘
/// ```
///
/// Among free blocks of equal minimal length the lowest address wins.
pub struct BlockAllocator<T> {
  by_addr: BTreeMap<usize, FreeBlock<T>>,
  by_len: BTreeSet<(usize, usize)>,
  regions: BTreeMap<usize, SystemRegion>,
  total_capacity: usize,
}

impl<T> BlockAllocator<T> {
  pub fn new() -> Self {
    Self {
      by_addr: BTreeMap::new(),
      by_len: BTreeSet::new(),
      regions: BTreeMap::new(),
      total_capacity: 0,
    }
  }

  /// Returns a pointer to `count` contiguous, uninitialized elements.
  ///
  /// The smallest free block that fits is used; any excess stays in the
  /// free set. When nothing fits, `count` new elements are claimed from the
  /// system. Zero-length requests and zero-sized `T` get a dangling pointer
  /// and leave the allocator untouched.
  pub fn allocate(
    &mut self,
    count: usize,
  ) -> Result<NonNull<T>, AllocError> {
    if count == 0 || mem::size_of::<T>() == 0 {
      return Ok(NonNull::dangling());
    }

    if let Some(mut block) = self.take_best_fit(count) {
      if block.len() > count {
        let remainder = block.split_off(count);
        self.insert_free(remainder);
      }

      trace!(count, address = ?block.ptr(), "allocate: reused free block");

      #[cfg(debug_assertions)]
      self.check_integrity();

      return Ok(block.ptr());
    }

    let ptr = self.claim(count)?;

    trace!(count, address = ?ptr, total_capacity = self.total_capacity, "allocate: claimed");

    Ok(ptr)
  }

  /// Returns `count` elements starting at `ptr` to the free set and fuses
  /// the run with any free neighbours.
  ///
  /// # Safety
  ///
  /// `ptr` and `count` must be exactly what an earlier call to
  /// [`allocate`](Self::allocate) on this allocator returned and was asked
  /// for, and the run must not have been deallocated since. Any elements
  /// still living there are not dropped.
  pub unsafe fn deallocate(
    &mut self,
    ptr: NonNull<T>,
    count: usize,
  ) {
    if count == 0 || mem::size_of::<T>() == 0 {
      return;
    }

    let addr = ptr.as_ptr() as usize;
    let region = self.region_of(addr, count * mem::size_of::<T>());

    debug_assert!(region.is_some(), "deallocate: {addr:#x} (+{count}) is not inside a claimed region");

    let block = FreeBlock::new(ptr, count, region.unwrap_or(addr));

    debug_assert!(!self.overlaps_free(&block), "deallocate: {block:?} overlaps the free set");

    trace!(count, address = ?ptr, "deallocate");

    self.insert_free(block);
    self.coalesce_around(addr);

    #[cfg(debug_assertions)]
    self.check_integrity();
  }

  /// Elements ever claimed from the system. Never decreases.
  pub fn total_capacity(&self) -> usize {
    self.total_capacity
  }

  /// Free blocks in address order.
  pub fn free_blocks(&self) -> impl Iterator<Item = &FreeBlock<T>> {
    self.by_addr.values()
  }

  /// Total free elements across all blocks.
  pub fn free_len(&self) -> usize {
    self.by_addr.values().map(FreeBlock::len).sum()
  }

  /// Number of chunks claimed from the system.
  pub fn region_count(&self) -> usize {
    self.regions.len()
  }

  fn claim(
    &mut self,
    count: usize,
  ) -> Result<NonNull<T>, AllocError> {
    let bytes = count
      .checked_mul(mem::size_of::<T>())
      .filter(|&bytes| bytes <= isize::MAX as usize)
      .map(|bytes| crate::align!(bytes))
      .ok_or(AllocError::CapacityOverflow { requested: count })?;

    let region = SystemRegion::claim(count, bytes, claim_alignment::<T>())?;
    let ptr = region.base().cast::<T>();

    self.regions.insert(region.addr(), region);
    self.total_capacity += count;

    Ok(ptr)
  }

  fn take_best_fit(
    &mut self,
    count: usize,
  ) -> Option<FreeBlock<T>> {
    let &(_, addr) = self.by_len.range((count, 0)..).next()?;

    self.remove_free(addr)
  }

  fn insert_free(
    &mut self,
    block: FreeBlock<T>,
  ) {
    self.by_len.insert((block.len(), block.addr()));
    self.by_addr.insert(block.addr(), block);
  }

  fn remove_free(
    &mut self,
    addr: usize,
  ) -> Option<FreeBlock<T>> {
    let block = self.by_addr.remove(&addr)?;
    self.by_len.remove(&(block.len(), addr));

    Some(block)
  }

  /// Fuses the free block at `addr` with its address neighbours.
  ///
  /// The free set has no adjacent pair before the insert, so only the
  /// predecessor and the successor can touch the new block.
  fn coalesce_around(
    &mut self,
    addr: usize,
  ) {
    let mut start = addr;

    let prev = self.by_addr.range(..addr).next_back().map(|(&a, b)| (a, *b));
    if let Some((prev_addr, prev)) = prev {
      if self.by_addr.get(&addr).is_some_and(|block| prev.is_adjacent_to(block)) {
        start = prev_addr;
        self.merge_with_next(prev_addr);
      }
    }

    let next = self
      .by_addr
      .range((Bound::Excluded(start), Bound::Unbounded))
      .next()
      .map(|(_, b)| *b);
    if let Some(next) = next {
      if self.by_addr.get(&start).is_some_and(|block| block.is_adjacent_to(&next)) {
        self.merge_with_next(start);
      }
    }
  }

  fn merge_with_next(
    &mut self,
    addr: usize,
  ) {
    let Some(mut head) = self.remove_free(addr) else {
      return;
    };

    let Some(tail) = self.remove_free(head.end()) else {
      self.insert_free(head);
      return;
    };

    trace!(head = ?head, tail = ?tail, "merging free blocks");

    head.absorb(tail);
    self.insert_free(head);
  }

  fn region_of(
    &self,
    addr: usize,
    bytes: usize,
  ) -> Option<usize> {
    self
      .regions
      .range(..=addr)
      .next_back()
      .filter(|(_, region)| region.contains(addr, bytes))
      .map(|(&base, _)| base)
  }

  fn overlaps_free(
    &self,
    block: &FreeBlock<T>,
  ) -> bool {
    let prev = self.by_addr.range(..=block.addr()).next_back();
    let next = self.by_addr.range(block.addr()..).next();

    prev.into_iter().chain(next).any(|(_, free)| free.overlaps(block))
  }

  #[cfg(debug_assertions)]
  fn check_integrity(&self) {
    assert_eq!(self.by_addr.len(), self.by_len.len());

    let mut prev: Option<&FreeBlock<T>> = None;
    for (&addr, block) in &self.by_addr {
      assert_eq!(addr, block.addr());
      assert!(!block.is_empty(), "empty block {block:?} in free set");
      assert!(self.by_len.contains(&(block.len(), addr)));
      assert!(
        self
          .regions
          .get(&block.region())
          .is_some_and(|region| region.contains(addr, block.end() - addr)),
        "{block:?} escapes its region"
      );

      if let Some(prev) = prev {
        assert!(prev.end() <= addr, "{prev:?} overlaps {block:?}");
        assert!(!prev.is_adjacent_to(block), "{prev:?} and {block:?} were not coalesced");
      }
      prev = Some(block);
    }

    assert!(self.free_len() <= self.total_capacity);
  }
}

impl<T> Default for BlockAllocator<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Drop for BlockAllocator<T> {
  fn drop(&mut self) {
    trace!(
      regions = self.regions.len(),
      free_blocks = self.by_addr.len(),
      total_capacity = self.total_capacity,
      "dropping block allocator"
    );
  }
}
