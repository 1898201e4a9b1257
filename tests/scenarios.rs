use std::{cell::RefCell, rc::Rc};

use fitvec::{ArrayConfig, ArrayError, BlockAllocator, DynArray, OutOfRange, SharedAllocator};

fn free_blocks<T>(allocator: &BlockAllocator<T>) -> Vec<(usize, usize)> {
  allocator.free_blocks().map(|block| (block.addr(), block.len())).collect()
}

#[test]
fn test_split_frees_coalesce_back_into_one_block() {
  let mut allocator = BlockAllocator::<u32>::new();
  let base = allocator.allocate(10).unwrap();
  let addr = base.as_ptr() as usize;

  unsafe {
    allocator.deallocate(base, 4);
    allocator.deallocate(base.add(4), 6);
  }

  assert_eq!(free_blocks(&allocator), vec![(addr, 10)]);

  let again = allocator.allocate(10).unwrap();

  assert_eq!(again, base);
  assert_eq!(allocator.total_capacity(), 10);
  assert!(free_blocks(&allocator).is_empty());

  unsafe { allocator.deallocate(again, 10) };
}

#[test]
fn test_freed_block_is_reused_for_smaller_request() {
  let mut allocator = BlockAllocator::<u64>::new();
  let ptr = allocator.allocate(32).unwrap();

  unsafe { allocator.deallocate(ptr, 32) };

  let smaller = allocator.allocate(20).unwrap();

  assert_eq!(smaller, ptr);
  assert_eq!(allocator.total_capacity(), 32);
  assert_eq!(allocator.free_len(), 12);
}

#[test]
fn test_push_hundred_elements() {
  let mut array = DynArray::new();
  let mut capacities = vec![array.capacity()];

  for value in 0..100 {
    array.push(value).unwrap();

    assert_eq!(array.len(), value + 1);
    assert!(array.capacity() >= array.len());
    assert_eq!(array.at(value), Ok(&value));

    if capacities.last() != Some(&array.capacity()) {
      capacities.push(array.capacity());
    }
  }

  assert_eq!(array.len(), 100);
  assert_eq!(capacities, vec![0, 1, 2, 4, 8, 16, 32, 64, 128]);
}

#[test]
fn test_pop_down_shrinks() {
  let mut array = DynArray::<i32>::new();
  for value in 0..100 {
    array.push(value).unwrap();
  }
  assert_eq!(array.capacity(), 128);

  let mut shrinks = 0;
  while array.len() > 10 {
    let before = array.capacity();
    array.pop();
    if array.capacity() < before {
      shrinks += 1;
    }
  }

  assert!(shrinks >= 1);
  assert!(array.capacity() < 2 * array.len());
  assert_eq!(array.as_slice(), (0..10).collect::<Vec<_>>().as_slice());
}

#[test]
fn test_bounds_on_size_three() {
  let mut array = DynArray::new();
  for value in ['a', 'b', 'c'] {
    array.push(value).unwrap();
  }

  let err = array.at(3).unwrap_err();
  assert_eq!(err, OutOfRange { index: 3, size: 3 });
  assert_eq!(err.to_string(), "index 3 out of range for array of size 3");

  assert_eq!(array.at(2), Ok(&'c'));
}

#[test]
fn test_errors_compose_with_question_mark() {
  fn push_then_read(
    array: &mut DynArray<u8>,
    value: u8,
    index: usize,
  ) -> Result<u8, ArrayError> {
    array.push(value)?;
    Ok(*array.at(index)?)
  }

  let mut array = DynArray::new();

  assert_eq!(push_then_read(&mut array, 1, 0), Ok(1));
  assert_eq!(
    push_then_read(&mut array, 2, 5),
    Err(ArrayError::OutOfRange(OutOfRange { index: 5, size: 2 }))
  );
}

#[test]
fn test_copy_then_mutate_leaves_source_alone() {
  let mut source = DynArray::new();
  for value in ["x", "y", "z"] {
    source.push(value.to_string()).unwrap();
  }

  let mut copy = source.clone();
  copy[1].push('!');
  copy.pop();
  copy.clear();

  assert_eq!(source.len(), 3);
  assert_eq!(source.as_slice(), &["x", "y", "z"]);
}

#[test]
fn test_move_leaves_source_empty() {
  let mut a = DynArray::new();
  for value in 0..5u16 {
    a.push(value).unwrap();
  }

  let b = a.take();

  assert_eq!(b.as_slice(), &[0, 1, 2, 3, 4]);
  assert_eq!(a.len(), 0);
  assert_eq!(a.capacity(), 0);
  assert!(a.at(0).is_err());
}

#[test]
fn test_arrays_sharing_an_allocator() {
  let alloc: SharedAllocator<u32> = Rc::new(RefCell::new(BlockAllocator::new()));
  let config = ArrayConfig::new(2.0, 0.5).unwrap();

  let mut a = DynArray::with_config_in(config, Rc::clone(&alloc));
  let mut b = DynArray::with_config_in(config, Rc::clone(&alloc));

  for value in 0..16 {
    a.push(value).unwrap();
  }
  a.clear();
  let claimed = alloc.borrow().total_capacity();

  for value in 0..16 {
    b.push(value).unwrap();
  }

  assert_eq!(alloc.borrow().total_capacity(), claimed);

  drop(a);
  drop(b);

  let alloc = alloc.borrow();
  assert_eq!(alloc.free_len(), alloc.total_capacity());
}
