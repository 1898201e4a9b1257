//! # fitvec - A Best-Fit Block Allocator and the Array Built On It
//!
//! This crate provides an **address-ordered, best-fit free-list allocator**
//! that claims memory from the system through `libc`, and a growable
//! contiguous array, [`DynArray`], that takes every buffer it uses from
//! that allocator.
//!
//! ## Overview
//!
//! ```text
//!   DynArray<T>                              BlockAllocator<T>
//!   ┌─────────────────────┐   allocate(n)    ┌───────────────────────────────┐
//!   │ RawBuf { ptr, cap } │ ───────────────► │ free set, ordered by address  │
//!   │ len                 │                  │   ┌──────┐ ┌──────┐ ┌──────┐  │
//!   │ ArrayConfig         │ ◄─────────────── │   │ 0x10 │ │ 0x80 │ │ 0xc0 │  │
//!   └─────────────────────┘  deallocate(p,n) │   └──────┘ └──────┘ └──────┘  │
//!                                            │ regions claimed from libc     │
//!                                            └───────────────────────────────┘
//! ```
//!
//! Only raw pointers and element counts cross between the two. The array
//! alone constructs and drops elements; the allocator only tracks memory.
//!
//! ## Crate Structure
//!
//! ```text
//!   fitvec
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── system     - Regions claimed from / released to libc (internal)
//!   ├── block      - FreeBlock, one run in the free set
//!   ├── best_fit   - BlockAllocator implementation
//!   ├── raw_buf    - RAII buffer owner (internal)
//!   ├── config     - ArrayConfig growth / shrink policy
//!   ├── error      - AllocError, OutOfRange, ConfigError
//!   └── dyn_array  - DynArray implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use fitvec::{DynArray, OutOfRange};
//!
//! let mut array = DynArray::new();
//!
//! array.push(5).unwrap();
//! array.push(3).unwrap();
//! array.push(1).unwrap();
//!
//! assert_eq!(array.at(2), Ok(&1));
//! assert_eq!(array.at(10), Err(OutOfRange { index: 10, size: 3 }));
//!
//! array.sort();
//! assert_eq!(array.as_slice(), &[1, 3, 5]);
//!
//! array.pop();
//! array.clear();
//! assert_eq!(array.capacity(), 0);
//! ```
//!
//! ## How Allocation Works
//!
//! A request for `n` elements takes the smallest free block of at least
//! `n`, lowest address first among equals. The tail the request did not
//! need stays free:
//!
//! ```text
//!   before:  ┌──────────────── free, 10 ─────────────────┐
//!   after:   ┌─── in use, 4 ───┬──────── free, 6 ────────┐
//!            ▲
//!            └── pointer returned
//! ```
//!
//! When nothing fits, exactly `n` elements are claimed from the system and
//! `total_capacity` grows by `n`. Freed runs go back into the free set and
//! are fused with free neighbours in the same region:
//!
//! ```text
//!   free [0,4), then free [4,10):
//!   ┌── free, 4 ──┬────── free, 6 ──────┐   ──►   ┌────────── free, 10 ──────────┐
//! ```
//!
//! Memory is only handed back to the system when the allocator is dropped.
//!
//! ## How the Array Grows
//!
//! ```text
//!   capacity:  0 → 1 → 2 → 4 → 8 → …         (growth_factor = 2.0)
//!   pop/clear: len < capacity * 0.5  ⇒  capacity = len
//! ```
//!
//! Every resize allocates the new buffer, moves the elements across and
//! returns the old buffer to the allocator.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: allocators are shared through `Rc<RefCell<_>>`
//! - **No eager release**: freed blocks are kept until the allocator drops
//! - **Unix-only**: requires `libc` and `posix_memalign`
//!
//! ## Safety
//!
//! [`BlockAllocator::deallocate`] is `unsafe`: the caller must hand back
//! exactly what it was given. [`DynArray`] wraps all of that behind a safe
//! interface except for [`DynArray::get_unchecked`].

pub mod align;
pub mod best_fit;
pub mod block;
pub mod config;
pub mod dyn_array;
pub mod error;
mod raw_buf;
mod system;

pub use best_fit::BlockAllocator;
pub use block::FreeBlock;
pub use config::ArrayConfig;
pub use dyn_array::DynArray;
pub use error::{AllocError, ArrayError, ConfigError, OutOfRange};
pub use raw_buf::SharedAllocator;
