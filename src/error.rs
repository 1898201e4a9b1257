//! Error types shared by the allocator and the array.

use thiserror::Error;

/// Failure to obtain memory for a request of `requested` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
  /// The request does not fit in the address space (the byte size overflows
  /// `usize` or exceeds `isize::MAX`).
  #[error("allocation of {requested} elements overflows the address space")]
  CapacityOverflow {
    /// Number of elements requested.
    requested: usize,
  },

  /// The system allocator refused to hand out more memory.
  #[error("system allocator could not supply {bytes} bytes for {requested} elements")]
  Exhausted {
    /// Number of elements requested.
    requested: usize,
    /// Number of bytes asked of the system.
    bytes: usize,
  },
}

/// Checked access past the live elements of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("index {index} out of range for array of size {size}")]
pub struct OutOfRange {
  /// The offending index.
  pub index: usize,
  /// Array size at the time of the access.
  pub size: usize,
}

/// Rejected array configuration.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
  #[error("growth factor must be finite and greater than 1.0, got {0}")]
  GrowthFactor(f64),

  #[error("shrink threshold must lie strictly between 0 and 1, got {0}")]
  ShrinkThreshold(f64),
}

/// Any failure surfaced by a [`DynArray`](crate::DynArray) operation.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ArrayError {
  #[error(transparent)]
  OutOfRange(#[from] OutOfRange),

  #[error(transparent)]
  Alloc(#[from] AllocError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}
