/// Rounds `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use fitvec::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(1, 64), 64);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}

/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use fitvec::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Alignment used when claiming memory for elements of type `T`.
///
/// `posix_memalign` wants a power of two that is also a multiple of the
/// pointer size, so small element alignments are raised to a word.
pub(crate) const fn claim_alignment<T>() -> usize {
  let word = core::mem::size_of::<usize>();
  let align = core::mem::align_of::<T>();

  if align > word { align } else { word }
}
