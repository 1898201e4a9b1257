//! Growth and shrink policy for [`DynArray`](crate::DynArray).

use crate::error::ConfigError;

/// Capacity policy of a dynamic array.
///
/// Fixed at construction. The only way to build one besides [`Default`] is
/// [`ArrayConfig::new`], which validates both values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrayConfig {
  growth_factor: f64,
  shrink_threshold: f64,
}

impl ArrayConfig {
  /// Capacity multiplier applied when a push finds the buffer full.
  pub const DEFAULT_GROWTH_FACTOR: f64 = 2.0;

  /// Occupancy below which a pop or clear shrinks the buffer to fit.
  pub const DEFAULT_SHRINK_THRESHOLD: f64 = 0.5;

  /// Creates a config, rejecting a growth factor that is not a finite
  /// number above 1.0 or a shrink threshold outside `(0, 1)`.
  pub fn new(
    growth_factor: f64,
    shrink_threshold: f64,
  ) -> Result<Self, ConfigError> {
    if !growth_factor.is_finite() || growth_factor <= 1.0 {
      return Err(ConfigError::GrowthFactor(growth_factor));
    }

    if !(shrink_threshold > 0.0 && shrink_threshold < 1.0) {
      return Err(ConfigError::ShrinkThreshold(shrink_threshold));
    }

    Ok(Self { growth_factor, shrink_threshold })
  }

  pub fn growth_factor(&self) -> f64 {
    self.growth_factor
  }

  pub fn shrink_threshold(&self) -> f64 {
    self.shrink_threshold
  }

  /// Capacity to grow to from `capacity`, or `None` if it is not
  /// representable.
  ///
  /// Always strictly larger than `capacity`; an empty buffer grows to one.
  pub(crate) fn grown_capacity(
    &self,
    capacity: usize,
  ) -> Option<usize> {
    if capacity == 0 {
      return Some(1);
    }

    let scaled = (capacity as f64 * self.growth_factor).ceil();
    if !scaled.is_finite() || scaled >= isize::MAX as f64 {
      return None;
    }

    Some((scaled as usize).max(capacity.checked_add(1)?))
  }

  /// Whether `len` live elements are sparse enough in `capacity` to shrink.
  pub(crate) fn should_shrink(
    &self,
    len: usize,
    capacity: usize,
  ) -> bool {
    (len as f64) < capacity as f64 * self.shrink_threshold
  }
}

impl Default for ArrayConfig {
  fn default() -> Self {
    Self {
      growth_factor: Self::DEFAULT_GROWTH_FACTOR,
      shrink_threshold: Self::DEFAULT_SHRINK_THRESHOLD,
    }
  }
}
