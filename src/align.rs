/// Alignment every granted address and every hunk size honours.
///
/// Large enough for any scalar type and for 128-bit vector registers.
pub const ALIGNMENT: usize = 16;

/// The largest multiple of [`ALIGNMENT`] representable in a `usize`.
pub const MAX_ALIGNED: usize = usize::MAX & !(ALIGNMENT - 1);

/// Rounds a byte count up to the next multiple of [`ALIGNMENT`].
///
/// The arithmetic is unchecked; use [`align_up`] when the input may come
/// within `ALIGNMENT` of `usize::MAX`.
///
/// # Examples
///
/// ```rust
/// use rcarena::align;
///
/// assert_eq!(align!(0), 0);
/// assert_eq!(align!(1), 16);
/// assert_eq!(align!(16), 16);
/// assert_eq!(align!(100), 112);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + $crate::align::ALIGNMENT - 1) & !($crate::align::ALIGNMENT - 1)
  };
}

/// Rounds `value` up to a multiple of an arbitrary power of two.
///
/// ```rust
/// use rcarena::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(4096, 4096), 4096);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Checked form of [`align!`]. Returns `None` on overflow.
pub fn align_up(value: usize) -> Option<usize> {
  value
    .checked_add(ALIGNMENT - 1)
    .map(|v| v & !(ALIGNMENT - 1))
}

/// Whether `addr` sits on an [`ALIGNMENT`] boundary.
pub fn is_aligned(addr: usize) -> bool {
  addr & (ALIGNMENT - 1) == 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_align() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ALIGNMENT * i + 1)..=(ALIGNMENT * (i + 1));

      let expected_alignment = ALIGNMENT * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
        assert_eq!(Some(expected), align_up(size));
      }
    }
  }

  #[test]
  fn test_align_is_power_of_two() {
    assert!(ALIGNMENT.is_power_of_two());
    assert!(ALIGNMENT >= std::mem::align_of::<u128>());
    assert!(ALIGNMENT >= std::mem::align_of::<f64>());
  }

  #[test]
  fn test_align_up_overflow() {
    assert_eq!(align_up(usize::MAX), None);
    assert_eq!(align_up(usize::MAX - ALIGNMENT + 2), None);
    assert_eq!(align_up(MAX_ALIGNED), Some(MAX_ALIGNED));
  }

  #[test]
  fn test_align_to() {
    assert_eq!(align_to!(1, 8), 8);
    assert_eq!(align_to!(9, 8), 16);
    assert_eq!(align_to!(1000, 1024), 1024);
  }

  #[test]
  fn test_is_aligned() {
    assert!(is_aligned(0));
    assert!(is_aligned(32));
    assert!(!is_aligned(8));
  }
}
