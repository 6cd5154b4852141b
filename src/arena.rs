use std::ptr::NonNull;

use crate::{align, error::ArenaError};

/// The allocation capability an arena offers.
///
/// Handing out and taking back byte ranges never touches their contents,
/// so every method is safe. Reading or writing through a granted address
/// is the caller's `unsafe` business.
pub trait Arena {
  /// Grants at least `nbytes` bytes aligned to
  /// [`ALIGNMENT`](crate::align::ALIGNMENT).
  fn alloc(
    &mut self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError>;

  /// Takes back a range granted by [`alloc`](Arena::alloc). Null is a no-op.
  ///
  /// # Panics
  ///
  /// Panics when `ptr` is not a live allocation of this arena.
  fn free(
    &mut self,
    ptr: *mut u8,
  );

  /// The number of bytes `alloc(nbytes)` grants: `nbytes` rounded up to
  /// the alignment every granted address honours, with zero counting as
  /// one byte.
  ///
  /// Requests within `ALIGNMENT` of `usize::MAX` saturate to
  /// [`MAX_ALIGNED`](crate::align::MAX_ALIGNED); `alloc` refuses them with
  /// [`ArenaError::SizeOverflow`].
  fn align(
    &self,
    nbytes: usize,
  ) -> usize {
    align::align_up(nbytes.max(1)).unwrap_or(align::MAX_ALIGNED)
  }
}

impl<A: Arena + ?Sized> Arena for &mut A {
  fn alloc(
    &mut self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    (**self).alloc(nbytes)
  }

  fn free(
    &mut self,
    ptr: *mut u8,
  ) {
    (**self).free(ptr)
  }

  fn align(
    &self,
    nbytes: usize,
  ) -> usize {
    (**self).align(nbytes)
  }
}

impl<A: Arena + ?Sized> Arena for Box<A> {
  fn alloc(
    &mut self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    (**self).alloc(nbytes)
  }

  fn free(
    &mut self,
    ptr: *mut u8,
  ) {
    (**self).free(ptr)
  }

  fn align(
    &self,
    nbytes: usize,
  ) -> usize {
    (**self).align(nbytes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ALIGNMENT, CArena};

  #[test]
  fn test_align_matches_granted_size() {
    let mut arena = CArena::new(1024);

    for n in [0, 1, 15, 16, 17, 100, 1000] {
      let p = arena.alloc(n).unwrap();
      assert_eq!(arena.size_of(p.as_ptr()), Some(arena.align(n)), "request of {n} bytes");
    }
    assert_eq!(arena.align(0), ALIGNMENT);
  }

  #[test]
  fn test_align_saturates_near_max() {
    let mut arena = CArena::new(1024);

    assert_eq!(arena.align(usize::MAX), align::MAX_ALIGNED);
    assert_eq!(arena.align(align::MAX_ALIGNED), align::MAX_ALIGNED);
    assert!(matches!(
      arena.alloc(usize::MAX),
      Err(ArenaError::SizeOverflow { requested: usize::MAX })
    ));
  }

  #[test]
  fn test_align_through_box() {
    let arena: Box<dyn Arena> = Box::new(CArena::new(1024));
    assert_eq!(arena.align(usize::MAX), align::MAX_ALIGNED);
    assert_eq!(arena.align(33), 48);
  }
}
