use std::ptr::{self, NonNull};

use libc::c_void;

use crate::align::ALIGNMENT;

/// The system allocator the arena carves hunks out of.
///
/// # Safety
///
/// The arena writes through and offsets pointers into every hunk, so an
/// implementation must guarantee that:
///
/// - a successful [`acquire`](HunkSource::acquire) returns a block of at
///   least `size` bytes aligned to [`ALIGNMENT`], exclusively owned by the
///   arena until handed back through [`release`](HunkSource::release);
/// - two hunks that are address-adjacent (one ends where the other starts)
///   belong to one allocation, so a pointer into the lower hunk may be
///   offset into the upper one. The arena merges free ranges across such
///   hunks. Sources that cannot promise this must never return abutting
///   hunks.
///
/// Implementations must therefore be declared `unsafe impl`:
///
/// ```compile_fail
/// use std::ptr::NonNull;
/// use rcarena::HunkSource;
///
/// struct Tiny;
///
/// impl HunkSource for Tiny {
///   fn acquire(&mut self, _size: usize) -> Option<NonNull<u8>> {
///     None
///   }
///
///   unsafe fn release(&mut self, _base: NonNull<u8>, _size: usize) {}
/// }
/// ```
pub unsafe trait HunkSource {
  /// Obtains `size` bytes, or `None` when the system cannot supply them.
  fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>>;

  /// Hands a hunk back.
  ///
  /// # Safety
  ///
  /// `base` and `size` must come from an earlier `acquire` on this source,
  /// and the hunk must not be released twice.
  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  );
}

/// Hunks straight from the C heap via `posix_memalign(3)` and `free(3)`.
///
/// Each block is over-allocated by [`ALIGNMENT`] bytes that the arena never
/// sees, so two hunks from this source never abut.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibcHeap;

// SAFETY: posix_memalign returns an exclusively owned block of the padded
// size aligned to ALIGNMENT; the padding keeps separate blocks apart.
unsafe impl HunkSource for LibcHeap {
  fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let padded = size.checked_add(ALIGNMENT)?;
    let mut raw: *mut c_void = ptr::null_mut();
    // SAFETY: ALIGNMENT is a power of two and a multiple of the pointer size.
    let rc = unsafe { libc::posix_memalign(&mut raw, ALIGNMENT, padded) };
    if rc != 0 {
      return None;
    }
    NonNull::new(raw as *mut u8)
  }

  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    _size: usize,
  ) {
    unsafe { libc::free(base.as_ptr() as *mut c_void) }
  }
}

/// Every hunk ever acquired, plus the running total of committed bytes.
///
/// Hunks are only returned in bulk by [`Hunks::release_all`].
#[derive(Debug, Default)]
pub struct Hunks {
  acquired: Vec<(NonNull<u8>, usize)>,
  committed: usize,
}

impl Hunks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquires a hunk of exactly `size` bytes from `source` and records it.
  pub fn grow<H: HunkSource>(
    &mut self,
    source: &mut H,
    size: usize,
  ) -> Option<NonNull<u8>> {
    let base = source.acquire(size)?;
    self.acquired.push((base, size));
    self.committed += size;
    Some(base)
  }

  /// Total bytes ever acquired. Never decreases.
  pub fn committed(&self) -> usize {
    self.committed
  }

  pub fn len(&self) -> usize {
    self.acquired.len()
  }

  pub fn is_empty(&self) -> bool {
    self.acquired.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (NonNull<u8>, usize)> + '_ {
    self.acquired.iter().copied()
  }

  /// Returns every recorded hunk to `source`.
  ///
  /// # Safety
  ///
  /// Every hunk must have been acquired from `source`, and no pointer into
  /// any of them may be used afterwards.
  pub unsafe fn release_all<H: HunkSource>(
    &mut self,
    source: &mut H,
  ) {
    for (base, size) in self.acquired.drain(..) {
      unsafe { source.release(base, size) };
    }
  }
}
