use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::{
  arena::Arena,
  carena::CArena,
  config::ArenaConfig,
  error::ArenaError,
  hunk::{HunkSource, LibcHeap},
  stats::ArenaStats,
};

/// A [`CArena`] behind a mutex, for sharing one arena between threads.
///
/// Each call holds the lock for its whole duration, so operations are
/// serialized exactly as the bare arena requires.
///
/// ```rust
/// use std::sync::Arc;
/// use rcarena::SharedArena;
///
/// let arena = Arc::new(SharedArena::new(4096));
///
/// let handles: Vec<_> = (0..4)
///   .map(|_| {
///     let arena = Arc::clone(&arena);
///     std::thread::spawn(move || {
///       let p = arena.alloc(64).unwrap();
///       arena.free(p.as_ptr());
///     })
///   })
///   .collect();
///
/// for handle in handles {
///   handle.join().unwrap();
/// }
/// assert_eq!(arena.stats().busy_bytes, 0);
/// ```
#[derive(Debug)]
pub struct SharedArena<H: HunkSource = LibcHeap> {
  inner: Mutex<CArena<H>>,
}

impl SharedArena<LibcHeap> {
  pub fn new(hunk_size: usize) -> Self {
    Self::from_arena(CArena::new(hunk_size))
  }

  pub fn with_config(config: ArenaConfig) -> Self {
    Self::from_arena(CArena::with_config(config))
  }
}

impl<H: HunkSource> SharedArena<H> {
  pub fn from_arena(arena: CArena<H>) -> Self {
    Self {
      inner: Mutex::new(arena),
    }
  }

  pub fn alloc(
    &self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    self.inner.lock().allocate(nbytes)
  }

  /// # Panics
  ///
  /// Panics when `ptr` is not a live allocation of this arena.
  pub fn free(
    &self,
    ptr: *mut u8,
  ) {
    self.inner.lock().release(ptr)
  }

  pub fn heap_space_used(&self) -> usize {
    self.inner.lock().heap_space_used()
  }

  pub fn stats(&self) -> ArenaStats {
    self.inner.lock().stats()
  }

  /// Runs `f` with the arena locked, for sequences that must not interleave
  /// with other threads.
  pub fn with<R>(
    &self,
    f: impl FnOnce(&mut CArena<H>) -> R,
  ) -> R {
    f(&mut self.inner.lock())
  }

  pub fn into_inner(self) -> CArena<H> {
    self.inner.into_inner()
  }
}

impl<H: HunkSource> Arena for &SharedArena<H> {
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
}
