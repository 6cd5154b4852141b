//! Hunk sources shared by the integration tests.

#![allow(dead_code)]

use std::ptr::NonNull;

use rcarena::{HunkSource, LibcHeap};

/// Records every hunk size it is asked for, optionally refusing once a
/// byte limit would be crossed.
#[derive(Debug, Default)]
pub struct CountingHeap {
  pub acquired: Vec<usize>,
  pub released: Vec<usize>,
  pub limit: Option<usize>,
}

impl CountingHeap {
  pub fn with_limit(limit: usize) -> Self {
    Self {
      limit: Some(limit),
      ..Self::default()
    }
  }

  pub fn total(&self) -> usize {
    self.acquired.iter().sum()
  }
}

// SAFETY: forwards to LibcHeap, only recording sizes.
unsafe impl HunkSource for CountingHeap {
  fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if let Some(limit) = self.limit {
      if self.total() + size > limit {
        return None;
      }
    }
    let base = LibcHeap.acquire(size)?;
    self.acquired.push(size);
    Some(base)
  }

  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  ) {
    self.released.push(size);
    unsafe { LibcHeap.release(base, size) }
  }
}

// SAFETY: forwards to the underlying CountingHeap.
unsafe impl HunkSource for &mut CountingHeap {
  fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    (**self).acquire(size)
  }

  unsafe fn release(
    &mut self,
    base: NonNull<u8>,
    size: usize,
  ) {
    unsafe { (**self).release(base, size) }
  }
}

/// Hands out back-to-back slices of one buffer, so consecutive hunks abut.
#[derive(Debug)]
pub struct ContiguousHeap {
  base: NonNull<u8>,
  capacity: usize,
  next: usize,
}

impl ContiguousHeap {
  pub fn new(capacity: usize) -> Self {
    let base = LibcHeap.acquire(capacity).expect("backing buffer");
    Self {
      base,
      capacity,
      next: 0,
    }
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }
}

// SAFETY: every hunk is an aligned, disjoint slice of one allocation, so
// abutting hunks share provenance.
unsafe impl HunkSource for ContiguousHeap {
  fn acquire(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if self.capacity - self.next < size {
      return None;
    }
    let hunk = unsafe { self.base.add(self.next) };
    self.next += size;
    Some(hunk)
  }

  unsafe fn release(
    &mut self,
    _base: NonNull<u8>,
    _size: usize,
  ) {
  }
}

impl Drop for ContiguousHeap {
  fn drop(&mut self) {
    unsafe { LibcHeap.release(self.base, self.capacity) }
  }
}

/// Installs a test subscriber so `RUST_LOG=rcarena=trace` shows arena events.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}
