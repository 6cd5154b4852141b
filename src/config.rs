use crate::align;

/// Hunk size used when none is configured: 8 MiB.
pub const DEFAULT_HUNK_SIZE: usize = 8 * 1024 * 1024;

/// Construction parameters for [`CArena`](crate::CArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
  /// Minimum number of bytes requested from the system allocator per hunk.
  /// Zero selects [`DEFAULT_HUNK_SIZE`].
  pub hunk_size: usize,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self {
      hunk_size: DEFAULT_HUNK_SIZE,
    }
  }
}

impl ArenaConfig {
  /// Sets the minimum hunk size; zero selects the default.
  pub fn with_hunk_size(
    mut self,
    hunk_size: usize,
  ) -> Self {
    self.hunk_size = hunk_size;
    self
  }

  /// The hunk size actually used: the default for zero, then rounded up to
  /// the arena alignment.
  pub fn effective_hunk_size(&self) -> usize {
    let size = if self.hunk_size == 0 {
      DEFAULT_HUNK_SIZE
    } else {
      self.hunk_size
    };
    align::align_up(size).unwrap_or(align::MAX_ALIGNED)
  }
}
