use std::fmt;

/// A point-in-time view of an arena's bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
  /// Bytes ever acquired from the system allocator.
  pub heap_space_used: usize,
  /// Bytes sitting in the free ledger.
  pub free_bytes: usize,
  /// Bytes currently granted to callers.
  pub busy_bytes: usize,
  pub free_nodes: usize,
  pub busy_nodes: usize,
  pub hunks: usize,
}

impl ArenaStats {
  /// Fraction of committed bytes currently granted, in `[0.0, 1.0]`.
  ///
  /// Returns `0.0` before the first hunk is acquired.
  pub fn utilization(&self) -> f64 {
    if self.heap_space_used == 0 {
      return 0.0;
    }
    self.busy_bytes as f64 / self.heap_space_used as f64
  }
}

impl fmt::Display for ArenaStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "committed {} bytes in {} hunk(s): {} busy in {} node(s), {} free in {} node(s)",
      self.heap_space_used,
      self.hunks,
      self.busy_bytes,
      self.busy_nodes,
      self.free_bytes,
      self.free_nodes,
    )
  }
}
