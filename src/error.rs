/// Errors reported by the arena.
///
/// Releasing an address the arena never granted is not an error value:
/// it panics, since the ledgers can no longer be trusted afterwards.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
  /// The system allocator could not supply a new hunk.
  #[error("out of memory: requested {requested} bytes, hunk of {hunk_size} bytes could not be acquired")]
  OutOfMemory { requested: usize, hunk_size: usize },

  /// Rounding the request up to the arena alignment overflowed.
  #[error("allocation size overflow: {requested} bytes cannot be aligned")]
  SizeOverflow { requested: usize },

  /// A bookkeeping invariant does not hold.
  #[error("arena corruption: {0}")]
  Corruption(String),
}
