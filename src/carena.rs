//! The coalescing arena.
//!
//! Hunks come from a [`HunkSource`]; each byte of every hunk is described
//! by exactly one node, either in the free ledger or in the busy ledger.
//! Allocation takes the first free node that fits and splits off the
//! remainder. Release moves the node back and merges it with its free
//! neighbours, so no two free nodes are ever adjacent.

use std::{fmt, ptr::NonNull};

use tracing::{debug, trace, warn};

use crate::{
  align::{self, ALIGNMENT},
  arena::Arena,
  config::ArenaConfig,
  error::ArenaError,
  hunk::{HunkSource, Hunks, LibcHeap},
  ledger::Ledger,
  node::Node,
  stats::ArenaStats,
};

/// A coalescing memory manager.
///
/// Not synchronized: wrap it in [`SharedArena`](crate::SharedArena) (or any
/// other lock) before calling it from more than one thread.
///
/// ```rust
/// use rcarena::{Arena, CArena};
///
/// let mut arena = CArena::new(1024);
///
/// let a = arena.alloc(100).unwrap();
/// let b = arena.alloc(200).unwrap();
/// assert_eq!(arena.heap_space_used(), 1024);
///
/// arena.free(a.as_ptr());
/// arena.free(b.as_ptr());
///
/// // The two ranges merged back with the rest of the hunk.
/// arena.alloc(300).unwrap();
/// assert_eq!(arena.heap_space_used(), 1024);
/// ```
pub struct CArena<H: HunkSource = LibcHeap> {
  source: H,
  hunks: Hunks,
  free: Ledger,
  busy: Ledger,
  hunk_size: usize,
}

// SAFETY: the arena exclusively owns its hunks and the nodes only point
// into them; moving the whole arena to another thread moves that ownership.
unsafe impl<H: HunkSource + Send> Send for CArena<H> {}

impl CArena<LibcHeap> {
  /// Builds an arena whose hunks are at least `hunk_size` bytes.
  /// Zero selects [`DEFAULT_HUNK_SIZE`](crate::DEFAULT_HUNK_SIZE).
  pub fn new(hunk_size: usize) -> Self {
    Self::with_config(ArenaConfig::default().with_hunk_size(hunk_size))
  }

  /// Builds an arena from a full configuration.
  pub fn with_config(config: ArenaConfig) -> Self {
    Self::with_source(config, LibcHeap)
  }
}

impl Default for CArena<LibcHeap> {
  fn default() -> Self {
    Self::with_config(ArenaConfig::default())
  }
}

impl<H: HunkSource> CArena<H> {
  /// Builds an arena that acquires its hunks from `source`.
  pub fn with_source(
    config: ArenaConfig,
    source: H,
  ) -> Self {
    Self {
      source,
      hunks: Hunks::new(),
      free: Ledger::new(),
      busy: Ledger::new(),
      hunk_size: config.effective_hunk_size(),
    }
  }

  /// Total bytes ever acquired from the system allocator.
  pub fn heap_space_used(&self) -> usize {
    self.hunks.committed()
  }

  /// Bytes available in the free ledger.
  pub fn free_space(&self) -> usize {
    self.free.bytes()
  }

  /// Bytes currently granted to callers.
  pub fn busy_space(&self) -> usize {
    self.busy.bytes()
  }

  /// The minimum size of every hunk.
  pub fn hunk_size(&self) -> usize {
    self.hunk_size
  }

  /// Number of hunks acquired so far.
  pub fn hunk_count(&self) -> usize {
    self.hunks.len()
  }

  /// The granted size of the live allocation at `ptr`.
  pub fn size_of(
    &self,
    ptr: *const u8,
  ) -> Option<usize> {
    let block = NonNull::new(ptr as *mut u8)?;
    self.busy.get(block).map(Node::size)
  }

  /// The hunk source backing this arena.
  pub fn source(&self) -> &H {
    &self.source
  }

  /// Free nodes in address order.
  pub fn free_nodes(&self) -> impl Iterator<Item = &Node> {
    self.free.iter()
  }

  /// Busy nodes in address order.
  pub fn busy_nodes(&self) -> impl Iterator<Item = &Node> {
    self.busy.iter()
  }

  /// Snapshot of commitment, ledger sizes and hunk count.
  pub fn stats(&self) -> ArenaStats {
    ArenaStats {
      heap_space_used: self.heap_space_used(),
      free_bytes: self.free.bytes(),
      busy_bytes: self.busy.bytes(),
      free_nodes: self.free.len(),
      busy_nodes: self.busy.len(),
      hunks: self.hunks.len(),
    }
  }

  /// Grants `nbytes` (rounded up to [`ALIGNMENT`]) from the first free node
  /// large enough, acquiring a new hunk when none is.
  ///
  /// Zero-byte requests are served as `ALIGNMENT`-byte requests, so every
  /// call yields a distinct, releasable address.
  pub fn allocate(
    &mut self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let size = align::align_up(nbytes.max(1)).ok_or(ArenaError::SizeOverflow { requested: nbytes })?;

    // A new hunk joins the free ledger like any other free range, so it
    // merges with a free tail it happens to abut before the rescan.
    let node = loop {
      if let Some(node) = self.free.take_first_fit(size) {
        break node;
      }
      let hunk = self.grow(size)?;
      self.insert_free(hunk);
    };

    let granted = if node.size() == size {
      node
    } else {
      let (head, rest) = node.split_at(size);
      trace!(addr = head.addr(), size, remainder = rest.size(), "split free node");
      self.insert_free(rest);
      head
    };

    let inserted = self.busy.insert(granted);
    debug_assert!(inserted, "address {:#x} already busy", granted.addr());

    Ok(granted.block())
  }

  /// Acquires a hunk able to hold `size` bytes. The returned node spans the
  /// whole hunk and is not yet in any ledger.
  fn grow(
    &mut self,
    size: usize,
  ) -> Result<Node, ArenaError> {
    let hunk_size = self.hunk_size.max(size);

    let Some(base) = self.hunks.grow(&mut self.source, hunk_size) else {
      warn!(requested = size, hunk_size, "hunk acquisition failed");
      return Err(ArenaError::OutOfMemory {
        requested: size,
        hunk_size,
      });
    };

    debug!(
      base = base.as_ptr().addr(),
      hunk_size,
      committed = self.hunks.committed(),
      "acquired hunk"
    );

    Ok(Node::new(base, hunk_size))
  }

  /// Returns the allocation at `ptr` to the free ledger, merging it with any
  /// adjacent free neighbours. Null is a no-op.
  ///
  /// # Panics
  ///
  /// Panics when `ptr` is not a live allocation of this arena.
  pub fn release(
    &mut self,
    ptr: *mut u8,
  ) {
    let Some(block) = NonNull::new(ptr) else {
      return;
    };

    let Some(node) = self.busy.take(block) else {
      panic!("invalid release of {ptr:p}: not a live allocation of this arena");
    };

    self.insert_free(node);
  }

  /// Puts `node` in the free ledger, first merging it with the free nodes
  /// ending where it starts and starting where it ends.
  fn insert_free(
    &mut self,
    mut node: Node,
  ) {
    if let Some(&prev) = self.free.predecessor(node.block())
      && prev.is_adjacent_to(&node)
    {
      trace!(addr = prev.addr(), size = prev.size(), "coalesce backward");
      self.free.take(prev.block());
      let mut merged = prev;
      merged.merge(node);
      node = merged;
    }

    if let Some(&next) = self.free.successor(node.block())
      && node.is_adjacent_to(&next)
    {
      trace!(addr = next.addr(), size = next.size(), "coalesce forward");
      self.free.take(next.block());
      node.merge(next);
    }

    let inserted = self.free.insert(node);
    debug_assert!(inserted, "address {:#x} already free", node.addr());
  }

  /// Checks every ledger invariant, reporting the first one that fails.
  ///
  /// Walks both ledgers and every hunk, so this is meant for tests and
  /// debugging rather than hot paths.
  pub fn validate(&self) -> Result<(), ArenaError> {
    let mut nodes: Vec<(Node, bool)> = self
      .free
      .iter()
      .map(|node| (*node, true))
      .chain(self.busy.iter().map(|node| (*node, false)))
      .collect();
    nodes.sort_by_key(|(node, _)| node.addr());

    for pair in nodes.windows(2) {
      let (a, a_free) = pair[0];
      let (b, b_free) = pair[1];
      if a.addr() == b.addr() {
        return Err(ArenaError::Corruption(format!("address {:#x} appears twice", a.addr())));
      }
      if a.end() > b.addr() {
        return Err(ArenaError::Corruption(format!("{a:?} overlaps {b:?}")));
      }
      if a_free && b_free && a.is_adjacent_to(&b) {
        return Err(ArenaError::Corruption(format!("free {a:?} and {b:?} were not merged")));
      }
    }

    for (node, free) in &nodes {
      if node.size() == 0 {
        return Err(ArenaError::Corruption(format!("empty node {node:?}")));
      }
      if !free && !align::is_aligned(node.addr()) {
        return Err(ArenaError::Corruption(format!(
          "busy {node:?} is not aligned to {ALIGNMENT}"
        )));
      }
    }

    let mut hunks: Vec<(usize, usize)> = self
      .hunks
      .iter()
      .map(|(base, size)| (base.as_ptr().addr(), size))
      .collect();
    hunks.sort_unstable();

    // Hunks that happen to sit back to back may be spanned by one node.
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(hunks.len());
    for (base, size) in hunks {
      match spans.last_mut() {
        Some((last_base, last_size)) if *last_base + *last_size == base => *last_size += size,
        _ => spans.push((base, size)),
      }
    }

    // Nodes must tile the hunks exactly: walk both in address order.
    let mut cursor = nodes.iter().map(|(node, _)| node).peekable();
    for (base, size) in spans {
      let end = base + size;
      let mut at = base;
      while at < end {
        match cursor.next() {
          Some(node) if node.addr() == at => at = node.end(),
          Some(node) => {
            return Err(ArenaError::Corruption(format!(
              "gap before {node:?} in hunk {base:#x}+{size}"
            )));
          }
          None => {
            return Err(ArenaError::Corruption(format!(
              "hunk {base:#x}+{size} not covered past {at:#x}"
            )));
          }
        }
      }
      if at != end {
        return Err(ArenaError::Corruption(format!("node crosses the end of hunk {base:#x}+{size}")));
      }
    }
    if let Some(node) = cursor.peek() {
      return Err(ArenaError::Corruption(format!("{node:?} lies outside every hunk")));
    }

    Ok(())
  }
}

impl<H: HunkSource> Arena for CArena<H> {
  fn alloc(
    &mut self,
    nbytes: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    self.allocate(nbytes)
  }

  fn free(
    &mut self,
    ptr: *mut u8,
  ) {
    self.release(ptr)
  }
}

impl<H: HunkSource> Drop for CArena<H> {
  fn drop(&mut self) {
    if self.hunks.is_empty() {
      return;
    }
    debug!(
      hunks = self.hunks.len(),
      committed = self.hunks.committed(),
      outstanding = self.busy.len(),
      "releasing hunks"
    );
    // SAFETY: every hunk came from `self.source`, and granted addresses are
    // documented as dead once the arena is dropped.
    unsafe { self.hunks.release_all(&mut self.source) };
  }
}

impl<H: HunkSource> fmt::Debug for CArena<H> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("CArena")
      .field("hunk_size", &self.hunk_size)
      .field("heap_space_used", &self.heap_space_used())
      .field("free", &self.free)
      .field("busy", &self.busy)
      .finish()
  }
}
