use std::{cmp::Ordering, fmt, ptr::NonNull};

/// A region descriptor: a block address and its length in bytes.
///
/// Ordering and equality look at the address only. A [`Node::key`] with
/// no size therefore finds the real ledger entry starting at the same
/// address, which is how release locates a busy block.
#[derive(Clone, Copy)]
pub struct Node {
  block: NonNull<u8>,
  size: usize,
}

impl Node {
  pub(crate) fn new(
    block: NonNull<u8>,
    size: usize,
  ) -> Self {
    Self { block, size }
  }

  /// A lookup key carrying only an address.
  pub(crate) fn key(block: NonNull<u8>) -> Self {
    Self { block, size: 0 }
  }

  pub fn block(&self) -> NonNull<u8> {
    self.block
  }

  pub fn addr(&self) -> usize {
    self.block.as_ptr().addr()
  }

  pub fn size(&self) -> usize {
    self.size
  }

  /// One past the last byte of the region.
  pub fn end(&self) -> usize {
    self.addr() + self.size
  }

  /// Whether `next` starts exactly where `self` ends.
  pub fn is_adjacent_to(
    &self,
    next: &Node,
  ) -> bool {
    self.end() == next.addr()
  }

  /// Splits into a leading node of `at` bytes and the remainder.
  ///
  /// `at` must be strictly less than `self.size()`.
  pub(crate) fn split_at(
    self,
    at: usize,
  ) -> (Node, Node) {
    debug_assert!(at < self.size);
    // SAFETY: `at < size` keeps the offset inside the region this node
    // describes. That region lies in one hunk, or in abutting hunks that
    // `HunkSource` guarantees share one allocation.
    let rest = unsafe { self.block.add(at) };
    (Node::new(self.block, at), Node::new(rest, self.size - at))
  }

  /// Absorbs the adjacent `next` node, growing this one in place.
  pub(crate) fn merge(
    &mut self,
    next: Node,
  ) {
    debug_assert!(self.is_adjacent_to(&next));
    self.size += next.size;
  }
}

impl PartialEq for Node {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.addr() == other.addr()
  }
}

impl Eq for Node {}

impl PartialOrd for Node {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Node {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    self.addr().cmp(&other.addr())
  }
}

impl fmt::Debug for Node {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "Node({:#x}, {})", self.addr(), self.size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(
    buf: &mut [u8],
    offset: usize,
  ) -> NonNull<u8> {
    NonNull::from(&mut buf[offset])
  }

  #[test]
  fn test_equality_ignores_size() {
    let mut buf = [0u8; 64];
    let a = Node::new(at(&mut buf, 0), 32);
    let b = Node::new(at(&mut buf, 0), 16);
    let key = Node::key(at(&mut buf, 0));

    assert_eq!(a, b);
    assert_eq!(a, key);
    assert_eq!(a.cmp(&key), Ordering::Equal);
  }

  #[test]
  fn test_ordering_by_address() {
    let mut buf = [0u8; 64];
    let low = Node::new(at(&mut buf, 0), 48);
    let high = Node::new(at(&mut buf, 16), 1);

    assert!(low < high);
    assert_ne!(low, high);
  }

  #[test]
  fn test_split_and_merge() {
    let mut buf = [0u8; 64];
    let whole = Node::new(at(&mut buf, 0), 64);

    let (head, tail) = whole.split_at(16);
    assert_eq!(head.size(), 16);
    assert_eq!(tail.size(), 48);
    assert_eq!(tail.addr(), whole.addr() + 16);
    assert!(head.is_adjacent_to(&tail));
    assert!(!tail.is_adjacent_to(&head));

    let mut merged = head;
    merged.merge(tail);
    assert_eq!(merged.addr(), whole.addr());
    assert_eq!(merged.size(), 64);
    assert_eq!(merged.end(), whole.end());
  }
}
