use std::{collections::BTreeSet, ptr::NonNull};

use crate::node::Node;

/// An address-ordered set of [`Node`]s, unique by address.
///
/// The arena keeps two of these: one for free ranges and one for ranges
/// currently granted to callers.
#[derive(Debug, Default)]
pub struct Ledger {
  nodes: BTreeSet<Node>,
  bytes: usize,
}

impl Ledger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts `node`. Returns `false`, leaving the ledger untouched, when a
  /// node with the same address is already present.
  pub fn insert(
    &mut self,
    node: Node,
  ) -> bool {
    let inserted = self.nodes.insert(node);
    if inserted {
      self.bytes += node.size();
    }
    inserted
  }

  /// Removes and returns the node starting at `block`.
  pub fn take(
    &mut self,
    block: NonNull<u8>,
  ) -> Option<Node> {
    let node = self.nodes.take(&Node::key(block))?;
    self.bytes -= node.size();
    Some(node)
  }

  /// Returns the node starting at `block` without removing it.
  pub fn get(
    &self,
    block: NonNull<u8>,
  ) -> Option<&Node> {
    self.nodes.get(&Node::key(block))
  }

  /// Removes and returns the lowest-addressed node of at least `size` bytes.
  pub fn take_first_fit(
    &mut self,
    size: usize,
  ) -> Option<Node> {
    let node = *self.nodes.iter().find(|node| node.size() >= size)?;
    self.nodes.remove(&node);
    self.bytes -= node.size();
    Some(node)
  }

  /// The node with the highest address strictly below `block`.
  pub fn predecessor(
    &self,
    block: NonNull<u8>,
  ) -> Option<&Node> {
    self.nodes.range(..Node::key(block)).next_back()
  }

  /// The node with the lowest address at or above `block`.
  pub fn successor(
    &self,
    block: NonNull<u8>,
  ) -> Option<&Node> {
    self.nodes.range(Node::key(block)..).next()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Node> {
    self.nodes.iter()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Sum of the sizes of every node.
  pub fn bytes(&self) -> usize {
    self.bytes
  }
}
