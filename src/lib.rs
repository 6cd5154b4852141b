//! # rcarena - A Coalescing Hunk Allocator
//!
//! This crate provides a **coalescing arena**: it grabs large contiguous
//! regions ("hunks") from the system allocator and hands out byte ranges
//! carved from them, merging neighbouring free ranges on every release.
//!
//! It suits workloads that make many short-lived allocations (numeric
//! scratch buffers, for instance) and want few trips to the system
//! allocator plus low long-run fragmentation.
//!
//! ## Overview
//!
//! ```text
//!   One hunk, after a few allocations and releases:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              HUNK                                    │
//!   │                                                                      │
//!   │   ┌───────┬──────────┬─────┬──────────────┬───────────────────────┐  │
//!   │   │ busy  │   free   │busy │     busy     │         free          │  │
//!   │   └───────┴──────────┴─────┴──────────────┴───────────────────────┘  │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   free ledger: { (0x..40, 96), (0x..160, 512) }     sorted by address
//!   busy ledger: { (0x..00, 64), (0x..a0, 16), (0x..b0, 176) }
//! ```
//!
//! Every byte of every hunk is described by exactly one node, either in the
//! free ledger or in the busy ledger, and no two free nodes touch.
//!
//! ## Crate Structure
//!
//! ```text
//!   rcarena
//!   ├── align      - Alignment macros (align!, align_to!) and ALIGNMENT
//!   ├── arena      - Arena trait: alloc / free / align
//!   ├── carena     - CArena, the coalescing engine
//!   ├── config     - ArenaConfig (minimum hunk size)
//!   ├── error      - ArenaError
//!   ├── hunk       - HunkSource trait, LibcHeap, acquired-hunk record
//!   ├── ledger     - Address-ordered node sets (internal)
//!   ├── node       - Region descriptor, ordered by address
//!   ├── stats      - ArenaStats snapshot
//!   └── sync       - SharedArena, a locked CArena
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rcarena::{Arena, CArena};
//!
//! let mut arena = CArena::new(0); // 8 MiB hunks
//!
//! let ptr = arena.alloc(64 * size_of::<f64>()).unwrap().cast::<f64>();
//! unsafe {
//!   ptr.as_ptr().write(1.5);
//!   assert_eq!(ptr.as_ptr().read(), 1.5);
//! }
//! arena.free(ptr.as_ptr().cast());
//! ```
//!
//! ## How It Works
//!
//! Allocation rounds the request up to [`ALIGNMENT`] and scans the free
//! ledger in address order for the first node large enough:
//!
//! ```text
//!   alloc(n):
//!
//!   free: [ 32 ][      256      ][   128   ]
//!                    ▲ first node with size >= n
//!                    │
//!         split ─────┴──► busy: [ n ]   free: [ 256 - n ]
//!
//!   nothing fits ──► acquire hunk of max(hunk_size, n), then retry
//! ```
//!
//! Release finds the busy node by address (its size comes from the ledger,
//! never from the caller) and merges it with free neighbours:
//!
//! ```text
//!   free(p):
//!
//!   before:  [ free A ][ busy p ][ free B ]
//!   after:   [           free A+p+B       ]
//! ```
//!
//! Hunks are never given back one at a time; dropping the arena returns all
//! of them at once.
//!
//! ## Limitations
//!
//! - **Not synchronized**: use [`SharedArena`] to share one arena
//! - **No shrinking**: committed heap only grows until the arena is dropped
//! - **Unix-only**: hunks come from `libc::posix_memalign`
//!
//! ## Safety
//!
//! Allocating and releasing are safe: the arena only edits its bookkeeping.
//! Reading or writing through a granted pointer is `unsafe` and is only
//! valid between the `alloc` that produced it and the matching `free` (or
//! the arena being dropped). Releasing an address the arena did not grant
//! panics.

pub mod align;
mod arena;
mod carena;
mod config;
mod error;
mod hunk;
mod ledger;
mod node;
mod stats;
mod sync;

pub use align::ALIGNMENT;
pub use arena::Arena;
pub use carena::CArena;
pub use config::{ArenaConfig, DEFAULT_HUNK_SIZE};
pub use error::ArenaError;
pub use hunk::{HunkSource, LibcHeap};
pub use node::Node;
pub use stats::ArenaStats;
pub use sync::SharedArena;
