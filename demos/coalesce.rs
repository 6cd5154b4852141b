use std::io::{IsTerminal, Read};

use libc::sbrk;
use rcarena::{Arena, CArena};
use tracing_subscriber::EnvFilter;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap` or
/// `gdb` between steps. Skipped when stdin is not a terminal.
fn block_until_enter_pressed() {
  if !std::io::stdin().is_terminal() {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// Small hunks usually come from the brk heap; large ones from mmap.
unsafe fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

/// Dumps both ledgers, one node per line.
fn print_ledgers(arena: &CArena) {
  println!("    {}", arena.stats());
  for node in arena.free_nodes() {
    println!("    free {node:?}");
  }
  for node in arena.busy_nodes() {
    println!("    busy {node:?}");
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rcarena=debug")))
    .init();

  // Small hunks keep the ledgers short enough to read.
  let mut arena = CArena::new(1024);

  unsafe { print_program_break("start") };
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) First allocation: the arena acquires its first hunk and splits it.
  // --------------------------------------------------------------------
  let first = arena.alloc(100).unwrap();
  println!("\n[1] alloc(100) = {first:?} (rounded to {})", arena.align(100));
  print_ledgers(&arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) A second allocation is carved from the remainder, right after the
  //    first one.
  // --------------------------------------------------------------------
  let second = arena.alloc(200).unwrap();
  println!("\n[2] alloc(200) = {second:?}");
  print_ledgers(&arena);

  let values = second.cast::<f64>();
  unsafe {
    for i in 0..25 {
      values.as_ptr().add(i).write(i as f64 * 0.5);
    }
    println!("[2] values[24] = {}", values.as_ptr().add(24).read());
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Release the first block: it becomes a free node of its own, since
  //    its neighbour is still busy.
  // --------------------------------------------------------------------
  arena.free(first.as_ptr());
  println!("\n[3] free(first)");
  print_ledgers(&arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Release the second block: it merges backwards with the first and
  //    forwards with the tail, leaving a single free node.
  // --------------------------------------------------------------------
  arena.free(second.as_ptr());
  println!("\n[4] free(second)");
  print_ledgers(&arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) A 300-byte request now fits where the two blocks used to be.
  // --------------------------------------------------------------------
  let third = arena.alloc(300).unwrap();
  println!(
    "\n[5] alloc(300) = {third:?}, reused first address? {}",
    if third == first { "yes" } else { "no" }
  );
  print_ledgers(&arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) A request larger than the hunk size gets a hunk of its own.
  // --------------------------------------------------------------------
  unsafe { print_program_break("before large alloc") };
  let big = arena.alloc(64 * 1024).unwrap();
  println!("\n[6] alloc(64 KiB) = {big:?}");
  print_ledgers(&arena);
  unsafe { print_program_break("after large alloc") };
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 7) Dropping the arena returns every hunk at once.
  // --------------------------------------------------------------------
  arena.free(third.as_ptr());
  arena.free(big.as_ptr());
  println!("\n[7] heap_space_used = {} bytes", arena.heap_space_used());
  drop(arena);
  println!("[7] Arena dropped, all hunks released.");
}
