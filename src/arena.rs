//! The value allocator and mark-and-sweep collector (spec.md §4.2).
//!
//! The arena is a fixed-capacity pool of [`ArenaCell`]s. Allocation is O(1)
//! in the steady state: cells are handed out from an uninitialized pool
//! until capacity is reached, then recycled off a free list, and only once
//! both are exhausted does a sweep run. Interned digits and `Program`
//! constants never live here — only transient arithmetic results do — so
//! the collector only ever has to reason about indices into this one
//! `Vec`.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::error::ExecutionError;
use crate::value::ArenaCell;

pub const ARENA_SIZE: usize = 256;

pub struct Arena {
    cells: Vec<Option<ArenaCell>>,
    allocated: usize,
    free_list: Vec<usize>,
}

impl Arena {
    pub fn new() -> Arena {
        let mut cells = Vec::with_capacity(ARENA_SIZE);
        cells.resize_with(ARENA_SIZE, || None);
        Arena {
            cells,
            allocated: 0,
            free_list: Vec::new(),
        }
    }

    pub fn get(&self, index: usize) -> &ArenaCell {
        self.cells[index]
            .as_ref()
            .expect("arena index must refer to an initialized cell")
    }

    /// Allocate a cell holding `decimal`, running a mark-and-sweep pass if
    /// necessary. `roots` enumerates every arena index currently reachable
    /// from the stack, the variable banks, and any extra GC roots the
    /// calling opcode handler supplies (spec.md §4.2, rule 3).
    pub fn allocate(
        &mut self,
        decimal: Decimal,
        roots: impl Iterator<Item = usize> + Clone,
    ) -> Result<usize, ExecutionError> {
        if self.allocated < ARENA_SIZE {
            let index = self.allocated;
            self.cells[index] = Some(ArenaCell::new(decimal));
            self.allocated += 1;
            return Ok(index);
        }

        if let Some(index) = self.free_list.pop() {
            self.cells[index]
                .as_mut()
                .expect("free-list index must refer to an initialized cell")
                .reinitialize(decimal);
            return Ok(index);
        }

        self.collect(roots);

        if let Some(index) = self.free_list.pop() {
            self.cells[index]
                .as_mut()
                .expect("free-list index must refer to an initialized cell")
                .reinitialize(decimal);
            Ok(index)
        } else {
            debug!(allocated = self.allocated, "arena exhausted after sweep");
            Err(ExecutionError::OutOfSpace)
        }
    }

    fn collect(&mut self, roots: impl Iterator<Item = usize>) {
        self.free_list.clear();

        for root in roots {
            if let Some(cell) = self.cells[root].as_mut() {
                cell.marked = true;
            }
        }

        let mut reclaimed = 0usize;
        for index in 0..self.allocated {
            if let Some(cell) = self.cells[index].as_mut() {
                if cell.marked {
                    cell.marked = false;
                } else {
                    self.free_list.push(index);
                    reclaimed += 1;
                }
            }
        }
        trace!(reclaimed, live = self.allocated - reclaimed, "arena swept");
    }

    /// Number of cells ever handed out (used capacity, not counting
    /// cells that have been freed and could still be recycled).
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}

impl Default for Arena {
    fn default() -> Arena {
        Arena::new()
    }
}
