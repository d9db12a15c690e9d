//! The simulated memory hierarchy.
//!
//! Two private L1 caches (instruction and data) back onto a shared L2, which
//! backs onto main memory. This module provides:
//! 1. **Geometry:** Address decomposition parameters ([`geometry`]).
//! 2. **Sets:** LRU-ordered block storage ([`set`]).
//! 3. **Levels:** Per-level state and statistics ([`level`]).
//! 4. **Memory:** The terminal timing model ([`memory`]).
//! 5. **Walker:** The recursive inter-level fetch/store algorithm ([`walker`]).
//!
//! [`Hierarchy`] ties these together and is the surface the trace driver
//! calls: instruction fetches and loads go through [`Hierarchy::fetch_instruction`]
//! and [`Hierarchy::load`], stores through [`Hierarchy::store`].

/// Cache geometry and the address decoder.
pub mod geometry;
/// One cache level: sets plus statistics.
pub mod level;
/// Terminal main-memory timing model.
pub mod memory;
/// Per-set block storage and LRU ordering.
pub mod set;
/// Recursive inter-level fetch/store algorithm.
pub mod walker;

pub use geometry::CacheGeometry;
pub use level::{CacheLevel, LevelStats};
pub use memory::MainMemory;
pub use set::{Block, Set};

/// The fixed three-level-plus-memory topology of the simulation.
///
/// Owns every level; the walker borrows chains assembled here (`[l1i, l2]`
/// for the instruction side, `[l1d, l2]` for the data side). Levels never own
/// their successor, so the chain can never cycle.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    l1i: CacheLevel,
    l1d: CacheLevel,
    l2: CacheLevel,
    memory: MainMemory,
}

impl Hierarchy {
    /// Builds the hierarchy with all sets empty.
    ///
    /// # Arguments
    ///
    /// * `l1` - Geometry applied identically to both L1 caches.
    /// * `l2` - Geometry of the shared L2.
    /// * `memory` - Terminal timing parameters.
    pub fn new(l1: CacheGeometry, l2: CacheGeometry, memory: MainMemory) -> Self {
        Self {
            l1i: CacheLevel::new("L1i", l1),
            l1d: CacheLevel::new("L1d", l1),
            l2: CacheLevel::new("L2", l2),
            memory,
        }
    }

    /// Fetches an instruction address through the L1i/L2 chain.
    pub fn fetch_instruction(&mut self, addr: u32, cycles: &mut u64) {
        let Self {
            l1i, l2, memory, ..
        } = self;
        walker::fetch(&mut [l1i, l2], memory, addr, cycles);
    }

    /// Fetches a data address through the L1d/L2 chain.
    pub fn load(&mut self, addr: u32, cycles: &mut u64) {
        let Self {
            l1d, l2, memory, ..
        } = self;
        walker::fetch(&mut [l1d, l2], memory, addr, cycles);
    }

    /// Stores to a data address through the L1d/L2 chain, leaving the block
    /// dirty at the MRU position.
    pub fn store(&mut self, addr: u32, cycles: &mut u64) {
        let Self {
            l1d, l2, memory, ..
        } = self;
        walker::store(&mut [l1d, l2], memory, addr, cycles);
    }

    /// The L1 instruction cache.
    pub fn l1i(&self) -> &CacheLevel {
        &self.l1i
    }

    /// The L1 data cache.
    pub fn l1d(&self) -> &CacheLevel {
        &self.l1d
    }

    /// The shared L2 cache.
    pub fn l2(&self) -> &CacheLevel {
        &self.l2
    }

    /// The terminal memory descriptor.
    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }
}
