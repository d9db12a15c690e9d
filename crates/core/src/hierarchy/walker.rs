//! Recursive inter-level fetch/store algorithm.
//!
//! The walker drives a chain of [`CacheLevel`]s terminated by a
//! [`MainMemory`] descriptor. Each call is a complete run of the access state
//! machine: probe the current level, and on a miss evict the stale occupant,
//! recurse toward memory, then transfer the block back up, accumulating all
//! cycle charges into the caller's counter. The walker keeps no state of its
//! own between calls.
//!
//! A chain is passed as a slice ordered from the requesting level toward
//! memory; the terminal memory node travels alongside as its own type rather
//! than as a null successor, so "is terminal" is a tagged case instead of a
//! pointer convention.

use tracing::trace;

use super::level::CacheLevel;
use super::memory::MainMemory;

/// What a level spills into: the next cache level, or terminal memory.
#[derive(Debug)]
pub enum NextLevel<'a> {
    /// A further cache level, which is probed and written like any other.
    Cache(&'a mut CacheLevel),
    /// Terminal memory: never probed, unconditionally absorbs write-backs.
    Memory(&'a MainMemory),
}

/// Fetches `addr` through the chain, charging all costs into `cycles`.
///
/// On a hit at the front level nothing else happens. On a miss the front
/// level's LRU occupant is kicked out first, then the rest of the chain is
/// asked to supply the block (memory never gets probed; when the chain below
/// is empty its timing formula applies directly), and finally the block is
/// transferred in and installed clean at the MRU position.
///
/// # Arguments
///
/// * `chain` - Levels from the requesting level toward memory; empty is a no-op.
/// * `memory` - Terminal timing source backing the last chain element.
/// * `addr` - Byte address being fetched.
/// * `cycles` - Accumulator for this operation's cycle cost.
pub fn fetch(chain: &mut [&mut CacheLevel], memory: &MainMemory, addr: u32, cycles: &mut u64) {
    let Some((level, rest)) = chain.split_first_mut() else {
        return;
    };
    let level = &mut **level;

    if level.hit(addr, cycles) {
        return;
    }

    // Evict the stale occupant before asking the hierarchy for the new block.
    match rest.first_mut() {
        Some(next) => kickout(level, NextLevel::Cache(next), addr, cycles),
        None => kickout(level, NextLevel::Memory(memory), addr, cycles),
    }

    if !rest.is_empty() {
        fetch(rest, memory, addr, cycles);
    }

    transfer(level, rest.first().map(|next| &**next), memory, addr, cycles);
}

/// Fetches `addr` (charging the whole miss path if needed), then
/// unconditionally writes it.
///
/// The write marks the block dirty and re-runs the LRU promotion even on a
/// pure hit: a store always refreshes recency.
pub fn store(chain: &mut [&mut CacheLevel], memory: &MainMemory, addr: u32, cycles: &mut u64) {
    fetch(chain, memory, addr, cycles);
    if let Some(level) = chain.first_mut() {
        level.write(addr);
    }
}

/// Evicts the LRU occupant of the set `addr` maps to in `level`, writing it
/// back to `next` when dirty.
///
/// The dirty path reconstructs the victim's full address from its stored tag
/// and set index, then probes the next level for it. That probe goes through
/// [`CacheLevel::hit`] and so records a statistic and charges cycles like any
/// other probe. When it hits, the replay the probe just paid for is undone:
/// the next level's `transfers` is decremented and its `hit_time` subtracted
/// back out of the counter, a compensating adjustment rather than a general
/// rollback. The victim is then written into the next level, propagating its
/// dirty state downward.
pub fn kickout(level: &mut CacheLevel, next: NextLevel<'_>, addr: u32, cycles: &mut u64) {
    let (index, _) = level.geometry().decode(addr);
    let victim = *level.set(index).lru();
    if !victim.valid {
        return;
    }
    level.stats.kickouts += 1;
    if !victim.dirty {
        return;
    }
    level.stats.dirty_kickouts += 1;

    let victim_addr = level.geometry().rebuild(victim.tag, index);
    trace!(
        level = level.label(),
        victim = format_args!("{victim_addr:#010x}"),
        "dirty kickout"
    );

    match next {
        NextLevel::Cache(next) => {
            if next.hit(victim_addr, cycles) {
                // The block is already resident below; the probe's replay
                // charge would double-count, so take it back. `transfers`
                // floors at zero: a write-back replay can outnumber the
                // fills actually recorded for that level.
                next.stats.transfers = next.stats.transfers.saturating_sub(1);
                *cycles -= next.geometry().hit_time;
            }
            next.write(victim_addr);
        }
        NextLevel::Memory(memory) => {
            // No sets to probe; the write-back costs one block transfer.
            *cycles += memory.block_transfer_time(level.geometry().block_size);
        }
    }
}

/// Moves the missing block into `level` and installs it.
///
/// When `next` is `None` the level backs directly onto memory and the memory
/// formula applies; otherwise the supplying cache's bus parameters do. Either
/// way the level's `transfers` counter is incremented, the block is installed
/// clean at the MRU position, and `hit_time` is charged as the replay cost of
/// re-accessing the now-resident block.
fn transfer(
    level: &mut CacheLevel,
    next: Option<&CacheLevel>,
    memory: &MainMemory,
    addr: u32,
    cycles: &mut u64,
) {
    let supply_time = match next {
        Some(next) => {
            next.geometry().transfer_time
                * u64::from(level.geometry().block_size / next.geometry().bus_width)
        }
        None => memory.block_transfer_time(level.geometry().block_size),
    };
    *cycles += supply_time;
    level.stats.transfers += 1;
    level.read(addr);
    *cycles += level.geometry().hit_time;
    trace!(
        level = level.label(),
        addr = format_args!("{addr:#010x}"),
        supply_time,
        "transfer"
    );
}
