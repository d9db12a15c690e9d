//! Inter-Level Walker Tests.
//!
//! Exercises the fetch/kickout/transfer state machine over a two-level chain
//! and over a single level backed directly by memory, checking both the
//! statistics and the exact cycle totals of each path.
//!
//! Geometry used throughout (chosen so every charge is distinct):
//! L1 is 8 bytes, direct mapped, 4-byte blocks, hit 1 / miss 2. L2 is 64
//! bytes, direct mapped, 4-byte blocks, hit 4 / miss 6, supplying the L1 over
//! a 4-byte bus at 10 cycles per beat. Memory moves a 4-byte block in
//! 10 + 20 + 2 * 4 / 4 = 32 cycles.

use pretty_assertions::assert_eq;

use cachesim_core::hierarchy::walker::{self, NextLevel};
use cachesim_core::hierarchy::{CacheGeometry, CacheLevel, MainMemory};

fn l1() -> CacheLevel {
    CacheLevel::new("L1d", CacheGeometry::new(4, 8, 1, 1, 2, 0, 0))
}

fn l2() -> CacheLevel {
    CacheLevel::new("L2", CacheGeometry::new(4, 64, 1, 4, 6, 10, 4))
}

fn memory() -> MainMemory {
    MainMemory {
        sendaddr: 10,
        ready: 20,
        chunktime: 2,
        chunksize: 4,
    }
}

/// Miss-path cost of one cold fetch through [L1, L2]:
/// L1 miss (2) + L2 miss (6) + memory transfer (32) + L2 replay hit (4)
/// + L2-to-L1 transfer (10 * 4/4) + L1 replay hit (1).
const COLD_FETCH: u64 = 2 + 6 + 32 + 4 + 10 + 1;

/// Miss-path cost of one cold fetch through [L1] alone:
/// L1 miss (2) + memory transfer (32) + L1 replay hit (1).
const COLD_FETCH_NO_L2: u64 = 2 + 32 + 1;

#[test]
fn cold_fetch_charges_the_full_miss_path() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;

    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    assert_eq!(cycles, COLD_FETCH);
    assert_eq!(l1.stats.miss_count, 1);
    assert_eq!(l1.stats.transfers, 1);
    assert_eq!(l2.stats.miss_count, 1);
    assert_eq!(l2.stats.transfers, 1);
    // Installed clean at both levels.
    assert!(!l1.set(0).lru().dirty);
    assert!(!l2.set(0).lru().dirty);
}

#[test]
fn hit_charges_only_the_front_level() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;
    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    assert_eq!(cycles, COLD_FETCH + 1);
    assert_eq!(l1.stats.hit_count, 1);
    // The L2 never saw the second access.
    assert_eq!(l2.stats.total_requests(), 1);
}

#[test]
fn store_leaves_the_block_dirty_at_mru() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;

    walker::store(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    // A store charges exactly the fetch path.
    assert_eq!(cycles, COLD_FETCH);
    let block = l1.set(0).blocks().last().copied().unwrap();
    assert!(block.valid && block.dirty);
    // The dirt stays local until kickout.
    assert!(!l2.set(0).lru().dirty);
}

#[test]
fn store_hit_rewrites_and_stays_dirty() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;
    walker::store(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    walker::store(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    assert_eq!(cycles, COLD_FETCH + 1);
    assert!(l1.set(0).lru().dirty);
}

// ──────────────────────────────────────────────────────────
// Kickout
// ──────────────────────────────────────────────────────────

#[test]
fn clean_kickout_skips_the_write_back() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;
    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);

    // 0x8 maps to the same L1 set as 0x0 and displaces it.
    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x8, &mut cycles);

    assert_eq!(cycles, 2 * COLD_FETCH);
    assert_eq!(l1.stats.kickouts, 1);
    assert_eq!(l1.stats.dirty_kickouts, 0);
    // The victim was clean, so the L2 was never probed for it.
    assert_eq!(l2.stats.hit_count, 0);
}

/// A dirty victim is written back to the next level. The residency probe
/// records a hit and charges `hit_time`, and both are immediately compensated:
/// the next level's `transfers` drops by one and the charge is taken back out.
#[test]
fn dirty_kickout_writes_back_with_compensation() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;
    walker::store(&mut [&mut l1, &mut l2], &memory, 0x0, &mut cycles);
    assert_eq!(l2.stats.transfers, 1);

    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x8, &mut cycles);

    // The probe's hit charge cancels out, leaving the plain miss path.
    assert_eq!(cycles, 2 * COLD_FETCH);
    assert_eq!(l1.stats.kickouts, 1);
    assert_eq!(l1.stats.dirty_kickouts, 1);
    // Probe recorded on the L2, then its transfer count compensated back
    // down before the new block's fill raised it again.
    assert_eq!(l2.stats.hit_count, 1);
    assert_eq!(l2.stats.transfers, 1);
    // The written-back block is dirty in the L2 now.
    assert!(l2.set(0).lru().dirty);
}

/// The write-back lands at the victim's own address, reconstructed from its
/// stored tag and set index, not at the address that displaced it.
#[test]
fn dirty_kickout_reconstructs_the_victim_address() {
    let (mut l1, mut l2, memory) = (l1(), l2(), memory());
    let mut cycles = 0;
    walker::store(&mut [&mut l1, &mut l2], &memory, 0x104, &mut cycles);

    // 0x10c shares L1 set 1 with 0x104 but maps to a different L2 set.
    walker::fetch(&mut [&mut l1, &mut l2], &memory, 0x10c, &mut cycles);

    assert_eq!(l1.stats.dirty_kickouts, 1);
    let (index, tag) = l2.geometry().decode(0x104);
    let set = l2.set(index);
    let position = set.probe(tag).unwrap();
    assert!(set.blocks()[position].dirty);
}

#[test]
fn dirty_kickout_to_memory_charges_a_block_transfer() {
    let (mut l1, memory) = (l1(), memory());
    let mut cycles = 0;
    walker::store(&mut [&mut l1], &memory, 0x0, &mut cycles);
    assert_eq!(cycles, COLD_FETCH_NO_L2);

    walker::fetch(&mut [&mut l1], &memory, 0x8, &mut cycles);

    // Second access pays its own miss path plus the victim's write-back.
    assert_eq!(cycles, 2 * COLD_FETCH_NO_L2 + 32);
    assert_eq!(l1.stats.kickouts, 1);
    assert_eq!(l1.stats.dirty_kickouts, 1);
    assert_eq!(l1.stats.transfers, 2);
}

#[test]
fn kickout_of_an_invalid_slot_counts_nothing() {
    let (mut l1, mut l2, _memory) = (l1(), l2(), memory());
    let mut cycles = 0;

    walker::kickout(&mut l1, NextLevel::Cache(&mut l2), 0x0, &mut cycles);

    assert_eq!(cycles, 0);
    assert_eq!(l1.stats.kickouts, 0);
    assert_eq!(l2.stats.total_requests(), 0);
}

// ──────────────────────────────────────────────────────────
// Associativity
// ──────────────────────────────────────────────────────────

/// Blocks coexist in one set up to the associativity; the next distinct
/// block displaces the least recently used of them.
#[test]
fn single_set_evicts_in_lru_order() {
    // One set of two ways backed directly by memory.
    let mut l1 = CacheLevel::new("L1d", CacheGeometry::new(4, 8, 2, 1, 2, 0, 0));
    let memory = memory();
    let mut cycles = 0;

    walker::fetch(&mut [&mut l1], &memory, 0x0, &mut cycles);
    walker::fetch(&mut [&mut l1], &memory, 0x4, &mut cycles);
    assert_eq!(l1.stats.kickouts, 0);

    walker::fetch(&mut [&mut l1], &memory, 0x8, &mut cycles);

    assert_eq!(l1.stats.kickouts, 1);
    let geometry = *l1.geometry();
    let resident: Vec<u32> = l1
        .set(0)
        .blocks()
        .iter()
        .filter(|b| b.valid)
        .map(|b| b.tag)
        .collect();
    let tag_of = |addr: u32| geometry.decode(addr).1;
    assert_eq!(resident, vec![tag_of(0x4), tag_of(0x8)]);
}
