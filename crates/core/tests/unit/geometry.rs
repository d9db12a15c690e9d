//! Address Decomposition Tests.
//!
//! Verifies the (index, tag) decode for representative geometries and that
//! evicted-address reconstruction inverts the decode.

use pretty_assertions::assert_eq;
use rstest::rstest;

use cachesim_core::hierarchy::CacheGeometry;

/// 8 KiB direct-mapped cache with 32-byte blocks: 256 sets, 19 tag bits.
fn reference_l1() -> CacheGeometry {
    CacheGeometry::new(32, 8192, 1, 1, 1, 0, 0)
}

#[test]
fn derived_fields() {
    let g = reference_l1();
    assert_eq!(g.sets, 256);
    assert_eq!(g.tag_bits, 32 - 8 - 5);
}

// ──────────────────────────────────────────────────────────
// Decode
// ──────────────────────────────────────────────────────────

#[rstest]
// Block offset bits never reach the index.
#[case(0x0000_0000, 0, 0)]
#[case(0x0000_001f, 0, 0)]
// One block up moves the index, not the tag.
#[case(0x0000_0020, 1, 0)]
// Wrapping past the last set increments the tag.
#[case(0x0000_2000, 0, 1)]
#[case(0x0000_2040, 2, 1)]
// High bits land entirely in the tag.
#[case(0x7b03_4dd4, 0x6e, 0x3d81a)]
fn decode_cases(#[case] addr: u32, #[case] index: u32, #[case] tag: u32) {
    assert_eq!(reference_l1().decode(addr), (index, tag));
}

/// A single-set (fully associative) cache decodes every address to index 0
/// and uses the full non-offset address as the tag.
#[test]
fn fully_associative_decode() {
    // 32 bytes, 8-byte blocks, 4-way: one set, tag_bits = 32 - 0 - 3 = 29.
    let g = CacheGeometry::new(8, 32, 4, 1, 1, 0, 0);
    assert_eq!(g.sets, 1);
    assert_eq!(g.tag_bits, 29);
    assert_eq!(g.decode(0x40), (0, 0x8));
    assert_eq!(g.decode(0xffff_fff8), (0, 0x1fff_ffff));
}

// ──────────────────────────────────────────────────────────
// Rebuild
// ──────────────────────────────────────────────────────────

/// Reconstruction from (tag, index) recovers the block base address, so a
/// kicked-out block is written back to exactly the address it was fetched
/// from (minus the block offset).
#[rstest]
#[case(0x0000_0000)]
#[case(0x0000_2040)]
#[case(0x7b03_4dd4)]
#[case(0xffff_ffff)]
fn rebuild_inverts_decode(#[case] addr: u32) {
    let g = reference_l1();
    let (index, tag) = g.decode(addr);
    let rebuilt = g.rebuild(tag, index);
    assert_eq!(rebuilt, addr / g.block_size * g.block_size);
    assert_eq!(g.decode(rebuilt), (index, tag));
}

#[test]
fn rebuild_inverts_decode_fully_associative() {
    let g = CacheGeometry::new(8, 32, 4, 1, 1, 0, 0);
    let (index, tag) = g.decode(0xdead_beef);
    assert_eq!(g.rebuild(tag, index), 0xdead_beef & !0x7);
}
