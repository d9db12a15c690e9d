//! LRU Set Ordering Tests.
//!
//! The set's element order *is* the replacement policy, so these tests pin
//! down the exact block movement of every operation and check the combined
//! update step against a recency-list model.

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use cachesim_core::hierarchy::Set;

/// Valid tags in LRU-to-MRU order.
fn resident(set: &Set) -> Vec<u32> {
    set.blocks()
        .iter()
        .filter(|b| b.valid)
        .map(|b| b.tag)
        .collect()
}

#[test]
fn starts_empty() {
    let set = Set::new(4);
    assert_eq!(set.blocks().len(), 4);
    assert!(set.blocks().iter().all(|b| !b.valid));
    assert!(!set.lru().valid);
}

// ──────────────────────────────────────────────────────────
// Primitive moves
// ──────────────────────────────────────────────────────────

#[test]
fn promote_moves_block_to_front() {
    let mut set = Set::new(3);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    // Order is now [1, 2, 3] (LRU to MRU).
    set.promote(2);
    assert_eq!(resident(&set), vec![3, 1, 2]);
}

#[test]
fn promote_front_is_noop() {
    let mut set = Set::new(3);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    set.promote(0);
    assert_eq!(resident(&set), vec![1, 2, 3]);
}

#[test]
fn rotate_to_back_shifts_everything_else_forward() {
    let mut set = Set::new(3);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    set.rotate_to_back();
    assert_eq!(resident(&set), vec![2, 3, 1]);
}

#[test]
fn install_front_overwrites_only_the_front_slot() {
    let mut set = Set::new(2);
    set.update(1, false);
    set.update(2, false);
    set.install_front(9, true);
    assert_eq!(resident(&set), vec![9, 2]);
    assert!(set.lru().dirty);
}

// ──────────────────────────────────────────────────────────
// Combined update
// ──────────────────────────────────────────────────────────

#[test]
fn update_fills_in_access_order() {
    let mut set = Set::new(4);
    for tag in [7, 8, 9] {
        set.update(tag, false);
    }
    assert_eq!(resident(&set), vec![7, 8, 9]);
    assert_eq!(set.blocks().last().map(|b| b.tag), Some(9));
}

#[test]
fn update_beyond_capacity_evicts_the_lru() {
    let mut set = Set::new(2);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    assert_eq!(resident(&set), vec![2, 3]);
    assert_eq!(set.probe(1), None);
}

#[test]
fn update_of_resident_tag_refreshes_recency() {
    let mut set = Set::new(3);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    set.update(1, false);
    assert_eq!(resident(&set), vec![2, 3, 1]);
}

/// Accessing the same tag twice in a row leaves it at the MRU slot; the
/// second update must not move it any further.
#[test]
fn repeated_update_is_idempotent_in_position() {
    let mut set = Set::new(3);
    for tag in [1, 2, 3] {
        set.update(tag, false);
    }
    set.update(3, false);
    assert_eq!(resident(&set), vec![1, 2, 3]);
}

#[test]
fn update_records_dirty_flag() {
    let mut set = Set::new(2);
    set.update(5, true);
    let mru = set.blocks().last().copied().unwrap();
    assert!(mru.valid && mru.dirty);
    assert_eq!(mru.tag, 5);
}

// ──────────────────────────────────────────────────────────
// Model check
// ──────────────────────────────────────────────────────────

proptest! {
    /// After any access sequence, the resident tags in LRU-to-MRU order are
    /// exactly the last `assoc` distinct tags in order of last use.
    #[test]
    fn matches_recency_list_model(
        assoc in 1u32..=4,
        accesses in prop::collection::vec(0u32..6, 1..48),
    ) {
        let mut set = Set::new(assoc);
        // Model: most recent first.
        let mut model: Vec<u32> = Vec::new();
        for &tag in &accesses {
            set.update(tag, false);
            model.retain(|&t| t != tag);
            model.insert(0, tag);
            model.truncate(assoc as usize);
        }
        let expected: Vec<u32> = model.iter().rev().copied().collect();
        prop_assert_eq!(resident(&set), expected);
    }
}
