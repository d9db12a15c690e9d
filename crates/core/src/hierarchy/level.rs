//! One cache level: sets, geometry, and statistics.
//!
//! A [`CacheLevel`] owns one [`Set`] per set index plus its geometry and a
//! mutable statistics block. It exposes the hit test and the fill/write
//! operations; inter-level movement lives in [`crate::hierarchy::walker`].

use tracing::trace;

use super::geometry::CacheGeometry;
use super::set::Set;

/// Per-level access statistics. Counters only increase, with one documented
/// exception: the compensating `transfers` decrement in
/// [`crate::hierarchy::walker::kickout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelStats {
    /// Probes that found the block resident.
    pub hit_count: u64,
    /// Probes that did not.
    pub miss_count: u64,
    /// Valid blocks displaced from their set.
    pub kickouts: u64,
    /// Displaced blocks that were dirty and had to be written back.
    pub dirty_kickouts: u64,
    /// Blocks moved into this level from the level below (or memory).
    pub transfers: u64,
}

impl LevelStats {
    /// Total probes observed by this level.
    pub fn total_requests(&self) -> u64 {
        self.hit_count + self.miss_count
    }
}

/// One level of the cache hierarchy.
#[derive(Debug, Clone)]
pub struct CacheLevel {
    label: &'static str,
    geometry: CacheGeometry,
    sets: Vec<Set>,
    /// Access statistics, readable by the reporting layer.
    pub stats: LevelStats,
}

impl CacheLevel {
    /// Allocates a level with every set empty (all blocks invalid).
    ///
    /// # Arguments
    ///
    /// * `label` - Display name for the report and trace output (e.g. `"L1d"`).
    /// * `geometry` - Resolved geometry; see [`CacheGeometry::new`].
    pub fn new(label: &'static str, geometry: CacheGeometry) -> Self {
        Self {
            label,
            geometry,
            sets: (0..geometry.sets).map(|_| Set::new(geometry.assoc)).collect(),
            stats: LevelStats::default(),
        }
    }

    /// Display name of this level.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Geometry this level was built with.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// The set a given address maps to.
    pub fn set(&self, index: u32) -> &Set {
        &self.sets[index as usize]
    }

    /// Probes for `addr` without reordering the set.
    ///
    /// Every call counts and charges: a match increments `hit_count` and
    /// charges `hit_time`; otherwise `miss_count` and `miss_time`. The charge
    /// happens even for probes issued only to check residency on behalf of a
    /// neighboring level (the kickout path relies on that side effect).
    ///
    /// # Returns
    ///
    /// `true` on hit.
    pub fn hit(&mut self, addr: u32, cycles: &mut u64) -> bool {
        let (index, tag) = self.geometry.decode(addr);
        let found = self.sets[index as usize].probe(tag).is_some();
        if found {
            self.stats.hit_count += 1;
            *cycles += self.geometry.hit_time;
        } else {
            self.stats.miss_count += 1;
            *cycles += self.geometry.miss_time;
        }
        trace!(
            level = self.label,
            addr = format_args!("{addr:#010x}"),
            index,
            tag,
            hit = found,
        );
        found
    }

    /// Installs or refreshes `addr` as a clean block at the MRU position.
    pub fn read(&mut self, addr: u32) {
        self.update(addr, false);
    }

    /// Installs or refreshes `addr` as a dirty block at the MRU position.
    pub fn write(&mut self, addr: u32) {
        self.update(addr, true);
    }

    fn update(&mut self, addr: u32, dirty: bool) {
        let (index, tag) = self.geometry.decode(addr);
        self.sets[index as usize].update(tag, dirty);
    }
}
