//! Cache geometry and address decomposition.
//!
//! This module defines the immutable per-level parameters and the address
//! decoder. It provides:
//! 1. **Geometry:** Block size, total size, associativity, and latencies,
//!    with the derived set count and tag width.
//! 2. **Decode:** Mapping a 32-bit byte address to a (set index, tag) pair.
//! 3. **Rebuild:** The inverse mapping, used to reconstruct the full address
//!    of an evicted block from its stored tag and set index.

/// Width of the simulated address space in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Immutable geometry and latency parameters for one cache level.
///
/// All sizes are byte counts and all times are cycle counts. `sets` and
/// `tag_bits` are derived at construction time and never change.
///
/// `block_size` and the derived set count must be powers of two; this is an
/// unchecked precondition (the truncating divisions in [`decode`] silently
/// misbehave otherwise). [`crate::config::Config::resolve`] establishes the
/// remaining invariants (nonzero sizes, associativity dividing the cache).
///
/// [`decode`]: CacheGeometry::decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// Block (line) size in bytes.
    pub block_size: u32,
    /// Total cache capacity in bytes.
    pub cache_size: u32,
    /// Blocks per set. Fully-associative configurations are resolved to
    /// `cache_size / block_size` before this struct is built.
    pub assoc: u32,
    /// Cycles charged for a hit probe.
    pub hit_time: u64,
    /// Cycles charged for a miss probe.
    pub miss_time: u64,
    /// Cycles per bus beat when this level supplies a block upward.
    pub transfer_time: u64,
    /// Width in bytes of the bus this level supplies blocks over.
    pub bus_width: u32,
    /// Number of sets, `cache_size / (assoc * block_size)`.
    pub sets: u32,
    /// Tag width, `32 - log2(sets) - log2(block_size)`.
    pub tag_bits: u32,
}

impl CacheGeometry {
    /// Builds a geometry, deriving `sets` and `tag_bits`.
    ///
    /// # Arguments
    ///
    /// * `block_size` - Block size in bytes (nonzero power of two).
    /// * `cache_size` - Total capacity in bytes.
    /// * `assoc` - Blocks per set (nonzero; already resolved if fully associative).
    /// * `hit_time` / `miss_time` - Probe charges in cycles.
    /// * `transfer_time` / `bus_width` - Supply-side bus parameters; zero for
    ///   levels that never supply another cache (the L1s).
    ///
    /// # Returns
    ///
    /// The completed geometry. Callers are responsible for the divisibility
    /// invariants; see [`crate::config::Config::resolve`].
    pub fn new(
        block_size: u32,
        cache_size: u32,
        assoc: u32,
        hit_time: u64,
        miss_time: u64,
        transfer_time: u64,
        bus_width: u32,
    ) -> Self {
        let sets = cache_size / (assoc * block_size);
        let tag_bits = ADDRESS_BITS - sets.trailing_zeros() - block_size.trailing_zeros();
        Self {
            block_size,
            cache_size,
            assoc,
            hit_time,
            miss_time,
            transfer_time,
            bus_width,
            sets,
            tag_bits,
        }
    }

    /// Decomposes a byte address into `(set index, tag)`.
    ///
    /// `index = (addr / block_size) mod sets`; `tag = addr >> (32 - tag_bits)`.
    pub fn decode(&self, addr: u32) -> (u32, u32) {
        let index = (addr / self.block_size) % self.sets;
        // Widen before shifting: a direct-mapped single-set cache can have
        // tag_bits == 32, and a 32-bit shift by zero bits must stay defined.
        let tag = (u64::from(addr) >> (ADDRESS_BITS - self.tag_bits)) as u32;
        (index, tag)
    }

    /// Reconstructs the full block-aligned address of a resident block.
    ///
    /// Inverts [`decode`](CacheGeometry::decode):
    /// `addr = (tag << (32 - tag_bits)) + index * block_size`.
    pub fn rebuild(&self, tag: u32, index: u32) -> u32 {
        let high = (u64::from(tag) << (ADDRESS_BITS - self.tag_bits)) as u32;
        high + index * self.block_size
    }
}
