//! Simulator configuration.
//!
//! This module defines the cache and memory parameters and how they are
//! supplied. It provides:
//! 1. **Defaults:** The reference configuration, used when no overlay sets a
//!    field.
//! 2. **Overlays:** JSON fragments applied field-by-field over the current
//!    values; later sources win and unset fields keep prior values.
//! 3. **Resolution:** Validation and derivation of the runtime geometry,
//!    rejecting invalid parameters before any set is allocated.
//!
//! Sections use the original configuration-file names: `L1_cache` (applied
//! identically to both L1 caches), `L2_cache`, and `Main_Mem`.

use serde::Deserialize;
use thiserror::Error;

use crate::hierarchy::{CacheGeometry, MainMemory};

/// Reference configuration constants, used field-by-field when no overlay
/// overrides them.
mod defaults {
    /// L1 block size in bytes.
    pub const L1_BLOCK_SIZE: u32 = 32;
    /// L1 capacity in bytes (per cache; I and D are sized identically).
    pub const L1_CACHE_SIZE: u32 = 8192;
    /// L1 associativity (1 = direct mapped; 0 would mean fully associative).
    pub const L1_ASSOC: u32 = 1;
    /// L1 hit charge in cycles.
    pub const L1_HIT_TIME: u64 = 1;
    /// L1 miss charge in cycles.
    pub const L1_MISS_TIME: u64 = 1;

    /// L2 block size in bytes.
    pub const L2_BLOCK_SIZE: u32 = 64;
    /// L2 capacity in bytes.
    pub const L2_CACHE_SIZE: u32 = 32768;
    /// L2 associativity.
    pub const L2_ASSOC: u32 = 1;
    /// L2 hit charge in cycles.
    pub const L2_HIT_TIME: u64 = 8;
    /// L2 miss charge in cycles.
    pub const L2_MISS_TIME: u64 = 10;
    /// Cycles per bus beat when L2 supplies an L1.
    pub const L2_TRANSFER_TIME: u64 = 10;
    /// Width in bytes of the L2-to-L1 bus.
    pub const L2_BUS_WIDTH: u32 = 16;

    /// Cycles to send an address to main memory.
    pub const MM_SENDADDR: u64 = 10;
    /// Cycles until main memory has the first chunk ready.
    pub const MM_READY: u64 = 50;
    /// Cycles per chunk after the first is ready.
    pub const MM_CHUNKTIME: u64 = 15;
    /// Bytes per chunk.
    pub const MM_CHUNKSIZE: u64 = 8;
}

/// Error rejecting a configuration at resolution time, before any cache set
/// is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The overlay was not valid JSON for the expected shape.
    #[error("invalid configuration source: {0}")]
    Parse(#[from] serde_json::Error),

    /// A parameter that must be positive was zero.
    #[error("{section}.{field} must be nonzero")]
    ZeroField {
        /// Configuration section name.
        section: &'static str,
        /// Offending field name.
        field: &'static str,
    },

    /// One way of one set (`assoc * block_size` bytes) does not fit the cache.
    #[error("{section}: assoc {assoc} x block_size {block_size} exceeds cache_size {cache_size}")]
    WaysExceedCache {
        /// Configuration section name.
        section: &'static str,
        /// Resolved associativity.
        assoc: u32,
        /// Block size in bytes.
        block_size: u32,
        /// Cache capacity in bytes.
        cache_size: u32,
    },

    /// `cache_size` is not a whole number of sets.
    #[error(
        "{section}: cache_size {cache_size} is not a multiple of assoc x block_size ({way_bytes})"
    )]
    Indivisible {
        /// Configuration section name.
        section: &'static str,
        /// Cache capacity in bytes.
        cache_size: u32,
        /// Bytes per set, `assoc * block_size`.
        way_bytes: u32,
    },
}

/// Complete parameter set for one run. Starts at the reference defaults and
/// is mutated by [`Config::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Parameters applied identically to both L1 caches.
    pub l1: L1Params,
    /// Shared L2 parameters.
    pub l2: L2Params,
    /// Main-memory timing parameters.
    pub main_mem: MainMemParams,
}

/// L1 section: both L1 caches share these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Params {
    /// Block size in bytes.
    pub block_size: u32,
    /// Capacity in bytes.
    pub cache_size: u32,
    /// Associativity; `0` means fully associative.
    pub assoc: u32,
    /// Hit charge in cycles.
    pub hit_time: u64,
    /// Miss charge in cycles.
    pub miss_time: u64,
}

/// L2 section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L2Params {
    /// Block size in bytes.
    pub block_size: u32,
    /// Capacity in bytes.
    pub cache_size: u32,
    /// Associativity; `0` means fully associative.
    pub assoc: u32,
    /// Hit charge in cycles.
    pub hit_time: u64,
    /// Miss charge in cycles.
    pub miss_time: u64,
    /// Cycles per bus beat when supplying an L1.
    pub transfer_time: u64,
    /// Width in bytes of the bus toward the L1s.
    pub bus_width: u32,
}

/// Main-memory section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainMemParams {
    /// Cycles to send the address.
    pub sendaddr: u64,
    /// Cycles until the first chunk is ready.
    pub ready: u64,
    /// Cycles per chunk.
    pub chunktime: u64,
    /// Bytes per chunk.
    pub chunksize: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            l1: L1Params {
                block_size: defaults::L1_BLOCK_SIZE,
                cache_size: defaults::L1_CACHE_SIZE,
                assoc: defaults::L1_ASSOC,
                hit_time: defaults::L1_HIT_TIME,
                miss_time: defaults::L1_MISS_TIME,
            },
            l2: L2Params {
                block_size: defaults::L2_BLOCK_SIZE,
                cache_size: defaults::L2_CACHE_SIZE,
                assoc: defaults::L2_ASSOC,
                hit_time: defaults::L2_HIT_TIME,
                miss_time: defaults::L2_MISS_TIME,
                transfer_time: defaults::L2_TRANSFER_TIME,
                bus_width: defaults::L2_BUS_WIDTH,
            },
            main_mem: MainMemParams {
                sendaddr: defaults::MM_SENDADDR,
                ready: defaults::MM_READY,
                chunktime: defaults::MM_CHUNKTIME,
                chunksize: defaults::MM_CHUNKSIZE,
            },
        }
    }
}

/// One configuration source: every field optional, applied field-by-field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigOverlay {
    /// `L1_cache` section, if present.
    #[serde(rename = "L1_cache", default)]
    pub l1: L1Overlay,
    /// `L2_cache` section, if present.
    #[serde(rename = "L2_cache", default)]
    pub l2: L2Overlay,
    /// `Main_Mem` section, if present.
    #[serde(rename = "Main_Mem", default)]
    pub main_mem: MainMemOverlay,
}

/// Optional overrides for the `L1_cache` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct L1Overlay {
    /// Block size in bytes.
    pub block_size: Option<u32>,
    /// Capacity in bytes.
    pub cache_size: Option<u32>,
    /// Associativity; `0` means fully associative.
    pub assoc: Option<u32>,
    /// Hit charge in cycles.
    pub hit_time: Option<u64>,
    /// Miss charge in cycles.
    pub miss_time: Option<u64>,
}

/// Optional overrides for the `L2_cache` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct L2Overlay {
    /// Block size in bytes.
    pub block_size: Option<u32>,
    /// Capacity in bytes.
    pub cache_size: Option<u32>,
    /// Associativity; `0` means fully associative.
    pub assoc: Option<u32>,
    /// Hit charge in cycles.
    pub hit_time: Option<u64>,
    /// Miss charge in cycles.
    pub miss_time: Option<u64>,
    /// Cycles per bus beat when supplying an L1.
    pub transfer_time: Option<u64>,
    /// Width in bytes of the bus toward the L1s.
    pub bus_width: Option<u32>,
}

/// Optional overrides for the `Main_Mem` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainMemOverlay {
    /// Cycles to send the address.
    pub sendaddr: Option<u64>,
    /// Cycles until the first chunk is ready.
    pub ready: Option<u64>,
    /// Cycles per chunk.
    pub chunktime: Option<u64>,
    /// Bytes per chunk.
    pub chunksize: Option<u64>,
}

impl ConfigOverlay {
    /// Parses an overlay from a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] when the document is not valid JSON or has the
    /// wrong shape.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

/// Runtime parameters derived from a validated [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Geometry for both L1 caches.
    pub l1: CacheGeometry,
    /// Geometry for the shared L2.
    pub l2: CacheGeometry,
    /// Terminal memory timing.
    pub memory: MainMemory,
}

impl Config {
    /// Applies one overlay, overriding set fields and keeping the rest.
    pub fn apply(&mut self, overlay: &ConfigOverlay) {
        let l1 = &overlay.l1;
        set_if(&mut self.l1.block_size, l1.block_size);
        set_if(&mut self.l1.cache_size, l1.cache_size);
        set_if(&mut self.l1.assoc, l1.assoc);
        set_if(&mut self.l1.hit_time, l1.hit_time);
        set_if(&mut self.l1.miss_time, l1.miss_time);

        let l2 = &overlay.l2;
        set_if(&mut self.l2.block_size, l2.block_size);
        set_if(&mut self.l2.cache_size, l2.cache_size);
        set_if(&mut self.l2.assoc, l2.assoc);
        set_if(&mut self.l2.hit_time, l2.hit_time);
        set_if(&mut self.l2.miss_time, l2.miss_time);
        set_if(&mut self.l2.transfer_time, l2.transfer_time);
        set_if(&mut self.l2.bus_width, l2.bus_width);

        let mm = &overlay.main_mem;
        set_if(&mut self.main_mem.sendaddr, mm.sendaddr);
        set_if(&mut self.main_mem.ready, mm.ready);
        set_if(&mut self.main_mem.chunktime, mm.chunktime);
        set_if(&mut self.main_mem.chunksize, mm.chunksize);
    }

    /// Validates the parameters and derives the runtime geometry.
    ///
    /// `assoc == 0` resolves to `cache_size / block_size` (fully associative)
    /// before set math. Power-of-two sizing is *not* validated; behavior is
    /// undefined without it.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when a required field is zero, one way exceeds the
    /// cache, or the capacity is not a whole number of sets.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let l1 = resolve_level(
            "L1_cache",
            self.l1.block_size,
            self.l1.cache_size,
            self.l1.assoc,
            self.l1.hit_time,
            self.l1.miss_time,
            // The L1s never supply another cache; their bus side is unused.
            0,
            0,
        )?;
        nonzero("L2_cache", "bus_width", u64::from(self.l2.bus_width))?;
        let l2 = resolve_level(
            "L2_cache",
            self.l2.block_size,
            self.l2.cache_size,
            self.l2.assoc,
            self.l2.hit_time,
            self.l2.miss_time,
            self.l2.transfer_time,
            self.l2.bus_width,
        )?;
        nonzero("Main_Mem", "ready", self.main_mem.ready)?;
        nonzero("Main_Mem", "chunksize", self.main_mem.chunksize)?;
        Ok(ResolvedConfig {
            l1,
            l2,
            memory: MainMemory {
                sendaddr: self.main_mem.sendaddr,
                ready: self.main_mem.ready,
                chunktime: self.main_mem.chunktime,
                chunksize: self.main_mem.chunksize,
            },
        })
    }
}

fn nonzero(section: &'static str, field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroField { section, field });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn resolve_level(
    section: &'static str,
    block_size: u32,
    cache_size: u32,
    assoc: u32,
    hit_time: u64,
    miss_time: u64,
    transfer_time: u64,
    bus_width: u32,
) -> Result<CacheGeometry, ConfigError> {
    nonzero(section, "block_size", u64::from(block_size))?;
    nonzero(section, "cache_size", u64::from(cache_size))?;

    let assoc = if assoc == 0 {
        cache_size / block_size
    } else {
        assoc
    };
    // Widened so an absurd explicit associativity can't overflow the check.
    let way_bytes = u64::from(assoc) * u64::from(block_size);
    if way_bytes > u64::from(cache_size) {
        return Err(ConfigError::WaysExceedCache {
            section,
            assoc,
            block_size,
            cache_size,
        });
    }
    if u64::from(cache_size) % way_bytes != 0 {
        return Err(ConfigError::Indivisible {
            section,
            cache_size,
            way_bytes: way_bytes as u32,
        });
    }

    Ok(CacheGeometry::new(
        block_size,
        cache_size,
        assoc,
        hit_time,
        miss_time,
        transfer_time,
        bus_width,
    ))
}

fn set_if<T: Copy>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
