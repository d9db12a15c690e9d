//! Trace-driven memory-hierarchy simulator library.
//!
//! This crate simulates a multi-level, set-associative cache hierarchy (two
//! private L1 caches backed by a shared L2, backed by main memory) against a
//! trace of memory-reference operations. It provides:
//! 1. **Hierarchy:** Address decomposition, LRU set management, hit/miss
//!    determination, dirty write-back, cross-level kickout propagation, and
//!    recursive transfer timing.
//! 2. **Configuration:** Layered JSON sources resolved and validated into
//!    runtime geometry.
//! 3. **Trace:** Parsing of `L`/`S`/`B`/`C` reference records.
//! 4. **Simulation:** The per-record dispatch loop with per-opcode cycle
//!    accounting.
//! 5. **Report:** End-of-run statistics and cost reporting.

/// Simulator configuration (defaults, overlays, validated resolution).
pub mod config;
/// Cache levels, sets, main memory, and the inter-level walker.
pub mod hierarchy;
/// End-of-run statistics and cost report.
pub mod report;
/// Trace-driven simulation loop.
pub mod sim;
/// Memory-reference trace records.
pub mod trace;

/// Root configuration type; start from `Config::default()` and layer overlays.
pub use crate::config::Config;
/// The simulated cache topology.
pub use crate::hierarchy::Hierarchy;
/// One simulation run over a trace.
pub use crate::sim::Simulation;
