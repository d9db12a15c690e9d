//! End-of-run statistics and cost report.
//!
//! Formats a completed [`Simulation`] as the classic simulator report:
//! 1. **Memory system banner:** Configured sizes, ways, and memory timing.
//! 2. **Execution:** Total cycles and reference counts.
//! 3. **Instruction mix:** Counts, cycles, and CPI per opcode.
//! 4. **Perfect-memory comparison:** Two cycles per instruction baseline.
//! 5. **Per-level statistics:** Hits, misses, kickouts, transfers.
//! 6. **Cost model:** Dollar cost of each level and the total.

use std::fmt;

use crate::hierarchy::{CacheLevel, MainMemory};
use crate::sim::Simulation;

/// Cycles per instruction a perfect memory system would deliver.
const PERFECT_CPI: u64 = 2;

/// Displayable report over a finished simulation.
///
/// Obtained from [`Simulation::report`]; render it with `{}`.
#[derive(Debug)]
pub struct Report<'a> {
    sim: &'a Simulation,
}

impl Simulation {
    /// Formats the end-of-run report for this simulation.
    pub fn report(&self) -> Report<'_> {
        Report { sim: self }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hierarchy = self.sim.hierarchy();
        let (l1i, l1d, l2) = (hierarchy.l1i(), hierarchy.l1d(), hierarchy.l2());
        let memory = hierarchy.memory();
        let counts = self.sim.counts();
        let cycles = self.sim.cycles();

        let d = l1d.geometry();
        let i = l1i.geometry();
        let s = l2.geometry();
        writeln!(f, "Memory System:")?;
        writeln!(
            f,
            "\tDcache size = {} : ways = {} : block size = {}",
            d.cache_size, d.assoc, d.block_size
        )?;
        writeln!(
            f,
            "\tIcache size = {} : ways = {} : block size = {}",
            i.cache_size, i.assoc, i.block_size
        )?;
        writeln!(
            f,
            "\tL2-cache size = {} : ways = {} : block size = {}",
            s.cache_size, s.assoc, s.block_size
        )?;
        writeln!(
            f,
            "\tMemory ready time = {} : chunksize = {} : chunktime = {}",
            memory.ready, memory.chunksize, memory.chunktime
        )?;
        writeln!(f)?;

        let inst_refs = l1i.stats.total_requests();
        let data_refs = l1d.stats.total_requests();
        let total_cycles = cycles.total();
        writeln!(
            f,
            "Execute time = {} : Total refs = {}",
            total_cycles,
            inst_refs + data_refs
        )?;
        writeln!(f, "Inst refs = {inst_refs} : Data refs = {data_refs}")?;
        writeln!(f)?;

        let num_inst = counts.total();
        writeln!(f, "Number of Instructions: [Percentage]")?;
        writeln!(
            f,
            "\tLoads  (L) = {} [{:.1}%] : Stores (S) = {} [{:.1}%]",
            counts.loads,
            percent(counts.loads, num_inst),
            counts.stores,
            percent(counts.stores, num_inst)
        )?;
        writeln!(
            f,
            "\tBranch (B) = {} [{:.1}%] : Comp. (C) = {} [{:.1}%]",
            counts.branches,
            percent(counts.branches, num_inst),
            counts.computes,
            percent(counts.computes, num_inst)
        )?;
        writeln!(f, "\tTotal  (T) = {num_inst}")?;
        writeln!(f)?;

        writeln!(f, "Cycles for Instructions: [Percentage]")?;
        writeln!(
            f,
            "\tLoads  (L) = {} [{:.1}%] : Stores (S) = {} [{:.1}%]",
            cycles.load,
            percent(cycles.load, total_cycles),
            cycles.store,
            percent(cycles.store, total_cycles)
        )?;
        writeln!(
            f,
            "\tBranch (B) = {} [{:.1}%] : Comp. (C) = {} [{:.1}%]",
            cycles.branch,
            percent(cycles.branch, total_cycles),
            cycles.compute,
            percent(cycles.compute, total_cycles)
        )?;
        writeln!(f, "\tTotal  (T) = {total_cycles}")?;
        writeln!(f)?;

        writeln!(f, "Cycles per Instruction (CPI):")?;
        writeln!(
            f,
            "\tLoads  (L) = {:.1} : Stores (S) = {:.1}",
            ratio(cycles.load, counts.loads),
            ratio(cycles.store, counts.stores)
        )?;
        writeln!(
            f,
            "\tBranch (B) = {:.1} : Comp. (C) = {:.1}",
            ratio(cycles.branch, counts.branches),
            ratio(cycles.compute, counts.computes)
        )?;
        writeln!(f, "\tOverall (CPI) = {:.1}", ratio(total_cycles, num_inst))?;
        writeln!(f)?;

        let perf_cycles = PERFECT_CPI * num_inst;
        writeln!(
            f,
            "Cycles for processor w/ perfect memory system = {perf_cycles}"
        )?;
        writeln!(
            f,
            "Cycles for processor w/ simulated memory system = {total_cycles}"
        )?;
        writeln!(
            f,
            "Ratio of simulated to perfect performance = {:.1}",
            ratio(total_cycles, perf_cycles)
        )?;
        writeln!(f)?;

        for level in [l1i, l1d, l2] {
            write_level(f, level)?;
        }

        let icache_cost = l1_cost(i.cache_size, i.assoc);
        let dcache_cost = l1_cost(d.cache_size, d.assoc);
        let l2_cost = l2_cost(s.cache_size, s.assoc);
        let mem_cost = memory_cost(memory);
        writeln!(
            f,
            "L1 cache cost (Icache ${icache_cost}) + (Dcache ${dcache_cost}) = ${}",
            icache_cost + dcache_cost
        )?;
        writeln!(f, "L2 cache cost = ${l2_cost}")?;
        writeln!(f, "Memory cost = ${mem_cost}")?;
        writeln!(
            f,
            "Total cost = ${}",
            icache_cost + dcache_cost + l2_cost + mem_cost
        )
    }
}

fn write_level(f: &mut fmt::Formatter<'_>, level: &CacheLevel) -> fmt::Result {
    let stats = &level.stats;
    let total = stats.total_requests();
    writeln!(f, "Memory Level: {}", level.label())?;
    writeln!(
        f,
        "\tHit Count = {}\tMiss Count = {}\tTotal Requests = {}",
        stats.hit_count, stats.miss_count, total
    )?;
    writeln!(
        f,
        "\tHit Rate = {:.1}%\tMiss Rate = {:.1}%",
        percent(stats.hit_count, total),
        percent(stats.miss_count, total)
    )?;
    writeln!(
        f,
        "\tKickouts : {} Dirty Kickouts : {} Transfers : {}",
        stats.kickouts, stats.dirty_kickouts, stats.transfers
    )?;
    writeln!(f)
}

fn percent(part: u64, whole: u64) -> f64 {
    ratio(part, whole) * 100.0
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// L1 cost: `$100` per 4 KiB, multiplied by `log2(assoc) + 1`.
fn l1_cost(cache_size: u32, assoc: u32) -> i64 {
    100 * i64::from(cache_size) / 4096 * i64::from(assoc.trailing_zeros() + 1)
}

/// L2 cost: `$50` per 64 KiB plus `$50` per doubling of associativity.
fn l2_cost(cache_size: u32, assoc: u32) -> i64 {
    50 * i64::from(cache_size) / 65536 + 50 * i64::from(assoc.trailing_zeros())
}

/// Memory cost: base `$75`, plus `$200` per halving of ready time below 100
/// cycles and `$100` per doubling of chunk size beyond 16 bytes. Slow, small
/// parts can push the bonuses negative; the total floors at zero.
fn memory_cost(memory: &MainMemory) -> i64 {
    let ready_bonus = 200 * (100 / memory.ready as i64 - 1);
    let chunk_bonus = 100 * (memory.chunksize as i64 / 16 - 1);
    (50 + ready_bonus + 25 + chunk_bonus).max(0)
}
