//! Trace-driven simulation loop.
//!
//! [`Simulation`] owns the hierarchy plus per-opcode instruction counts and
//! cycle accumulators, and processes one trace record at a time to
//! completion: every operation's full fetch/kickout/transfer chain runs
//! before the next record is read, and its cycle cost accumulates into the
//! counter selected by its opcode. Nothing is shared across operations.

use std::io::{self, BufRead};

use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::hierarchy::Hierarchy;
use crate::trace::{Opcode, TraceRecord};

/// Instruction counts by opcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// `L` records processed.
    pub loads: u64,
    /// `S` records processed.
    pub stores: u64,
    /// `B` records processed.
    pub branches: u64,
    /// `C` records processed.
    pub computes: u64,
}

impl OpCounts {
    /// Total records processed.
    pub fn total(&self) -> u64 {
        self.loads + self.stores + self.branches + self.computes
    }
}

/// Simulated cycle totals by opcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCycles {
    /// Cycles charged to loads.
    pub load: u64,
    /// Cycles charged to stores.
    pub store: u64,
    /// Cycles charged to branches.
    pub branch: u64,
    /// Cycles charged to computation.
    pub compute: u64,
}

impl OpCycles {
    /// Total simulated execution time in cycles.
    pub fn total(&self) -> u64 {
        self.load + self.store + self.branch + self.compute
    }
}

/// One simulation run: hierarchy state plus run-wide counters.
#[derive(Debug, Clone)]
pub struct Simulation {
    hierarchy: Hierarchy,
    counts: OpCounts,
    cycles: OpCycles,
}

impl Simulation {
    /// Builds a fresh simulation from resolved configuration.
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            hierarchy: Hierarchy::new(config.l1, config.l2, config.memory),
            counts: OpCounts::default(),
            cycles: OpCycles::default(),
        }
    }

    /// Processes one record to completion.
    ///
    /// Every opcode fetches its instruction through L1i. Loads additionally
    /// fetch and stores additionally store their data address through L1d;
    /// branches charge one extra cycle; computation records charge their
    /// operand as extra cycles.
    pub fn step(&mut self, record: &TraceRecord) {
        debug!(?record, "trace op");
        match record.op {
            Opcode::Load => {
                self.counts.loads += 1;
                let cycles = &mut self.cycles.load;
                self.hierarchy.fetch_instruction(record.inst_addr, cycles);
                self.hierarchy.load(record.operand, cycles);
            }
            Opcode::Store => {
                self.counts.stores += 1;
                let cycles = &mut self.cycles.store;
                self.hierarchy.fetch_instruction(record.inst_addr, cycles);
                self.hierarchy.store(record.operand, cycles);
            }
            Opcode::Branch => {
                self.counts.branches += 1;
                let cycles = &mut self.cycles.branch;
                self.hierarchy.fetch_instruction(record.inst_addr, cycles);
                *cycles += 1;
            }
            Opcode::Compute => {
                self.counts.computes += 1;
                let cycles = &mut self.cycles.compute;
                self.hierarchy.fetch_instruction(record.inst_addr, cycles);
                *cycles += u64::from(record.operand);
            }
        }
    }

    /// Runs records from `reader` until end of input or the first malformed
    /// record (which stops the run without failing it).
    ///
    /// # Returns
    ///
    /// The number of records processed.
    ///
    /// # Errors
    ///
    /// Only I/O errors from the reader itself.
    pub fn run<R: BufRead>(&mut self, reader: R) -> io::Result<u64> {
        let mut processed = 0;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<TraceRecord>() {
                Ok(record) => {
                    self.step(&record);
                    processed += 1;
                }
                Err(err) => {
                    warn!(%err, line, "stopping at malformed trace record");
                    break;
                }
            }
        }
        Ok(processed)
    }

    /// The simulated hierarchy, for statistics readout.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Instruction counts by opcode.
    pub fn counts(&self) -> &OpCounts {
        &self.counts
    }

    /// Cycle totals by opcode.
    pub fn cycles(&self) -> &OpCycles {
        &self.cycles
    }
}
