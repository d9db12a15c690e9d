//! Terminal main-memory timing model.
//!
//! Main memory ends the hierarchy chain. It has no sets and is never probed
//! for hits; it unconditionally supplies data and contributes only its
//! transfer-time formula.

/// Timing parameters of the terminal memory node, all in cycles except
/// `chunksize` (bytes per chunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainMemory {
    /// Cycles to send the address to memory.
    pub sendaddr: u64,
    /// Cycles until the first chunk is ready.
    pub ready: u64,
    /// Cycles per chunk after the first is ready.
    pub chunktime: u64,
    /// Bytes delivered per chunk.
    pub chunksize: u64,
}

impl MainMemory {
    /// Cycles to move one block of `block_size` bytes out of memory:
    /// `sendaddr + ready + chunktime * block_size / chunksize`.
    pub fn block_transfer_time(&self, block_size: u32) -> u64 {
        self.sendaddr + self.ready + self.chunktime * u64::from(block_size) / self.chunksize
    }
}
