//! Memory-reference trace records.
//!
//! One record per line, three whitespace-separated tokens: a one-character
//! opcode in `{L, S, B, C}`, a hexadecimal instruction address, and a second
//! hexadecimal field whose meaning depends on the opcode (data byte address
//! for `L`/`S`, unused for `B`, extra compute cycles for `C`).

use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Reason a trace line failed to parse. The driver stops reading at the first
/// malformed record rather than treating it as fatal.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The line did not have exactly three fields.
    #[error("expected 3 whitespace-separated fields, got {0}")]
    FieldCount(usize),

    /// The first field was not one of `L`, `S`, `B`, `C`.
    #[error("unknown opcode {0:?}")]
    UnknownOpcode(String),

    /// A hexadecimal field did not parse.
    #[error("invalid hex field {field:?}: {source}")]
    BadHex {
        /// The offending token.
        field: String,
        /// Underlying parse failure.
        source: ParseIntError,
    },
}

/// Kind of memory-reference operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `L`: load word.
    Load,
    /// `S`: store word.
    Store,
    /// `B`: branch.
    Branch,
    /// `C`: computation.
    Compute,
}

/// One trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Operation kind.
    pub op: Opcode,
    /// Instruction byte address (always fetched through L1i).
    pub inst_addr: u32,
    /// Data byte address for `L`/`S`, extra cycles for `C`, unused for `B`.
    pub operand: u32,
}

impl FromStr for TraceRecord {
    type Err = TraceError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [op, inst, operand] = fields.as_slice() else {
            return Err(TraceError::FieldCount(fields.len()));
        };
        let op = match *op {
            "L" => Opcode::Load,
            "S" => Opcode::Store,
            "B" => Opcode::Branch,
            "C" => Opcode::Compute,
            other => return Err(TraceError::UnknownOpcode(other.to_string())),
        };
        Ok(Self {
            op,
            inst_addr: parse_hex(inst)?,
            operand: parse_hex(operand)?,
        })
    }
}

fn parse_hex(token: &str) -> Result<u32, TraceError> {
    u32::from_str_radix(token, 16).map_err(|source| TraceError::BadHex {
        field: token.to_string(),
        source,
    })
}
