//! Binary line decoders with chip-select inputs.

use gatesim_core::{CircuitBuilder, CircuitError, LogicBlock};
use tracing::debug;

use crate::bits::{self, read_word, write_word};
use crate::error::Error;

/// Widest supported address.
pub const MAX_ADDRESS_BITS: usize = 12;

/// Polarity of the decoder's output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    /// The selected line is 1, all others 0.
    High,
    /// The selected line is 0, all others 1.
    Low,
}

/// An N-to-2^N line decoder.
///
/// Ports: address `A{i}` (LSB first) and active-low chip selects `!CS1`,
/// `!CS2` in; lines `Y{k}` out. Line `k` is asserted when the address equals
/// `k` and both chip selects are low. Each line is one gate over the address
/// bits, inverted where `k` has a 0, and the chip-select enable.
#[derive(Debug, Clone)]
pub struct Decoder {
    block: LogicBlock,
    bits: usize,
    active: Active,
}

impl Decoder {
    /// Build a decoder over `bits` address bits.
    ///
    /// # Errors
    ///
    /// [`Error::WidthMismatch`] for zero bits or more than
    /// [`MAX_ADDRESS_BITS`].
    pub fn new(uid: &str, bits: usize, active: Active) -> Result<Self, Error> {
        if bits == 0 || bits > MAX_ADDRESS_BITS {
            return Err(Error::WidthMismatch {
                expected: MAX_ADDRESS_BITS,
                found: bits,
            });
        }

        let block = LogicBlock::new(uid, [], |b| {
            for w in 0..bits {
                b.add_input(&format!("A{w}"), false)?;
            }
            b.add_input("!CS1", false)?;
            b.add_input("!CS2", false)?;
            b.add_nor_gate("EN", 2)?;
            b.connect("!CS1", "EN")?;
            b.connect("!CS2", "EN")?;

            for k in 0..1usize << bits {
                add_line(b, k, bits, active)?;
            }
            Ok(())
        })?;

        debug!(uid, bits, ?active, vertices = block.vertex_count(), "built decoder");
        Ok(Self { block, bits, active })
    }

    /// Number of address bits.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Number of output lines.
    pub fn lines(&self) -> usize {
        1 << self.bits
    }

    /// Output polarity.
    pub fn active(&self) -> Active {
        self.active
    }

    /// The decoder circuit.
    pub fn block(&self) -> &LogicBlock {
        &self.block
    }

    /// Drive both chip selects: enabled pulls them low.
    ///
    /// # Errors
    ///
    /// Only circuit errors from the core.
    pub fn select(&mut self, enabled: bool) -> Result<(), Error> {
        self.block.set_inputs([("!CS1", !enabled), ("!CS2", !enabled)])?;
        Ok(())
    }

    /// Apply `address` and return every output line, `Y0` first.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if the address does not fit.
    pub fn decode(&mut self, address: u64) -> Result<Vec<bool>, Error> {
        let address = bits::to_bits(address, self.bits)?;
        write_word(&mut self.block, "A", &address)?;
        read_word(&self.block, "Y", self.lines())
    }
}

/// Output `Y{k}` = gate(address literals of `k`, EN).
fn add_line(
    b: &mut CircuitBuilder,
    k: usize,
    bits: usize,
    active: Active,
) -> Result<(), CircuitError> {
    let line = format!("Y{k}");
    let gate = format!("G{k}");
    b.add_output(&line, active == Active::Low)?;
    match active {
        Active::High => b.add_and_gate(&gate, bits + 1)?,
        Active::Low => b.add_nand_gate(&gate, bits + 1)?,
    }

    for w in 0..bits {
        let address = format!("A{w}");
        if (k >> w) & 1 == 1 {
            b.connect(&address, &gate)?;
        } else {
            let inverter = format!("N{k}(!A{w})");
            b.add_not_gate(&inverter)?;
            b.connect(&address, &inverter)?;
            b.connect(&inverter, &gate)?;
        }
    }

    b.connect("EN", &gate)?;
    b.connect(&gate, &line)
}
