//! Binary adders.

use gatesim_core::LogicBlock;
use tracing::debug;

use crate::bits::{self, read_word, write_word, MAX_WIDTH};
use crate::error::Error;

/// One-bit half adder: `S = A ⊕ B`, `C = A ∧ B`.
///
/// # Errors
///
/// Only construction errors from the core, which a valid `uid` never hits.
pub fn half_adder(uid: &str) -> Result<LogicBlock, Error> {
    Ok(LogicBlock::new(uid, [], |b| {
        b.add_input("A", false)?;
        b.add_input("B", false)?;
        b.add_output("S", false)?;
        b.add_output("C", false)?;
        b.add_xor_gate("XOR", 2)?;
        b.add_and_gate("AND", 2)?;
        b.connect("A", "XOR")?;
        b.connect("B", "XOR")?;
        b.connect("A", "AND")?;
        b.connect("B", "AND")?;
        b.connect("XOR", "S")?;
        b.connect("AND", "C")
    })?)
}

/// One-bit full adder from two half adders and an OR of their carries.
///
/// Ports: `A`, `B`, `Cin` in; `S`, `Cout` out.
///
/// # Errors
///
/// Only construction errors from the core.
pub fn full_adder(uid: &str) -> Result<LogicBlock, Error> {
    let children = [half_adder("HA0")?, half_adder("HA1")?];
    Ok(LogicBlock::new(uid, children, |b| {
        b.extend("HA0::A", "A")?;
        b.extend("HA0::B", "B")?;
        b.extend("HA1::B", "Cin")?;
        b.extend("HA1::S", "S")?;
        b.add_output("Cout", false)?;
        b.add_or_gate("OR", 2)?;
        b.connect("HA0::S", "HA1::A")?;
        b.connect("HA0::C", "OR")?;
        b.connect("HA1::C", "OR")?;
        b.connect("OR", "Cout")
    })?)
}

/// N-bit ripple-carry adder.
///
/// Full adder `FA{i}` adds bit `i` of each operand; its carry out drives the
/// carry in of `FA{i+1}`. Ports: `A{i}`, `B{i}` in; `S{i}`, `Cout` out.
#[derive(Debug, Clone)]
pub struct RippleAdder {
    block: LogicBlock,
    width: usize,
}

impl RippleAdder {
    /// Build a `width`-bit adder.
    ///
    /// # Errors
    ///
    /// [`Error::WidthMismatch`] unless `1 <= width < 64`, so that the sum
    /// with carry fits a `u64`.
    pub fn new(uid: &str, width: usize) -> Result<Self, Error> {
        if width == 0 || width >= MAX_WIDTH {
            return Err(Error::WidthMismatch {
                expected: MAX_WIDTH - 1,
                found: width,
            });
        }

        let children = (0..width)
            .map(|i| full_adder(&format!("FA{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        let block = LogicBlock::new(uid, children, |b| {
            for i in 0..width {
                b.extend(&format!("FA{i}::A"), &format!("A{i}"))?;
                b.extend(&format!("FA{i}::B"), &format!("B{i}"))?;
                b.extend(&format!("FA{i}::S"), &format!("S{i}"))?;
            }
            for i in 1..width {
                b.connect(&format!("FA{}::Cout", i - 1), &format!("FA{i}::Cin"))?;
            }
            b.extend(&format!("FA{}::Cout", width - 1), "Cout")
        })?;

        debug!(uid, width, vertices = block.vertex_count(), "built ripple adder");
        Ok(Self { block, width })
    }

    /// Operand width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The adder circuit.
    pub fn block(&self) -> &LogicBlock {
        &self.block
    }

    fn apply(&mut self, a: &[bool], b: &[bool]) -> Result<Vec<bool>, Error> {
        write_word(&mut self.block, "A", a)?;
        write_word(&mut self.block, "B", b)?;
        let mut sum = read_word(&self.block, "S", self.width)?;
        sum.push(self.block.get_output("Cout")?);
        Ok(sum)
    }

    /// Add two operands; the result includes the carry out.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if an operand does not fit the width.
    pub fn add(&mut self, a: u64, b: u64) -> Result<u64, Error> {
        let a = bits::to_bits(a, self.width)?;
        let b = bits::to_bits(b, self.width)?;
        bits::bits_to_int(&self.apply(&a, &b)?)
    }

    /// Add two MSB-first binary strings of exactly `width` digits.
    ///
    /// Returns `width + 1` digits, carry first.
    ///
    /// # Errors
    ///
    /// [`Error::WidthMismatch`] or [`Error::InvalidDigit`] for bad operands.
    pub fn add_str(&mut self, a: &str, b: &str) -> Result<String, Error> {
        let a = bits::parse_bits(a, self.width)?;
        let b = bits::parse_bits(b, self.width)?;
        Ok(bits::format_bits(&self.apply(&a, &b)?))
    }
}
