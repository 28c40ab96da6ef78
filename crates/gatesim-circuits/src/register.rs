//! Parallel-in parallel-out register.

use gatesim_core::LogicBlock;
use tracing::debug;

use crate::bits::{self, read_word, write_word, MAX_WIDTH};
use crate::error::Error;
use crate::latch::d_latch;

/// An N-bit register of D latches sharing one enable and one clear line.
///
/// Ports: data `D{i}`, `EN`, `!CLR` (active low) in; `Q{i}` out. Buffers
/// fan `EN` and `!CLR` out to every latch.
#[derive(Debug, Clone)]
pub struct Register {
    block: LogicBlock,
    width: usize,
}

impl Register {
    /// Build a `width`-bit register, initially holding 0.
    ///
    /// # Errors
    ///
    /// [`Error::WidthMismatch`] unless `1 <= width <= 64`.
    pub fn new(uid: &str, width: usize) -> Result<Self, Error> {
        if width == 0 || width > MAX_WIDTH {
            return Err(Error::WidthMismatch {
                expected: MAX_WIDTH,
                found: width,
            });
        }

        let latches = (0..width)
            .map(|i| d_latch(&format!("DL{i}")))
            .collect::<Result<Vec<_>, _>>()?;
        let block = LogicBlock::new(uid, latches, |b| {
            b.add_input("EN", false)?;
            b.add_buffer_gate("ENSPLIT")?;
            b.connect("EN", "ENSPLIT")?;
            b.add_input("!CLR", true)?;
            b.add_buffer_gate("!CLRSPLIT")?;
            b.connect("!CLR", "!CLRSPLIT")?;

            for i in 0..width {
                b.extend(&format!("DL{i}::D"), &format!("D{i}"))?;
                b.extend(&format!("DL{i}::Q"), &format!("Q{i}"))?;
                b.connect("ENSPLIT", &format!("DL{i}::EN"))?;
                b.connect("!CLRSPLIT", &format!("DL{i}::!CLR"))?;
            }
            Ok(())
        })?;

        debug!(uid, width, vertices = block.vertex_count(), "built register");
        Ok(Self { block, width })
    }

    /// Width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The register circuit.
    pub fn block(&self) -> &LogicBlock {
        &self.block
    }

    /// Load `value`: present it on the data lines and pulse `EN`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if the value does not fit.
    pub fn write(&mut self, value: u64) -> Result<(), Error> {
        let data = bits::to_bits(value, self.width)?;
        write_word(&mut self.block, "D", &data)?;
        self.block.set_inputs([("EN", true), ("EN", false)])?;
        Ok(())
    }

    /// Current stored value.
    ///
    /// # Errors
    ///
    /// Only circuit errors from the core.
    pub fn read(&self) -> Result<u64, Error> {
        bits::bits_to_int(&read_word(&self.block, "Q", self.width)?)
    }

    /// Reset every bit by pulsing `!CLR` low.
    ///
    /// # Errors
    ///
    /// Only circuit errors from the core.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.block.set_inputs([("!CLR", false), ("!CLR", true)])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_clear() {
        let mut register = Register::new("reg", 4).unwrap();
        assert_eq!(register.read().unwrap(), 0);

        register.write(0b1010).unwrap();
        assert_eq!(register.read().unwrap(), 0b1010);
        register.write(0b0101).unwrap();
        assert_eq!(register.read().unwrap(), 0b0101);
        register.clear().unwrap();
        assert_eq!(register.read().unwrap(), 0);
        register.write(0b1111).unwrap();
        assert_eq!(register.read().unwrap(), 0b1111);
    }

    #[test]
    fn test_data_lines_are_ignored_until_enabled() {
        let mut register = Register::new("reg", 2).unwrap();
        register.write(0b01).unwrap();
        register.block.set_inputs([("D0", false), ("D1", true)]).unwrap();
        assert_eq!(register.read().unwrap(), 0b01);
    }

    #[test]
    fn test_write_out_of_range() {
        let mut register = Register::new("reg", 3).unwrap();
        assert_eq!(
            register.write(8),
            Err(Error::OutOfRange { value: 8, width: 3 })
        );
        assert!(Register::new("reg", 0).is_err());
    }
}
