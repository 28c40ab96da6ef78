//! Asynchronous ripple counters and frequency dividers.

use gatesim_core::LogicBlock;
use tracing::{debug, trace};

use crate::bits::{self, read_word, MAX_WIDTH};
use crate::error::Error;
use crate::latch::d_flip_flop;

/// Chain of toggling D flip-flops `F0` .. `F{stages-1}`.
///
/// Each flip-flop feeds `!Q` back into `D`, so it toggles on every rising
/// edge of its clock; the clock of `F{i+1}` is `F{i}::Q`.
fn toggle_chain(uid: &str, stages: usize) -> Result<LogicBlock, Error> {
    let flops = (0..stages)
        .map(|i| d_flip_flop(&format!("F{i}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LogicBlock::new(uid, flops, |b| {
        for i in 0..stages {
            b.connect(&format!("F{i}::!Q"), &format!("F{i}::D"))?;
            if i + 1 < stages {
                b.connect(&format!("F{i}::Q"), &format!("F{}::CLK", i + 1))?;
            }
        }
        b.extend("F0::CLK", "CLK")?;
        for i in 0..stages {
            b.extend(&format!("F{i}::Q"), &format!("Q{i}"))?;
        }
        Ok(())
    })?)
}

fn check_stages(stages: usize) -> Result<(), Error> {
    if stages == 0 || stages > MAX_WIDTH {
        return Err(Error::WidthMismatch {
            expected: MAX_WIDTH,
            found: stages,
        });
    }
    Ok(())
}

/// N-bit asynchronous ripple counter.
///
/// Ports: `CLK` in; `Q{i}` out, LSB first. Each stage toggles when the
/// previous stage's `Q` rises, so the count steps down by one per clock
/// pulse modulo `2^N`: 0, `2^N - 1`, ..., 1, 0.
#[derive(Debug, Clone)]
pub struct RippleCounter {
    block: LogicBlock,
    width: usize,
}

impl RippleCounter {
    /// Build a `width`-bit counter, starting at 0.
    ///
    /// # Errors
    ///
    /// [`Error::WidthMismatch`] unless `1 <= width <= 64`.
    pub fn new(uid: &str, width: usize) -> Result<Self, Error> {
        check_stages(width)?;
        let block = toggle_chain(uid, width)?;
        debug!(uid, width, vertices = block.vertex_count(), "built ripple counter");
        Ok(Self { block, width })
    }

    /// Width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The counter circuit.
    pub fn block(&self) -> &LogicBlock {
        &self.block
    }

    /// One full clock cycle: `CLK` rises then falls.
    ///
    /// # Errors
    ///
    /// Only circuit errors from the core.
    pub fn pulse(&mut self) -> Result<(), Error> {
        let stats = self.block.set_inputs([("CLK", true), ("CLK", false)])?;
        trace!(visits = stats.visits, changed = stats.changed, "clock pulse");
        Ok(())
    }

    /// Current count.
    ///
    /// # Errors
    ///
    /// Only circuit errors from the core.
    pub fn value(&self) -> Result<u64, Error> {
        bits::bits_to_int(&read_word(&self.block, "Q", self.width)?)
    }
}

/// Divide a clock by `2^stages`.
///
/// Ports: `Fin` in; `Fout` out. `Fout` completes one period for every
/// `2^stages` periods of `Fin`.
///
/// # Errors
///
/// [`Error::WidthMismatch`] unless `1 <= stages <= 64`.
pub fn frequency_divider(uid: &str, stages: usize) -> Result<LogicBlock, Error> {
    check_stages(stages)?;
    let chain = toggle_chain("chain", stages)?;
    Ok(LogicBlock::new(uid, [chain], |b| {
        b.extend("chain::CLK", "Fin")?;
        b.extend(&format!("chain::Q{}", stages - 1), "Fout")
    })?)
}
