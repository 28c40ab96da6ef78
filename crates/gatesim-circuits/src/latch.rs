//! Latches and flip-flops built from cross-coupled NAND gates.
//!
//! Every element here settles after visiting the fan-out of the written input
//! once, plus at most one revisit per element on its feedback loop, for all
//! input combinations it defines. Forbidden combinations (`!S = !R = 0` on
//! the SR latch, `J = K = 1` with the clock high on the JK latch) still
//! terminate but leave the outputs in an unspecified state.

use gatesim_core::LogicBlock;

use crate::error::Error;

/// Active-low SR latch.
///
/// Ports: `!S`, `!R` in (idle high); `Q`, `!Q` out. Starts set (`Q = 1`).
///
/// # Errors
///
/// Only construction errors from the core.
pub fn sr_latch(uid: &str) -> Result<LogicBlock, Error> {
    Ok(LogicBlock::new(uid, [], |b| {
        b.add_input("!R", true)?;
        b.add_input("!S", true)?;
        b.add_output("Q", true)?;
        b.add_output("!Q", false)?;
        b.add_nand_gate("N(!R)", 2)?;
        b.add_nand_gate("N(!S)", 2)?;
        b.connect("N(!S)", "Q")?;
        b.connect("N(!R)", "!Q")?;
        b.connect("!S", "N(!S)")?;
        b.connect("!Q", "N(!S)")?;
        b.connect("!R", "N(!R)")?;
        b.connect("Q", "N(!R)")
    })?)
}

/// SR latch with an enable stage.
///
/// Ports: `S`, `R`, `EN` in (active high); `Q`, `!Q` out. `S` and `R` only
/// reach the latch while `EN` is high.
///
/// # Errors
///
/// Only construction errors from the core.
pub fn gated_sr_latch(uid: &str) -> Result<LogicBlock, Error> {
    let enable = LogicBlock::new("en", [], |b| {
        b.add_input("S", false)?;
        b.add_input("R", false)?;
        b.add_input("EN", false)?;
        b.add_output("X", true)?;
        b.add_output("Y", true)?;
        b.add_nand_gate("N(S)", 2)?;
        b.add_nand_gate("N(R)", 2)?;
        b.connect("S", "N(S)")?;
        b.connect("EN", "N(S)")?;
        b.connect("R", "N(R)")?;
        b.connect("EN", "N(R)")?;
        b.connect("N(S)", "X")?;
        b.connect("N(R)", "Y")
    })?;

    Ok(LogicBlock::new(uid, [enable, sr_latch("sr")?], |b| {
        b.connect("en::X", "sr::!S")?;
        b.connect("en::Y", "sr::!R")?;
        b.extend("en::S", "S")?;
        b.extend("en::R", "R")?;
        b.extend("en::EN", "EN")?;
        b.extend("sr::Q", "Q")?;
        b.extend("sr::!Q", "!Q")
    })?)
}

/// Gated D latch with asynchronous preset and clear.
///
/// Ports: `D`, `EN` in (active high); `!PRE`, `!CLR` in (active low, idle
/// high); `Q`, `!Q` out. `Q` follows `D` while `EN` is high and holds
/// otherwise. Starts cleared (`Q = 0`).
///
/// # Errors
///
/// Only construction errors from the core.
pub fn d_latch(uid: &str) -> Result<LogicBlock, Error> {
    Ok(LogicBlock::new(uid, [], |b| {
        b.add_input("D", false)?;
        b.add_input("EN", false)?;
        b.add_input("!PRE", true)?;
        b.add_input("!CLR", true)?;
        b.add_output("Q", false)?;
        b.add_output("!Q", true)?;
        b.add_not_gate("NOT(D)")?;
        b.add_nand_gate("NAND(D)", 3)?;
        b.add_nand_gate("NAND(!D)", 3)?;
        b.add_nand_gate("NAND(Q)", 3)?;
        b.add_nand_gate("NAND(!Q)", 3)?;

        // Input stage
        b.connect("D", "NOT(D)")?;
        b.connect("NOT(D)", "NAND(!D)")?;
        b.connect("D", "NAND(D)")?;
        b.connect("EN", "NAND(D)")?;
        b.connect("EN", "NAND(!D)")?;

        // Cross-coupled stage
        b.connect("NAND(D)", "NAND(Q)")?;
        b.connect("NAND(!D)", "NAND(!Q)")?;
        b.connect("Q", "NAND(!Q)")?;
        b.connect("!Q", "NAND(Q)")?;
        b.connect("NAND(Q)", "Q")?;
        b.connect("NAND(!Q)", "!Q")?;

        // Preset and clear override both stages
        b.connect("!PRE", "NAND(Q)")?;
        b.connect("!PRE", "NAND(D)")?;
        b.connect("!CLR", "NAND(!Q)")?;
        b.connect("!CLR", "NAND(!D)")
    })?)
}

/// Level-sensitive JK latch.
///
/// Ports: `J`, `K`, `CLK` in; `Q`, `!Q` out. While `CLK` is high, `J` sets
/// and `K` resets. Starts cleared (`Q = 0`).
///
/// # Errors
///
/// Only construction errors from the core.
pub fn jk_latch(uid: &str) -> Result<LogicBlock, Error> {
    Ok(LogicBlock::new(uid, [], |b| {
        b.add_input("J", false)?;
        b.add_input("K", false)?;
        b.add_input("CLK", false)?;
        b.add_output("Q", false)?;
        b.add_output("!Q", true)?;
        b.add_nand_gate("NAND(Q)", 2)?;
        b.add_nand_gate("NAND(!Q)", 2)?;
        b.add_nand_gate("NAND(J)", 3)?;
        b.add_nand_gate("NAND(K)", 3)?;

        b.connect("J", "NAND(J)")?;
        b.connect("K", "NAND(K)")?;
        b.connect("CLK", "NAND(J)")?;
        b.connect("CLK", "NAND(K)")?;
        b.connect("NAND(J)", "NAND(Q)")?;
        b.connect("NAND(K)", "NAND(!Q)")?;
        b.connect("NAND(Q)", "Q")?;
        b.connect("NAND(!Q)", "!Q")?;
        b.connect("Q", "NAND(!Q)")?;
        b.connect("!Q", "NAND(Q)")?;
        b.connect("Q", "NAND(K)")?;
        b.connect("!Q", "NAND(J)")
    })?)
}

/// Positive-edge-triggered D flip-flop (six NAND gates).
///
/// Ports: `D`, `CLK` in; `Q`, `!Q` out. `Q` takes the value of `D` on each
/// rising edge of `CLK` and holds otherwise. Starts cleared (`Q = 0`).
///
/// # Errors
///
/// Only construction errors from the core.
pub fn d_flip_flop(uid: &str) -> Result<LogicBlock, Error> {
    Ok(LogicBlock::new(uid, [], |b| {
        b.add_input("D", false)?;
        b.add_input("CLK", false)?;
        b.add_output("Q", false)?;
        b.add_output("!Q", true)?;
        b.add_nand_gate("N1", 2)?;
        b.add_nand_gate("N2", 2)?;
        b.add_nand_gate("N3", 3)?;
        b.add_nand_gate("N4", 2)?;
        b.add_nand_gate("N5", 2)?;
        b.add_nand_gate("N6", 2)?;

        // Clock-side latch: N1 = !(N4 & N2), N2 = !(N1 & CLK)
        b.connect("N4", "N1")?;
        b.connect("N2", "N1")?;
        b.connect("N1", "N2")?;
        b.connect("CLK", "N2")?;

        // Data-side latch: N3 = !(N2 & CLK & N4), N4 = !(N3 & D)
        b.connect("N2", "N3")?;
        b.connect("CLK", "N3")?;
        b.connect("N4", "N3")?;
        b.connect("N3", "N4")?;
        b.connect("D", "N4")?;

        // Output latch
        b.connect("N2", "N5")?;
        b.connect("!Q", "N5")?;
        b.connect("N3", "N6")?;
        b.connect("Q", "N6")?;
        b.connect("N5", "Q")?;
        b.connect("N6", "!Q")
    })?)
}
