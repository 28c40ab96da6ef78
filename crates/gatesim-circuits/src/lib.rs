//! A library of standard digital circuits built on `gatesim-core`.
//!
//! Every circuit here is a [`LogicBlock`](gatesim_core::LogicBlock) or a thin
//! wrapper around one, so it can be simulated directly or nested inside a
//! larger block under its own namespace.
//!
//! | Module | Circuits |
//! |--------|----------|
//! | [`adder`] | half adder, full adder, N-bit ripple-carry adder |
//! | [`latch`] | SR, gated SR, D and JK latches, edge-triggered D flip-flop |
//! | [`decoder`] | N-to-2^N decoder with chip selects |
//! | [`register`] | N-bit parallel-in parallel-out register |
//! | [`counter`] | ripple counter and frequency divider |
//!
//! Multi-bit ports are numbered least-significant bit first (`A0`, `A1`,
//! ...). The [`bits`] helpers convert between integers, binary strings and
//! bit vectors in that order.
//!
//! ```
//! use gatesim_circuits::RippleAdder;
//!
//! let mut adder = RippleAdder::new("add4", 4).unwrap();
//! assert_eq!(adder.add(9, 8).unwrap(), 17);
//! assert_eq!(adder.add_str("0110", "0111").unwrap(), "01101");
//! ```

pub mod adder;
pub mod bits;
pub mod counter;
pub mod decoder;
pub mod error;
pub mod latch;
pub mod register;

pub use adder::{full_adder, half_adder, RippleAdder};
pub use counter::{frequency_divider, RippleCounter};
pub use decoder::{Active, Decoder, MAX_ADDRESS_BITS};
pub use error::Error;
pub use latch::{d_flip_flop, d_latch, gated_sr_latch, jk_latch, sr_latch};
pub use register::Register;
