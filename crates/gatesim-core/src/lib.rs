//! gatesim: a zero-delay digital logic simulator.
//!
//! # Overview
//!
//! Circuits are directed graphs of inputs, outputs and gates. Writing an
//! input propagates the new value depth-first through its fan-out until
//! every reachable element is consistent again. Key properties:
//!
//! - **Zero delay**: every write settles before the call returns
//! - **Feedback allowed**: latches and flip-flops are plain gate loops
//! - **Hierarchical**: sealed circuits merge into larger ones under a
//!   namespace and stay addressable as `child::port`
//! - **Bounded**: resource [`Limits`] cap construction and propagation
//!
//! # Example
//!
//! ```
//! use gatesim_core::{CircuitBuilder, LogicCircuit};
//!
//! // AND gate
//! let mut and = CircuitBuilder::new("and");
//! and.add_input("A", false).unwrap();
//! and.add_input("B", false).unwrap();
//! and.add_output("X", false).unwrap();
//! and.add_and_gate("AND", 2).unwrap();
//! and.connect("A", "AND").unwrap();
//! and.connect("B", "AND").unwrap();
//! and.connect("AND", "X").unwrap();
//!
//! // Inverter
//! let mut not = CircuitBuilder::new("not");
//! not.add_input("A", false).unwrap();
//! not.add_output("X", true).unwrap();
//! not.add_not_gate("NOT").unwrap();
//! not.connect("A", "NOT").unwrap();
//! not.connect("NOT", "X").unwrap();
//!
//! // NAND = NOT(AND)
//! let mut nand = LogicCircuit::merge("nand", [and.finish().unwrap(), not.finish().unwrap()]).unwrap();
//! nand.connect("and::X", "not::A").unwrap();
//! nand.extend("and::A", "A").unwrap();
//! nand.extend("and::B", "B").unwrap();
//! nand.extend("not::X", "X").unwrap();
//! let mut nand = nand.finish().unwrap();
//!
//! assert_eq!(nand.get_output("X").unwrap(), true);
//! nand.set_inputs([("A", true), ("B", true)]).unwrap();
//! assert_eq!(nand.get_output("X").unwrap(), false);
//! ```
//!
//! # Name resolution
//!
//! Wiring references resolve in order: a port of the circuit under
//! construction, a `child::port` of a merged child, an element of the
//! circuit itself, then any element whose qualified name ends with the
//! reference. A reference matching no element or several elements is an
//! error.

pub mod block;
pub mod builder;
pub mod circuit;
pub mod element;
pub mod error;
pub mod eval;
pub mod graph;
pub mod limits;
pub mod path;

pub use block::LogicBlock;
pub use builder::CircuitBuilder;
pub use circuit::{LogicCircuit, Ports};
pub use element::{CircuitElement, ElementKind, GateKind, Transfer, TransferFn};
pub use error::{CircuitError, GraphError};
pub use eval::Propagation;
pub use graph::{Graph, VertexId, Visit};
pub use limits::Limits;
pub use path::QualifiedName;
