//! Reusable composite circuits.
//!
//! A [`LogicBlock`] wraps the merge → configure → finish sequence so library
//! circuits can be written as one constructor call and then nested inside
//! other blocks.

use crate::builder::CircuitBuilder;
use crate::circuit::LogicCircuit;
use crate::error::CircuitError;
use crate::eval::Propagation;
use crate::limits::Limits;

/// A sealed circuit built from child blocks and a wiring closure.
#[derive(Debug, Clone)]
pub struct LogicBlock {
    circuit: LogicCircuit,
}

impl LogicBlock {
    /// Build block `uid` from `children` with default limits.
    ///
    /// `configure` receives a builder that already holds every child and
    /// adds the block's own elements, wiring and port extensions.
    ///
    /// # Errors
    ///
    /// Any error from merging, from `configure` or from sealing.
    pub fn new<I, F>(uid: impl Into<String>, children: I, configure: F) -> Result<Self, CircuitError>
    where
        I: IntoIterator<Item = LogicBlock>,
        F: FnOnce(&mut CircuitBuilder) -> Result<(), CircuitError>,
    {
        Self::with_limits(uid, Limits::default(), children, configure)
    }

    /// Build block `uid` from `children` with custom limits.
    ///
    /// # Errors
    ///
    /// Any error from merging, from `configure` or from sealing.
    pub fn with_limits<I, F>(
        uid: impl Into<String>,
        limits: Limits,
        children: I,
        configure: F,
    ) -> Result<Self, CircuitError>
    where
        I: IntoIterator<Item = LogicBlock>,
        F: FnOnce(&mut CircuitBuilder) -> Result<(), CircuitError>,
    {
        let children = children.into_iter().map(LogicBlock::into_circuit);
        let mut builder = CircuitBuilder::merge_with_limits(uid, limits, children)?;
        configure(&mut builder)?;
        Ok(Self {
            circuit: builder.finish()?,
        })
    }

    /// Namespace of the block.
    pub fn uid(&self) -> &str {
        self.circuit.uid()
    }

    /// The sealed circuit behind this block.
    pub fn circuit(&self) -> &LogicCircuit {
        &self.circuit
    }

    /// Unwrap the sealed circuit.
    pub fn into_circuit(self) -> LogicCircuit {
        self.circuit
    }

    /// Number of live elements, children included.
    pub fn vertex_count(&self) -> usize {
        self.circuit.vertex_count()
    }

    /// Names of the externally writable inputs.
    pub fn input_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.circuit.input_names()
    }

    /// Names of the readable outputs.
    pub fn output_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.circuit.output_names()
    }

    /// See [`LogicCircuit::set_input`].
    ///
    /// # Errors
    ///
    /// See [`LogicCircuit::set_input`].
    pub fn set_input(&mut self, name: &str, value: bool) -> Result<Propagation, CircuitError> {
        self.circuit.set_input(name, value)
    }

    /// See [`LogicCircuit::set_inputs`].
    ///
    /// # Errors
    ///
    /// See [`LogicCircuit::set_inputs`].
    pub fn set_inputs<'a, I>(&mut self, assignments: I) -> Result<Propagation, CircuitError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        self.circuit.set_inputs(assignments)
    }

    /// See [`LogicCircuit::get_input`].
    ///
    /// # Errors
    ///
    /// See [`LogicCircuit::get_input`].
    pub fn get_input(&self, name: &str) -> Result<bool, CircuitError> {
        self.circuit.get_input(name)
    }

    /// See [`LogicCircuit::get_output`].
    ///
    /// # Errors
    ///
    /// See [`LogicCircuit::get_output`].
    pub fn get_output(&self, name: &str) -> Result<bool, CircuitError> {
        self.circuit.get_output(name)
    }
}

impl From<LogicBlock> for LogicCircuit {
    fn from(block: LogicBlock) -> Self {
        block.circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverter(uid: &str) -> LogicBlock {
        LogicBlock::new(uid, [], |b| {
            b.add_input("A", false)?;
            b.add_output("X", true)?;
            b.add_not_gate("NOT")?;
            b.connect("A", "NOT")?;
            b.connect("NOT", "X")
        })
        .unwrap()
    }

    #[test]
    fn test_leaf_block() {
        let mut block = inverter("inv");
        assert_eq!(block.uid(), "inv");
        assert!(block.get_output("X").unwrap());
        block.set_input("A", true).unwrap();
        assert!(!block.get_output("X").unwrap());
    }

    #[test]
    fn test_nested_blocks_chain() {
        // Two inverters in series: a buffer.
        let mut block = LogicBlock::new("buf", [inverter("I0"), inverter("I1")], |b| {
            b.connect("I0::X", "I1::A")?;
            b.extend("I0::A", "A")?;
            b.extend("I1::X", "X")
        })
        .unwrap();

        assert_eq!(block.vertex_count(), 6);
        assert_eq!(block.input_names().collect::<Vec<_>>(), vec!["I0::A", "A"]);
        assert!(!block.get_output("X").unwrap());
        block.set_input("A", true).unwrap();
        assert!(block.get_output("X").unwrap());
        assert!(block.get_output("I0::X").is_ok());
    }

    #[test]
    fn test_configure_error_is_returned() {
        let result = LogicBlock::new("bad", [], |b| {
            b.add_input("A", false)?;
            b.connect("A", "NOWHERE")
        });
        assert!(result.is_err());
    }
}
