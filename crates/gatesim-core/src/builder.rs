//! Construction phase of a logic circuit.
//!
//! A [`CircuitBuilder`] collects elements, wiring and port declarations and
//! enforces the structural rules as they arrive:
//! - element names are unique within the circuit
//! - connections respect the legal direction between element kinds
//! - no element gets more drivers than its arity
//! - resource limits (vertex count, gate arity)
//!
//! [`CircuitBuilder::finish`] checks that every gate is fully driven, seals
//! the builder into a [`LogicCircuit`] and settles its initial state.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::circuit::{LogicCircuit, Ports};
use crate::element::{CircuitElement, ElementKind, GateKind, Transfer};
use crate::error::{CircuitError, GraphError};
use crate::graph::{Graph, VertexId};
use crate::limits::Limits;
use crate::path::SEPARATOR;

/// Mutable, not-yet-evaluated logic circuit.
#[derive(Debug)]
pub struct CircuitBuilder {
    graph: Graph<CircuitElement>,
    inputs: IndexMap<String, VertexId>,
    outputs: IndexMap<String, VertexId>,
    /// Port registries of merged children, keyed by child uid.
    sub_circuits: IndexMap<String, Ports>,
    limits: Limits,
}

impl CircuitBuilder {
    /// Create an empty circuit named `uid` with default limits.
    pub fn new(uid: impl Into<String>) -> Self {
        Self::with_limits(uid, Limits::default())
    }

    /// Create an empty circuit named `uid` with custom limits.
    pub fn with_limits(uid: impl Into<String>, limits: Limits) -> Self {
        Self {
            graph: Graph::new(uid),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            sub_circuits: IndexMap::new(),
            limits,
        }
    }

    /// Start a circuit `uid` from the union of sealed `circuits`.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::merge_with_limits`].
    pub fn merge<I>(uid: impl Into<String>, circuits: I) -> Result<Self, CircuitError>
    where
        I: IntoIterator<Item = LogicCircuit>,
    {
        Self::merge_with_limits(uid, Limits::default(), circuits)
    }

    /// Start a circuit `uid` from the union of sealed `circuits`.
    ///
    /// Every child vertex moves under `uid`, every child port `p` of child
    /// `c` is registered as `c::p`, and each child's registries are kept
    /// under its uid so later wiring can address `c::p` across the former
    /// boundary.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateVertex`] if two children share a uid
    /// - [`CircuitError::MaxVerticesExceeded`] if the union is too large
    pub fn merge_with_limits<I>(
        uid: impl Into<String>,
        limits: Limits,
        circuits: I,
    ) -> Result<Self, CircuitError>
    where
        I: IntoIterator<Item = LogicCircuit>,
    {
        let circuits: Vec<LogicCircuit> = circuits.into_iter().collect();
        let graph = Graph::merge(uid, circuits.iter().map(LogicCircuit::graph))?;
        if graph.vertex_count() > limits.max_vertices {
            return Err(CircuitError::MaxVerticesExceeded(limits.max_vertices));
        }

        let mut builder = Self {
            graph,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            sub_circuits: IndexMap::new(),
            limits,
        };

        let mut offset = 0;
        for circuit in &circuits {
            let ports = circuit.ports().shifted(offset);
            for (name, id) in ports.inputs() {
                builder.inputs.insert(qualify(circuit.uid(), name), id);
            }
            for (name, id) in ports.outputs() {
                builder.outputs.insert(qualify(circuit.uid(), name), id);
            }
            builder.sub_circuits.insert(circuit.uid().to_owned(), ports);
            offset += circuit.graph().slot_count();
        }

        debug!(
            uid = builder.uid(),
            children = circuits.len(),
            vertices = builder.graph.vertex_count(),
            "merged circuits"
        );
        Ok(builder)
    }

    /// Namespace of the circuit under construction.
    pub fn uid(&self) -> &str {
        self.graph.uid()
    }

    /// Limits applied to this circuit.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of elements added or merged so far.
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    fn add_element(&mut self, name: &str, element: CircuitElement) -> Result<VertexId, CircuitError> {
        if self.graph.vertex_count() >= self.limits.max_vertices {
            return Err(CircuitError::MaxVerticesExceeded(self.limits.max_vertices));
        }
        Ok(self.graph.add_vertex(name, element)?)
    }

    fn ensure_port_free(&self, name: &str) -> Result<(), CircuitError> {
        if self.inputs.contains_key(name) || self.outputs.contains_key(name) {
            return Err(CircuitError::DuplicatePort(name.to_owned()));
        }
        Ok(())
    }

    /// Declare an input port holding `initial`.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the vertex limit is reached.
    pub fn add_input(&mut self, name: &str, initial: bool) -> Result<(), CircuitError> {
        self.ensure_port_free(name)?;
        let id = self.add_element(name, CircuitElement::input(initial))?;
        self.inputs.insert(name.to_owned(), id);
        Ok(())
    }

    /// Declare an output port with an initial cached value.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the vertex limit is reached.
    pub fn add_output(&mut self, name: &str, initial: bool) -> Result<(), CircuitError> {
        self.ensure_port_free(name)?;
        let id = self.add_element(name, CircuitElement::output(initial))?;
        self.outputs.insert(name.to_owned(), id);
        Ok(())
    }

    /// Add a gate computing `transfer` over exactly `arity` drivers.
    ///
    /// # Errors
    ///
    /// - [`CircuitError::ArityMismatch`] for a zero arity, or a unary family
    ///   with an arity other than 1
    /// - [`CircuitError::MaxArityExceeded`] above [`Limits::max_arity`]
    /// - [`GraphError::DuplicateVertex`] if the name is taken
    pub fn add_gate(&mut self, name: &str, arity: usize, transfer: Transfer) -> Result<(), CircuitError> {
        let unary = matches!(transfer, Transfer::Identity)
            || matches!(transfer, Transfer::Gate(kind) if kind.is_unary());
        if arity == 0 || (unary && arity != 1) {
            return Err(CircuitError::ArityMismatch {
                element: qualify(self.uid(), name),
                expected: 1,
                found: arity,
            });
        }
        if arity > self.limits.max_arity {
            return Err(CircuitError::MaxArityExceeded(self.limits.max_arity));
        }
        self.add_element(name, CircuitElement::gate(arity, transfer))?;
        Ok(())
    }

    /// Add a 1-input identity gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_buffer_gate(&mut self, name: &str) -> Result<(), CircuitError> {
        self.add_gate(name, 1, Transfer::Gate(GateKind::Buffer))
    }

    /// Add an inverter.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_not_gate(&mut self, name: &str) -> Result<(), CircuitError> {
        self.add_gate(name, 1, Transfer::Gate(GateKind::Not))
    }

    /// Add an AND gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_and_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::And))
    }

    /// Add an OR gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_or_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::Or))
    }

    /// Add an XOR gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_xor_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::Xor))
    }

    /// Add a NAND gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_nand_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::Nand))
    }

    /// Add a NOR gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_nor_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::Nor))
    }

    /// Add an XNOR gate.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::add_gate`].
    pub fn add_xnor_gate(&mut self, name: &str, arity: usize) -> Result<(), CircuitError> {
        self.add_gate(name, arity, Transfer::Gate(GateKind::Xnor))
    }

    /// Resolve a port name, `child::port` reference or partial vertex name.
    fn resolve(&self, reference: &str) -> Result<VertexId, CircuitError> {
        if let Some(&id) = self.inputs.get(reference).or_else(|| self.outputs.get(reference)) {
            return Ok(id);
        }
        if let Some((child, port)) = reference.split_once(SEPARATOR) {
            if let Some(id) = self.sub_circuits.get(child).and_then(|ports| ports.get(port)) {
                return Ok(id);
            }
        }
        Ok(self.graph.resolve(reference)?)
    }

    fn element(&self, id: VertexId) -> Result<&CircuitElement, CircuitError> {
        self.graph
            .vertex(id)
            .ok_or_else(|| GraphError::VertexNotFound(self.name_of(id)).into())
    }

    fn name_of(&self, id: VertexId) -> String {
        self.graph
            .name(id)
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("#{}", id.index()))
    }

    /// Wire `from` to drive `to`.
    ///
    /// Legal directions are input→gate, gate→gate, gate→output,
    /// output→gate (feedback), and output→input or gate→input to drive a
    /// merged child's input from inside the parent. A driven input stops
    /// being an external port.
    ///
    /// # Errors
    ///
    /// - [`GraphError::VertexNotFound`] / [`GraphError::AmbiguousReference`]
    ///   if a reference does not resolve to exactly one element
    /// - [`CircuitError::IllegalConnection`] for any other pair of kinds
    /// - [`CircuitError::DuplicateConnection`] if the edge exists
    /// - [`CircuitError::ArityMismatch`] if `to` is already fully driven
    pub fn connect(&mut self, from: &str, to: &str) -> Result<(), CircuitError> {
        let init = self.resolve(from)?;
        let term = self.resolve(to)?;
        let from_kind = self.element(init)?.kind();
        let (to_kind, to_arity) = {
            let element = self.element(term)?;
            (element.kind(), element.arity())
        };

        use ElementKind::{Gate, Input, Output};
        let legal = matches!(
            (from_kind, to_kind),
            (Input, Gate) | (Gate, Gate) | (Gate, Output) | (Output, Gate) | (Output, Input) | (Gate, Input)
        );
        if !legal {
            return Err(CircuitError::IllegalConnection {
                from: self.name_of(init),
                from_kind,
                to: self.name_of(term),
                to_kind,
            });
        }
        if self.graph.has_edge(init, term) {
            return Err(CircuitError::DuplicateConnection {
                from: self.name_of(init),
                to: self.name_of(term),
            });
        }
        let found = self.graph.inward(term).len();
        if found >= to_arity {
            return Err(CircuitError::ArityMismatch {
                element: self.name_of(term),
                expected: to_arity,
                found: found + 1,
            });
        }

        self.graph.add_edge(init, term)?;
        if to_kind == Input {
            if let Some(element) = self.graph.vertex_mut(term) {
                element.mark_driven();
            }
            self.inputs.retain(|_, id| *id != term);
            for ports in self.sub_circuits.values_mut() {
                ports.remove_input(term);
            }
        }

        trace!(from = %self.name_of(init), to = %self.name_of(term), "connected");
        Ok(())
    }

    /// Publish an input or output, possibly inside a merged child, as the
    /// port `name` of this circuit.
    ///
    /// # Errors
    ///
    /// - [`CircuitError::DuplicatePort`] if `name` is taken
    /// - [`CircuitError::NotAPort`] for gates and driven inputs
    /// - resolution errors as for [`CircuitBuilder::connect`]
    pub fn extend(&mut self, reference: &str, name: &str) -> Result<(), CircuitError> {
        self.ensure_port_free(name)?;
        let id = self.resolve(reference)?;
        let (kind, external) = {
            let element = self.element(id)?;
            (element.kind(), element.is_external())
        };
        match kind {
            ElementKind::Input if external => {
                self.inputs.insert(name.to_owned(), id);
            }
            ElementKind::Output => {
                self.outputs.insert(name.to_owned(), id);
            }
            _ => return Err(CircuitError::NotAPort(self.name_of(id))),
        }
        Ok(())
    }

    /// Seal the circuit and settle its initial state.
    ///
    /// # Errors
    ///
    /// - [`CircuitError::ArityMismatch`] if a gate is not fully driven
    /// - [`CircuitError::Unstable`] if initial propagation does not settle
    pub fn finish(self) -> Result<LogicCircuit, CircuitError> {
        for id in self.graph.vertex_ids() {
            let element = self.element(id)?;
            let found = self.graph.inward(id).len();
            if element.kind() == ElementKind::Gate && found != element.arity() {
                return Err(CircuitError::ArityMismatch {
                    element: self.name_of(id),
                    expected: element.arity(),
                    found,
                });
            }
        }

        let mut circuit = LogicCircuit::from_parts(
            self.graph,
            Ports::new(self.inputs, self.outputs),
            self.sub_circuits,
            self.limits,
        );
        let settled = circuit.initialize()?;
        debug!(
            uid = circuit.uid(),
            vertices = circuit.vertex_count(),
            visits = settled.visits,
            "sealed circuit"
        );
        Ok(circuit)
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    format!("{namespace}{SEPARATOR}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_circuit() -> LogicCircuit {
        let mut builder = CircuitBuilder::new("and");
        builder.add_input("A", false).unwrap();
        builder.add_input("B", false).unwrap();
        builder.add_output("X", false).unwrap();
        builder.add_and_gate("AND", 2).unwrap();
        builder.connect("A", "AND").unwrap();
        builder.connect("B", "AND").unwrap();
        builder.connect("AND", "X").unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_simple_build() {
        let circuit = and_circuit();
        assert_eq!(circuit.uid(), "and");
        assert_eq!(circuit.vertex_count(), 4);
        assert_eq!(circuit.input_names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(circuit.output_names().collect::<Vec<_>>(), vec!["X"]);
    }

    #[test]
    fn test_duplicate_port() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        assert_eq!(
            builder.add_output("A", false),
            Err(CircuitError::DuplicatePort("A".into()))
        );
    }

    #[test]
    fn test_duplicate_vertex() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_not_gate("N").unwrap();
        assert_eq!(
            builder.add_not_gate("N"),
            Err(GraphError::DuplicateVertex("c::N".into()).into())
        );
    }

    #[test]
    fn test_illegal_connection() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        builder.add_output("X", false).unwrap();
        assert_eq!(
            builder.connect("A", "X"),
            Err(CircuitError::IllegalConnection {
                from: "c::A".into(),
                from_kind: ElementKind::Input,
                to: "c::X".into(),
                to_kind: ElementKind::Output,
            })
        );
        // Feedback into an input is legal and turns it into an internal node.
        builder.connect("X", "A").unwrap();
        assert!(builder.resolve("A").is_ok());
    }

    #[test]
    fn test_unknown_vertex() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        assert_eq!(
            builder.connect("A", "MISSING"),
            Err(GraphError::VertexNotFound("MISSING".into()).into())
        );
    }

    #[test]
    fn test_arity_checked_on_connect() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        builder.add_input("B", false).unwrap();
        builder.add_not_gate("N").unwrap();
        builder.connect("A", "N").unwrap();
        assert_eq!(
            builder.connect("B", "N"),
            Err(CircuitError::ArityMismatch {
                element: "c::N".into(),
                expected: 1,
                found: 2,
            })
        );
    }

    #[test]
    fn test_arity_checked_on_finish() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        builder.add_or_gate("OR", 3).unwrap();
        builder.connect("A", "OR").unwrap();
        assert_eq!(
            builder.finish().unwrap_err(),
            CircuitError::ArityMismatch {
                element: "c::OR".into(),
                expected: 3,
                found: 1,
            }
        );
    }

    #[test]
    fn test_invalid_gate_arity() {
        let mut builder = CircuitBuilder::new("c");
        assert!(matches!(
            builder.add_and_gate("AND", 0),
            Err(CircuitError::ArityMismatch { .. })
        ));
        assert!(matches!(
            builder.add_gate("NOT", 2, Transfer::Gate(GateKind::Not)),
            Err(CircuitError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_connection() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_input("A", false).unwrap();
        builder.add_and_gate("AND", 2).unwrap();
        builder.connect("A", "AND").unwrap();
        assert_eq!(
            builder.connect("A", "AND"),
            Err(CircuitError::DuplicateConnection {
                from: "c::A".into(),
                to: "c::AND".into(),
            })
        );
    }

    #[test]
    fn test_max_vertices() {
        let mut builder = CircuitBuilder::with_limits("c", Limits::new(2, 4, 64));
        builder.add_input("A", false).unwrap();
        builder.add_input("B", false).unwrap();
        assert_eq!(
            builder.add_input("C", false),
            Err(CircuitError::MaxVerticesExceeded(2))
        );
    }

    #[test]
    fn test_max_arity() {
        let mut builder = CircuitBuilder::with_limits("c", Limits::strict());
        assert_eq!(
            builder.add_or_gate("OR", 17),
            Err(CircuitError::MaxArityExceeded(16))
        );
    }

    #[test]
    fn test_merge_qualifies_child_ports() {
        let builder = CircuitBuilder::merge("pair", [and_circuit()]).unwrap();
        assert_eq!(builder.vertex_count(), 4);
        assert!(builder.resolve("and::A").is_ok());
        assert_eq!(builder.resolve("and::X"), builder.resolve("pair::and::X"));
    }

    #[test]
    fn test_driven_input_is_no_longer_a_port() {
        let mut merged = CircuitBuilder::merge("outer", [and_circuit()]).unwrap();
        merged.add_input("EN", false).unwrap();
        merged.add_buffer_gate("SPLIT").unwrap();
        merged.connect("EN", "SPLIT").unwrap();
        merged.connect("SPLIT", "and::A").unwrap();

        assert_eq!(
            merged.extend("and::A", "A"),
            Err(CircuitError::NotAPort("outer::and::A".into()))
        );
        let circuit = merged.finish().unwrap();
        assert_eq!(
            circuit.input_names().collect::<Vec<_>>(),
            vec!["and::B", "EN"]
        );
        let child = circuit.sub_circuit("and").unwrap();
        assert_eq!(child.get("A"), None);
        assert!(child.get("X").is_some());
    }

    #[test]
    fn test_extend_rejects_gates() {
        let mut builder = CircuitBuilder::new("c");
        builder.add_not_gate("N").unwrap();
        assert_eq!(
            builder.extend("N", "OUT"),
            Err(CircuitError::NotAPort("c::N".into()))
        );
    }
}
