//! Sealed, evaluable logic circuits.

use indexmap::IndexMap;
use tracing::debug;

use crate::builder::CircuitBuilder;
use crate::element::CircuitElement;
use crate::error::CircuitError;
use crate::eval::{propagate, Propagation};
use crate::graph::{Graph, VertexId};
use crate::limits::Limits;

/// Named input and output ports of a circuit.
#[derive(Debug, Clone, Default)]
pub struct Ports {
    inputs: IndexMap<String, VertexId>,
    outputs: IndexMap<String, VertexId>,
}

impl Ports {
    pub(crate) fn new(inputs: IndexMap<String, VertexId>, outputs: IndexMap<String, VertexId>) -> Self {
        Self { inputs, outputs }
    }

    /// Input ports in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, VertexId)> + '_ {
        self.inputs.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Output ports in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = (&str, VertexId)> + '_ {
        self.outputs.iter().map(|(name, &id)| (name.as_str(), id))
    }

    /// Look up a port by name, inputs first.
    pub fn get(&self, name: &str) -> Option<VertexId> {
        self.inputs.get(name).or_else(|| self.outputs.get(name)).copied()
    }

    /// Forget an input that is now driven from inside the parent.
    pub(crate) fn remove_input(&mut self, id: VertexId) {
        self.inputs.retain(|_, input| *input != id);
    }

    pub(crate) fn shifted(&self, offset: usize) -> Self {
        let shift = |map: &IndexMap<String, VertexId>| {
            map.iter()
                .map(|(name, &id)| (name.clone(), id.shifted(offset)))
                .collect()
        };
        Self {
            inputs: shift(&self.inputs),
            outputs: shift(&self.outputs),
        }
    }
}

/// A sealed logic circuit with settled state.
///
/// Produced by [`CircuitBuilder::finish`]. The topology is frozen; only
/// external inputs can change, and every change propagates synchronously
/// before the call returns.
#[derive(Debug, Clone)]
pub struct LogicCircuit {
    graph: Graph<CircuitElement>,
    ports: Ports,
    sub_circuits: IndexMap<String, Ports>,
    limits: Limits,
}

impl LogicCircuit {
    pub(crate) fn from_parts(
        graph: Graph<CircuitElement>,
        ports: Ports,
        sub_circuits: IndexMap<String, Ports>,
        limits: Limits,
    ) -> Self {
        Self {
            graph,
            ports,
            sub_circuits,
            limits,
        }
    }

    /// Start a new circuit `uid` composed of `circuits`.
    ///
    /// # Errors
    ///
    /// See [`CircuitBuilder::merge`].
    pub fn merge<I>(uid: impl Into<String>, circuits: I) -> Result<CircuitBuilder, CircuitError>
    where
        I: IntoIterator<Item = LogicCircuit>,
    {
        CircuitBuilder::merge(uid, circuits)
    }

    /// Namespace of the circuit.
    pub fn uid(&self) -> &str {
        self.graph.uid()
    }

    /// The underlying element graph.
    pub fn graph(&self) -> &Graph<CircuitElement> {
        &self.graph
    }

    /// The circuit's own port registry.
    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    /// Port registry of the merged child `uid`, as remapped into this circuit.
    pub fn sub_circuit(&self, uid: &str) -> Option<&Ports> {
        self.sub_circuits.get(uid)
    }

    /// Limits applied to this circuit.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Number of live elements.
    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Names of the externally writable inputs.
    pub fn input_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ports.inputs().map(|(name, _)| name)
    }

    /// Names of the readable outputs.
    pub fn output_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.ports.outputs().map(|(name, _)| name)
    }

    fn port_value(&self, registry: &IndexMap<String, VertexId>, name: &str) -> Result<bool, CircuitError> {
        registry
            .get(name)
            .and_then(|&id| self.graph.vertex(id))
            .map(CircuitElement::value)
            .ok_or_else(|| CircuitError::PortNotFound(name.to_owned()))
    }

    /// Current value of input `name`.
    ///
    /// # Errors
    ///
    /// [`CircuitError::PortNotFound`] if no such input exists.
    pub fn get_input(&self, name: &str) -> Result<bool, CircuitError> {
        self.port_value(&self.ports.inputs, name)
    }

    /// Current value of output `name`.
    ///
    /// # Errors
    ///
    /// [`CircuitError::PortNotFound`] if no such output exists.
    pub fn get_output(&self, name: &str) -> Result<bool, CircuitError> {
        self.port_value(&self.ports.outputs, name)
    }

    /// Write `value` to input `name` and propagate until settled.
    ///
    /// # Errors
    ///
    /// - [`CircuitError::PortNotFound`] if no such input exists
    /// - [`CircuitError::Unstable`] if the walk exceeds the visit limit
    pub fn set_input(&mut self, name: &str, value: bool) -> Result<Propagation, CircuitError> {
        let id = *self
            .ports
            .inputs
            .get(name)
            .ok_or_else(|| CircuitError::PortNotFound(name.to_owned()))?;
        let stats = propagate(&mut self.graph, id, Some(value), &self.limits)?;
        debug!(
            uid = self.graph.uid(),
            port = name,
            value,
            visits = stats.visits,
            changed = stats.changed,
            "input set"
        );
        Ok(stats)
    }

    /// Write several inputs in order, propagating after each.
    ///
    /// # Errors
    ///
    /// Stops at the first failing write; earlier writes stay applied.
    pub fn set_inputs<'a, I>(&mut self, assignments: I) -> Result<Propagation, CircuitError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut total = Propagation::default();
        for (name, value) in assignments {
            total += self.set_input(name, value)?;
        }
        Ok(total)
    }

    /// Settle the state of a freshly sealed circuit.
    ///
    /// Every element seeds one walk, in insertion order. External inputs and
    /// undriven outputs seed with their declared value; everything else is
    /// re-evaluated from its drivers, so gates never keep a default value
    /// that disagrees with their operands.
    pub(crate) fn initialize(&mut self) -> Result<Propagation, CircuitError> {
        let ids: Vec<VertexId> = self.graph.vertex_ids().collect();

        let mut total = Propagation::default();
        for id in ids {
            let Some(element) = self.graph.vertex(id) else {
                continue;
            };
            let seed = if element.is_external() || self.graph.inward(id).is_empty() {
                Some(element.value())
            } else {
                None
            };
            total += propagate(&mut self.graph, id, seed, &self.limits)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nand() -> LogicCircuit {
        let mut builder = CircuitBuilder::new("nand");
        builder.add_input("A", true).unwrap();
        builder.add_input("B", true).unwrap();
        builder.add_output("X", false).unwrap();
        builder.add_nand_gate("NAND", 2).unwrap();
        builder.connect("A", "NAND").unwrap();
        builder.connect("B", "NAND").unwrap();
        builder.connect("NAND", "X").unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_initial_state_is_settled() {
        let circuit = nand();
        assert!(circuit.get_input("A").unwrap());
        assert!(!circuit.get_output("X").unwrap());
    }

    #[test]
    fn test_set_input_propagates() {
        let mut circuit = nand();
        let stats = circuit.set_input("A", false).unwrap();
        assert!(circuit.get_output("X").unwrap());
        assert_eq!(stats, Propagation { visits: 3, changed: 3 });
    }

    #[test]
    fn test_set_inputs_accumulates() {
        let mut circuit = nand();
        let stats = circuit.set_inputs([("A", false), ("B", false)]).unwrap();
        assert!(circuit.get_output("X").unwrap());
        // Second write only reaches the gate, which stays true.
        assert_eq!(stats.visits, 3 + 2);
    }

    #[test]
    fn test_unknown_port() {
        let mut circuit = nand();
        assert_eq!(
            circuit.set_input("X", true),
            Err(CircuitError::PortNotFound("X".into()))
        );
        assert_eq!(
            circuit.get_output("A"),
            Err(CircuitError::PortNotFound("A".into()))
        );
    }

    #[test]
    fn test_sub_circuit_ports_are_remapped() {
        let mut builder = LogicCircuit::merge("pair", [nand(), {
            let mut other = CircuitBuilder::new("other");
            other.add_input("A", false).unwrap();
            other.finish().unwrap()
        }])
        .unwrap();
        builder.extend("other::A", "A").unwrap();
        let circuit = builder.finish().unwrap();

        let child = circuit.sub_circuit("other").unwrap();
        assert_eq!(child.get("A"), circuit.graph().resolve("pair::other::A").ok());
        assert_eq!(child.get("A").map(VertexId::index), Some(4));
        assert_eq!(circuit.ports().get("A"), child.get("A"));
        assert!(circuit.sub_circuit("missing").is_none());
    }
}
