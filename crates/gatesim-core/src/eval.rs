//! Signal propagation for logic circuits.
//!
//! Writing a value to an element starts a depth-first walk over its fan-out.
//! Each visited element recomputes its value from its drivers; the walk only
//! continues past elements whose value changed. Feedback loops therefore
//! stop as soon as a pass over the loop leaves every value unchanged.

use std::ops::AddAssign;

use tracing::{trace, warn};

use crate::element::CircuitElement;
use crate::error::CircuitError;
use crate::graph::{Graph, VertexId, Visit};
use crate::limits::Limits;

/// Summary of one or more propagation walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Propagation {
    /// Vertices entered by the walk, including the start vertex.
    pub visits: usize,
    /// Vertices whose cached value changed.
    pub changed: usize,
}

impl AddAssign for Propagation {
    fn add_assign(&mut self, other: Self) {
        self.visits += other.visits;
        self.changed += other.changed;
    }
}

/// Update `start` and propagate the result through its fan-out.
///
/// With `Some(value)` the start vertex is evaluated with `value` as its only
/// operand, so the walk is seeded by the new value rather than a stale
/// cache. With `None` it is re-evaluated from its drivers. Either way the
/// start vertex always descends. Every other vertex is evaluated from its
/// drivers' cached values in inward order and prunes the walk when its value
/// is unchanged.
///
/// # Errors
///
/// Returns [`CircuitError::Unstable`] if the walk exceeds
/// [`Limits::max_visits`].
pub(crate) fn propagate(
    graph: &mut Graph<CircuitElement>,
    start: VertexId,
    seed: Option<bool>,
    limits: &Limits,
) -> Result<Propagation, CircuitError> {
    let mut stats = Propagation::default();

    graph.dfs(start, |graph, v| {
        stats.visits += 1;
        if stats.visits > limits.max_visits {
            let port = graph.name(start).map(ToString::to_string).unwrap_or_default();
            warn!(%port, visits = stats.visits, "propagation did not settle");
            return Err(CircuitError::Unstable {
                port,
                visits: stats.visits,
            });
        }

        let operands: Vec<bool> = match seed {
            Some(value) if v == start => vec![value],
            _ => graph
                .inward(v)
                .iter()
                .filter_map(|&u| graph.vertex(u))
                .map(CircuitElement::value)
                .collect(),
        };

        let Some(element) = graph.vertex_mut(v) else {
            return Ok(Visit::Prune);
        };

        let next = element.compute(&operands);
        let previous = element.value();
        if next != previous {
            element.set_value(next);
            stats.changed += 1;
        }

        trace!(vertex = v.index(), previous, next, "visit");

        if v == start || next != previous {
            Ok(Visit::Descend)
        } else {
            Ok(Visit::Prune)
        }
    })?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{GateKind, Transfer};

    /// in -> NOT -> out
    fn inverter() -> (Graph<CircuitElement>, VertexId, VertexId) {
        let mut graph = Graph::new("inv");
        let input = graph.add_vertex("A", CircuitElement::input(false)).unwrap();
        let not = graph
            .add_vertex("NOT", CircuitElement::gate(1, Transfer::Gate(GateKind::Not)))
            .unwrap();
        let output = graph.add_vertex("X", CircuitElement::output(false)).unwrap();
        graph.add_edge(input, not).unwrap();
        graph.add_edge(not, output).unwrap();
        (graph, input, output)
    }

    #[test]
    fn test_propagates_change() {
        let (mut graph, input, output) = inverter();
        let stats = propagate(&mut graph, input, Some(false), &Limits::default()).unwrap();
        assert!(graph.vertex(output).unwrap().value());
        assert_eq!(stats, Propagation { visits: 3, changed: 2 });

        propagate(&mut graph, input, Some(true), &Limits::default()).unwrap();
        assert!(!graph.vertex(output).unwrap().value());
    }

    #[test]
    fn test_prunes_unchanged() {
        let (mut graph, input, _) = inverter();
        propagate(&mut graph, input, Some(false), &Limits::default()).unwrap();
        // Same value again: NOT recomputes true and stops there.
        let stats = propagate(&mut graph, input, Some(false), &Limits::default()).unwrap();
        assert_eq!(stats, Propagation { visits: 2, changed: 0 });
    }

    #[test]
    fn test_visit_limit_aborts_walk() {
        // a -> n1 -> n2 -> n1, with n1 = XOR(a, n2)
        let mut graph = Graph::new("ring");
        let a = graph.add_vertex("A", CircuitElement::input(false)).unwrap();
        let n1 = graph
            .add_vertex("N1", CircuitElement::gate(2, Transfer::Gate(GateKind::Xor)))
            .unwrap();
        let n2 = graph
            .add_vertex("N2", CircuitElement::gate(1, Transfer::Gate(GateKind::Buffer)))
            .unwrap();
        graph.add_edge(a, n1).unwrap();
        graph.add_edge(n1, n2).unwrap();
        graph.add_edge(n2, n1).unwrap();

        let limits = Limits::new(16, 4, 2);
        let err = propagate(&mut graph, a, Some(true), &limits).unwrap_err();
        assert_eq!(
            err,
            CircuitError::Unstable {
                port: "ring::A".into(),
                visits: 3,
            }
        );
    }

    #[test]
    fn test_reevaluate_from_drivers() {
        let (mut graph, input, output) = inverter();
        // NOT starts at its default false, inconsistent with A = false.
        let not = graph.resolve("NOT").unwrap();
        let stats = propagate(&mut graph, not, None, &Limits::default()).unwrap();
        assert!(graph.vertex(not).unwrap().value());
        assert!(graph.vertex(output).unwrap().value());
        assert_eq!(stats, Propagation { visits: 2, changed: 2 });
        assert!(!graph.vertex(input).unwrap().value());
    }

    #[test]
    fn test_propagation_accumulates() {
        let mut total = Propagation::default();
        total += Propagation { visits: 3, changed: 1 };
        total += Propagation { visits: 2, changed: 2 };
        assert_eq!(total, Propagation { visits: 5, changed: 3 });
    }
}
