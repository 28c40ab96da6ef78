//! Resource limits for circuit construction and propagation.

/// Resource limits for a circuit.
///
/// Vertex and arity ceilings are checked while a circuit is built. The visit
/// ceiling caps a single propagation walk, so a topology that oscillates
/// instead of converging fails with an error rather than spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of vertices in the circuit graph.
    pub max_vertices: usize,
    /// Maximum number of operands of a single gate.
    pub max_arity: usize,
    /// Maximum vertex visits in one propagation walk.
    pub max_visits: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vertices: 1 << 16,
            max_arity: 64,
            max_visits: 1 << 20,
        }
    }
}

impl Limits {
    /// Create limits with custom values.
    pub fn new(max_vertices: usize, max_arity: usize, max_visits: usize) -> Self {
        Self {
            max_vertices,
            max_arity,
            max_visits,
        }
    }

    /// Permissive limits for large generated circuits.
    pub fn permissive() -> Self {
        Self {
            max_vertices: 1 << 24,
            max_arity: 1024,
            max_visits: 1 << 28,
        }
    }

    /// Strict limits for small hand-built circuits.
    pub fn strict() -> Self {
        Self {
            max_vertices: 4096,
            max_arity: 16,
            max_visits: 1 << 14,
        }
    }
}
