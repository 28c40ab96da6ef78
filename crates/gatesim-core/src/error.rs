//! Error types for graph manipulation and circuit construction/evaluation.

use thiserror::Error;

use crate::element::ElementKind;

/// Errors raised by the directed property graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A vertex with this fully-qualified name already exists.
    #[error("vertex {0} already exists")]
    DuplicateVertex(String),

    /// No vertex matches the (possibly partial) name.
    #[error("vertex {0} not found")]
    VertexNotFound(String),

    /// The edge is missing from the outward or inward adjacency.
    #[error("edge {init} -> {term} not found")]
    EdgeNotFound {
        /// Initial vertex of the edge.
        init: String,
        /// Terminal vertex of the edge.
        term: String,
    },

    /// A partial name matches more than one vertex.
    #[error("reference {query} is ambiguous, matches: {}", .matches.join(", "))]
    AmbiguousReference {
        /// The name that was looked up.
        query: String,
        /// Every fully-qualified name it matched.
        matches: Vec<String>,
    },
}

/// Errors raised while building or driving a logic circuit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CircuitError {
    /// Underlying graph failure (missing, duplicate or ambiguous vertex).
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No input or output port has this name.
    #[error("port {0} not found")]
    PortNotFound(String),

    /// The pair of element kinds cannot be wired in this direction.
    #[error("cannot connect {from_kind} {from} to {to_kind} {to}")]
    IllegalConnection {
        /// Driving element.
        from: String,
        /// Kind of the driving element.
        from_kind: ElementKind,
        /// Driven element.
        to: String,
        /// Kind of the driven element.
        to_kind: ElementKind,
    },

    /// An element has (or would have) a driver count different from its arity.
    #[error("{element} expects {expected} driver(s), found {found}")]
    ArityMismatch {
        /// The element at fault.
        element: String,
        /// Declared arity.
        expected: usize,
        /// Number of driving edges.
        found: usize,
    },

    /// The same two elements were connected twice.
    #[error("{from} is already connected to {to}")]
    DuplicateConnection {
        /// Driving element.
        from: String,
        /// Driven element.
        to: String,
    },

    /// A port with this name is already registered.
    #[error("port {0} already exists")]
    DuplicatePort(String),

    /// The element cannot be published as an external port.
    #[error("{0} is not an externally drivable port")]
    NotAPort(String),

    /// Maximum vertex count exceeded.
    #[error("maximum vertices exceeded ({0})")]
    MaxVerticesExceeded(usize),

    /// Maximum gate arity exceeded.
    #[error("maximum arity exceeded ({0})")]
    MaxArityExceeded(usize),

    /// A propagation walk did not settle within the visit limit.
    #[error("propagation from {port} did not settle after {visits} visits")]
    Unstable {
        /// The port whose write started the walk.
        port: String,
        /// Visits performed before the walk was aborted.
        visits: usize,
    },
}
