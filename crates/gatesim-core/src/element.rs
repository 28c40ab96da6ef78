//! Circuit elements: the vertex payload of a logic circuit graph.
//!
//! Every element computes one boolean from the ordered values of the
//! elements driving it. Inputs and outputs are 1-operand identities so the
//! evaluator can treat them exactly like gates.

use std::fmt;

/// Role of an element in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Externally written port (or a child port driven from its parent).
    Input,
    /// Externally read port.
    Output,
    /// Combinational logic.
    Gate,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Input => "input",
            ElementKind::Output => "output",
            ElementKind::Gate => "gate",
        })
    }
}

/// Built-in gate families.
///
/// Variadic gates reduce their operands left to right; the inverted
/// families negate that reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// 1-input identity, used to fan one signal out to many child inputs.
    Buffer,
    /// 1-input inverter: ¬A
    Not,
    /// A ∧ B ∧ …
    And,
    /// A ∨ B ∨ …
    Or,
    /// A ⊕ B ⊕ …
    Xor,
    /// ¬(A ∧ B ∧ …)
    Nand,
    /// ¬(A ∨ B ∨ …)
    Nor,
    /// ¬(A ⊕ B ⊕ …)
    Xnor,
}

impl GateKind {
    /// Evaluate the gate over its operands.
    #[inline]
    pub fn eval(self, operands: &[bool]) -> bool {
        let fold = |op: fn(bool, bool) -> bool| operands.iter().copied().reduce(op).unwrap_or(false);
        match self {
            GateKind::Buffer => operands.first().copied().unwrap_or(false),
            GateKind::Not => !operands.first().copied().unwrap_or(false),
            GateKind::And => fold(|a, b| a && b),
            GateKind::Or => fold(|a, b| a || b),
            GateKind::Xor => fold(|a, b| a ^ b),
            GateKind::Nand => !fold(|a, b| a && b),
            GateKind::Nor => !fold(|a, b| a || b),
            GateKind::Xnor => !fold(|a, b| a ^ b),
        }
    }

    /// Whether this family takes exactly one operand.
    pub fn is_unary(self) -> bool {
        matches!(self, GateKind::Buffer | GateKind::Not)
    }
}

/// A pure boolean function over ordered operands.
pub type TransferFn = fn(&[bool]) -> bool;

/// How an element turns its operands into a value.
#[derive(Debug, Clone, Copy)]
pub enum Transfer {
    /// Pass the single operand through (inputs and outputs).
    Identity,
    /// A built-in gate family.
    Gate(GateKind),
    /// A caller-supplied pure function.
    Custom(TransferFn),
}

impl Transfer {
    /// Apply the transfer function.
    #[inline]
    pub fn apply(&self, operands: &[bool]) -> bool {
        match self {
            Transfer::Identity => operands.first().copied().unwrap_or(false),
            Transfer::Gate(kind) => kind.eval(operands),
            Transfer::Custom(f) => f(operands),
        }
    }
}

/// A vertex of a logic circuit.
#[derive(Debug, Clone)]
pub struct CircuitElement {
    kind: ElementKind,
    arity: usize,
    transfer: Transfer,
    value: bool,
    external: bool,
}

impl CircuitElement {
    /// An input port holding `value`.
    pub fn input(value: bool) -> Self {
        Self {
            kind: ElementKind::Input,
            arity: 1,
            transfer: Transfer::Identity,
            value,
            external: true,
        }
    }

    /// An output port with an initial cached value.
    pub fn output(value: bool) -> Self {
        Self {
            kind: ElementKind::Output,
            arity: 1,
            transfer: Transfer::Identity,
            value,
            external: false,
        }
    }

    /// A gate expecting `arity` drivers.
    pub fn gate(arity: usize, transfer: Transfer) -> Self {
        Self {
            kind: ElementKind::Gate,
            arity,
            transfer,
            value: false,
            external: false,
        }
    }

    /// Role of the element.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Number of drivers the element expects.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The element's transfer function.
    pub fn transfer(&self) -> Transfer {
        self.transfer
    }

    /// Last computed (or written) value.
    pub fn value(&self) -> bool {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    /// Whether the value comes from outside rather than from a driver.
    pub fn is_external(&self) -> bool {
        self.external
    }

    pub(crate) fn mark_driven(&mut self) {
        self.external = false;
    }

    /// Evaluate the transfer function.
    pub fn compute(&self, operands: &[bool]) -> bool {
        self.transfer.apply(operands)
    }
}
