//! Error types for the simulation core.

use thiserror::Error;

/// Errors produced by state allocation, gate application, circuit execution
/// and observable evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The requested statevector cannot be allocated.
    #[error("cannot allocate a {qubits}-qubit state: {reason}")]
    Allocation {
        /// Requested number of qubits.
        qubits: u32,
        /// Why the allocation was refused.
        reason: String,
    },

    /// Gate parameters are malformed.
    #[error("invalid gate '{gate}': {reason}")]
    InvalidGate {
        /// Name of the offending gate.
        gate: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A gate references a qubit the state does not have.
    #[error("gate '{gate}' references qubit {qubit} but the state only has {num_qubits} qubits")]
    QubitOutOfRange {
        /// Name of the offending gate.
        gate: &'static str,
        /// The out-of-range qubit index.
        qubit: u32,
        /// Width of the state the gate was applied to.
        num_qubits: u32,
    },

    /// Two objects that must agree on their width do not.
    #[error("dimension mismatch: expected {expected} qubits, got {got}")]
    DimensionMismatch {
        /// Width of the object driving the operation (circuit, observable).
        expected: u32,
        /// Width of the state it was handed.
        got: u32,
    },

    /// Two gates cannot be composed into a single gate.
    #[error("cannot merge gates: {0}")]
    UnsupportedMerge(String),

    /// A Pauli string could not be parsed.
    #[error("cannot parse Pauli string '{input}': {reason}")]
    Parse {
        /// The offending input.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A state-level operation received an argument that does not fit the state.
    #[error("invalid state operation: {0}")]
    InvalidState(String),
}

impl SimError {
    pub(crate) fn invalid_gate(gate: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidGate {
            gate,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// True for every error class that signals a malformed or misplaced gate.
    pub fn is_invalid_gate(&self) -> bool {
        matches!(self, Self::InvalidGate { .. } | Self::QubitOutOfRange { .. })
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
