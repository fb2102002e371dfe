//! Pauli-sum observables.
//!
//! An observable is a weighted sum of Pauli strings,
//!
//!   O = Σ_k  c_k · P_k,   c_k ∈ ℂ,
//!
//! evaluated against a [`QuantumState`] as `Σ_k c_k ⟨ψ|P_k|ψ⟩`. For a
//! Hermitian observable (real coefficients) the imaginary part of the result
//! is zero up to rounding; it is returned but not checked.
//!
//! # Example
//!
//! ```rust
//! use num_complex::Complex64;
//! use qforge_core::{Observable, QuantumState};
//!
//! let state = QuantumState::new(1, false).unwrap();
//! let mut obs = Observable::new(1);
//! obs.add_operator(Complex64::new(1.0, 0.0), "Z 0").unwrap();
//!
//! let value = obs.expectation_value(&state).unwrap();
//! assert!((value.re - 1.0).abs() < 1e-12);
//! ```

mod pauli;

pub use pauli::{PauliOp, PauliString};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::state::{PauliMasks, QuantumState};

/// A single weighted Pauli term: `coefficient · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// Complex coefficient.
    pub coefficient: Complex64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl PauliTerm {
    /// Create a new term.
    pub fn new(coefficient: Complex64, pauli: PauliString) -> Self {
        Self { coefficient, pauli }
    }

    /// Parse the Pauli string and attach `coefficient`.
    pub fn parse(coefficient: Complex64, pauli: &str) -> SimResult<Self> {
        Ok(Self::new(coefficient, pauli.parse()?))
    }
}

/// A sum of Pauli terms over a fixed-width register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    num_qubits: u32,
    terms: Vec<PauliTerm>,
}

impl Observable {
    /// Create an observable with no terms.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// Parse `pauli_string` and append it with `coefficient`.
    ///
    /// Nothing is appended if parsing or validation fails.
    pub fn add_operator(&mut self, coefficient: Complex64, pauli_string: &str) -> SimResult<()> {
        let (pauli, highest) = PauliString::parse_indexed(pauli_string)?;
        // Identity factors are not kept in `pauli`, so range-check what was written.
        if let Some(q) = highest.filter(|&q| q >= self.num_qubits) {
            return Err(SimError::parse(
                pauli_string,
                format!(
                    "qubit {q} is out of range for a {}-qubit observable",
                    self.num_qubits
                ),
            ));
        }
        self.add_term(PauliTerm::new(coefficient, pauli))
    }

    /// Append an already-parsed term after checking it fits this register.
    pub fn add_term(&mut self, term: PauliTerm) -> SimResult<()> {
        if let Some(q) = term.pauli.max_qubit().filter(|&q| q >= self.num_qubits) {
            return Err(SimError::parse(
                &term.pauli.to_string(),
                format!(
                    "qubit {q} is out of range for a {}-qubit observable",
                    self.num_qubits
                ),
            ));
        }
        self.terms.push(term);
        Ok(())
    }

    /// Number of qubits.
    pub fn qubit_count(&self) -> u32 {
        self.num_qubits
    }

    /// All terms, in insertion order.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// `Σ_k c_k ⟨ψ|P_k|ψ⟩`. The state is only read.
    pub fn expectation_value(&self, state: &QuantumState) -> SimResult<Complex64> {
        self.transition_amplitude(state, state)
    }

    /// `Σ_k c_k ⟨bra|P_k|ket⟩`.
    pub fn transition_amplitude(
        &self,
        bra: &QuantumState,
        ket: &QuantumState,
    ) -> SimResult<Complex64> {
        for state in [bra, ket] {
            if state.qubit_count() != self.num_qubits {
                return Err(SimError::DimensionMismatch {
                    expected: self.num_qubits,
                    got: state.qubit_count(),
                });
            }
        }

        let value: Complex64 = self
            .terms
            .iter()
            .map(|term| {
                let masks = PauliMasks::from_ops(term.pauli.ops());
                term.coefficient * ket.pauli_transition(bra.state_vector(), masks)
            })
            .sum();
        trace!(terms = self.terms.len(), "evaluated observable");
        Ok(value)
    }
}

impl FromIterator<PauliTerm> for Observable {
    /// Collect terms, sizing the register to the highest qubit referenced.
    fn from_iter<T: IntoIterator<Item = PauliTerm>>(iter: T) -> Self {
        let terms: Vec<PauliTerm> = iter.into_iter().collect();
        let num_qubits = terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1);
        Self { num_qubits, terms }
    }
}
