//! `qforge-core`: statevector quantum circuit simulation.
//!
//! Holds an `n`-qubit state as `2^n` complex amplitudes and evolves it with:
//!
//! - **Gates**: Pauli, Hadamard, rotations, CNOT, multi-qubit Pauli
//!   rotations, diagonal and dense matrices, and Z-basis measurement
//! - **Circuits**: ordered gate lists executed against a state, with
//!   optional fusion of adjacent gates
//! - **Observables**: weighted Pauli sums evaluated as expectation values
//!
//! Kernels can run on one thread or on the rayon pool; both modes produce
//! bit-identical results. Every random draw takes an explicit seed.
//!
//! # Quick start
//!
//! ```rust
//! use num_complex::Complex64;
//! use qforge_core::{Observable, QuantumCircuit, QuantumState};
//!
//! // Bell state, then ⟨Z0 Z1⟩
//! let mut state = QuantumState::new(2, false).unwrap();
//! let mut circuit = QuantumCircuit::new(2);
//! circuit.add_h_gate(0).add_cnot_gate(0, 1).unwrap();
//! circuit.execute(&mut state, None).unwrap();
//!
//! let mut zz = Observable::new(2);
//! zz.add_operator(Complex64::new(1.0, 0.0), "Z 0 Z 1").unwrap();
//! let value = zz.expectation_value(&state).unwrap();
//! assert!((value.re - 1.0).abs() < 1e-12);
//! ```

pub mod circuit;
pub mod config;
pub mod error;
pub mod gate;
pub mod observable;
pub mod state;

pub use circuit::QuantumCircuit;
pub use config::{ConfigError, SimConfig};
pub use error::{SimError, SimResult};
pub use gate::{Gate, MAX_MERGE_QUBITS, merge};
pub use observable::{Observable, PauliOp, PauliString, PauliTerm};
pub use state::{QuantumState, WorkerMode};
